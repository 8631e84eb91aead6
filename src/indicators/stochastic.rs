// =============================================================================
// Stochastic Oscillator
// =============================================================================
//
//   %K = (close - lowest_low) / (highest_high - lowest_low) * 100
//   %D = SMA(%K, smoothing)
//
// Both extremes are taken over the trailing `period` bars. A zero range (all
// highs and lows equal) reports %K = 50.
// =============================================================================

use serde::{Deserialize, Serialize};

use super::ema::calculate_sma;

/// One stochastic reading. `d` is `None` until `smoothing` %K values exist.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StochasticReading {
    pub k: f64,
    pub d: Option<f64>,
}

/// Compute %K / %D for every bar from input index `period - 1` onwards.
///
/// `highs`, `lows` and `closes` must have equal length; a mismatch or a zero
/// period yields an empty vec.
pub fn calculate_stochastic(
    highs: &[f64],
    lows: &[f64],
    closes: &[f64],
    period: usize,
    smoothing: usize,
) -> Vec<StochasticReading> {
    let n = closes.len();
    if period == 0 || smoothing == 0 || n < period || highs.len() != n || lows.len() != n {
        return Vec::new();
    }

    let k_values: Vec<f64> = (period - 1..n)
        .map(|i| {
            let start = i + 1 - period;
            let highest = highs[start..=i].iter().copied().fold(f64::MIN, f64::max);
            let lowest = lows[start..=i].iter().copied().fold(f64::MAX, f64::min);
            percent_k(closes[i], lowest, highest)
        })
        .collect();

    let d_values = calculate_sma(&k_values, smoothing);

    k_values
        .iter()
        .enumerate()
        .map(|(i, &k)| StochasticReading {
            k,
            d: i
                .checked_sub(smoothing - 1)
                .and_then(|j| d_values.get(j).copied()),
        })
        .collect()
}

fn percent_k(close: f64, lowest: f64, highest: f64) -> f64 {
    let range = highest - lowest;
    if range == 0.0 {
        return 50.0;
    }
    ((close - lowest) / range * 100.0).clamp(0.0, 100.0)
}
