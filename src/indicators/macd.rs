// =============================================================================
// Moving Average Convergence Divergence (MACD)
// =============================================================================
//
//   line      = EMA(fast) - EMA(slow)
//   signal    = EMA(line, signal_period)
//   histogram = line - signal
//
// The line exists from input index `slow - 1`; signal and histogram from
// index `slow + signal_period - 2`.
// =============================================================================

use serde::{Deserialize, Serialize};

use super::ema::calculate_ema;

/// One MACD reading. `signal` / `histogram` stay `None` until the signal EMA
/// has enough line values to seed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MacdReading {
    pub line: f64,
    pub signal: Option<f64>,
    pub histogram: Option<f64>,
}

/// Compute the MACD series.
///
/// The output starts at input index `slow - 1`. Returns an empty vec when
/// any period is zero, `fast >= slow`, or `closes.len() < slow`.
pub fn calculate_macd(
    closes: &[f64],
    fast: usize,
    slow: usize,
    signal_period: usize,
) -> Vec<MacdReading> {
    if fast == 0 || signal_period == 0 || fast >= slow || closes.len() < slow {
        return Vec::new();
    }

    let ema_fast = calculate_ema(closes, fast);
    let ema_slow = calculate_ema(closes, slow);

    // ema_fast[i] is at input index fast-1+i; align it to ema_slow.
    let offset = slow - fast;
    let line: Vec<f64> = ema_slow
        .iter()
        .zip(ema_fast.iter().skip(offset))
        .map(|(s, f)| f - s)
        .collect();

    let signal = calculate_ema(&line, signal_period);
    let signal_offset = signal_period - 1;

    line.iter()
        .enumerate()
        .map(|(i, &line)| {
            let signal = i
                .checked_sub(signal_offset)
                .and_then(|j| signal.get(j).copied());
            MacdReading {
                line,
                signal,
                histogram: signal.map(|s| line - s),
            }
        })
        .collect()
}
