// =============================================================================
// Bollinger Bands
// =============================================================================
//
// Bollinger Bands consist of a middle band (SMA), an upper band (SMA + k*σ),
// and a lower band (SMA - k*σ). σ is the sample standard deviation (n - 1
// denominator) of the same window; a one-bar window has σ = 0. The Band Width (BBW) is the normalised distance:
// BBW = (upper - lower) / middle * 100.

use serde::{Deserialize, Serialize};

use super::ema::window_mean;

/// Result of a Bollinger Band calculation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BollingerBands {
    pub upper: f64,
    pub middle: f64,
    pub lower: f64,
    pub width: f64,
}

/// Bollinger Bands for every full window; output starts at index `period - 1`.
///
/// A zero middle band yields a width of 0.
pub fn bollinger_series(closes: &[f64], period: usize, num_std: f64) -> Vec<BollingerBands> {
    if period == 0 || closes.len() < period {
        return Vec::new();
    }
    closes
        .windows(period)
        .map_while(|w| bands_for_window(w, num_std))
        .collect()
}

fn bands_for_window(window: &[f64], num_std: f64) -> Option<BollingerBands> {
    let middle = window_mean(window);
    let std_dev = if window.len() < 2 {
        0.0
    } else {
        let sum_sq = window.iter().map(|x| (x - middle).powi(2)).sum::<f64>();
        (sum_sq / (window.len() - 1) as f64).sqrt()
    };

    let upper = middle + num_std * std_dev;
    let lower = middle - num_std * std_dev;
    let width = if middle == 0.0 {
        0.0
    } else {
        (upper - lower) / middle * 100.0
    };

    if upper.is_finite() && lower.is_finite() && width.is_finite() {
        Some(BollingerBands {
            upper,
            middle,
            lower,
            width,
        })
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::ema::calculate_sma;

    fn latest(closes: &[f64], period: usize, num_std: f64) -> Option<BollingerBands> {
        bollinger_series(closes, period, num_std).last().copied()
    }

    #[test]
    fn bollinger_basic() {
        let closes: Vec<f64> = (1..=20).map(|x| x as f64).collect();
        let bb = latest(&closes, 20, 2.0).unwrap();
        assert!(bb.upper > bb.middle);
        assert!(bb.lower < bb.middle);
        assert!(bb.width > 0.0);
        // Sample σ of 1..=20 is sqrt(35).
        assert!((bb.upper - (10.5 + 2.0 * 35.0_f64.sqrt())).abs() < 1e-10);
        assert!((bb.upper - 22.3322).abs() < 1e-4);
        assert!((bb.lower - (10.5 - 2.0 * 35.0_f64.sqrt())).abs() < 1e-10);
    }

    #[test]
    fn single_bar_window_has_zero_deviation() {
        let bb = latest(&[7.0, 9.0], 1, 2.0).unwrap();
        assert_eq!((bb.upper, bb.middle, bb.lower), (9.0, 9.0, 9.0));
    }

    #[test]
    fn bollinger_insufficient_data() {
        assert!(bollinger_series(&[1.0, 2.0, 3.0], 20, 2.0).is_empty());
        assert!(bollinger_series(&[1.0, 2.0, 3.0], 0, 2.0).is_empty());
    }

    #[test]
    fn bollinger_flat() {
        let bb = latest(&[100.0; 20], 20, 2.0).unwrap();
        assert_eq!(bb.upper, 100.0);
        assert_eq!(bb.middle, 100.0);
        assert_eq!(bb.lower, 100.0);
        assert_eq!(bb.width, 0.0);
    }

    #[test]
    fn middle_band_equals_sma_exactly() {
        let closes: Vec<f64> = (0..120)
            .map(|i| 1000.0 + (i as f64 * 0.37).sin() * 73.1 + i as f64 * 0.913)
            .collect();
        let sma = calculate_sma(&closes, 20);
        let bands = bollinger_series(&closes, 20, 2.0);
        assert_eq!(sma.len(), bands.len());
        for (s, b) in sma.iter().zip(&bands) {
            assert_eq!(*s, b.middle);
        }
    }

    #[test]
    fn zero_middle_band_has_zero_width() {
        let bb = latest(&[0.0; 5], 5, 2.0).unwrap();
        assert_eq!(bb.width, 0.0);
    }
}
