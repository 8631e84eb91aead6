// =============================================================================
// Moving Averages — SMA and EMA
// =============================================================================
//
// SMA is the plain arithmetic mean of the trailing `period` values.
//
// EMA gives more weight to recent prices, making it more responsive to new
// information than the SMA.
//
// Formula:
//   multiplier = 2 / (period + 1)
//   EMA_t      = value_t * multiplier + EMA_{t-1} * (1 - multiplier)
//
// The very first EMA value is seeded with the SMA of the first `period` values.
// =============================================================================

/// Compute the SMA series for `values` and look-back `period`.
///
/// Each output element corresponds to an input index starting at
/// `period - 1`. Every window is summed independently so the value at a given
/// index does not depend on how much history precedes it; Bollinger middle
/// bands reuse this routine and therefore match the SMA exactly.
///
/// # Edge cases
/// - `period == 0` => empty vec
/// - `values.len() < period` => empty vec
pub fn calculate_sma(values: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || values.len() < period {
        return Vec::new();
    }

    values.windows(period).map(window_mean).collect()
}

/// Mean of a single window. Shared by SMA and Bollinger.
pub(crate) fn window_mean(window: &[f64]) -> f64 {
    window.iter().sum::<f64>() / window.len() as f64
}

/// Compute the EMA series for the given `values` slice and look-back `period`.
///
/// Returns an empty `Vec` when the input is too short or the period is zero.
/// Each output element corresponds to an input index starting at
/// `period - 1`.
///
/// # Edge cases
/// - `period == 0` => empty vec
/// - `values.len() < period` => empty vec
/// - Non-finite intermediate values stop the series.
pub fn calculate_ema(values: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || values.len() < period {
        return Vec::new();
    }

    let multiplier = 2.0 / (period + 1) as f64;

    // Seed: SMA of the first `period` values.
    let sma = window_mean(&values[..period]);
    if !sma.is_finite() {
        return Vec::new();
    }

    let mut result = Vec::with_capacity(values.len() - period + 1);
    result.push(sma);

    let mut prev_ema = sma;
    for &value in &values[period..] {
        // Same recurrence rearranged so a constant input stays exact.
        let ema = prev_ema + multiplier * (value - prev_ema);
        if !ema.is_finite() {
            break;
        }
        result.push(ema);
        prev_ema = ema;
    }

    result
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    // ---- calculate_sma ---------------------------------------------------

    #[test]
    fn sma_insufficient_data() {
        assert!(calculate_sma(&[1.0, 2.0], 3).is_empty());
        assert!(calculate_sma(&[1.0, 2.0], 0).is_empty());
    }

    #[test]
    fn sma_known_values() {
        let values: Vec<f64> = (1..=5).map(|x| x as f64).collect();
        assert_eq!(calculate_sma(&values, 3), vec![2.0, 3.0, 4.0]);
    }

    #[test]
    fn sma_flat_series() {
        let sma = calculate_sma(&[100.0; 30], 20);
        assert_eq!(sma.len(), 11);
        assert!(sma.iter().all(|&v| v == 100.0));
    }

    // ---- calculate_ema ---------------------------------------------------

    #[test]
    fn ema_empty_input() {
        assert!(calculate_ema(&[], 5).is_empty());
    }

    #[test]
    fn ema_period_zero() {
        assert!(calculate_ema(&[1.0, 2.0, 3.0], 0).is_empty());
    }

    #[test]
    fn ema_period_equals_length() {
        let ema = calculate_ema(&[2.0, 4.0, 6.0], 3);
        assert_eq!(ema.len(), 1);
        assert!((ema[0] - 4.0).abs() < 1e-10);
    }

    #[test]
    fn ema_known_values() {
        // 5-period EMA of [1..=10]: SMA seed = 3.0, multiplier = 1/3.
        let values: Vec<f64> = (1..=10).map(|x| x as f64).collect();
        let ema = calculate_ema(&values, 5);
        assert_eq!(ema.len(), 6);

        let mult = 2.0 / 6.0;
        let mut expected = 3.0;
        let mut expected_vec = vec![expected];
        for &c in &values[5..] {
            expected = c * mult + expected * (1.0 - mult);
            expected_vec.push(expected);
        }
        for (a, b) in ema.iter().zip(expected_vec.iter()) {
            assert!((a - b).abs() < 1e-10, "got {a}, expected {b}");
        }
    }

    #[test]
    fn ema_constant_series_stays_constant() {
        let ema = calculate_ema(&[42.5; 100], 12);
        assert!(ema.iter().all(|&v| (v - 42.5).abs() < 1e-9));
    }

    #[test]
    fn ema_converges_after_level_shift() {
        // Jump from 10 to 50: the EMA approaches the new level.
        let mut values = vec![10.0; 20];
        values.extend(std::iter::repeat(50.0).take(200));
        let last = *calculate_ema(&values, 10).last().unwrap();
        assert!((last - 50.0).abs() < 1e-6, "EMA did not converge: {last}");
    }

    #[test]
    fn ema_handles_nan_in_input() {
        let ema = calculate_ema(&[1.0, 2.0, 3.0, f64::NAN, 5.0], 3);
        assert_eq!(ema.len(), 1);
    }
}
