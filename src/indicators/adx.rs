// =============================================================================
// Average Directional Index (ADX)
// =============================================================================
//
// ADX quantifies trend **strength** regardless of direction.
//
// Calculation pipeline:
//   1. Compute +DM (positive directional movement) and -DM per bar.
//   2. Compute True Range (TR) per bar.
//   3. Apply Wilder's smoothing (period) to +DM, -DM, and TR.
//   4. Derive +DI = smoothed(+DM) / smoothed(TR) * 100
//            -DI = smoothed(-DM) / smoothed(TR) * 100
//   5. DX  = |+DI - -DI| / (+DI + -DI) * 100
//   6. ADX = Wilder's smoothed average of DX over `period` bars.
//
// Interpretation:
//   ADX > 25  => trending market
//   ADX < 20  => ranging / choppy market
// =============================================================================

use serde::{Deserialize, Serialize};

/// ADX together with the directional indices it was derived from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AdxReading {
    pub adx: f64,
    pub plus_di: f64,
    pub minus_di: f64,
}

/// Compute the ADX series from parallel high/low/close slices.
///
/// The first reading sits at input index `2 * period - 1`: `period` bar
/// transitions seed the smoothed +DM/-DM/TR (first DX at index `period`),
/// then `period` DX values seed the ADX average.
///
/// Returns an empty vec when `period` is zero, the slices differ in length,
/// there are fewer than `2 * period` bars, or any intermediate value is
/// non-finite.
pub fn calculate_adx(highs: &[f64], lows: &[f64], closes: &[f64], period: usize) -> Vec<AdxReading> {
    let n = closes.len();
    if period == 0 || highs.len() != n || lows.len() != n || n < 2 * period {
        return Vec::new();
    }

    let period_f = period as f64;

    // ------------------------------------------------------------------
    // Step 1 & 2: Raw +DM, -DM, and True Range for each consecutive pair
    // ------------------------------------------------------------------
    let bar_count = n - 1;
    let mut plus_dm = Vec::with_capacity(bar_count);
    let mut minus_dm = Vec::with_capacity(bar_count);
    let mut tr_vals = Vec::with_capacity(bar_count);

    for i in 1..n {
        let tr = (highs[i] - lows[i])
            .max((highs[i] - closes[i - 1]).abs())
            .max((lows[i] - closes[i - 1]).abs());

        let up_move = highs[i] - highs[i - 1];
        let down_move = lows[i - 1] - lows[i];

        plus_dm.push(if up_move > down_move && up_move > 0.0 {
            up_move
        } else {
            0.0
        });
        minus_dm.push(if down_move > up_move && down_move > 0.0 {
            down_move
        } else {
            0.0
        });
        tr_vals.push(tr);
    }

    // ------------------------------------------------------------------
    // Step 3-5: Wilder's smoothing of +DM, -DM, TR and the resulting DX
    // ------------------------------------------------------------------
    let mut smooth_plus_dm: f64 = plus_dm[..period].iter().sum();
    let mut smooth_minus_dm: f64 = minus_dm[..period].iter().sum();
    let mut smooth_tr: f64 = tr_vals[..period].iter().sum();

    let mut directional = Vec::with_capacity(bar_count - period + 1);
    directional.push(directional_index(smooth_plus_dm, smooth_minus_dm, smooth_tr));

    for i in period..bar_count {
        smooth_plus_dm = smooth_plus_dm - smooth_plus_dm / period_f + plus_dm[i];
        smooth_minus_dm = smooth_minus_dm - smooth_minus_dm / period_f + minus_dm[i];
        smooth_tr = smooth_tr - smooth_tr / period_f + tr_vals[i];
        directional.push(directional_index(smooth_plus_dm, smooth_minus_dm, smooth_tr));
    }

    // ------------------------------------------------------------------
    // Step 6: ADX = Wilder's smoothed average of DX
    // ------------------------------------------------------------------
    let mut result = Vec::with_capacity(directional.len() - period + 1);

    let mut adx = directional[..period].iter().map(|d| d.dx).sum::<f64>() / period_f;
    let seed = directional[period - 1];
    if !adx.is_finite() {
        return result;
    }
    result.push(AdxReading {
        adx,
        plus_di: seed.plus_di,
        minus_di: seed.minus_di,
    });

    for d in &directional[period..] {
        adx = (adx * (period_f - 1.0) + d.dx) / period_f;
        if !adx.is_finite() || !d.dx.is_finite() {
            break;
        }
        result.push(AdxReading {
            adx,
            plus_di: d.plus_di,
            minus_di: d.minus_di,
        });
    }

    result
}

// =============================================================================
// Internal helpers
// =============================================================================

#[derive(Debug, Clone, Copy)]
struct Directional {
    plus_di: f64,
    minus_di: f64,
    dx: f64,
}

/// Derive +DI, -DI and DX from smoothed +DM, -DM and TR.
///
/// A zero true range or a zero DI sum means no directional movement; DX is
/// reported as 0 in both cases.
fn directional_index(smooth_plus_dm: f64, smooth_minus_dm: f64, smooth_tr: f64) -> Directional {
    if smooth_tr == 0.0 {
        return Directional {
            plus_di: 0.0,
            minus_di: 0.0,
            dx: 0.0,
        };
    }

    let plus_di = (smooth_plus_dm / smooth_tr) * 100.0;
    let minus_di = (smooth_minus_dm / smooth_tr) * 100.0;

    let di_sum = plus_di + minus_di;
    let dx = if di_sum == 0.0 {
        0.0
    } else {
        ((plus_di - minus_di).abs() / di_sum) * 100.0
    };

    Directional {
        plus_di,
        minus_di,
        dx,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    /// Split (high, low, close) tuples into parallel slices.
    fn columns(bars: &[(f64, f64, f64)]) -> (Vec<f64>, Vec<f64>, Vec<f64>) {
        (
            bars.iter().map(|b| b.0).collect(),
            bars.iter().map(|b| b.1).collect(),
            bars.iter().map(|b| b.2).collect(),
        )
    }

    #[test]
    fn adx_period_zero() {
        let (h, l, c) = columns(&[(2.0, 0.5, 1.5); 50]);
        assert!(calculate_adx(&h, &l, &c, 0).is_empty());
    }

    #[test]
    fn adx_insufficient_data() {
        let (h, l, c) = columns(&[(2.0, 0.5, 1.5); 10]);
        assert!(calculate_adx(&h, &l, &c, 14).is_empty());
    }

    #[test]
    fn adx_strong_uptrend() {
        // Consecutive higher highs and higher lows — a strong trend.
        let bars: Vec<_> = (0..60)
            .map(|i| {
                let base = 100.0 + i as f64 * 2.0;
                (base + 1.5, base - 0.5, base + 1.0)
            })
            .collect();
        let (h, l, c) = columns(&bars);

        let last = *calculate_adx(&h, &l, &c, 14).last().unwrap();
        assert!(last.adx > 25.0, "expected ADX > 25 for strong trend, got {}", last.adx);
        assert!(last.plus_di > last.minus_di);
    }

    #[test]
    fn adx_flat_market() {
        let (h, l, c) = columns(&[(101.0, 99.0, 100.0); 60]);
        let last = *calculate_adx(&h, &l, &c, 14).last().unwrap();
        assert!(last.adx < 1.0, "expected ADX near 0 for flat market, got {}", last.adx);
    }

    #[test]
    fn adx_zero_range_market_is_zero_not_unavailable() {
        let (h, l, c) = columns(&[(100.0, 100.0, 100.0); 40]);
        let series = calculate_adx(&h, &l, &c, 14);
        assert!(!series.is_empty());
        assert!(series.iter().all(|r| r.adx == 0.0));
    }

    #[test]
    fn adx_result_range() {
        let bars: Vec<_> = (0..100)
            .map(|i| {
                let base = 50.0 + (i as f64 * 0.3).sin() * 10.0;
                (base + 1.0, base - 1.0, base + 0.5)
            })
            .collect();
        let (h, l, c) = columns(&bars);
        for r in calculate_adx(&h, &l, &c, 14) {
            assert!((0.0..=100.0).contains(&r.adx), "ADX {} out of [0,100] range", r.adx);
        }
    }

    #[test]
    fn adx_minimum_bars_exact() {
        let period = 5;
        let min = 2 * period;
        let bars: Vec<_> = (0..min)
            .map(|i| {
                let base = 100.0 + i as f64;
                (base + 1.0, base - 0.5, base + 0.5)
            })
            .collect();
        let (h, l, c) = columns(&bars);
        assert_eq!(calculate_adx(&h, &l, &c, period).len(), 1);

        // One fewer yields nothing.
        assert!(calculate_adx(&h[..min - 1], &l[..min - 1], &c[..min - 1], period).is_empty());
    }
}
