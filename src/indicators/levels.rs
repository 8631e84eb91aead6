// =============================================================================
// Support / Resistance and Pivot Points
// =============================================================================
//
// Support/resistance come from swing pivots inside a trailing window. A bar is
// a pivot high when its high is the maximum of the `strength` bars on either
// side (ties on the right-hand side allowed, strictly greater on the left), and
// symmetrically for pivot lows.
//
//   support    = highest pivot low  strictly below the latest close
//   resistance = lowest  pivot high strictly above the latest close
//
// When no pivot qualifies the window's lowest low / highest high is used.
//
// Floor-trader pivot points are derived from a single bar:
//   P  = (H + L + C) / 3
//   R1 = 2P - L        S1 = 2P - H
//   R2 = P + (H - L)   S2 = P - (H - L)
// =============================================================================

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SupportResistance {
    pub support: f64,
    pub resistance: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PivotPoints {
    pub pivot: f64,
    pub r1: f64,
    pub r2: f64,
    pub s1: f64,
    pub s2: f64,
}

/// Nearest support and resistance around the last close of the slices.
///
/// Only the trailing `window` bars are inspected. Returns `None` when `window`
/// is zero, the slices differ in length, or fewer than `window` bars exist.
pub fn support_resistance(
    highs: &[f64],
    lows: &[f64],
    closes: &[f64],
    window: usize,
    strength: usize,
) -> Option<SupportResistance> {
    let n = closes.len();
    if window == 0 || n < window || highs.len() != n || lows.len() != n {
        return None;
    }

    let start = n - window;
    let highs = &highs[start..];
    let lows = &lows[start..];
    let close = closes[n - 1];

    let support = pivot_indices(lows, strength, |candidate, other| candidate < other)
        .map(|i| lows[i])
        .filter(|&level| level < close)
        .fold(None, |best: Option<f64>, level| {
            Some(best.map_or(level, |b| b.max(level)))
        })
        .unwrap_or_else(|| lows.iter().copied().fold(f64::MAX, f64::min));

    let resistance = pivot_indices(highs, strength, |candidate, other| candidate > other)
        .map(|i| highs[i])
        .filter(|&level| level > close)
        .fold(None, |best: Option<f64>, level| {
            Some(best.map_or(level, |b| b.min(level)))
        })
        .unwrap_or_else(|| highs.iter().copied().fold(f64::MIN, f64::max));

    Some(SupportResistance {
        support,
        resistance,
    })
}

/// Floor-trader pivots for one bar.
pub fn pivot_points(high: f64, low: f64, close: f64) -> PivotPoints {
    let pivot = (high + low + close) / 3.0;
    let range = high - low;
    PivotPoints {
        pivot,
        r1: 2.0 * pivot - low,
        r2: pivot + range,
        s1: 2.0 * pivot - high,
        s2: pivot - range,
    }
}

/// Indices `i` whose value beats every value within `strength` bars on the
/// left (`beats`) and is not beaten by any within `strength` on the right.
fn pivot_indices<'a>(
    values: &'a [f64],
    strength: usize,
    beats: impl Fn(f64, f64) -> bool + 'a,
) -> impl Iterator<Item = usize> + 'a {
    let end = values.len().saturating_sub(strength);
    (strength..end).filter(move |&i| {
        let v = values[i];
        values[i - strength..i].iter().all(|&o| beats(v, o))
            && values[i + 1..=i + strength].iter().all(|&o| !beats(o, v))
    })
}
