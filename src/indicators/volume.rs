// =============================================================================
// Volume Indicators — Volume SMA, Volume Ratio, On-Balance Volume
// =============================================================================
//
//   volume_sma   = SMA(volume, period)
//   volume_ratio = volume / volume_sma            (undefined when sma == 0)
//   OBV_0        = 0
//   OBV_t        = OBV_{t-1} + volume_t   if close_t > close_{t-1}
//                  OBV_{t-1} - volume_t   if close_t < close_{t-1}
//                  OBV_{t-1}              otherwise
// =============================================================================

use serde::{Deserialize, Serialize};

use super::ema::calculate_sma;

/// Volume SMA and the current bar's volume relative to it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VolumeReading {
    pub sma: f64,
    /// `None` when the volume SMA is zero.
    pub ratio: Option<f64>,
}

/// Volume SMA / ratio series; output starts at input index `period - 1`.
pub fn calculate_volume(volumes: &[f64], period: usize) -> Vec<VolumeReading> {
    calculate_sma(volumes, period)
        .into_iter()
        .zip(volumes.iter().skip(period.saturating_sub(1)))
        .map(|(sma, &volume)| VolumeReading {
            sma,
            ratio: if sma > 0.0 { Some(volume / sma) } else { None },
        })
        .collect()
}

/// On-Balance Volume, one value per input bar (the first bar is 0).
///
/// Returns an empty vec when the slices differ in length.
pub fn calculate_obv(closes: &[f64], volumes: &[f64]) -> Vec<f64> {
    if closes.len() != volumes.len() || closes.is_empty() {
        return Vec::new();
    }

    let mut obv = 0.0;
    let mut result = Vec::with_capacity(closes.len());
    result.push(obv);

    for (w, &volume) in closes.windows(2).zip(&volumes[1..]) {
        if w[1] > w[0] {
            obv += volume;
        } else if w[1] < w[0] {
            obv -= volume;
        }
        result.push(obv);
    }

    result
}
