// =============================================================================
// Signal Aggregator — IndicatorBundle -> FeatureSummary
// =============================================================================
//
// Maps numeric indicator values onto a handful of categorical states using the
// cut-offs in `SignalThresholds`. An unavailable indicator becomes `Unknown`
// in its category; aggregation never fails.
//
// Trend direction is a vote between up to three voters:
//   - SMA fast vs SMA slow
//   - EMA fast vs EMA slow
//   - MACD line vs signal (sign of the line while the signal is warming up)
// A voter with equal sides abstains.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::SignalThresholds;
use crate::engine::IndicatorBundle;

/// Oscillator state (RSI, stochastic).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Momentum {
    Oversold,
    Neutral,
    Overbought,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Trend {
    Bullish,
    Bearish,
    Sideways,
    Unknown,
}

/// ADX-derived trend strength.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TrendStrength {
    Trending,
    Moderate,
    Weak,
    Unknown,
}

/// Where the close sits relative to the Bollinger Bands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BandPosition {
    AboveUpper,
    Within,
    BelowLower,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VolumeState {
    High,
    Normal,
    Low,
    Unknown,
}

/// Categorical digest of one `IndicatorBundle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureSummary {
    pub momentum: Momentum,
    pub stochastic: Momentum,
    pub trend: Trend,
    pub trend_strength: TrendStrength,
    pub band_position: BandPosition,
    pub volume: VolumeState,
}

/// Stateless mapper from bundles to summaries.
#[derive(Debug, Clone, Default)]
pub struct SignalAggregator {
    thresholds: SignalThresholds,
}

impl SignalAggregator {
    pub fn new(thresholds: SignalThresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &SignalThresholds {
        &self.thresholds
    }

    pub fn summarize(&self, bundle: &IndicatorBundle) -> FeatureSummary {
        let t = &self.thresholds;
        FeatureSummary {
            momentum: classify_oscillator(bundle.rsi, t.rsi_oversold, t.rsi_overbought),
            stochastic: classify_oscillator(
                bundle.stochastic.map(|s| s.k),
                t.stochastic_oversold,
                t.stochastic_overbought,
            ),
            trend: trend_direction(bundle),
            trend_strength: match bundle.adx {
                Some(a) if a.adx > t.adx_trending => TrendStrength::Trending,
                Some(a) if a.adx < t.adx_weak => TrendStrength::Weak,
                Some(_) => TrendStrength::Moderate,
                None => TrendStrength::Unknown,
            },
            band_position: match bundle.bollinger {
                Some(bb) if bundle.close > bb.upper => BandPosition::AboveUpper,
                Some(bb) if bundle.close < bb.lower => BandPosition::BelowLower,
                Some(_) => BandPosition::Within,
                None => BandPosition::Unknown,
            },
            volume: match bundle.volume_stats.and_then(|v| v.ratio) {
                Some(r) if r > t.volume_high => VolumeState::High,
                Some(r) if r < t.volume_low => VolumeState::Low,
                Some(_) => VolumeState::Normal,
                None => VolumeState::Unknown,
            },
        }
    }
}

fn classify_oscillator(value: Option<f64>, oversold: f64, overbought: f64) -> Momentum {
    match value {
        Some(v) if v < oversold => Momentum::Oversold,
        Some(v) if v > overbought => Momentum::Overbought,
        Some(_) => Momentum::Neutral,
        None => Momentum::Unknown,
    }
}

fn trend_direction(bundle: &IndicatorBundle) -> Trend {
    let macd_vote = bundle.macd.map(|m| match m.signal {
        Some(signal) => (m.line, signal),
        None => (m.line, 0.0),
    });

    let voters = [
        bundle.sma_fast.zip(bundle.sma_slow),
        bundle.ema_fast.zip(bundle.ema_slow),
        macd_vote,
    ];

    let mut available = 0;
    let mut bullish = 0;
    let mut bearish = 0;
    for (fast, slow) in voters.into_iter().flatten() {
        available += 1;
        if fast > slow {
            bullish += 1;
        } else if fast < slow {
            bearish += 1;
        }
    }

    if available == 0 {
        Trend::Unknown
    } else if bullish > bearish {
        Trend::Bullish
    } else if bearish > bullish {
        Trend::Bearish
    } else {
        Trend::Sideways
    }
}

// ---------------------------------------------------------------------------
// Display
// ---------------------------------------------------------------------------

impl fmt::Display for Momentum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Oversold => write!(f, "OVERSOLD"),
            Self::Neutral => write!(f, "NEUTRAL"),
            Self::Overbought => write!(f, "OVERBOUGHT"),
            Self::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bullish => write!(f, "BULLISH"),
            Self::Bearish => write!(f, "BEARISH"),
            Self::Sideways => write!(f, "SIDEWAYS"),
            Self::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

impl fmt::Display for TrendStrength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Trending => write!(f, "STRONG"),
            Self::Moderate => write!(f, "MODERATE"),
            Self::Weak => write!(f, "WEAK"),
            Self::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

impl fmt::Display for BandPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AboveUpper => write!(f, "ABOVE UPPER BAND"),
            Self::Within => write!(f, "WITHIN BANDS"),
            Self::BelowLower => write!(f, "BELOW LOWER BAND"),
            Self::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

impl fmt::Display for VolumeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::High => write!(f, "HIGH"),
            Self::Normal => write!(f, "NORMAL"),
            Self::Low => write!(f, "LOW"),
            Self::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::IndicatorEngine;
    use crate::indicators::{AdxReading, BollingerBands, MacdReading, VolumeReading};
    use crate::market_data::{PriceSample, PriceSeries};
    use chrono::{Duration, TimeZone, Utc};

    fn series(closes: &[f64]) -> PriceSeries {
        let start = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        let samples = closes
            .iter()
            .enumerate()
            .map(|(i, &c)| PriceSample {
                timestamp: start + Duration::days(i as i64),
                open: c,
                high: c * 1.01,
                low: c * 0.99,
                close: c,
                volume: 500.0,
            })
            .collect();
        PriceSeries::new("AGG", samples).unwrap()
    }

    fn empty_bundle(close: f64) -> IndicatorBundle {
        IndicatorEngine::default().evaluate(&series(&[close]))
    }

    #[test]
    fn everything_unknown_on_single_sample() {
        let summary = SignalAggregator::default().summarize(&empty_bundle(10.0));
        assert_eq!(summary.momentum, Momentum::Unknown);
        assert_eq!(summary.stochastic, Momentum::Unknown);
        assert_eq!(summary.trend, Trend::Unknown);
        assert_eq!(summary.trend_strength, TrendStrength::Unknown);
        assert_eq!(summary.band_position, BandPosition::Unknown);
        assert_eq!(summary.volume, VolumeState::Unknown);
    }

    #[test]
    fn rsi_thresholds() {
        let agg = SignalAggregator::default();
        let mut bundle = empty_bundle(10.0);
        bundle.rsi = Some(25.0);
        assert_eq!(agg.summarize(&bundle).momentum, Momentum::Oversold);
        bundle.rsi = Some(75.0);
        assert_eq!(agg.summarize(&bundle).momentum, Momentum::Overbought);
        bundle.rsi = Some(30.0);
        assert_eq!(agg.summarize(&bundle).momentum, Momentum::Neutral);
    }

    #[test]
    fn band_and_volume_and_adx_states() {
        let agg = SignalAggregator::default();
        let mut bundle = empty_bundle(120.0);
        bundle.bollinger = Some(BollingerBands {
            upper: 110.0,
            middle: 100.0,
            lower: 90.0,
            width: 20.0,
        });
        bundle.volume_stats = Some(VolumeReading {
            sma: 100.0,
            ratio: Some(2.0),
        });
        bundle.adx = Some(AdxReading {
            adx: 30.0,
            plus_di: 25.0,
            minus_di: 10.0,
        });

        let summary = agg.summarize(&bundle);
        assert_eq!(summary.band_position, BandPosition::AboveUpper);
        assert_eq!(summary.volume, VolumeState::High);
        assert_eq!(summary.trend_strength, TrendStrength::Trending);

        bundle.close = 80.0;
        bundle.volume_stats = Some(VolumeReading {
            sma: 0.0,
            ratio: None,
        });
        bundle.adx = Some(AdxReading {
            adx: 22.0,
            plus_di: 1.0,
            minus_di: 1.0,
        });
        let summary = agg.summarize(&bundle);
        assert_eq!(summary.band_position, BandPosition::BelowLower);
        assert_eq!(summary.volume, VolumeState::Unknown);
        assert_eq!(summary.trend_strength, TrendStrength::Moderate);
    }

    #[test]
    fn macd_line_sign_votes_before_signal_exists() {
        let mut bundle = empty_bundle(10.0);
        bundle.macd = Some(MacdReading {
            line: -0.5,
            signal: None,
            histogram: None,
        });
        assert_eq!(SignalAggregator::default().summarize(&bundle).trend, Trend::Bearish);
    }

    #[test]
    fn rising_series_is_bullish() {
        let closes: Vec<f64> = (1..=50).map(|x| 100.0 + x as f64).collect();
        let bundle = IndicatorEngine::default().evaluate(&series(&closes));
        let summary = SignalAggregator::default().summarize(&bundle);
        assert_eq!(summary.trend, Trend::Bullish);
        assert_eq!(summary.momentum, Momentum::Overbought);
    }

    #[test]
    fn falling_series_is_bearish() {
        let closes: Vec<f64> = (1..=60).map(|x| 200.0 - x as f64).collect();
        let bundle = IndicatorEngine::default().evaluate(&series(&closes));
        let summary = SignalAggregator::default().summarize(&bundle);
        assert_eq!(summary.trend, Trend::Bearish);
        assert_eq!(summary.momentum, Momentum::Oversold);
    }

    #[test]
    fn flat_series_is_sideways_within_bands() {
        let bundle = IndicatorEngine::default().evaluate(&series(&[100.0; 60]));
        let summary = SignalAggregator::default().summarize(&bundle);
        assert_eq!(summary.trend, Trend::Sideways);
        assert_eq!(summary.band_position, BandPosition::Within);
        assert_eq!(summary.volume, VolumeState::Normal);
        assert_eq!(summary.stochastic, Momentum::Neutral);
    }

    #[test]
    fn summary_serialises_with_screaming_case() {
        let summary = SignalAggregator::default().summarize(&empty_bundle(1.0));
        let json = serde_json::to_value(summary).unwrap();
        assert_eq!(json["trend"], "UNKNOWN");
        assert_eq!(json["band_position"], "UNKNOWN");
    }
}
