// =============================================================================
// Indicator Engine
// =============================================================================
//
// Runs every indicator over a validated `PriceSeries` and assembles the values
// for one evaluation point into an `IndicatorBundle`. Indicators whose warm-up
// window is longer than the available history are reported as `None`; the
// engine itself never fails once the configuration has been validated.
//
// The engine holds only its configuration, so a single instance can be shared
// across threads and evaluated concurrently for different symbols.
// =============================================================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::IndicatorConfig;
use crate::errors::ConfigError;
use crate::indicators::{
    adx::calculate_adx,
    bollinger::bollinger_series,
    ema::{calculate_ema, calculate_sma},
    levels::{pivot_points, support_resistance},
    macd::calculate_macd,
    rsi::calculate_rsi,
    stochastic::calculate_stochastic,
    volume::{calculate_obv, calculate_volume},
    AdxReading, BollingerBands, MacdReading, PivotPoints, StochasticReading, SupportResistance,
    VolumeReading,
};
use crate::market_data::PriceSeries;

/// Snapshot of every indicator at one point of a series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorBundle {
    pub timestamp: DateTime<Utc>,
    pub close: f64,
    pub volume: f64,

    pub rsi: Option<f64>,
    pub macd: Option<MacdReading>,
    pub sma_fast: Option<f64>,
    pub sma_slow: Option<f64>,
    pub ema_fast: Option<f64>,
    pub ema_slow: Option<f64>,
    pub bollinger: Option<BollingerBands>,
    pub stochastic: Option<StochasticReading>,
    pub adx: Option<AdxReading>,
    pub volume_stats: Option<VolumeReading>,
    /// Running on-balance volume; 0 on the first sample.
    pub obv: f64,
    pub levels: Option<SupportResistance>,
    /// Floor pivots of the evaluated bar.
    pub pivots: PivotPoints,
}

/// Pure indicator engine parameterised by an [`IndicatorConfig`].
#[derive(Debug, Clone)]
pub struct IndicatorEngine {
    config: IndicatorConfig,
}

impl IndicatorEngine {
    /// Build an engine after validating `config`.
    pub fn new(config: IndicatorConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &IndicatorConfig {
        &self.config
    }

    /// Indicator bundle for the latest sample of `series`.
    pub fn evaluate(&self, series: &PriceSeries) -> IndicatorBundle {
        let columns = Columns::compute(series, &self.config);
        let bundle = columns.bundle_at(series.len() - 1);

        debug!(
            symbol = series.symbol(),
            samples = series.len(),
            rsi = ?bundle.rsi,
            adx = ?bundle.adx.map(|a| a.adx),
            "indicator bundle computed"
        );

        bundle
    }

    /// One bundle per sample, oldest first, for charting.
    ///
    /// Early bundles carry `None` for every indicator whose window is not yet
    /// filled.
    pub fn evaluate_history(&self, series: &PriceSeries) -> Vec<IndicatorBundle> {
        let columns = Columns::compute(series, &self.config);
        (0..series.len()).map(|i| columns.bundle_at(i)).collect()
    }
}

impl Default for IndicatorEngine {
    fn default() -> Self {
        Self {
            config: IndicatorConfig::default(),
        }
    }
}

// =============================================================================
// Internal helpers
// =============================================================================

/// Full indicator series for one input, each with the input index of its
/// first element.
struct Columns<'a> {
    series: &'a PriceSeries,
    config: &'a IndicatorConfig,
    highs: Vec<f64>,
    lows: Vec<f64>,
    closes: Vec<f64>,
    rsi: Vec<f64>,
    macd: Vec<MacdReading>,
    sma_fast: Vec<f64>,
    sma_slow: Vec<f64>,
    ema_fast: Vec<f64>,
    ema_slow: Vec<f64>,
    bollinger: Vec<BollingerBands>,
    stochastic: Vec<StochasticReading>,
    adx: Vec<AdxReading>,
    volume: Vec<VolumeReading>,
    obv: Vec<f64>,
}

impl<'a> Columns<'a> {
    fn compute(series: &'a PriceSeries, config: &'a IndicatorConfig) -> Self {
        let highs = series.highs();
        let lows = series.lows();
        let closes = series.closes();
        let volumes = series.volumes();

        Self {
            series,
            config,
            rsi: calculate_rsi(&closes, config.rsi_period),
            macd: calculate_macd(&closes, config.macd_fast, config.macd_slow, config.macd_signal),
            sma_fast: calculate_sma(&closes, config.sma_fast),
            sma_slow: calculate_sma(&closes, config.sma_slow),
            ema_fast: calculate_ema(&closes, config.ema_fast),
            ema_slow: calculate_ema(&closes, config.ema_slow),
            bollinger: bollinger_series(&closes, config.bollinger_period, config.bollinger_std_dev),
            stochastic: calculate_stochastic(
                &highs,
                &lows,
                &closes,
                config.stochastic_period,
                config.stochastic_smoothing,
            ),
            adx: calculate_adx(&highs, &lows, &closes, config.adx_period),
            volume: calculate_volume(&volumes, config.volume_period),
            obv: calculate_obv(&closes, &volumes),
            highs,
            lows,
            closes,
        }
    }

    fn bundle_at(&self, i: usize) -> IndicatorBundle {
        let cfg = self.config;
        let sample = &self.series.samples()[i];

        IndicatorBundle {
            timestamp: sample.timestamp,
            close: sample.close,
            volume: sample.volume,
            rsi: at(&self.rsi, cfg.rsi_period, i),
            macd: at(&self.macd, cfg.macd_slow - 1, i),
            sma_fast: at(&self.sma_fast, cfg.sma_fast - 1, i),
            sma_slow: at(&self.sma_slow, cfg.sma_slow - 1, i),
            ema_fast: at(&self.ema_fast, cfg.ema_fast - 1, i),
            ema_slow: at(&self.ema_slow, cfg.ema_slow - 1, i),
            bollinger: at(&self.bollinger, cfg.bollinger_period - 1, i),
            stochastic: at(&self.stochastic, cfg.stochastic_period - 1, i),
            adx: at(&self.adx, 2 * cfg.adx_period - 1, i),
            volume_stats: at(&self.volume, cfg.volume_period - 1, i),
            obv: at(&self.obv, 0, i).unwrap_or(0.0),
            levels: support_resistance(
                &self.highs[..=i],
                &self.lows[..=i],
                &self.closes[..=i],
                cfg.levels_window,
                cfg.pivot_strength,
            ),
            pivots: pivot_points(sample.high, sample.low, sample.close),
        }
    }
}

/// Value of a trimmed series at input index `i`, given the input index of
/// its first element.
fn at<T: Copy>(values: &[T], first_index: usize, i: usize) -> Option<T> {
    i.checked_sub(first_index)
        .and_then(|j| values.get(j).copied())
}
