// =============================================================================
// Configuration — indicator periods, signal thresholds, provider settings
// =============================================================================
//
// Every tunable lives in an explicit struct that is passed to the engine and
// the providers; nothing is read from process-wide state after startup.
//
// Persistence uses an atomic tmp + rename pattern to prevent corruption on
// crash. All fields carry `#[serde(default)]` so that adding new fields never
// breaks loading an older config file.
// =============================================================================

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::ConfigError;

// =============================================================================
// Default-value helpers (required by serde `default = "..."` attribute)
// =============================================================================

fn default_symbols() -> Vec<String> {
    vec!["BTC".to_string(), "ETH".to_string(), "SOL".to_string()]
}

fn default_rsi_period() -> usize {
    14
}

fn default_macd_fast() -> usize {
    12
}

fn default_macd_slow() -> usize {
    26
}

fn default_macd_signal() -> usize {
    9
}

fn default_sma_fast() -> usize {
    20
}

fn default_sma_slow() -> usize {
    50
}

fn default_ema_fast() -> usize {
    12
}

fn default_ema_slow() -> usize {
    26
}

fn default_bollinger_period() -> usize {
    20
}

fn default_bollinger_std_dev() -> f64 {
    2.0
}

fn default_stochastic_period() -> usize {
    14
}

fn default_stochastic_smoothing() -> usize {
    3
}

fn default_adx_period() -> usize {
    14
}

fn default_volume_period() -> usize {
    20
}

fn default_levels_window() -> usize {
    20
}

fn default_pivot_strength() -> usize {
    2
}

fn default_rsi_oversold() -> f64 {
    30.0
}

fn default_rsi_overbought() -> f64 {
    70.0
}

fn default_stochastic_oversold() -> f64 {
    20.0
}

fn default_stochastic_overbought() -> f64 {
    80.0
}

fn default_adx_trending() -> f64 {
    25.0
}

fn default_adx_weak() -> f64 {
    20.0
}

fn default_volume_high() -> f64 {
    1.5
}

fn default_volume_low() -> f64 {
    0.5
}

fn default_buy_rsi_below() -> f64 {
    40.0
}

fn default_sell_rsi_above() -> f64 {
    60.0
}

fn default_min_conditions() -> usize {
    2
}

fn default_binance_api_url() -> String {
    "https://api.binance.com/api/v3".to_string()
}

fn default_quote_asset() -> String {
    "USDT".to_string()
}

fn default_interval() -> String {
    "1d".to_string()
}

fn default_limit() -> u32 {
    100
}

fn default_min_request_interval_ms() -> u64 {
    100
}

fn default_cache_ttl_secs() -> u64 {
    300
}

fn default_coingecko_api_url() -> String {
    "https://api.coingecko.com/api/v3".to_string()
}

fn default_coingecko_days() -> u32 {
    30
}

fn default_coingecko_min_request_interval_ms() -> u64 {
    2000
}

// =============================================================================
// IndicatorConfig
// =============================================================================

/// Look-back periods for every indicator the engine computes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorConfig {
    #[serde(default = "default_rsi_period")]
    pub rsi_period: usize,

    #[serde(default = "default_macd_fast")]
    pub macd_fast: usize,
    #[serde(default = "default_macd_slow")]
    pub macd_slow: usize,
    #[serde(default = "default_macd_signal")]
    pub macd_signal: usize,

    #[serde(default = "default_sma_fast")]
    pub sma_fast: usize,
    #[serde(default = "default_sma_slow")]
    pub sma_slow: usize,

    #[serde(default = "default_ema_fast")]
    pub ema_fast: usize,
    #[serde(default = "default_ema_slow")]
    pub ema_slow: usize,

    #[serde(default = "default_bollinger_period")]
    pub bollinger_period: usize,
    /// Band distance from the middle, in standard deviations.
    #[serde(default = "default_bollinger_std_dev")]
    pub bollinger_std_dev: f64,

    #[serde(default = "default_stochastic_period")]
    pub stochastic_period: usize,
    /// %D smoothing window applied to %K.
    #[serde(default = "default_stochastic_smoothing")]
    pub stochastic_smoothing: usize,

    #[serde(default = "default_adx_period")]
    pub adx_period: usize,

    #[serde(default = "default_volume_period")]
    pub volume_period: usize,

    /// Trailing window scanned for support/resistance pivots.
    #[serde(default = "default_levels_window")]
    pub levels_window: usize,
    /// Bars required on each side of a swing pivot.
    #[serde(default = "default_pivot_strength")]
    pub pivot_strength: usize,
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            rsi_period: default_rsi_period(),
            macd_fast: default_macd_fast(),
            macd_slow: default_macd_slow(),
            macd_signal: default_macd_signal(),
            sma_fast: default_sma_fast(),
            sma_slow: default_sma_slow(),
            ema_fast: default_ema_fast(),
            ema_slow: default_ema_slow(),
            bollinger_period: default_bollinger_period(),
            bollinger_std_dev: default_bollinger_std_dev(),
            stochastic_period: default_stochastic_period(),
            stochastic_smoothing: default_stochastic_smoothing(),
            adx_period: default_adx_period(),
            volume_period: default_volume_period(),
            levels_window: default_levels_window(),
            pivot_strength: default_pivot_strength(),
        }
    }
}

impl IndicatorConfig {
    /// Check that every period is usable and fast/slow pairs are ordered.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let periods = [
            ("rsi", self.rsi_period),
            ("macd_fast", self.macd_fast),
            ("macd_slow", self.macd_slow),
            ("macd_signal", self.macd_signal),
            ("sma_fast", self.sma_fast),
            ("sma_slow", self.sma_slow),
            ("ema_fast", self.ema_fast),
            ("ema_slow", self.ema_slow),
            ("bollinger", self.bollinger_period),
            ("stochastic", self.stochastic_period),
            ("stochastic_smoothing", self.stochastic_smoothing),
            ("adx", self.adx_period),
            ("volume", self.volume_period),
            ("levels_window", self.levels_window),
        ];
        if let Some((name, _)) = periods.into_iter().find(|&(_, p)| p == 0) {
            return Err(ConfigError::ZeroPeriod { name });
        }

        let pairs = [
            ("macd_fast", self.macd_fast, "macd_slow", self.macd_slow),
            ("sma_fast", self.sma_fast, "sma_slow", self.sma_slow),
            ("ema_fast", self.ema_fast, "ema_slow", self.ema_slow),
        ];
        for (fast_name, fast, slow_name, slow) in pairs {
            if fast >= slow {
                return Err(ConfigError::PeriodOrder {
                    fast_name,
                    fast,
                    slow_name,
                    slow,
                });
            }
        }

        if !self.bollinger_std_dev.is_finite() || self.bollinger_std_dev <= 0.0 {
            return Err(ConfigError::InvalidStdDev(self.bollinger_std_dev));
        }

        Ok(())
    }
}

// =============================================================================
// SignalThresholds
// =============================================================================

/// Cut-offs used to turn indicator values into categorical states.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalThresholds {
    #[serde(default = "default_rsi_oversold")]
    pub rsi_oversold: f64,
    #[serde(default = "default_rsi_overbought")]
    pub rsi_overbought: f64,
    #[serde(default = "default_stochastic_oversold")]
    pub stochastic_oversold: f64,
    #[serde(default = "default_stochastic_overbought")]
    pub stochastic_overbought: f64,
    /// ADX above this is a trending market.
    #[serde(default = "default_adx_trending")]
    pub adx_trending: f64,
    /// ADX below this is a weak / ranging market.
    #[serde(default = "default_adx_weak")]
    pub adx_weak: f64,
    #[serde(default = "default_volume_high")]
    pub volume_high: f64,
    #[serde(default = "default_volume_low")]
    pub volume_low: f64,
}

impl Default for SignalThresholds {
    fn default() -> Self {
        Self {
            rsi_oversold: default_rsi_oversold(),
            rsi_overbought: default_rsi_overbought(),
            stochastic_oversold: default_stochastic_oversold(),
            stochastic_overbought: default_stochastic_overbought(),
            adx_trending: default_adx_trending(),
            adx_weak: default_adx_weak(),
            volume_high: default_volume_high(),
            volume_low: default_volume_low(),
        }
    }
}

// =============================================================================
// RecommendationRules
// =============================================================================

/// Rule-set parameters for the BUY / SELL / HOLD recommender.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationRules {
    #[serde(default = "default_buy_rsi_below")]
    pub buy_rsi_below: f64,
    #[serde(default = "default_sell_rsi_above")]
    pub sell_rsi_above: f64,
    /// ADX required for the moving-average crossover conditions.
    #[serde(default = "default_adx_trending")]
    pub trend_adx_above: f64,
    /// Conditions that must hold on one side before it becomes an action.
    #[serde(default = "default_min_conditions")]
    pub min_conditions: usize,
}

impl Default for RecommendationRules {
    fn default() -> Self {
        Self {
            buy_rsi_below: default_buy_rsi_below(),
            sell_rsi_above: default_sell_rsi_above(),
            trend_adx_above: default_adx_trending(),
            min_conditions: default_min_conditions(),
        }
    }
}

// =============================================================================
// ProviderConfig
// =============================================================================

/// Where price history comes from and how aggressively it is fetched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default = "default_binance_api_url")]
    pub binance_api_url: String,
    /// Appended to bare symbols (`BTC` -> `BTCUSDT`).
    #[serde(default = "default_quote_asset")]
    pub quote_asset: String,
    /// Kline interval, e.g. `1h`, `4h`, `1d`.
    #[serde(default = "default_interval")]
    pub interval: String,
    /// Klines requested per symbol.
    #[serde(default = "default_limit")]
    pub limit: u32,
    #[serde(default = "default_min_request_interval_ms")]
    pub min_request_interval_ms: u64,
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,
    #[serde(default = "default_coingecko_api_url")]
    pub coingecko_api_url: String,
    /// Days of `market_chart` history requested when Binance is unavailable.
    #[serde(default = "default_coingecko_days")]
    pub coingecko_days: u32,
    /// The public CoinGecko API allows roughly 30 calls a minute.
    #[serde(default = "default_coingecko_min_request_interval_ms")]
    pub coingecko_min_request_interval_ms: u64,
    /// Directory of `<SYMBOL>.json` files used as the fallback source.
    #[serde(default)]
    pub data_dir: Option<String>,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            binance_api_url: default_binance_api_url(),
            quote_asset: default_quote_asset(),
            interval: default_interval(),
            limit: default_limit(),
            min_request_interval_ms: default_min_request_interval_ms(),
            cache_ttl_secs: default_cache_ttl_secs(),
            coingecko_api_url: default_coingecko_api_url(),
            coingecko_days: default_coingecko_days(),
            coingecko_min_request_interval_ms: default_coingecko_min_request_interval_ms(),
            data_dir: None,
        }
    }
}

// =============================================================================
// AppConfig
// =============================================================================

/// Top-level configuration file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_symbols")]
    pub symbols: Vec<String>,

    #[serde(default)]
    pub indicators: IndicatorConfig,

    #[serde(default)]
    pub thresholds: SignalThresholds,

    #[serde(default)]
    pub rules: RecommendationRules,

    #[serde(default)]
    pub provider: ProviderConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            symbols: default_symbols(),
            indicators: IndicatorConfig::default(),
            thresholds: SignalThresholds::default(),
            rules: RecommendationRules::default(),
            provider: ProviderConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a JSON file at `path`.
    ///
    /// A missing file is an error so the caller can fall back to defaults
    /// with a warning.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config from {}", path.display()))?;

        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse config from {}", path.display()))?;

        info!(
            path = %path.display(),
            symbols = ?config.symbols,
            interval = %config.provider.interval,
            "config loaded"
        );

        Ok(config)
    }

    /// Persist the configuration to `path` using an atomic write
    /// (write to `.tmp`, then rename).
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        let content =
            serde_json::to_string_pretty(self).context("failed to serialise config to JSON")?;

        let tmp_path = path.with_extension("json.tmp");

        std::fs::write(&tmp_path, &content)
            .with_context(|| format!("failed to write tmp config to {}", tmp_path.display()))?;

        std::fs::rename(&tmp_path, path)
            .with_context(|| format!("failed to rename tmp config to {}", path.display()))?;

        info!(path = %path.display(), "config saved (atomic)");
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_expected_values() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.symbols, vec!["BTC", "ETH", "SOL"]);
        let ind = &cfg.indicators;
        assert_eq!(ind.rsi_period, 14);
        assert_eq!((ind.macd_fast, ind.macd_slow, ind.macd_signal), (12, 26, 9));
        assert_eq!((ind.sma_fast, ind.sma_slow), (20, 50));
        assert_eq!((ind.ema_fast, ind.ema_slow), (12, 26));
        assert_eq!(ind.bollinger_period, 20);
        assert!((ind.bollinger_std_dev - 2.0).abs() < f64::EPSILON);
        assert_eq!(ind.stochastic_period, 14);
        assert_eq!(ind.adx_period, 14);
        assert!((cfg.thresholds.rsi_oversold - 30.0).abs() < f64::EPSILON);
        assert!((cfg.thresholds.adx_trending - 25.0).abs() < f64::EPSILON);
        assert_eq!(cfg.provider.limit, 100);
        assert_eq!(cfg.provider.coingecko_days, 30);
        assert_eq!(cfg.provider.coingecko_min_request_interval_ms, 2000);
        assert!(cfg.provider.data_dir.is_none());
        assert!(ind.validate().is_ok());
    }

    #[test]
    fn deserialise_empty_json_uses_defaults() {
        let cfg: AppConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg, AppConfig::default());
    }

    #[test]
    fn deserialise_partial_json_fills_defaults() {
        let json = r#"{ "symbols": ["DOGE"], "indicators": { "rsi_period": 7 } }"#;
        let cfg: AppConfig = serde_json::from_str(json).unwrap();
        assert_eq!(cfg.symbols, vec!["DOGE"]);
        assert_eq!(cfg.indicators.rsi_period, 7);
        assert_eq!(cfg.indicators.macd_slow, 26);
        assert_eq!(cfg.provider.interval, "1d");
    }

    #[test]
    fn validate_rejects_zero_period() {
        let cfg = IndicatorConfig {
            adx_period: 0,
            ..IndicatorConfig::default()
        };
        assert_eq!(cfg.validate(), Err(ConfigError::ZeroPeriod { name: "adx" }));
    }

    #[test]
    fn validate_rejects_inverted_macd() {
        let cfg = IndicatorConfig {
            macd_fast: 26,
            macd_slow: 12,
            ..IndicatorConfig::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::PeriodOrder {
                fast_name: "macd_fast",
                ..
            })
        ));
    }

    #[test]
    fn validate_rejects_bad_std_dev() {
        let cfg = IndicatorConfig {
            bollinger_std_dev: f64::NAN,
            ..IndicatorConfig::default()
        };
        assert!(matches!(cfg.validate(), Err(ConfigError::InvalidStdDev(_))));
    }

    #[test]
    fn save_then_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("crypto_insight.json");

        let mut cfg = AppConfig::default();
        cfg.symbols = vec!["ADA".into()];
        cfg.provider.data_dir = Some("/tmp/prices".into());
        cfg.save(&path).unwrap();

        assert!(!path.with_extension("json.tmp").exists());
        let loaded = AppConfig::load(&path).unwrap();
        assert_eq!(loaded, cfg);
    }

    #[test]
    fn load_missing_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(AppConfig::load(dir.path().join("absent.json")).is_err());
    }
}
