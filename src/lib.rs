// =============================================================================
// Crypto Insight — technical indicators and signal aggregation
// =============================================================================
//
// Pipeline: provider -> PriceSeries -> IndicatorEngine -> IndicatorBundle ->
// SignalAggregator / Recommender -> report.
//
// The engine layer (`indicators`, `engine`, `signals`, `report`) is pure and
// synchronous. Network and filesystem access live in `providers` and
// `binance`.
// =============================================================================

pub mod binance;
pub mod config;
pub mod engine;
pub mod errors;
pub mod indicators;
pub mod market_data;
pub mod providers;
pub mod report;
pub mod signals;

pub use config::{AppConfig, IndicatorConfig, ProviderConfig, RecommendationRules, SignalThresholds};
pub use engine::{IndicatorBundle, IndicatorEngine};
pub use errors::{ConfigError, SeriesError};
pub use market_data::{PriceSample, PriceSeries};
pub use providers::PriceSeriesProvider;
pub use signals::{FeatureSummary, Recommendation, Recommender, SignalAggregator};
