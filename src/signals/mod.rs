// =============================================================================
// Signals Module
// =============================================================================
//
// Downstream of the indicator engine:
// - Feature aggregation (numeric bundle -> categorical summary)
// - Rule-based BUY / SELL / HOLD recommendation

pub mod aggregator;
pub mod recommendation;

pub use aggregator::{
    BandPosition, FeatureSummary, Momentum, SignalAggregator, Trend, TrendStrength, VolumeState,
};
pub use recommendation::{Action, Recommendation, Recommender};
