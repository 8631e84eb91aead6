// =============================================================================
// Technical Indicators Module
// =============================================================================
//
// Pure, side-effect-free implementations of the technical indicators used by
// the engine. Series functions return trimmed vectors (documented start
// offset) and single-value functions return `Option<T>`, so callers are forced
// to handle insufficient-data and numerical-edge-case scenarios.

pub mod adx;
pub mod bollinger;
pub mod ema;
pub mod levels;
pub mod macd;
pub mod rsi;
pub mod stochastic;
pub mod volume;

pub use adx::AdxReading;
pub use bollinger::BollingerBands;
pub use levels::{PivotPoints, SupportResistance};
pub use macd::MacdReading;
pub use stochastic::StochasticReading;
pub use volume::VolumeReading;
