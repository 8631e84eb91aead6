// =============================================================================
// Validation errors raised at the engine boundaries
// =============================================================================
//
// The indicator engine itself never fails. Malformed input is rejected once,
// when a `PriceSeries` is constructed or when an `IndicatorEngine` is built
// from its configuration.

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Rejection reasons for a raw sample sequence.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SeriesError {
    #[error("price series for {symbol} is empty")]
    Empty { symbol: String },

    #[error("sample {index}: timestamp {timestamp} is not after the previous sample ({previous})")]
    NonMonotonicTimestamp {
        index: usize,
        timestamp: DateTime<Utc>,
        previous: DateTime<Utc>,
    },

    #[error("sample {index}: volume is not a finite, non-negative number ({volume})")]
    InvalidVolume { index: usize, volume: f64 },

    #[error("sample {index}: {field} is not a finite, non-negative price ({value})")]
    InvalidPrice {
        index: usize,
        field: &'static str,
        value: f64,
    },

    #[error("sample {index}: bar is inconsistent (low={low}, open={open}, close={close}, high={high})")]
    InconsistentBar {
        index: usize,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
    },
}

/// Rejection reasons for an indicator configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("{name} period must be at least 1")]
    ZeroPeriod { name: &'static str },

    #[error("{fast_name} ({fast}) must be shorter than {slow_name} ({slow})")]
    PeriodOrder {
        fast_name: &'static str,
        fast: usize,
        slow_name: &'static str,
        slow: usize,
    },

    #[error("bollinger std-dev multiplier must be finite and positive, got {0}")]
    InvalidStdDev(f64),
}
