use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::SeriesError;

// ---------------------------------------------------------------------------
// Data types
// ---------------------------------------------------------------------------

/// A single OHLCV sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceSample {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    #[serde(default)]
    pub volume: f64,
}

impl PriceSample {
    /// Build a sample where open/high/low all equal `close`.
    ///
    /// Close-only sources (aggregated market charts) only report one price per
    /// point; the bar degenerates to a single value.
    pub fn from_close(timestamp: DateTime<Utc>, close: f64, volume: f64) -> Self {
        Self {
            timestamp,
            open: close,
            high: close,
            low: close,
            close,
            volume,
        }
    }

    fn validate(&self, index: usize) -> Result<(), SeriesError> {
        for (field, value) in [
            ("open", self.open),
            ("high", self.high),
            ("low", self.low),
            ("close", self.close),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(SeriesError::InvalidPrice { index, field, value });
            }
        }

        if !self.volume.is_finite() || self.volume < 0.0 {
            return Err(SeriesError::InvalidVolume {
                index,
                volume: self.volume,
            });
        }

        let body_low = self.open.min(self.close);
        let body_high = self.open.max(self.close);
        if self.low > body_low || self.high < body_high {
            return Err(SeriesError::InconsistentBar {
                index,
                open: self.open,
                high: self.high,
                low: self.low,
                close: self.close,
            });
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// PriceSeries -- validated, immutable sample sequence for one symbol
// ---------------------------------------------------------------------------

/// Validated OHLCV history for one symbol, oldest sample first.
///
/// Construction is the only place where input is checked: timestamps are
/// strictly increasing, prices finite and non-negative, volumes non-negative
/// and every bar satisfies `low <= open, close <= high`. The series is never
/// empty.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceSeries {
    symbol: String,
    samples: Vec<PriceSample>,
}

impl PriceSeries {
    pub fn new(symbol: impl Into<String>, samples: Vec<PriceSample>) -> Result<Self, SeriesError> {
        let symbol = symbol.into();
        if samples.is_empty() {
            return Err(SeriesError::Empty { symbol });
        }

        for (index, sample) in samples.iter().enumerate() {
            sample.validate(index)?;
            if index > 0 {
                let previous = samples[index - 1].timestamp;
                if sample.timestamp <= previous {
                    return Err(SeriesError::NonMonotonicTimestamp {
                        index,
                        timestamp: sample.timestamp,
                        previous,
                    });
                }
            }
        }

        Ok(Self { symbol, samples })
    }

    /// Sort by timestamp before validating.
    ///
    /// Providers returning newest-first data go through here. Duplicate
    /// timestamps are still rejected.
    pub fn from_unordered(
        symbol: impl Into<String>,
        mut samples: Vec<PriceSample>,
    ) -> Result<Self, SeriesError> {
        samples.sort_by_key(|s| s.timestamp);
        Self::new(symbol, samples)
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn samples(&self) -> &[PriceSample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn latest(&self) -> &PriceSample {
        // Non-empty by construction.
        &self.samples[self.samples.len() - 1]
    }

    pub fn closes(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.close).collect()
    }

    pub fn highs(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.high).collect()
    }

    pub fn lows(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.low).collect()
    }

    pub fn volumes(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.volume).collect()
    }
}
