use anyhow::Result;
use async_trait::async_trait;
use tracing::warn;

use super::PriceSeriesProvider;
use crate::market_data::PriceSeries;

/// Tries `primary` first and falls back to `secondary` on any error.
pub struct FallbackProvider<A, B> {
    primary: A,
    secondary: B,
}

impl<A: PriceSeriesProvider, B: PriceSeriesProvider> FallbackProvider<A, B> {
    pub fn new(primary: A, secondary: B) -> Self {
        Self { primary, secondary }
    }
}

#[async_trait]
impl<A: PriceSeriesProvider, B: PriceSeriesProvider> PriceSeriesProvider for FallbackProvider<A, B> {
    fn name(&self) -> &str {
        self.primary.name()
    }

    async fn fetch_series(&self, symbol: &str) -> Result<PriceSeries> {
        match self.primary.fetch_series(symbol).await {
            Ok(series) => Ok(series),
            Err(e) => {
                warn!(
                    symbol,
                    primary = self.primary.name(),
                    secondary = self.secondary.name(),
                    error = %e,
                    "primary price source failed, falling back"
                );
                self.secondary.fetch_series(symbol).await.map_err(|fallback_err| {
                    fallback_err.context(format!(
                        "{} and {} both failed for {symbol} (primary: {e:#})",
                        self.primary.name(),
                        self.secondary.name()
                    ))
                })
            }
        }
    }
}
