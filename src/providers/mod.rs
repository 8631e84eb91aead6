// =============================================================================
// Price Series Providers
// =============================================================================
//
// Everything that fetches history lives behind `PriceSeriesProvider`. Network
// concerns (throttling, weight budgets, caching, fallback between sources)
// stay in this layer; the indicator engine only ever sees a validated
// `PriceSeries`.

pub mod cache;
pub mod coingecko;
pub mod fallback;
pub mod file;

use anyhow::Result;
use async_trait::async_trait;

use crate::market_data::PriceSeries;

pub use cache::CachedProvider;
pub use coingecko::CoinGeckoProvider;
pub use fallback::FallbackProvider;
pub use file::JsonFileProvider;

/// A source of historical price samples.
#[async_trait]
pub trait PriceSeriesProvider: Send + Sync {
    /// Short identifier used in logs (`binance`, `file`, ...).
    fn name(&self) -> &str;

    /// Fetch the full configured history for `symbol`.
    async fn fetch_series(&self, symbol: &str) -> Result<PriceSeries>;
}

/// Canonical form of a user-supplied symbol: trimmed, upper-case, no spaces.
pub fn clean_symbol(symbol: &str) -> String {
    symbol
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_uppercase()
}

#[async_trait]
impl<P: PriceSeriesProvider + ?Sized> PriceSeriesProvider for std::sync::Arc<P> {
    fn name(&self) -> &str {
        (**self).name()
    }

    async fn fetch_series(&self, symbol: &str) -> Result<PriceSeries> {
        (**self).fetch_series(symbol).await
    }
}
