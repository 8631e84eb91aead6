use std::collections::HashMap;
use std::time::{Duration, Instant};

use anyhow::Result;
use async_trait::async_trait;
use parking_lot::RwLock;
use tracing::debug;

use super::{clean_symbol, PriceSeriesProvider};
use crate::market_data::PriceSeries;

/// Per-symbol TTL cache in front of another provider.
///
/// The lock is never held across the inner fetch; two concurrent misses for
/// the same symbol may both reach the inner provider.
pub struct CachedProvider<P> {
    inner: P,
    ttl: Duration,
    entries: RwLock<HashMap<String, (Instant, PriceSeries)>>,
}

impl<P: PriceSeriesProvider> CachedProvider<P> {
    pub fn new(inner: P, ttl: Duration) -> Self {
        Self {
            inner,
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    fn lookup(&self, key: &str) -> Option<PriceSeries> {
        let entries = self.entries.read();
        entries
            .get(key)
            .filter(|(stored_at, _)| stored_at.elapsed() < self.ttl)
            .map(|(_, series)| series.clone())
    }
}

#[async_trait]
impl<P: PriceSeriesProvider> PriceSeriesProvider for CachedProvider<P> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn fetch_series(&self, symbol: &str) -> Result<PriceSeries> {
        let key = clean_symbol(symbol);
        if let Some(series) = self.lookup(&key) {
            debug!(symbol = %key, "price series served from cache");
            return Ok(series);
        }

        let series = self.inner.fetch_series(&key).await?;
        self.entries
            .write()
            .insert(key, (Instant::now(), series.clone()));
        Ok(series)
    }
}
