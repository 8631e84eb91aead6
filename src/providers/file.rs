use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::{debug, instrument};

use super::{clean_symbol, PriceSeriesProvider};
use crate::market_data::{PriceSample, PriceSeries};

/// Reads `<dir>/<SYMBOL>.json`, a JSON array of [`PriceSample`] objects in
/// ascending timestamp order.
#[derive(Debug, Clone)]
pub struct JsonFileProvider {
    dir: PathBuf,
}

impl JsonFileProvider {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, symbol: &str) -> PathBuf {
        self.dir.join(format!("{}.json", clean_symbol(symbol)))
    }

    fn load(path: &Path, symbol: &str) -> Result<PriceSeries> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read price file {}", path.display()))?;

        let samples: Vec<PriceSample> = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse price file {}", path.display()))?;

        let series = PriceSeries::new(symbol, samples)
            .with_context(|| format!("invalid price history in {}", path.display()))?;

        debug!(symbol, samples = series.len(), path = %path.display(), "price file loaded");
        Ok(series)
    }
}

#[async_trait]
impl PriceSeriesProvider for JsonFileProvider {
    fn name(&self) -> &str {
        "file"
    }

    #[instrument(skip(self), name = "file::fetch_series")]
    async fn fetch_series(&self, symbol: &str) -> Result<PriceSeries> {
        let symbol = clean_symbol(symbol);
        let path = self.path_for(&symbol);
        tokio::task::spawn_blocking(move || Self::load(&path, &symbol))
            .await
            .context("price file loader task panicked")?
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLES: &str = r#"[
        {"timestamp":"2024-01-01T00:00:00Z","open":10.0,"high":11.0,"low":9.5,"close":10.5,"volume":100.0},
        {"timestamp":"2024-01-02T00:00:00Z","open":10.5,"high":12.0,"low":10.0,"close":11.5,"volume":120.0}
    ]"#;

    #[tokio::test]
    async fn loads_symbol_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("BTC.json"), SAMPLES).unwrap();

        let provider = JsonFileProvider::new(dir.path());
        let series = provider.fetch_series(" btc").await.unwrap();
        assert_eq!(series.symbol(), "BTC");
        assert_eq!(series.len(), 2);
        assert_eq!(series.latest().close, 11.5);
    }

    #[tokio::test]
    async fn missing_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let provider = JsonFileProvider::new(dir.path());
        let err = provider.fetch_series("ETH").await.unwrap_err();
        assert!(format!("{err:#}").contains("ETH.json"));
    }

    #[tokio::test]
    async fn invalid_history_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let reversed = r#"[
            {"timestamp":"2024-01-02T00:00:00Z","open":1.0,"high":1.0,"low":1.0,"close":1.0},
            {"timestamp":"2024-01-01T00:00:00Z","open":1.0,"high":1.0,"low":1.0,"close":1.0}
        ]"#;
        std::fs::write(dir.path().join("SOL.json"), reversed).unwrap();

        let err = JsonFileProvider::new(dir.path())
            .fetch_series("sol")
            .await
            .unwrap_err();
        assert!(format!("{err:#}").contains("not after the previous sample"));
    }
}
