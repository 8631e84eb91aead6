// =============================================================================
// CoinGecko market-chart provider
// =============================================================================
//
// Secondary history source. `coins/{id}/market_chart` only reports one price
// per point, so every sample is a degenerate close-only bar. Requests share a
// single `RequestThrottle`; the public API tolerates about 30 calls a minute.
// =============================================================================

use std::collections::HashMap;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use tracing::{debug, instrument, warn};

use super::{clean_symbol, PriceSeriesProvider};
use crate::binance::rate_limit::RequestThrottle;
use crate::config::ProviderConfig;
use crate::market_data::{PriceSample, PriceSeries};

/// Ticker -> CoinGecko coin id for the common cases, saving a search call.
const KNOWN_COIN_IDS: &[(&str, &str)] = &[
    ("BTC", "bitcoin"),
    ("ETH", "ethereum"),
    ("SOL", "solana"),
    ("BNB", "binancecoin"),
    ("XRP", "ripple"),
    ("ADA", "cardano"),
    ("DOGE", "dogecoin"),
    ("DOT", "polkadot"),
    ("AVAX", "avalanche-2"),
    ("MATIC", "matic-network"),
    ("LINK", "chainlink"),
    ("LTC", "litecoin"),
    ("TRX", "tron"),
    ("SHIB", "shiba-inu"),
    ("USDT", "tether"),
    ("USDC", "usd-coin"),
];

/// CoinGecko switches to daily points on its own beyond this many days; the
/// `interval=daily` hint is only sent past it.
const HOURLY_GRANULARITY_MAX_DAYS: u32 = 90;

pub struct CoinGeckoProvider {
    base_url: String,
    days: u32,
    client: reqwest::Client,
    throttle: RequestThrottle,
}

impl CoinGeckoProvider {
    pub fn new(config: &ProviderConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .context("failed to build reqwest client")?;

        debug!(base_url = %config.coingecko_api_url, "CoinGeckoProvider initialised");

        Ok(Self {
            base_url: config.coingecko_api_url.trim_end_matches('/').to_string(),
            days: config.coingecko_days.max(1),
            client,
            throttle: RequestThrottle::new(Duration::from_millis(
                config.coingecko_min_request_interval_ms,
            )),
        })
    }

    async fn get_json(&self, url: &str, what: &str) -> Result<serde_json::Value> {
        self.throttle.acquire().await;

        let resp = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("GET {what} request failed"))?;

        let status = resp.status();
        let body: serde_json::Value = resp
            .json()
            .await
            .with_context(|| format!("failed to parse {what} response"))?;

        if !status.is_success() {
            bail!("CoinGecko GET {what} returned {status}: {body}");
        }
        Ok(body)
    }

    /// Resolve a ticker to a coin id: known table first, then `/search`.
    #[instrument(skip(self), name = "coingecko::coin_id")]
    async fn coin_id(&self, symbol: &str) -> Result<String> {
        if let Some(id) = known_coin_id(symbol) {
            return Ok(id.to_string());
        }

        let url = format!("{}/search?query={}", self.base_url, symbol);
        let body = self.get_json(&url, "/search").await?;
        let id = pick_coin_id(&body, symbol).unwrap_or_else(|| {
            warn!(symbol, "no CoinGecko search match, using lower-cased ticker");
            symbol.to_lowercase()
        });
        debug!(symbol, coin_id = %id, "coin id resolved");
        Ok(id)
    }

    #[instrument(skip(self), name = "coingecko::get_market_chart")]
    pub async fn get_market_chart(&self, coin_id: &str) -> Result<Vec<PriceSample>> {
        let mut url = format!(
            "{}/coins/{}/market_chart?vs_currency=usd&days={}",
            self.base_url, coin_id, self.days
        );
        if self.days > HOURLY_GRANULARITY_MAX_DAYS {
            url.push_str("&interval=daily");
        }

        let body = self.get_json(&url, "/market_chart").await?;
        let samples = parse_market_chart(&body)?;
        debug!(coin_id, days = self.days, count = samples.len(), "market chart fetched");
        Ok(samples)
    }
}

#[async_trait]
impl PriceSeriesProvider for CoinGeckoProvider {
    fn name(&self) -> &str {
        "coingecko"
    }

    async fn fetch_series(&self, symbol: &str) -> Result<PriceSeries> {
        let symbol = clean_symbol(symbol);
        let coin_id = self.coin_id(&symbol).await?;
        let samples = self.get_market_chart(&coin_id).await?;
        PriceSeries::from_unordered(symbol.as_str(), samples)
            .with_context(|| format!("CoinGecko returned an unusable history for {coin_id}"))
    }
}

impl std::fmt::Debug for CoinGeckoProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoinGeckoProvider")
            .field("base_url", &self.base_url)
            .field("days", &self.days)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Response parsing
// ---------------------------------------------------------------------------

fn known_coin_id(symbol: &str) -> Option<&'static str> {
    KNOWN_COIN_IDS
        .iter()
        .find(|(ticker, _)| *ticker == symbol)
        .map(|&(_, id)| id)
}

/// Pick a coin id from a `/search` response: an exact ticker match wins,
/// otherwise the first (highest ranked) coin.
pub fn pick_coin_id(body: &serde_json::Value, symbol: &str) -> Option<String> {
    let coins = body.get("coins")?.as_array()?;
    let id_of = |coin: &serde_json::Value| coin.get("id")?.as_str().map(str::to_string);

    coins
        .iter()
        .find(|coin| {
            coin.get("symbol")
                .and_then(|s| s.as_str())
                .is_some_and(|s| s.eq_ignore_ascii_case(symbol))
        })
        .and_then(id_of)
        .or_else(|| coins.first().and_then(id_of))
}

/// Decode a `market_chart` payload into close-only samples, oldest first.
///
/// `prices` is required; `total_volumes` is matched by timestamp and a
/// missing volume counts as 0. Entries without a numeric price are skipped
/// and repeated timestamps keep the first point.
pub fn parse_market_chart(body: &serde_json::Value) -> Result<Vec<PriceSample>> {
    let prices = body
        .get("prices")
        .and_then(|p| p.as_array())
        .context("market_chart response has no prices array")?;

    let volumes: HashMap<i64, f64> = body
        .get("total_volumes")
        .and_then(|v| v.as_array())
        .map(|entries| entries.iter().filter_map(chart_point).collect())
        .unwrap_or_default();

    let mut samples = Vec::with_capacity(prices.len());
    for entry in prices {
        let Some((millis, price)) = chart_point(entry) else {
            warn!(%entry, "skipping malformed market_chart price point");
            continue;
        };
        let timestamp = Utc
            .timestamp_millis_opt(millis)
            .single()
            .with_context(|| format!("market_chart timestamp {millis} is out of range"))?;
        let volume = volumes.get(&millis).copied().unwrap_or(0.0);
        samples.push(PriceSample::from_close(timestamp, price, volume));
    }

    samples.sort_by_key(|s| s.timestamp);
    samples.dedup_by_key(|s| s.timestamp);
    Ok(samples)
}

/// `[timestamp_ms, value]` pair; CoinGecko sends both as JSON numbers.
fn chart_point(entry: &serde_json::Value) -> Option<(i64, f64)> {
    let pair = entry.as_array()?;
    let millis = pair.first()?.as_f64()?;
    let value = pair.get(1)?.as_f64()?;
    Some((millis as i64, value))
}
