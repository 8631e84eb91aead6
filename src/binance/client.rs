// =============================================================================
// Binance public klines client
// =============================================================================
//
// Only unauthenticated market-data endpoints are used. Every request passes
// through the shared `RequestThrottle` and is refused up front when the last
// reported per-minute weight leaves no room for it.
// =============================================================================

use std::time::Duration;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use tracing::{debug, instrument, warn};

use super::rate_limit::{RateLimitTracker, RequestThrottle};
use crate::config::ProviderConfig;
use crate::market_data::{PriceSample, PriceSeries};
use crate::providers::{clean_symbol, PriceSeriesProvider};

/// Request weight Binance charges for a klines call with `limit <= 100`.
const KLINES_WEIGHT: u32 = 2;

/// Fetches daily (or any configured interval) candles from `/klines`.
pub struct BinanceProvider {
    base_url: String,
    quote_asset: String,
    interval: String,
    limit: u32,
    client: reqwest::Client,
    throttle: RequestThrottle,
    rate_limit: RateLimitTracker,
}

impl BinanceProvider {
    pub fn new(config: &ProviderConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .context("failed to build reqwest client")?;

        debug!(base_url = %config.binance_api_url, "BinanceProvider initialised");

        Ok(Self {
            base_url: config.binance_api_url.trim_end_matches('/').to_string(),
            quote_asset: clean_symbol(&config.quote_asset),
            interval: config.interval.clone(),
            limit: config.limit,
            client,
            throttle: RequestThrottle::new(Duration::from_millis(config.min_request_interval_ms)),
            rate_limit: RateLimitTracker::new(),
        })
    }

    /// Exchange pair for a base symbol: `btc` -> `BTCUSDT`. Symbols that
    /// already end with the quote asset are left alone.
    pub fn trading_pair(&self, symbol: &str) -> String {
        let base = clean_symbol(symbol);
        if base.ends_with(&self.quote_asset) && base.len() > self.quote_asset.len() {
            base
        } else {
            format!("{base}{}", self.quote_asset)
        }
    }

    /// GET /klines for `pair`, returning samples oldest first.
    #[instrument(skip(self), name = "binance::get_klines")]
    pub async fn get_klines(&self, pair: &str) -> Result<Vec<PriceSample>> {
        if !self.rate_limit.can_send_request(KLINES_WEIGHT) {
            bail!("Binance request weight budget exhausted, refusing klines call for {pair}");
        }
        self.throttle.acquire().await;

        let url = format!(
            "{}/klines?symbol={}&interval={}&limit={}",
            self.base_url, pair, self.interval, self.limit
        );

        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .context("GET /klines request failed")?;

        self.rate_limit.update_from_headers(resp.headers());

        let status = resp.status();
        let body: serde_json::Value = resp
            .json()
            .await
            .context("failed to parse klines response")?;

        if !status.is_success() {
            bail!("Binance GET /klines returned {status}: {body}");
        }

        let samples = parse_klines(&body)?;
        debug!(
            pair,
            interval = %self.interval,
            count = samples.len(),
            used_weight_1m = self.rate_limit.used_weight(),
            "klines fetched"
        );
        Ok(samples)
    }
}

#[async_trait]
impl PriceSeriesProvider for BinanceProvider {
    fn name(&self) -> &str {
        "binance"
    }

    async fn fetch_series(&self, symbol: &str) -> Result<PriceSeries> {
        let symbol = clean_symbol(symbol);
        let pair = self.trading_pair(&symbol);
        let samples = self.get_klines(&pair).await?;
        PriceSeries::from_unordered(symbol.as_str(), samples)
            .with_context(|| format!("Binance returned an unusable history for {pair}"))
    }
}

impl std::fmt::Debug for BinanceProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BinanceProvider")
            .field("base_url", &self.base_url)
            .field("quote_asset", &self.quote_asset)
            .field("interval", &self.interval)
            .field("limit", &self.limit)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Response parsing
// ---------------------------------------------------------------------------

/// Decode the array-of-arrays klines payload.
///
/// Each entry is `[open_time_ms, "open", "high", "low", "close", "volume",
/// close_time_ms, ...]`. Short entries are skipped with a warning; unparsable
/// numbers fail the whole response.
pub fn parse_klines(body: &serde_json::Value) -> Result<Vec<PriceSample>> {
    let raw = body
        .as_array()
        .context("klines response is not an array")?;

    let mut samples = Vec::with_capacity(raw.len());

    for entry in raw {
        let arr = entry.as_array().context("kline entry is not an array")?;

        if arr.len() < 6 {
            warn!("skipping malformed kline entry with {} elements", arr.len());
            continue;
        }

        let open_time = arr[0].as_i64().context("kline open time is not an integer")?;
        let timestamp = Utc
            .timestamp_millis_opt(open_time)
            .single()
            .with_context(|| format!("kline open time {open_time} is out of range"))?;

        samples.push(PriceSample {
            timestamp,
            open: parse_str_f64(&arr[1])?,
            high: parse_str_f64(&arr[2])?,
            low: parse_str_f64(&arr[3])?,
            close: parse_str_f64(&arr[4])?,
            volume: parse_str_f64(&arr[5])?,
        });
    }

    Ok(samples)
}

/// Binance encodes decimals as strings; accept plain numbers too.
fn parse_str_f64(val: &serde_json::Value) -> Result<f64> {
    if let Some(s) = val.as_str() {
        s.parse::<f64>()
            .with_context(|| format!("failed to parse '{s}' as f64"))
    } else if let Some(n) = val.as_f64() {
        Ok(n)
    } else {
        bail!("expected string or number, got: {val}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn provider() -> BinanceProvider {
        BinanceProvider::new(&ProviderConfig::default()).unwrap()
    }

    #[test]
    fn trading_pair_appends_quote_asset() {
        let p = provider();
        assert_eq!(p.trading_pair("btc"), "BTCUSDT");
        assert_eq!(p.trading_pair(" eth "), "ETHUSDT");
        assert_eq!(p.trading_pair("solusdt"), "SOLUSDT");
        // The quote asset on its own is still a base symbol.
        assert_eq!(p.trading_pair("usdt"), "USDTUSDT");
    }

    #[test]
    fn parses_klines_payload() {
        let body = json!([
            [1704067200000i64, "42283.58", "44184.10", "42180.77", "44179.55", "27174.29", 1704153599999i64, "0", 0, "0", "0", "0"],
            [1704153600000i64, "44179.55", "45879.63", "44148.34", "44946.91", "65146.40", 1704239999999i64, "0", 0, "0", "0", "0"]
        ]);

        let samples = parse_klines(&body).unwrap();
        assert_eq!(samples.len(), 2);
        assert_eq!(
            samples[0].timestamp,
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
        );
        assert!((samples[1].close - 44946.91).abs() < 1e-9);
        assert!((samples[0].volume - 27174.29).abs() < 1e-9);
    }

    #[test]
    fn skips_short_entries() {
        let body = json!([[1704067200000i64, "1"], [1704067200000i64, "1", "2", "0.5", "1.5", "10"]]);
        let samples = parse_klines(&body).unwrap();
        assert_eq!(samples.len(), 1);
        assert_eq!(samples[0].high, 2.0);
    }

    #[test]
    fn rejects_non_numeric_price() {
        let body = json!([[1704067200000i64, "abc", "2", "0.5", "1.5", "10"]]);
        assert!(parse_klines(&body).is_err());
    }

    #[test]
    fn rejects_non_array_body() {
        let body = json!({"code": -1121, "msg": "Invalid symbol."});
        assert!(parse_klines(&body).is_err());
    }
}
