// =============================================================================
// Crypto Insight — Main Entry Point
// =============================================================================
//
// One-shot analysis run: fetch history for every configured symbol
// concurrently, evaluate the indicators, then print the text report, the
// recommendation and the JSON bundle per symbol.
// =============================================================================

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use serde_json::json;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crypto_insight::binance::BinanceProvider;
use crypto_insight::providers::{
    CachedProvider, CoinGeckoProvider, FallbackProvider, JsonFileProvider,
};
use crypto_insight::report::{render_recommendation, render_report};
use crypto_insight::{
    AppConfig, IndicatorEngine, PriceSeriesProvider, Recommender, SignalAggregator,
};

const DEFAULT_CONFIG_PATH: &str = "crypto_insight.json";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── 1. Environment & config ──────────────────────────────────────────
    let _ = dotenv::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config_path =
        std::env::var("CRYPTO_INSIGHT_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());

    let mut config = AppConfig::load(&config_path).unwrap_or_else(|e| {
        warn!(path = %config_path, error = %e, "Failed to load config, using defaults");
        AppConfig::default()
    });

    if let Ok(syms) = std::env::var("CRYPTO_INSIGHT_SYMBOLS") {
        config.symbols = syms
            .split(',')
            .map(|s| s.trim().to_uppercase())
            .filter(|s| !s.is_empty())
            .collect();
    }
    if let Ok(dir) = std::env::var("CRYPTO_INSIGHT_DATA_DIR") {
        config.provider.data_dir = Some(dir);
    }
    if config.symbols.is_empty() {
        warn!("No symbols configured, nothing to analyse");
        return Ok(());
    }

    info!(symbols = ?config.symbols, interval = %config.provider.interval, "Configured symbols");

    // ── 2. Engine & consumers ────────────────────────────────────────────
    let engine = Arc::new(
        IndicatorEngine::new(config.indicators.clone()).context("invalid indicator config")?,
    );
    let aggregator = Arc::new(SignalAggregator::new(config.thresholds.clone()));
    let recommender = Arc::new(Recommender::new(config.rules.clone()));

    // ── 3. Price source ──────────────────────────────────────────────────
    // Binance first, CoinGecko market charts second, local files last.
    let online = FallbackProvider::new(
        BinanceProvider::new(&config.provider)?,
        CoinGeckoProvider::new(&config.provider)?,
    );
    let ttl = Duration::from_secs(config.provider.cache_ttl_secs);
    let provider: Arc<dyn PriceSeriesProvider> = match &config.provider.data_dir {
        Some(dir) => {
            info!(data_dir = %dir, "File fallback enabled");
            Arc::new(CachedProvider::new(
                FallbackProvider::new(online, JsonFileProvider::new(dir)),
                ttl,
            ))
        }
        None => Arc::new(CachedProvider::new(online, ttl)),
    };

    // ── 4. Evaluate every symbol concurrently ────────────────────────────
    let mut handles = Vec::with_capacity(config.symbols.len());
    for symbol in &config.symbols {
        let sym = symbol.clone();
        let provider = provider.clone();
        let engine = engine.clone();
        let aggregator = aggregator.clone();
        let recommender = recommender.clone();

        handles.push(tokio::spawn(async move {
            let series = provider
                .fetch_series(&sym)
                .await
                .with_context(|| format!("failed to fetch price history for {sym}"))?;

            let bundle = engine.evaluate(&series);
            let summary = aggregator.summarize(&bundle);
            let recommendation = recommender.recommend(&bundle);

            info!(
                symbol = %sym,
                samples = series.len(),
                close = bundle.close,
                trend = %summary.trend,
                action = %recommendation.action,
                confidence = recommendation.confidence,
                "Symbol analysed"
            );

            let text = format!(
                "{}\n{}",
                render_report(&sym, &bundle, &summary, engine.config()),
                render_recommendation(&recommendation)
            );
            let payload = json!({
                "symbol": sym,
                "indicators": bundle,
                "summary": summary,
                "recommendation": recommendation,
            });
            anyhow::Ok((text, payload))
        }));
    }

    // ── 5. Output ────────────────────────────────────────────────────────
    let mut failures = 0usize;
    for (symbol, handle) in config.symbols.iter().zip(handles) {
        match handle.await {
            Ok(Ok((text, payload))) => {
                println!("{text}");
                println!("{}", serde_json::to_string_pretty(&payload)?);
            }
            Ok(Err(e)) => {
                failures += 1;
                error!(symbol = %symbol, error = %format!("{e:#}"), "Analysis failed");
            }
            Err(e) => {
                failures += 1;
                error!(symbol = %symbol, error = %e, "Analysis task panicked");
            }
        }
    }

    if failures == config.symbols.len() {
        anyhow::bail!("analysis failed for every configured symbol");
    }

    info!(analysed = config.symbols.len() - failures, failed = failures, "Run complete");
    Ok(())
}
