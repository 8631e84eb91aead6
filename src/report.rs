// =============================================================================
// Plain-text indicator report
// =============================================================================
//
// One labelled line per indicator, for consumers that want text rather than
// structured data (terminal output, prompt building, notifications).

use std::fmt::Write;

use crate::config::IndicatorConfig;
use crate::engine::IndicatorBundle;
use crate::signals::{FeatureSummary, Recommendation};

const UNAVAILABLE: &str = "unavailable";

/// Render `bundle` and its `summary` as a multi-line report.
pub fn render_report(
    symbol: &str,
    bundle: &IndicatorBundle,
    summary: &FeatureSummary,
    config: &IndicatorConfig,
) -> String {
    let mut out = String::new();

    // Writing into a String cannot fail.
    let _ = writeln!(out, "CRYPTO: {symbol}");
    let _ = writeln!(out, "AS OF: {}", bundle.timestamp.format("%Y-%m-%d %H:%M UTC"));
    let _ = writeln!(out, "CURRENT PRICE: ${:.2}", bundle.close);
    let _ = writeln!(out);
    let _ = writeln!(out, "TECHNICAL INDICATORS:");

    match bundle.rsi {
        Some(rsi) => {
            let _ = writeln!(out, "- RSI ({}): {rsi:.2} ({})", config.rsi_period, summary.momentum);
        }
        None => {
            let _ = writeln!(out, "- RSI ({}): {UNAVAILABLE}", config.rsi_period);
        }
    }

    match bundle.macd {
        Some(m) => match (m.signal, m.histogram) {
            (Some(signal), Some(hist)) => {
                let cross = if m.line > signal { "BULLISH" } else { "BEARISH" };
                let _ = writeln!(
                    out,
                    "- MACD: {:.4}, Signal: {signal:.4}, Histogram: {hist:.4} ({cross})",
                    m.line
                );
            }
            _ => {
                let _ = writeln!(out, "- MACD: {:.4}, Signal: {UNAVAILABLE}", m.line);
            }
        },
        None => {
            let _ = writeln!(out, "- MACD: {UNAVAILABLE}");
        }
    }

    let _ = writeln!(
        out,
        "- SMA {}: {}, SMA {}: {}",
        config.sma_fast,
        price(bundle.sma_fast),
        config.sma_slow,
        price(bundle.sma_slow)
    );
    let _ = writeln!(
        out,
        "- EMA {}: {}, EMA {}: {} (Trend: {})",
        config.ema_fast,
        price(bundle.ema_fast),
        config.ema_slow,
        price(bundle.ema_slow),
        summary.trend
    );

    match bundle.bollinger {
        Some(bb) => {
            let _ = writeln!(
                out,
                "- Bollinger Bands: Upper ${:.2}, Middle ${:.2}, Lower ${:.2} - Price is {}",
                bb.upper, bb.middle, bb.lower, summary.band_position
            );
        }
        None => {
            let _ = writeln!(out, "- Bollinger Bands: {UNAVAILABLE}");
        }
    }

    match bundle.stochastic {
        Some(st) => {
            let d = st.d.map_or_else(|| UNAVAILABLE.to_string(), |d| format!("{d:.2}"));
            let _ = writeln!(out, "- Stochastic: K={:.2}, D={d} ({})", st.k, summary.stochastic);
        }
        None => {
            let _ = writeln!(out, "- Stochastic: {UNAVAILABLE}");
        }
    }

    match bundle.adx {
        Some(a) => {
            let _ = writeln!(
                out,
                "- ADX: {:.2} (+DI {:.2}, -DI {:.2}, Trend Strength: {})",
                a.adx, a.plus_di, a.minus_di, summary.trend_strength
            );
        }
        None => {
            let _ = writeln!(out, "- ADX: {UNAVAILABLE}");
        }
    }

    match bundle.volume_stats.and_then(|v| v.ratio) {
        Some(ratio) => {
            let _ = writeln!(out, "- Volume Ratio: {ratio:.2}x ({} volume)", summary.volume);
        }
        None => {
            let _ = writeln!(out, "- Volume Ratio: {UNAVAILABLE}");
        }
    }
    let _ = writeln!(out, "- OBV: {:.2}", bundle.obv);

    match bundle.levels {
        Some(levels) => {
            let _ = writeln!(out, "- Support Level: ${:.2}", levels.support);
            let _ = writeln!(out, "- Resistance Level: ${:.2}", levels.resistance);
        }
        None => {
            let _ = writeln!(out, "- Support/Resistance: {UNAVAILABLE}");
        }
    }

    let p = bundle.pivots;
    let _ = writeln!(
        out,
        "- Pivot: ${:.2} (R1 ${:.2}, R2 ${:.2}, S1 ${:.2}, S2 ${:.2})",
        p.pivot, p.r1, p.r2, p.s1, p.s2
    );

    out
}

/// Append the recommender's verdict to a report.
pub fn render_recommendation(recommendation: &Recommendation) -> String {
    let mut out = format!(
        "RECOMMENDATION: {} ({:.0}% confidence)\n",
        recommendation.action, recommendation.confidence
    );
    for reason in &recommendation.reasons {
        out.push_str("  * ");
        out.push_str(reason);
        out.push('\n');
    }
    out
}

fn price(value: Option<f64>) -> String {
    value.map_or_else(|| UNAVAILABLE.to_string(), |v| format!("${v:.2}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::IndicatorEngine;
    use crate::market_data::{PriceSample, PriceSeries};
    use crate::signals::{Recommender, SignalAggregator};
    use chrono::{Duration, TimeZone, Utc};

    fn flat_series(len: usize) -> PriceSeries {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let samples = (0..len)
            .map(|i| PriceSample::from_close(start + Duration::days(i as i64), 100.0, 1000.0))
            .collect();
        PriceSeries::new("FLAT", samples).unwrap()
    }

    #[test]
    fn report_lists_available_and_unavailable_indicators() {
        let engine = IndicatorEngine::default();
        let bundle = engine.evaluate(&flat_series(30));
        let summary = SignalAggregator::default().summarize(&bundle);
        let text = render_report("BTC", &bundle, &summary, engine.config());

        assert!(text.starts_with("CRYPTO: BTC\n"));
        assert!(text.contains("CURRENT PRICE: $100.00"));
        assert!(text.contains("- RSI (14): 100.00 (OVERBOUGHT)"));
        assert!(text.contains("- SMA 20: $100.00, SMA 50: unavailable"));
        assert!(text.contains("- MACD: 0.0000, Signal: unavailable"));
        assert!(text.contains("Price is WITHIN BANDS"));
        assert!(text.contains("- Volume Ratio: 1.00x (NORMAL volume)"));
    }

    #[test]
    fn report_for_single_sample() {
        let engine = IndicatorEngine::default();
        let bundle = engine.evaluate(&flat_series(1));
        let summary = SignalAggregator::default().summarize(&bundle);
        let text = render_report("ETH", &bundle, &summary, engine.config());
        assert!(text.contains("- RSI (14): unavailable"));
        assert!(text.contains("- ADX: unavailable"));
        assert!(text.contains("- Support/Resistance: unavailable"));
    }

    #[test]
    fn recommendation_block() {
        let bundle = IndicatorEngine::default().evaluate(&flat_series(1));
        let rec = Recommender::default().recommend(&bundle);
        assert_eq!(render_recommendation(&rec), "RECOMMENDATION: HOLD (10% confidence)\n");
    }
}
