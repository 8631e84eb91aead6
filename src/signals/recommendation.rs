// =============================================================================
// Rule-based Recommender — BUY / SELL / HOLD with confidence
// =============================================================================
//
// Four conditions are checked per side:
//
//   BUY                                  SELL
//   RSI < buy_rsi_below                  RSI > sell_rsi_above
//   MACD > signal and histogram > 0      MACD < signal and histogram < 0
//   close < lower Bollinger band         close > upper Bollinger band
//   SMA fast > SMA slow and ADX > N      SMA fast < SMA slow and ADX > N
//
// A side wins when it meets at least `min_conditions` and strictly more than
// the other side; otherwise the result is HOLD.
//
// Confidence:
//   winner with 2 / 3 / 4 conditions => 60 / 75 / 90, minus 10 per opposing
//   condition, clamped to [0, 100].
//   HOLD => 10 (nothing met), 30 (conflicting), 45 (one-sided, too few).

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::RecommendationRules;
use crate::engine::IndicatorBundle;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    Buy,
    Sell,
    Hold,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Buy => write!(f, "BUY"),
            Self::Sell => write!(f, "SELL"),
            Self::Hold => write!(f, "HOLD"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub action: Action,
    /// 0..=100
    pub confidence: f64,
    pub reasons: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct Recommender {
    rules: RecommendationRules,
}

impl Recommender {
    pub fn new(rules: RecommendationRules) -> Self {
        Self { rules }
    }

    pub fn recommend(&self, bundle: &IndicatorBundle) -> Recommendation {
        let buy = self.buy_conditions(bundle);
        let sell = self.sell_conditions(bundle);
        let min = self.rules.min_conditions.max(1);

        let (action, confidence) = if buy.len() >= min && buy.len() > sell.len() {
            (Action::Buy, side_confidence(buy.len(), sell.len()))
        } else if sell.len() >= min && sell.len() > buy.len() {
            (Action::Sell, side_confidence(sell.len(), buy.len()))
        } else {
            let confidence = match (buy.len(), sell.len()) {
                (0, 0) => 10.0,
                (b, s) if b > 0 && s > 0 => 30.0,
                _ => 45.0,
            };
            (Action::Hold, confidence)
        };

        let reasons = buy
            .into_iter()
            .map(|r| format!("bullish: {r}"))
            .chain(sell.into_iter().map(|r| format!("bearish: {r}")))
            .collect();

        Recommendation {
            action,
            confidence,
            reasons,
        }
    }

    fn buy_conditions(&self, b: &IndicatorBundle) -> Vec<String> {
        let r = &self.rules;
        let mut met = Vec::new();

        if let Some(rsi) = b.rsi.filter(|&v| v < r.buy_rsi_below) {
            met.push(format!("RSI {rsi:.2} below {:.0}", r.buy_rsi_below));
        }
        if let Some(m) = b.macd {
            if let (Some(signal), Some(hist)) = (m.signal, m.histogram) {
                if m.line > signal && hist > 0.0 {
                    met.push(format!("MACD {:.4} above signal {signal:.4}", m.line));
                }
            }
        }
        if let Some(bb) = b.bollinger.filter(|bb| b.close < bb.lower) {
            met.push(format!("close {:.2} below lower band {:.2}", b.close, bb.lower));
        }
        if let (Some(fast), Some(slow), Some(adx)) = (b.sma_fast, b.sma_slow, b.adx) {
            if fast > slow && adx.adx > r.trend_adx_above {
                met.push(format!(
                    "SMA fast {fast:.2} above SMA slow {slow:.2} with ADX {:.2}",
                    adx.adx
                ));
            }
        }

        met
    }

    fn sell_conditions(&self, b: &IndicatorBundle) -> Vec<String> {
        let r = &self.rules;
        let mut met = Vec::new();

        if let Some(rsi) = b.rsi.filter(|&v| v > r.sell_rsi_above) {
            met.push(format!("RSI {rsi:.2} above {:.0}", r.sell_rsi_above));
        }
        if let Some(m) = b.macd {
            if let (Some(signal), Some(hist)) = (m.signal, m.histogram) {
                if m.line < signal && hist < 0.0 {
                    met.push(format!("MACD {:.4} below signal {signal:.4}", m.line));
                }
            }
        }
        if let Some(bb) = b.bollinger.filter(|bb| b.close > bb.upper) {
            met.push(format!("close {:.2} above upper band {:.2}", b.close, bb.upper));
        }
        if let (Some(fast), Some(slow), Some(adx)) = (b.sma_fast, b.sma_slow, b.adx) {
            if fast < slow && adx.adx > r.trend_adx_above {
                met.push(format!(
                    "SMA fast {fast:.2} below SMA slow {slow:.2} with ADX {:.2}",
                    adx.adx
                ));
            }
        }

        met
    }
}

fn side_confidence(aligned: usize, opposing: usize) -> f64 {
    let base = match aligned {
        0 | 1 => 45.0,
        2 => 60.0,
        3 => 75.0,
        _ => 90.0,
    };
    (base - 10.0 * opposing as f64).clamp(0.0, 100.0)
}
