//! Indicator snapshot models.
//!
//! Every indicator is optional: each one independently degrades to `None`
//! when its minimum window is not satisfied. A snapshot is immutable once
//! produced; new candles produce a superseding snapshot.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MacdIndicator {
    pub line: f64,
    pub signal: f64,
    pub histogram: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StochasticIndicator {
    pub k: f64,
    pub d: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BollingerBandsIndicator {
    pub upper: f64,
    pub middle: f64,
    pub lower: f64,
    pub bandwidth: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PivotPointsIndicator {
    pub pivot: f64,
    pub r1: f64,
    pub r2: f64,
    pub r3: f64,
    pub s1: f64,
    pub s2: f64,
    pub s3: f64,
}

/// Composite 0-100 scores derived from the raw indicators.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompositeScores {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trend_strength: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volatility_score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub momentum_score: Option<f64>,
}

/// Per-asset snapshot of all computed indicators.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndicatorSet {
    pub asset: String,
    pub price: f64,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sma_20: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sma_50: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sma_200: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ema_12: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ema_26: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ema_50: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub macd: Option<MacdIndicator>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rsi_14: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stochastic: Option<StochasticIndicator>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub williams_r: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bollinger: Option<BollingerBandsIndicator>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub atr_14: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub obv: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pivot_points: Option<PivotPointsIndicator>,
    pub scores: CompositeScores,
}

impl IndicatorSet {
    pub fn empty(asset: String, price: f64) -> Self {
        Self {
            asset,
            price,
            timestamp: Utc::now(),
            sma_20: None,
            sma_50: None,
            sma_200: None,
            ema_12: None,
            ema_26: None,
            ema_50: None,
            macd: None,
            rsi_14: None,
            stochastic: None,
            williams_r: None,
            bollinger: None,
            atr_14: None,
            obv: None,
            pivot_points: None,
            scores: CompositeScores {
                trend_strength: None,
                volatility_score: None,
                momentum_score: None,
            },
        }
    }
}
