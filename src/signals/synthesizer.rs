//! Rule-based vote aggregation over an indicator snapshot.
//!
//! Fixed per-indicator weights: RSI extreme 2, MACD crossover 1,
//! moving-average trend alignment 1, Bollinger-band touch 1.
//! net = bullish - bearish; |net| <= 1 holds, net > 1 buys with
//! strength min(100, net*20), net < -1 sells symmetrically.

use crate::models::indicators::IndicatorSet;
use crate::models::signal::{IndicatorVote, Signal, SignalDirection};
use chrono::{Duration, Utc};

const RSI_OVERSOLD: f64 = 30.0;
const RSI_OVERBOUGHT: f64 = 70.0;
const RSI_WEIGHT: i32 = 2;
const MACD_WEIGHT: i32 = 1;
const TREND_WEIGHT: i32 = 1;
const BOLLINGER_WEIGHT: i32 = 1;

pub struct SignalSynthesizer {
    /// How long a generated signal stays valid, relative to the
    /// evaluation interval.
    horizon_minutes: i64,
}

impl SignalSynthesizer {
    pub fn new(horizon_minutes: i64) -> Self {
        Self { horizon_minutes }
    }

    pub fn synthesize(&self, indicators: &IndicatorSet, price: f64) -> Signal {
        let mut votes: Vec<IndicatorVote> = Vec::new();

        if let Some(rsi) = indicators.rsi_14 {
            if rsi < RSI_OVERSOLD {
                votes.push(vote("rsi", SignalDirection::Buy, RSI_WEIGHT));
            } else if rsi > RSI_OVERBOUGHT {
                votes.push(vote("rsi", SignalDirection::Sell, RSI_WEIGHT));
            }
        }

        if let Some(ref macd) = indicators.macd {
            if macd.line > macd.signal && macd.histogram > 0.0 {
                votes.push(vote("macd", SignalDirection::Buy, MACD_WEIGHT));
            } else if macd.line < macd.signal && macd.histogram < 0.0 {
                votes.push(vote("macd", SignalDirection::Sell, MACD_WEIGHT));
            }
        }

        if let (Some(sma_20), Some(sma_50)) = (indicators.sma_20, indicators.sma_50) {
            if price > sma_20 && sma_20 > sma_50 {
                votes.push(vote("ma_trend", SignalDirection::Buy, TREND_WEIGHT));
            } else if price < sma_20 && sma_20 < sma_50 {
                votes.push(vote("ma_trend", SignalDirection::Sell, TREND_WEIGHT));
            }
        }

        if let Some(ref bands) = indicators.bollinger {
            if price <= bands.lower {
                votes.push(vote("bollinger", SignalDirection::Buy, BOLLINGER_WEIGHT));
            } else if price >= bands.upper {
                votes.push(vote("bollinger", SignalDirection::Sell, BOLLINGER_WEIGHT));
            }
        }

        let bullish: i32 = votes
            .iter()
            .filter(|v| v.direction == SignalDirection::Buy)
            .map(|v| v.weight)
            .sum();
        let bearish: i32 = votes
            .iter()
            .filter(|v| v.direction == SignalDirection::Sell)
            .map(|v| v.weight)
            .sum();
        let net = bullish - bearish;

        let (direction, strength) = if net > 1 {
            (SignalDirection::Buy, (net as f64 * 20.0).min(100.0))
        } else if net < -1 {
            (SignalDirection::Sell, (net.abs() as f64 * 20.0).min(100.0))
        } else {
            (SignalDirection::Hold, 0.0)
        };

        let generated_at = Utc::now();
        Signal {
            asset: indicators.asset.clone(),
            direction,
            strength,
            contributing: votes,
            generated_at,
            valid_until: generated_at + Duration::minutes(self.horizon_minutes),
        }
    }
}

fn vote(indicator: &str, direction: SignalDirection, weight: i32) -> IndicatorVote {
    IndicatorVote {
        indicator: indicator.to_string(),
        direction,
        weight,
    }
}
