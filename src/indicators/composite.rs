//! Composite 0-100 scores derived from raw indicators.
//!
//! Deterministic, bucketed functions; each degrades to `None` when its
//! inputs are undercomputable.

use crate::common::math;
use crate::models::candle::Candle;
use crate::models::indicators::CompositeScores;

const VOLATILITY_WINDOW: usize = 20;
const MOMENTUM_LOOKBACK: usize = 10;
const SLOPE_LOOKBACK: usize = 5;

/// Sum of four fixed 25-point conditions on price-vs-SMA relationships and
/// short-term slope, capped to [0, 100].
pub fn trend_strength(candles: &[Candle], sma_20: Option<f64>, sma_50: Option<f64>) -> Option<f64> {
    let sma_20 = sma_20?;
    let sma_50 = sma_50?;
    if candles.len() <= SLOPE_LOOKBACK {
        return None;
    }
    let close = candles.last()?.close;
    let prior_close = candles[candles.len() - 1 - SLOPE_LOOKBACK].close;

    let mut score: f64 = 0.0;
    if close > sma_20 {
        score += 25.0;
    }
    if close > sma_50 {
        score += 25.0;
    }
    if sma_20 > sma_50 {
        score += 25.0;
    }
    if close > prior_close {
        score += 25.0;
    }
    Some(score.clamp(0.0, 100.0))
}

/// Population stdev of simple returns over the trailing window, annualized
/// by sqrt(365), expressed in percent and clamped to [0, 100].
pub fn volatility_score(candles: &[Candle]) -> Option<f64> {
    if candles.len() < VOLATILITY_WINDOW + 1 {
        return None;
    }
    let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();
    let returns = math::simple_returns(&closes);
    let stdev = math::population_std_dev(&returns, VOLATILITY_WINDOW)?;
    let annualized_pct = stdev * (365.0_f64).sqrt() * 100.0;
    Some(annualized_pct.clamp(0.0, 100.0))
}

/// Blend of RSI with a clamped recent price-change term.
pub fn momentum_score(candles: &[Candle], rsi: Option<f64>) -> Option<f64> {
    let rsi = rsi?;
    if candles.len() <= MOMENTUM_LOOKBACK {
        return None;
    }
    let close = candles.last()?.close;
    let prior = candles[candles.len() - 1 - MOMENTUM_LOOKBACK].close;
    let change_pct = if prior != 0.0 {
        (close - prior) / prior * 100.0
    } else {
        0.0
    };
    let change_term = 50.0 + change_pct.clamp(-10.0, 10.0) * 5.0;
    Some((0.6 * rsi + 0.4 * change_term).clamp(0.0, 100.0))
}

pub fn scores(
    candles: &[Candle],
    sma_20: Option<f64>,
    sma_50: Option<f64>,
    rsi: Option<f64>,
) -> CompositeScores {
    CompositeScores {
        trend_strength: trend_strength(candles, sma_20, sma_50),
        volatility_score: volatility_score(candles),
        momentum_score: momentum_score(candles, rsi),
    }
}
