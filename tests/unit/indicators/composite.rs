//! Unit tests for composite scores

use cadence::indicators::composite::{momentum_score, scores, trend_strength, volatility_score};
use cadence::indicators::trend::sma::calculate_sma;
use cadence::models::candle::Candle;
use chrono::Utc;

fn candles_from_closes(closes: &[f64]) -> Vec<Candle> {
    closes
        .iter()
        .map(|&c| Candle::new(c, c + 0.5, c - 0.5, c, 1000.0, Utc::now()))
        .collect()
}

fn uptrend(count: usize) -> Vec<Candle> {
    candles_from_closes(&(0..count).map(|i| 100.0 + i as f64).collect::<Vec<_>>())
}

fn downtrend(count: usize) -> Vec<Candle> {
    candles_from_closes(&(0..count).map(|i| 300.0 - i as f64).collect::<Vec<_>>())
}

#[test]
fn test_trend_strength_maxed_in_uptrend() {
    let candles = uptrend(60);
    let sma_20 = calculate_sma(&candles, 20);
    let sma_50 = calculate_sma(&candles, 50);
    assert_eq!(trend_strength(&candles, sma_20, sma_50), Some(100.0));
}

#[test]
fn test_trend_strength_zero_in_downtrend() {
    let candles = downtrend(60);
    let sma_20 = calculate_sma(&candles, 20);
    let sma_50 = calculate_sma(&candles, 50);
    assert_eq!(trend_strength(&candles, sma_20, sma_50), Some(0.0));
}

#[test]
fn test_trend_strength_requires_both_smas() {
    let candles = uptrend(60);
    assert!(trend_strength(&candles, None, Some(100.0)).is_none());
    assert!(trend_strength(&candles, Some(100.0), None).is_none());
}

#[test]
fn test_volatility_score_zero_on_flat_series() {
    let candles = candles_from_closes(&[100.0; 30]);
    assert_eq!(volatility_score(&candles), Some(0.0));
}

#[test]
fn test_volatility_score_clamped_to_100() {
    // Alternating +/-50% moves produce an enormous annualized figure.
    let closes: Vec<f64> = (0..30)
        .map(|i| if i % 2 == 0 { 100.0 } else { 150.0 })
        .collect();
    let score = volatility_score(&candles_from_closes(&closes)).unwrap();
    assert_eq!(score, 100.0);
}

#[test]
fn test_volatility_score_needs_window_plus_one() {
    assert!(volatility_score(&candles_from_closes(&[100.0; 20])).is_none());
    assert!(volatility_score(&candles_from_closes(&[100.0; 21])).is_some());
}

#[test]
fn test_momentum_score_bounds() {
    let up = momentum_score(&uptrend(30), Some(100.0)).unwrap();
    let down = momentum_score(&downtrend(30), Some(0.0)).unwrap();
    assert!(up <= 100.0);
    assert!(down >= 0.0);
    assert!(up > down);
}

#[test]
fn test_momentum_score_neutral_market() {
    let candles = candles_from_closes(&[100.0; 30]);
    // RSI 50 and zero price change blend to exactly 50.
    let score = momentum_score(&candles, Some(50.0)).unwrap();
    assert!((score - 50.0).abs() < 1e-9);
}

#[test]
fn test_scores_degrade_independently() {
    // 15 candles: too short for the volatility window, long enough for
    // the slope lookbacks.
    let candles = uptrend(15);
    let result = scores(&candles, Some(100.0), Some(99.0), Some(60.0));
    assert!(result.trend_strength.is_some());
    assert!(result.volatility_score.is_none());
    assert!(result.momentum_score.is_some());
}
