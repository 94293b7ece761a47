//! Unit tests for the full indicator snapshot

use cadence::indicators::engine::compute;
use cadence::models::candle::Candle;
use chrono::Utc;

fn create_test_candles(count: usize, base_price: f64) -> Vec<Candle> {
    (0..count)
        .map(|i| {
            let price = base_price + (i as f64 * 0.2) + ((i * 7) % 5) as f64;
            Candle::new(price, price + 1.0, price - 1.0, price, 1000.0, Utc::now())
        })
        .collect()
}

#[test]
fn test_full_history_computes_everything() {
    let candles = create_test_candles(250, 100.0);
    let set = compute("BTC", &candles);

    assert_eq!(set.asset, "BTC");
    assert_eq!(set.price, candles.last().unwrap().close);
    assert!(set.sma_20.is_some());
    assert!(set.sma_50.is_some());
    assert!(set.sma_200.is_some());
    assert!(set.ema_12.is_some());
    assert!(set.ema_26.is_some());
    assert!(set.ema_50.is_some());
    assert!(set.macd.is_some());
    assert!(set.rsi_14.is_some());
    assert!(set.stochastic.is_some());
    assert!(set.williams_r.is_some());
    assert!(set.bollinger.is_some());
    assert!(set.atr_14.is_some());
    assert!(set.obv.is_some());
    assert!(set.pivot_points.is_some());
    assert!(set.scores.trend_strength.is_some());
    assert!(set.scores.volatility_score.is_some());
    assert!(set.scores.momentum_score.is_some());
}

#[test]
fn test_short_history_degrades_per_indicator() {
    // 30 candles: enough for RSI, stochastic, Bollinger and SMA-20 but not
    // SMA-50, SMA-200 or MACD.
    let candles = create_test_candles(30, 100.0);
    let set = compute("ETH", &candles);

    assert!(set.sma_20.is_some());
    assert!(set.rsi_14.is_some());
    assert!(set.stochastic.is_some());
    assert!(set.bollinger.is_some());

    assert!(set.sma_50.is_none());
    assert!(set.sma_200.is_none());
    assert!(set.macd.is_none());
    assert!(set.ema_50.is_none());
}

#[test]
fn test_empty_history_is_all_none() {
    let set = compute("SOL", &[]);
    assert_eq!(set.price, 0.0);
    assert!(set.sma_20.is_none());
    assert!(set.rsi_14.is_none());
    assert!(set.obv.is_none());
    assert!(set.pivot_points.is_none());
    assert!(set.scores.trend_strength.is_none());
}
