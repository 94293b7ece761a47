//! RSI (Relative Strength Index) indicator
//!
//! RSI = 100 - (100 / (1 + RS))
//! RS = Average Gain / Average Loss, simple trailing averages.

use crate::models::candle::Candle;

/// RSI over the trailing `period` price changes. Needs period+1 candles.
/// An all-gain window (avg loss = 0) resolves to 100.
pub fn calculate_rsi(candles: &[Candle], period: u32) -> Option<f64> {
    let period = period as usize;
    if period == 0 || candles.len() < period + 1 {
        return None;
    }

    let mut avg_gain = 0.0;
    let mut avg_loss = 0.0;
    let start = candles.len() - period;
    for i in start..candles.len() {
        let change = candles[i].close - candles[i - 1].close;
        if change > 0.0 {
            avg_gain += change;
        } else {
            avg_loss += change.abs();
        }
    }
    avg_gain /= period as f64;
    avg_loss /= period as f64;

    if avg_loss == 0.0 {
        return Some(100.0);
    }

    let rs = avg_gain / avg_loss;
    Some(100.0 - (100.0 / (1.0 + rs)))
}

/// RSI with the default 14-candle window.
pub fn calculate_rsi_default(candles: &[Candle]) -> Option<f64> {
    calculate_rsi(candles, 14)
}
