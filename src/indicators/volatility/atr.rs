//! ATR (Average True Range) indicator

use crate::common::math;
use crate::models::candle::Candle;

/// ATR as the SMA of true range over `period`. Needs period+1 candles
/// because true range references the previous close.
pub fn calculate_atr(candles: &[Candle], period: u32) -> Option<f64> {
    let period = period as usize;
    if period == 0 || candles.len() < period + 1 {
        return None;
    }

    let mut tr_values = Vec::with_capacity(candles.len() - 1);
    for i in 1..candles.len() {
        tr_values.push(math::true_range(
            candles[i].high,
            candles[i].low,
            candles[i - 1].close,
        ));
    }

    math::sma(&tr_values, period)
}

/// ATR with the default 14-candle window.
pub fn calculate_atr_default(candles: &[Candle]) -> Option<f64> {
    calculate_atr(candles, 14)
}
