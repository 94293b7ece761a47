//! OBV (On-Balance Volume) indicator

use crate::models::candle::Candle;

/// Running cumulative volume over the entire history: adds volume on
/// up-closes, subtracts on down-closes, unchanged on flat closes.
/// Unwindowed; needs at least two candles.
pub fn calculate_obv(candles: &[Candle]) -> Option<f64> {
    if candles.len() < 2 {
        return None;
    }

    let mut obv = 0.0;
    for i in 1..candles.len() {
        let change = candles[i].close - candles[i - 1].close;
        if change > 0.0 {
            obv += candles[i].volume;
        } else if change < 0.0 {
            obv -= candles[i].volume;
        }
    }
    Some(obv)
}
