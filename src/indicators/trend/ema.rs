//! EMA (Exponential Moving Average) indicator

use crate::common::math;
use crate::models::candle::Candle;

/// EMA over closes, seeded with the first close, smoothing 2/(period+1).
pub fn calculate_ema(candles: &[Candle], period: u32) -> Option<f64> {
    if candles.len() < period as usize {
        return None;
    }
    let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();
    math::ema(&closes, period as usize)
}
