//! SMA (Simple Moving Average) indicator

use crate::common::math;
use crate::models::candle::Candle;

/// Arithmetic mean of the trailing `period` closes.
pub fn calculate_sma(candles: &[Candle], period: u32) -> Option<f64> {
    let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();
    math::sma(&closes, period as usize)
}
