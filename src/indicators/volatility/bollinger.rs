//! Bollinger Bands indicator
//!
//! Middle = SMA(period)
//! Upper/Lower = Middle +/- k * population standard deviation

use crate::common::math;
use crate::models::candle::Candle;
use crate::models::indicators::BollingerBandsIndicator;

pub fn calculate_bollinger_bands(
    candles: &[Candle],
    period: u32,
    k: f64,
) -> Option<BollingerBandsIndicator> {
    let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();
    let middle = math::sma(&closes, period as usize)?;
    let std = math::population_std_dev(&closes, period as usize)?;

    let upper = middle + k * std;
    let lower = middle - k * std;
    let bandwidth = if middle != 0.0 {
        (upper - lower) / middle
    } else {
        0.0
    };

    Some(BollingerBandsIndicator {
        upper,
        middle,
        lower,
        bandwidth,
    })
}

/// Bollinger Bands with default parameters (20 SMA, 2 sigma).
pub fn calculate_bollinger_bands_default(candles: &[Candle]) -> Option<BollingerBandsIndicator> {
    calculate_bollinger_bands(candles, 20, 2.0)
}
