//! MACD (Moving Average Convergence Divergence) indicator
//!
//! MACD line = EMA12 - EMA26. The signal line is the EMA9 of the MACD
//! line recomputed at every historical point, not of a single snapshot.

use crate::common::math;
use crate::models::candle::Candle;
use crate::models::indicators::MacdIndicator;

const FAST: usize = 12;
const SLOW: usize = 26;
const SIGNAL: usize = 9;

/// MACD with standard (12, 26, 9) parameters. Needs enough candles for
/// the slow EMA plus a full signal window.
pub fn calculate_macd(candles: &[Candle]) -> Option<MacdIndicator> {
    if candles.len() < SLOW + SIGNAL {
        return None;
    }

    let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();
    let fast_series = math::ema_series(&closes, FAST)?;
    let slow_series = math::ema_series(&closes, SLOW)?;

    // MACD line becomes meaningful once the slow EMA has a full window.
    let macd_series: Vec<f64> = fast_series
        .iter()
        .zip(slow_series.iter())
        .skip(SLOW - 1)
        .map(|(fast, slow)| fast - slow)
        .collect();

    let signal_series = math::ema_series(&macd_series, SIGNAL)?;

    let line = *macd_series.last()?;
    let signal = *signal_series.last()?;

    Some(MacdIndicator {
        line,
        signal,
        histogram: line - signal,
    })
}
