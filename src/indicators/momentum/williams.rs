//! Williams %R indicator

use crate::models::candle::Candle;

const PERIOD: usize = 14;

/// %R at the midpoint when the window is flat (zero denominator).
const FLAT_WINDOW_R: f64 = -50.0;

/// Williams %R = (highestHigh - close) / (highestHigh - lowestLow) * -100,
/// over the trailing 14-candle window. Ranges -100..0.
pub fn calculate_williams_r(candles: &[Candle]) -> Option<f64> {
    if candles.len() < PERIOD {
        return None;
    }
    let window = &candles[candles.len() - PERIOD..];
    let highest = window.iter().map(|c| c.high).fold(f64::MIN, f64::max);
    let lowest = window.iter().map(|c| c.low).fold(f64::MAX, f64::min);
    let close = window.last()?.close;

    if highest == lowest {
        return Some(FLAT_WINDOW_R);
    }
    Some((highest - close) / (highest - lowest) * -100.0)
}
