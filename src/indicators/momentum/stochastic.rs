//! Stochastic oscillator (%K / %D)

use crate::models::candle::Candle;
use crate::models::indicators::StochasticIndicator;

const K_PERIOD: usize = 14;
const D_PERIOD: usize = 3;

/// %K at the midpoint when the window is flat (zero denominator).
const FLAT_WINDOW_K: f64 = 50.0;

fn percent_k(candles: &[Candle], period: usize) -> Option<f64> {
    if candles.len() < period {
        return None;
    }
    let window = &candles[candles.len() - period..];
    let highest = window.iter().map(|c| c.high).fold(f64::MIN, f64::max);
    let lowest = window.iter().map(|c| c.low).fold(f64::MAX, f64::min);
    let close = window.last()?.close;

    if highest == lowest {
        return Some(FLAT_WINDOW_K);
    }
    Some((close - lowest) / (highest - lowest) * 100.0)
}

/// %K from the trailing 14-candle high/low window, %D as the 3-period SMA
/// of %K. Needs K_PERIOD + D_PERIOD - 1 candles.
pub fn calculate_stochastic(candles: &[Candle]) -> Option<StochasticIndicator> {
    if candles.len() < K_PERIOD + D_PERIOD - 1 {
        return None;
    }

    let mut k_values = Vec::with_capacity(D_PERIOD);
    for back in (0..D_PERIOD).rev() {
        let end = candles.len() - back;
        k_values.push(percent_k(&candles[..end], K_PERIOD)?);
    }

    let k = *k_values.last()?;
    let d = k_values.iter().sum::<f64>() / D_PERIOD as f64;
    Some(StochasticIndicator { k, d })
}
