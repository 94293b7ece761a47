//! Shared numeric helpers for indicator calculations.

/// Arithmetic mean of the trailing `period` values. `None` if the slice is
/// shorter than the window.
pub fn sma(values: &[f64], period: usize) -> Option<f64> {
    if period == 0 || values.len() < period {
        return None;
    }
    let window = &values[values.len() - period..];
    Some(window.iter().sum::<f64>() / period as f64)
}

/// Exponential moving average seeded with the first value, smoothing
/// factor 2/(period+1). Returns the final EMA over the whole series.
pub fn ema(values: &[f64], period: usize) -> Option<f64> {
    ema_series(values, period).map(|s| *s.last().unwrap_or(&f64::NAN))
}

/// Full EMA series: one value per input point, seeded with the first input.
/// `None` when the series is shorter than the period.
pub fn ema_series(values: &[f64], period: usize) -> Option<Vec<f64>> {
    if period == 0 || values.len() < period {
        return None;
    }
    let alpha = 2.0 / (period as f64 + 1.0);
    let mut out = Vec::with_capacity(values.len());
    let mut current = values[0];
    out.push(current);
    for &v in &values[1..] {
        current = (v - current) * alpha + current;
        out.push(current);
    }
    Some(out)
}

/// Population standard deviation of the trailing `period` values.
pub fn population_std_dev(values: &[f64], period: usize) -> Option<f64> {
    if period == 0 || values.len() < period {
        return None;
    }
    let window = &values[values.len() - period..];
    let mean = window.iter().sum::<f64>() / period as f64;
    let variance = window.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / period as f64;
    Some(variance.sqrt())
}

/// True range: max of (high-low, |high-prev_close|, |low-prev_close|).
pub fn true_range(high: f64, low: f64, prev_close: f64) -> f64 {
    (high - low)
        .max((high - prev_close).abs())
        .max((low - prev_close).abs())
}

/// Simple period-over-period returns: (v[i] - v[i-1]) / v[i-1].
/// Flat-at-zero points contribute a zero return.
pub fn simple_returns(values: &[f64]) -> Vec<f64> {
    values
        .windows(2)
        .map(|w| if w[0] != 0.0 { (w[1] - w[0]) / w[0] } else { 0.0 })
        .collect()
}
