//! Unit tests for Bollinger Bands and ATR

use cadence::indicators::volatility::{
    atr::{calculate_atr, calculate_atr_default},
    bollinger::{calculate_bollinger_bands, calculate_bollinger_bands_default},
};
use cadence::models::candle::Candle;
use chrono::Utc;

fn candles_from_closes(closes: &[f64]) -> Vec<Candle> {
    closes
        .iter()
        .map(|&c| Candle::new(c, c + 1.0, c - 1.0, c, 1000.0, Utc::now()))
        .collect()
}

#[test]
fn test_bollinger_band_ordering() {
    let closes: Vec<f64> = (0..40)
        .map(|i| 100.0 + ((i * 13) % 7) as f64 - 3.0)
        .collect();
    let bands = calculate_bollinger_bands_default(&candles_from_closes(&closes)).unwrap();
    assert!(bands.lower < bands.middle);
    assert!(bands.middle < bands.upper);
    assert!(bands.bandwidth > 0.0);
}

#[test]
fn test_bollinger_flat_series_collapses() {
    let bands = calculate_bollinger_bands_default(&candles_from_closes(&[50.0; 25])).unwrap();
    assert_eq!(bands.upper, bands.middle);
    assert_eq!(bands.lower, bands.middle);
    assert_eq!(bands.bandwidth, 0.0);
}

#[test]
fn test_bollinger_insufficient_data() {
    assert!(calculate_bollinger_bands_default(&candles_from_closes(&[100.0; 19])).is_none());
}

#[test]
fn test_bollinger_symmetry_around_middle() {
    let closes: Vec<f64> = (0..25).map(|i| 100.0 + (i % 5) as f64).collect();
    let bands = calculate_bollinger_bands(&candles_from_closes(&closes), 20, 2.0).unwrap();
    let upper_gap = bands.upper - bands.middle;
    let lower_gap = bands.middle - bands.lower;
    assert!((upper_gap - lower_gap).abs() < 1e-9);
}

#[test]
fn test_atr_needs_period_plus_one() {
    assert!(calculate_atr(&candles_from_closes(&[100.0; 14]), 14).is_none());
    assert!(calculate_atr(&candles_from_closes(&[100.0; 15]), 14).is_some());
}

#[test]
fn test_atr_constant_range() {
    // Flat closes with a constant 2.0 high-low range.
    let atr = calculate_atr_default(&candles_from_closes(&[100.0; 30])).unwrap();
    assert!((atr - 2.0).abs() < 1e-9);
}

#[test]
fn test_atr_grows_with_gaps() {
    let mut closes: Vec<f64> = vec![100.0; 20];
    closes.extend((0..10).map(|i| 100.0 + (i as f64 + 1.0) * 5.0));
    let gappy = calculate_atr_default(&candles_from_closes(&closes)).unwrap();
    let calm = calculate_atr_default(&candles_from_closes(&[100.0; 30])).unwrap();
    assert!(gappy > calm);
}
