//! Unit tests for OBV and pivot points

use cadence::indicators::structure::pivot::calculate_pivot_points;
use cadence::indicators::volume::obv::calculate_obv;
use cadence::models::candle::Candle;
use chrono::Utc;

fn candle(close: f64, volume: f64) -> Candle {
    Candle::new(close, close + 1.0, close - 1.0, close, volume, Utc::now())
}

#[test]
fn test_obv_needs_two_candles() {
    assert!(calculate_obv(&[candle(100.0, 500.0)]).is_none());
}

#[test]
fn test_obv_accumulates_signed_volume() {
    let candles = vec![
        candle(100.0, 1000.0),
        candle(101.0, 500.0),  // up: +500
        candle(100.5, 300.0),  // down: -300
        candle(100.5, 9999.0), // flat: ignored
        candle(102.0, 200.0),  // up: +200
    ];
    assert_eq!(calculate_obv(&candles), Some(400.0));
}

#[test]
fn test_obv_is_unwindowed() {
    // The first candle's volume never counts, everything after does.
    let candles: Vec<Candle> = (0..300).map(|i| candle(100.0 + i as f64, 10.0)).collect();
    assert_eq!(calculate_obv(&candles), Some(2990.0));
}

#[test]
fn test_pivot_points_ordering() {
    let candles = vec![Candle::new(100.0, 110.0, 95.0, 105.0, 1000.0, Utc::now())];
    let pivots = calculate_pivot_points(&candles).unwrap();

    assert!(pivots.s3 < pivots.s2);
    assert!(pivots.s2 < pivots.s1);
    assert!(pivots.s1 < pivots.pivot);
    assert!(pivots.pivot < pivots.r1);
    assert!(pivots.r1 < pivots.r2);
    assert!(pivots.r2 < pivots.r3);
}

#[test]
fn test_pivot_points_classic_formulas() {
    let candles = vec![Candle::new(100.0, 110.0, 95.0, 105.0, 1000.0, Utc::now())];
    let pivots = calculate_pivot_points(&candles).unwrap();

    let pivot = (110.0 + 95.0 + 105.0) / 3.0;
    assert!((pivots.pivot - pivot).abs() < 1e-12);
    assert!((pivots.r1 - (2.0 * pivot - 95.0)).abs() < 1e-12);
    assert!((pivots.s1 - (2.0 * pivot - 110.0)).abs() < 1e-12);
    assert!((pivots.r2 - (pivot + 15.0)).abs() < 1e-12);
    assert!((pivots.s2 - (pivot - 15.0)).abs() < 1e-12);
}

#[test]
fn test_pivot_points_empty_series() {
    assert!(calculate_pivot_points(&[]).is_none());
}
