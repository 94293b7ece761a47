//! Classic pivot points from the most recently completed candle.

use crate::models::candle::Candle;
use crate::models::indicators::PivotPointsIndicator;

pub fn calculate_pivot_points(candles: &[Candle]) -> Option<PivotPointsIndicator> {
    let last = candles.last()?;
    let (high, low, close) = (last.high, last.low, last.close);

    let pivot = (high + low + close) / 3.0;
    let range = high - low;

    Some(PivotPointsIndicator {
        pivot,
        r1: 2.0 * pivot - low,
        s1: 2.0 * pivot - high,
        r2: pivot + range,
        s2: pivot - range,
        r3: high + 2.0 * (pivot - low),
        s3: low - 2.0 * (high - pivot),
    })
}
