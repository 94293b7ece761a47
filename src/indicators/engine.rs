//! Entry point for computing a full indicator snapshot.

use crate::indicators::momentum::{macd, rsi, stochastic, williams};
use crate::indicators::structure::pivot;
use crate::indicators::trend::{ema, sma};
use crate::indicators::volatility::{atr, bollinger};
use crate::indicators::volume::obv;
use crate::indicators::composite;
use crate::models::candle::Candle;
use crate::models::indicators::IndicatorSet;
use chrono::Utc;

/// Compute every indicator over an ordered candle series. Pure and
/// infallible: each indicator independently degrades to `None` when its
/// minimum window is not satisfied.
pub fn compute(asset: &str, candles: &[Candle]) -> IndicatorSet {
    let price = candles.last().map(|c| c.close).unwrap_or(0.0);
    let mut set = IndicatorSet::empty(asset.to_string(), price);
    set.timestamp = Utc::now();

    set.sma_20 = sma::calculate_sma(candles, 20);
    set.sma_50 = sma::calculate_sma(candles, 50);
    set.sma_200 = sma::calculate_sma(candles, 200);
    set.ema_12 = ema::calculate_ema(candles, 12);
    set.ema_26 = ema::calculate_ema(candles, 26);
    set.ema_50 = ema::calculate_ema(candles, 50);
    set.macd = macd::calculate_macd(candles);
    set.rsi_14 = rsi::calculate_rsi_default(candles);
    set.stochastic = stochastic::calculate_stochastic(candles);
    set.williams_r = williams::calculate_williams_r(candles);
    set.bollinger = bollinger::calculate_bollinger_bands_default(candles);
    set.atr_14 = atr::calculate_atr_default(candles);
    set.obv = obv::calculate_obv(candles);
    set.pivot_points = pivot::calculate_pivot_points(candles);
    set.scores = composite::scores(candles, set.sma_20, set.sma_50, set.rsi_14);

    set
}
