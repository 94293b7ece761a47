//! Market data provider interface.
//!
//! Raw feed ingestion is an external collaborator; the engine consumes
//! this trait only.

use crate::config;
use crate::errors::{CadenceError, Result};
use crate::models::candle::Candle;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::RwLock;

/// Latest price with its trailing 24h change, used by dip-only conditions.
#[derive(Debug, Clone, Copy)]
pub struct PriceTick {
    pub price: f64,
    pub change_24h_pct: f64,
}

#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Ordered ascending candles, at most `limit` of them.
    async fn get_candles(&self, asset: &str, interval: &str, limit: usize)
        -> Result<Vec<Candle>>;

    async fn get_latest_price(&self, asset: &str) -> Result<PriceTick>;
}

#[derive(Debug, Deserialize)]
struct CandleRow {
    timestamp: DateTime<Utc>,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: f64,
}

#[derive(Debug, Deserialize)]
struct PriceRow {
    price: f64,
    #[serde(rename = "change24hPct")]
    change_24h_pct: f64,
}

/// HTTP-backed provider reading from the external price feed service.
pub struct HttpMarketDataProvider {
    client: reqwest::Client,
    base_url: String,
}

impl HttpMarketDataProvider {
    pub fn new(base_url: String, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_default();
        Self { client, base_url }
    }

    pub fn from_env() -> Self {
        Self::new(
            config::get_price_feed_url(),
            Duration::from_secs(config::get_gateway_timeout_seconds()),
        )
    }
}

#[async_trait]
impl MarketDataProvider for HttpMarketDataProvider {
    async fn get_candles(
        &self,
        asset: &str,
        interval: &str,
        limit: usize,
    ) -> Result<Vec<Candle>> {
        let url = format!(
            "{}/candles/{}?interval={}&limit={}",
            self.base_url, asset, interval, limit
        );
        let rows: Vec<CandleRow> = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| CadenceError::MarketData(e.to_string()))?
            .error_for_status()
            .map_err(|e| CadenceError::MarketData(e.to_string()))?
            .json()
            .await
            .map_err(|e| CadenceError::MarketData(e.to_string()))?;

        let mut candles: Vec<Candle> = rows
            .into_iter()
            .map(|r| Candle::new(r.open, r.high, r.low, r.close, r.volume, r.timestamp))
            .collect();
        candles.sort_by_key(|c| c.timestamp);
        candles.dedup_by_key(|c| c.timestamp);
        Ok(candles)
    }

    async fn get_latest_price(&self, asset: &str) -> Result<PriceTick> {
        let url = format!("{}/price/{}", self.base_url, asset);
        let row: PriceRow = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| CadenceError::MarketData(e.to_string()))?
            .error_for_status()
            .map_err(|e| CadenceError::MarketData(e.to_string()))?
            .json()
            .await
            .map_err(|e| CadenceError::MarketData(e.to_string()))?;

        Ok(PriceTick {
            price: row.price,
            change_24h_pct: row.change_24h_pct,
        })
    }
}

/// Fixture provider with preloaded candles and prices. Used in tests and
/// local development.
#[derive(Default)]
pub struct StaticMarketDataProvider {
    candles: RwLock<HashMap<String, Vec<Candle>>>,
    prices: RwLock<HashMap<String, PriceTick>>,
}

impl StaticMarketDataProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set_candles(&self, asset: &str, candles: Vec<Candle>) {
        self.candles
            .write()
            .await
            .insert(asset.to_string(), candles);
    }

    pub async fn set_price(&self, asset: &str, price: f64, change_24h_pct: f64) {
        self.prices.write().await.insert(
            asset.to_string(),
            PriceTick {
                price,
                change_24h_pct,
            },
        );
    }
}

#[async_trait]
impl MarketDataProvider for StaticMarketDataProvider {
    async fn get_candles(
        &self,
        asset: &str,
        _interval: &str,
        limit: usize,
    ) -> Result<Vec<Candle>> {
        let candles = self.candles.read().await;
        let series = candles.get(asset).cloned().unwrap_or_default();
        if series.len() > limit {
            Ok(series[series.len() - limit..].to_vec())
        } else {
            Ok(series)
        }
    }

    async fn get_latest_price(&self, asset: &str) -> Result<PriceTick> {
        self.prices
            .read()
            .await
            .get(asset)
            .copied()
            .ok_or_else(|| CadenceError::MarketData(format!("no price for {}", asset)))
    }
}
