//! Shared application context.
//!
//! Owns the wired component graph and exposes the read paths the API
//! serves: signals are computed on demand and cached until their horizon
//! expires, strategy status is joined with its execution history.

use crate::config;
use crate::errors::{CadenceError, Result};
use crate::execution::{ExecutionCoordinator, OrderGateway};
use crate::indicators::engine as indicator_engine;
use crate::ledger::PositionLedger;
use crate::metrics::Metrics;
use crate::models::execution::{ExecutionRecord, ExecutionStats};
use crate::models::indicators::IndicatorSet;
use crate::models::position::Position;
use crate::models::signal::Signal;
use crate::models::strategy::StrategyDefinition;
use crate::scheduler::{StrategyScheduler, VolatilityAdaptiveSpacing};
use crate::services::market_data::MarketDataProvider;
use crate::signals::SignalSynthesizer;
use crate::store::Store;
use chrono::Utc;
use std::sync::Arc;
use tracing::info;

/// Candle history fetched per signal evaluation. Enough for the SMA-200
/// window with headroom.
const CANDLE_LIMIT: usize = 250;

pub struct AppContext {
    pub store: Arc<dyn Store>,
    pub ledger: Arc<PositionLedger>,
    pub market_data: Arc<dyn MarketDataProvider>,
    pub coordinator: Arc<ExecutionCoordinator>,
    pub scheduler: Arc<StrategyScheduler>,
    pub synthesizer: SignalSynthesizer,
    pub metrics: Arc<Metrics>,
}

impl AppContext {
    /// Wire the full component graph from its injected seams.
    pub fn new(
        store: Arc<dyn Store>,
        market_data: Arc<dyn MarketDataProvider>,
        gateway: Arc<dyn OrderGateway>,
        metrics: Arc<Metrics>,
    ) -> Arc<Self> {
        let ledger = Arc::new(PositionLedger::new());
        let coordinator = Arc::new(ExecutionCoordinator::new(
            store.clone(),
            ledger.clone(),
            gateway,
            Some(metrics.clone()),
        ));
        let scheduler = Arc::new(StrategyScheduler::new(
            store.clone(),
            market_data.clone(),
            coordinator.clone(),
            ledger.clone(),
            Arc::new(VolatilityAdaptiveSpacing),
            Some(metrics.clone()),
            config::get_tick_interval_seconds(),
        ));
        let synthesizer = SignalSynthesizer::new(config::get_signal_horizon_minutes());

        info!("application context initialized");
        Arc::new(Self {
            store,
            ledger,
            market_data,
            coordinator,
            scheduler,
            synthesizer,
            metrics,
        })
    }

    /// Current signal for `asset`. A cached signal is returned while it is
    /// still within its validity horizon; otherwise candles are fetched and
    /// a fresh snapshot plus signal are computed and cached.
    pub async fn get_signal(&self, asset: &str) -> Result<Signal> {
        let now = Utc::now();
        if let Some(cached) = self.store.get_signal(asset).await? {
            if cached.is_valid_at(now) {
                return Ok(cached);
            }
        }

        let candles = self
            .market_data
            .get_candles(asset, &config::get_evaluation_interval(), CANDLE_LIMIT)
            .await?;
        if candles.is_empty() {
            return Err(CadenceError::MarketData(format!(
                "no candles available for {}",
                asset
            )));
        }

        let indicators = indicator_engine::compute(asset, &candles);
        let price = indicators.price;
        self.store.put_indicators(indicators.clone()).await?;

        let signal = self.synthesizer.synthesize(&indicators, price);
        self.store.put_signal(signal.clone()).await?;
        self.metrics.signals_generated_total.inc();

        Ok(signal)
    }

    /// Latest cached indicator snapshot for `asset`, if one exists.
    pub async fn get_indicators(&self, asset: &str) -> Result<Option<IndicatorSet>> {
        self.store.get_indicators(asset).await
    }

    /// Strategy definition joined with its execution history stats.
    pub async fn get_strategy_status(
        &self,
        id: i64,
    ) -> Result<(StrategyDefinition, ExecutionStats)> {
        let strategy = self.store.get_strategy(id).await?;
        let records = self.store.list_executions(id).await?;
        Ok((strategy, ExecutionStats::from_records(&records)))
    }

    pub async fn list_executions(&self, strategy_id: i64) -> Result<Vec<ExecutionRecord>> {
        self.store.list_executions(strategy_id).await
    }

    pub async fn get_position(&self, owner: &str, asset: &str) -> Option<Position> {
        self.ledger.get_position(owner, asset).await
    }
}
