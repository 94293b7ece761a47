//! Strategy scheduler: lifecycle state machine and polling tick loop.
//!
//! Each tick enumerates strategies with next_execution_at <= now and
//! processes them concurrently; strategies share no mutable state with
//! each other. Pausing prevents future scheduling but never cancels an
//! execution already in flight.

use crate::errors::{CadenceError, Result};
use crate::execution::{ExecutionCoordinator, ExecutionRequest};
use crate::ledger::PositionLedger;
use crate::metrics::Metrics;
use crate::models::execution::ExecutionOutcome;
use crate::models::strategy::{FrequencyModel, StrategyDefinition, StrategyStatus};
use crate::scheduler::conditions::{self, DueDecision};
use crate::scheduler::frequency::{self, SpacingPolicy};
use crate::services::market_data::MarketDataProvider;
use crate::store::Store;
use chrono::{DateTime, Utc};
use futures_util::future::join_all;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

const MAX_SLIPPAGE_CAP_BPS: u16 = 1000;

pub struct StrategyScheduler {
    store: Arc<dyn Store>,
    market_data: Arc<dyn MarketDataProvider>,
    coordinator: Arc<ExecutionCoordinator>,
    ledger: Arc<PositionLedger>,
    spacing: Arc<dyn SpacingPolicy>,
    metrics: Option<Arc<Metrics>>,
    tick_interval_seconds: u64,
    handle: Arc<RwLock<Option<tokio::task::JoinHandle<()>>>>,
}

impl StrategyScheduler {
    pub fn new(
        store: Arc<dyn Store>,
        market_data: Arc<dyn MarketDataProvider>,
        coordinator: Arc<ExecutionCoordinator>,
        ledger: Arc<PositionLedger>,
        spacing: Arc<dyn SpacingPolicy>,
        metrics: Option<Arc<Metrics>>,
        tick_interval_seconds: u64,
    ) -> Self {
        Self {
            store,
            market_data,
            coordinator,
            ledger,
            spacing,
            metrics,
            tick_interval_seconds,
            handle: Arc::new(RwLock::new(None)),
        }
    }

    /// Validate a definition, initialize its runtime block and persist it.
    pub async fn create_strategy(&self, mut definition: StrategyDefinition) -> Result<i64> {
        validate_definition(&definition)?;

        let now = Utc::now();
        let first_slot =
            frequency::next_execution_for(&definition.frequency, now, self.spacing.as_ref(), None)?;
        definition.created_at = now;
        definition.runtime = crate::models::strategy::StrategyRuntime::starting_at(first_slot);

        let id = self.store.insert_strategy(definition.clone()).await?;
        info!(
            strategy_id = id,
            owner = %definition.owner,
            asset_in = %definition.asset_in,
            asset_out = %definition.asset_out,
            next_execution = %first_slot,
            "strategy created"
        );
        self.refresh_active_gauge().await;
        Ok(id)
    }

    pub async fn pause_strategy(&self, id: i64) -> Result<()> {
        let mut strategy = self.store.get_strategy(id).await?;
        match strategy.runtime.status {
            StrategyStatus::Active => {
                strategy.runtime.status = StrategyStatus::Paused;
                self.store.update_strategy(&strategy).await?;
                info!(strategy_id = id, "strategy paused");
                self.refresh_active_gauge().await;
                Ok(())
            }
            other => Err(CadenceError::Validation(format!(
                "cannot pause strategy in state {:?}",
                other
            ))),
        }
    }

    /// Resume a paused strategy. The next slot is recomputed from the
    /// current time, not back-filled from the pause window.
    pub async fn resume_strategy(&self, id: i64) -> Result<()> {
        let mut strategy = self.store.get_strategy(id).await?;
        match strategy.runtime.status {
            StrategyStatus::Paused => {
                let now = Utc::now();
                let volatility = self.volatility_for(&strategy).await;
                strategy.runtime.next_execution_at = frequency::next_execution_for(
                    &strategy.frequency,
                    now,
                    self.spacing.as_ref(),
                    volatility,
                )?;
                strategy.runtime.status = StrategyStatus::Active;
                self.store.update_strategy(&strategy).await?;
                info!(
                    strategy_id = id,
                    next_execution = %strategy.runtime.next_execution_at,
                    "strategy resumed"
                );
                self.refresh_active_gauge().await;
                Ok(())
            }
            other => Err(CadenceError::Validation(format!(
                "cannot resume strategy in state {:?}",
                other
            ))),
        }
    }

    /// One polling tick: process every due strategy concurrently.
    /// Returns the number of strategies processed.
    pub async fn tick(&self, now: DateTime<Utc>) -> Result<usize> {
        if let Some(ref metrics) = self.metrics {
            metrics.scheduler_ticks_total.inc();
        }

        let due = self.store.list_due(now).await?;
        if due.is_empty() {
            return Ok(0);
        }
        debug!(count = due.len(), "tick: processing due strategies");

        let results = join_all(
            due.iter()
                .map(|strategy| self.process_due(strategy.clone(), now)),
        )
        .await;

        for (strategy, result) in due.iter().zip(results.iter()) {
            if let Err(e) = result {
                // Conflicts are expected under overlapping ticks; the
                // earlier attempt wins and nothing is lost.
                if matches!(e, CadenceError::ConcurrencyConflict { .. }) {
                    debug!(strategy_id = ?strategy.id, "tick: overlapping attempt deferred");
                } else {
                    error!(strategy_id = ?strategy.id, error = %e, "tick: strategy processing failed");
                }
            }
        }

        self.refresh_active_gauge().await;
        if let Some(ref metrics) = self.metrics {
            metrics
                .positions_open
                .set(self.ledger.open_positions().await as f64);
        }
        Ok(due.len())
    }

    async fn process_due(&self, mut strategy: StrategyDefinition, now: DateTime<Utc>) -> Result<()> {
        let id = strategy
            .id
            .ok_or_else(|| CadenceError::Store("due strategy without id".to_string()))?;
        let scheduled_time = strategy.runtime.next_execution_at;

        let tick = match self.market_data.get_latest_price(&strategy.asset_out).await {
            Ok(tick) => tick,
            Err(e) => {
                // No price, no decision. Record the aborted slot and move
                // to the next one; the strategy stays Active.
                warn!(strategy_id = id, error = %e, "due check aborted: no price");
                self.coordinator
                    .record_aborted(id, scheduled_time, &e.owner_message())
                    .await?;
                self.advance_schedule(&mut strategy, now).await?;
                strategy.runtime.last_outcome = Some(e.owner_message());
                return self.store.update_strategy(&strategy).await;
            }
        };

        self.ledger
            .mark_to_market(&strategy.asset_out, tick.price)
            .await?;
        let market_value = self
            .ledger
            .market_value(&strategy.owner, &strategy.asset_out)
            .await;

        match conditions::evaluate(&strategy, tick, market_value, now) {
            DueDecision::Complete { reason } => {
                strategy.runtime.status = StrategyStatus::Completed;
                strategy.runtime.last_outcome = Some(reason.clone());
                info!(strategy_id = id, reason = %reason, "strategy completed");
                self.store.update_strategy(&strategy).await
            }
            DueDecision::Skip { reason } => {
                self.coordinator
                    .record_skip(id, scheduled_time, &reason)
                    .await?;
                // Skips advance to the next normal slot, never re-check
                // immediately.
                self.advance_schedule(&mut strategy, now).await?;
                strategy.runtime.last_outcome = Some(format!("skipped: {}", reason));
                self.store.update_strategy(&strategy).await
            }
            DueDecision::Execute { amount } => {
                let request = ExecutionRequest {
                    strategy_id: id,
                    owner: strategy.owner.clone(),
                    asset_in: strategy.asset_in.clone(),
                    asset_out: strategy.asset_out.clone(),
                    amount,
                    max_slippage_bps: strategy.max_slippage_bps,
                    scheduled_time,
                };

                match self.coordinator.execute(request).await {
                    Ok(record) => {
                        if let ExecutionOutcome::Filled { amount_out, .. } = record.outcome {
                            strategy.runtime.total_executions += 1;
                            strategy.runtime.total_invested += amount;
                            strategy.runtime.total_received += amount_out;
                            strategy.runtime.last_outcome = Some("filled".to_string());
                        }
                        self.advance_schedule(&mut strategy, now).await?;
                        self.complete_if_limited(&mut strategy, now);
                        self.store.update_strategy(&strategy).await
                    }
                    Err(CadenceError::ConcurrencyConflict { .. }) => {
                        // Earlier attempt owns this slot; it will advance
                        // the schedule when it finishes.
                        Err(CadenceError::ConcurrencyConflict { strategy_id: id })
                    }
                    Err(e) if e.is_transient() => {
                        // Transient gateway trouble: stay Active, retry on
                        // the normal cadence.
                        strategy.runtime.last_outcome = Some(e.owner_message());
                        self.advance_schedule(&mut strategy, now).await?;
                        self.store.update_strategy(&strategy).await
                    }
                    Err(e) => {
                        strategy.runtime.status = StrategyStatus::Failed;
                        strategy.runtime.last_outcome = Some(e.owner_message());
                        error!(strategy_id = id, error = %e, "strategy failed");
                        self.store.update_strategy(&strategy).await?;
                        Err(e)
                    }
                }
            }
        }
    }

    /// Move next_execution_at to the next normal slot after `now`.
    async fn advance_schedule(
        &self,
        strategy: &mut StrategyDefinition,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let volatility = self.volatility_for(strategy).await;
        strategy.runtime.next_execution_at = frequency::next_execution_for(
            &strategy.frequency,
            now,
            self.spacing.as_ref(),
            volatility,
        )?;
        Ok(())
    }

    fn complete_if_limited(&self, strategy: &mut StrategyDefinition, now: DateTime<Utc>) {
        let runtime = &strategy.runtime;
        let reason = if strategy
            .limits
            .max_executions
            .is_some_and(|max| runtime.total_executions >= max)
        {
            Some("max executions reached".to_string())
        } else if strategy
            .limits
            .max_total_invested
            .is_some_and(|max| runtime.total_invested >= max)
        {
            Some("max total invested reached".to_string())
        } else if strategy.limits.end_time.is_some_and(|end| now >= end) {
            Some("end time passed".to_string())
        } else {
            None
        };

        if let Some(reason) = reason {
            strategy.runtime.status = StrategyStatus::Completed;
            strategy.runtime.last_outcome = Some(reason.clone());
            info!(strategy_id = ?strategy.id, reason = %reason, "strategy completed after execution");
        }
    }

    /// Cached volatility score for dynamic spacing, if a snapshot exists.
    async fn volatility_for(&self, strategy: &StrategyDefinition) -> Option<f64> {
        if !matches!(strategy.frequency, FrequencyModel::Dynamic { .. }) {
            return None;
        }
        self.store
            .get_indicators(&strategy.asset_out)
            .await
            .ok()
            .flatten()
            .and_then(|set| set.scores.volatility_score)
    }

    async fn refresh_active_gauge(&self) {
        if let Some(ref metrics) = self.metrics {
            if let Ok(count) = self.store.count_active().await {
                metrics.strategies_active.set(count as f64);
            }
        }
    }

    /// Start the background polling loop.
    pub async fn start(self: Arc<Self>) {
        let scheduler = self.clone();
        let interval = self.tick_interval_seconds;
        let handle = tokio::spawn(async move {
            info!(interval_seconds = interval, "scheduler started");
            loop {
                if let Err(e) = scheduler.tick(Utc::now()).await {
                    error!(error = %e, "scheduler tick failed");
                }
                tokio::time::sleep(tokio::time::Duration::from_secs(interval)).await;
            }
        });
        let mut slot = self.handle.write().await;
        *slot = Some(handle);
    }

    pub async fn stop(&self) {
        let mut slot = self.handle.write().await;
        if let Some(handle) = slot.take() {
            handle.abort();
            info!("scheduler stopped");
        }
    }
}

fn validate_definition(definition: &StrategyDefinition) -> Result<()> {
    if definition.per_execution_amount <= 0.0 {
        return Err(CadenceError::Validation(
            "per-execution amount must be positive".to_string(),
        ));
    }
    if definition.asset_in == definition.asset_out {
        return Err(CadenceError::Validation(
            "asset_in and asset_out must differ".to_string(),
        ));
    }
    if definition.max_slippage_bps > MAX_SLIPPAGE_CAP_BPS {
        return Err(CadenceError::Validation(format!(
            "max slippage cannot exceed {} bps",
            MAX_SLIPPAGE_CAP_BPS
        )));
    }
    if let (Some(min), Some(max)) = (
        definition.conditions.min_price,
        definition.conditions.max_price,
    ) {
        if min > max {
            return Err(CadenceError::Validation(
                "min_price cannot exceed max_price".to_string(),
            ));
        }
    }
    if definition.conditions.only_on_dip {
        match definition.conditions.dip_threshold_pct {
            Some(threshold) if threshold < 0.0 => {}
            _ => {
                return Err(CadenceError::Validation(
                    "dip-only strategies need a negative dip_threshold_pct".to_string(),
                ))
            }
        }
    }
    if let Some(factor) = definition.advanced.weekend_boost_factor {
        if factor <= 0.0 {
            return Err(CadenceError::Validation(
                "weekend boost factor must be positive".to_string(),
            ));
        }
    }
    match &definition.frequency {
        FrequencyModel::Interval { value, .. } if *value == 0 => {
            return Err(CadenceError::Validation(
                "interval value must be positive".to_string(),
            ));
        }
        FrequencyModel::Cron { expression } => {
            // Fail fast on unparseable expressions instead of at tick time.
            frequency::next_fire_time(expression, Utc::now())?;
        }
        FrequencyModel::Dynamic {
            base_minutes,
            min_minutes,
            max_minutes,
        } => {
            if *base_minutes == 0 || *min_minutes == 0 || min_minutes > max_minutes {
                return Err(CadenceError::Validation(
                    "dynamic spacing needs 0 < min <= max and a positive base".to_string(),
                ));
            }
        }
        _ => {}
    }
    Ok(())
}
