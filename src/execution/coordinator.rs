//! Execution coordinator.
//!
//! Turns a due strategy into an order, guards against duplicate and
//! concurrent execution, records every outcome, and forwards fills to the
//! position ledger. At most one execution per strategy is in flight at a
//! time; a later overlapping attempt is aborted, never queued.

use crate::errors::{CadenceError, Result};
use crate::execution::gateway::OrderGateway;
use crate::ledger::PositionLedger;
use crate::metrics::Metrics;
use crate::models::execution::{ExecutionOutcome, ExecutionRecord};
use crate::models::position::FillSide;
use crate::store::Store;
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use tracing::{error, info, warn};

#[derive(Debug, Clone)]
pub struct ExecutionRequest {
    pub strategy_id: i64,
    pub owner: String,
    pub asset_in: String,
    pub asset_out: String,
    pub amount: f64,
    pub max_slippage_bps: u16,
    pub scheduled_time: DateTime<Utc>,
}

pub struct ExecutionCoordinator {
    store: Arc<dyn Store>,
    ledger: Arc<PositionLedger>,
    gateway: Arc<dyn OrderGateway>,
    metrics: Option<Arc<Metrics>>,
    in_flight: Mutex<HashSet<i64>>,
}

/// Removes the strategy from the in-flight set when the execution path
/// unwinds, success or not.
struct InFlightGuard<'a> {
    set: &'a Mutex<HashSet<i64>>,
    strategy_id: i64,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        if let Ok(mut set) = self.set.lock() {
            set.remove(&self.strategy_id);
        }
    }
}

impl ExecutionCoordinator {
    pub fn new(
        store: Arc<dyn Store>,
        ledger: Arc<PositionLedger>,
        gateway: Arc<dyn OrderGateway>,
        metrics: Option<Arc<Metrics>>,
    ) -> Self {
        Self {
            store,
            ledger,
            gateway,
            metrics,
            in_flight: Mutex::new(HashSet::new()),
        }
    }

    fn try_begin(&self, strategy_id: i64) -> Result<InFlightGuard<'_>> {
        let mut set = self
            .in_flight
            .lock()
            .map_err(|_| CadenceError::Store("in-flight lock poisoned".to_string()))?;
        if !set.insert(strategy_id) {
            return Err(CadenceError::ConcurrencyConflict { strategy_id });
        }
        Ok(InFlightGuard {
            set: &self.in_flight,
            strategy_id,
        })
    }

    /// Execute one due strategy slot. Returns the appended record on fill.
    pub async fn execute(&self, request: ExecutionRequest) -> Result<ExecutionRecord> {
        let _guard = self.try_begin(request.strategy_id)?;
        let start = std::time::Instant::now();

        // A record for this slot means an earlier tick already claimed it.
        let existing = self.store.list_executions(request.strategy_id).await?;
        if existing
            .iter()
            .any(|r| r.scheduled_time == request.scheduled_time)
        {
            return Err(CadenceError::ConcurrencyConflict {
                strategy_id: request.strategy_id,
            });
        }

        let quote = self
            .gateway
            .quote(&request.asset_in, &request.asset_out, request.amount)
            .await;
        if let Err(e) = quote {
            return self.record_failure(&request, e).await;
        }

        let fill = match self
            .gateway
            .submit_order(
                &request.asset_in,
                &request.asset_out,
                request.amount,
                request.max_slippage_bps,
            )
            .await
        {
            Ok(fill) => fill,
            Err(e) => return self.record_failure(&request, e).await,
        };

        let record = ExecutionRecord {
            strategy_id: request.strategy_id,
            scheduled_time: request.scheduled_time,
            executed_at: Utc::now(),
            amount_in: request.amount,
            outcome: ExecutionOutcome::Filled {
                amount_out: fill.actual_out,
                price: fill.actual_price,
            },
        };
        self.store.insert_execution(record.clone()).await?;

        self.ledger
            .apply_fill(
                &request.owner,
                &request.asset_out,
                FillSide::Buy,
                fill.actual_out,
                fill.actual_price,
            )
            .await?;

        if let Some(ref metrics) = self.metrics {
            metrics.executions_total.inc();
            metrics
                .execution_duration_seconds
                .observe(start.elapsed().as_secs_f64());
        }

        info!(
            strategy_id = request.strategy_id,
            amount_in = request.amount,
            amount_out = fill.actual_out,
            price = fill.actual_price,
            "execution filled"
        );

        Ok(record)
    }

    /// Record a skipped due check for audit. Not an error path.
    pub async fn record_skip(
        &self,
        strategy_id: i64,
        scheduled_time: DateTime<Utc>,
        reason: &str,
    ) -> Result<()> {
        let outcome = ExecutionOutcome::Skipped {
            reason: reason.to_string(),
        };
        match self
            .append_outcome(strategy_id, scheduled_time, 0.0, outcome)
            .await
        {
            Ok(()) => {
                if let Some(ref metrics) = self.metrics {
                    metrics.execution_skips_total.inc();
                }
                info!(strategy_id, reason = %reason, "due check skipped");
                Ok(())
            }
            // An overlapping tick already claimed the slot; its record wins.
            Err(CadenceError::DuplicateExecution { .. }) => Ok(()),
            Err(e) => Err(e),
        }
    }

    /// Append an audit record for a slot that never reached the gateway
    /// (e.g. market data was unavailable).
    pub async fn record_aborted(
        &self,
        strategy_id: i64,
        scheduled_time: DateTime<Utc>,
        reason: &str,
    ) -> Result<()> {
        let outcome = ExecutionOutcome::Failed {
            reason: reason.to_string(),
        };
        match self
            .append_outcome(strategy_id, scheduled_time, 0.0, outcome)
            .await
        {
            Ok(()) => {
                if let Some(ref metrics) = self.metrics {
                    metrics.execution_failures_total.inc();
                }
                Ok(())
            }
            Err(CadenceError::DuplicateExecution { .. }) => Ok(()),
            Err(e) => Err(e),
        }
    }

    async fn append_outcome(
        &self,
        strategy_id: i64,
        scheduled_time: DateTime<Utc>,
        amount_in: f64,
        outcome: ExecutionOutcome,
    ) -> Result<()> {
        self.store
            .insert_execution(ExecutionRecord {
                strategy_id,
                scheduled_time,
                executed_at: Utc::now(),
                amount_in,
                outcome,
            })
            .await
    }

    async fn record_failure(
        &self,
        request: &ExecutionRequest,
        cause: CadenceError,
    ) -> Result<ExecutionRecord> {
        let record = ExecutionRecord {
            strategy_id: request.strategy_id,
            scheduled_time: request.scheduled_time,
            executed_at: Utc::now(),
            amount_in: request.amount,
            outcome: ExecutionOutcome::Failed {
                reason: cause.owner_message(),
            },
        };
        match self.store.insert_execution(record).await {
            Ok(()) => {}
            Err(CadenceError::DuplicateExecution { .. }) => {
                warn!(
                    strategy_id = request.strategy_id,
                    "failure slot already recorded by an earlier attempt"
                );
            }
            Err(e) => {
                error!(strategy_id = request.strategy_id, error = %e, "failed to record execution failure");
            }
        }

        if let Some(ref metrics) = self.metrics {
            metrics.execution_failures_total.inc();
        }
        error!(
            strategy_id = request.strategy_id,
            error = %cause,
            "execution failed; strategy stays active and retries on its normal cadence"
        );
        Err(cause)
    }
}
