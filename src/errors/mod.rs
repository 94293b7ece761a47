//! Error taxonomy for the engine.
//!
//! Indicator shortfalls degrade to `None` and never surface here; condition
//! skips are a normal scheduler outcome, recorded as executions with a
//! `Skipped` outcome rather than raised as errors.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, CadenceError>;

#[derive(Debug, Error)]
pub enum CadenceError {
    /// Gateway call exceeded its bounded timeout. Transient: the strategy
    /// stays Active and is retried on its normal cadence.
    #[error("order gateway timed out after {timeout_secs}s")]
    GatewayTimeout { timeout_secs: u64 },

    /// Gateway refused the order. Transient, same retry discipline.
    #[error("order gateway rejected request: {reason}")]
    GatewayRejected { reason: String },

    /// A strategy limit was reached; the strategy transitions to Completed.
    #[error("strategy limit exceeded: {0}")]
    LimitExceeded(String),

    /// A duplicate or overlapping execution attempt; the earlier attempt wins.
    #[error("concurrent execution conflict for strategy {strategy_id}")]
    ConcurrencyConflict { strategy_id: i64 },

    /// An execution record already exists for (strategy_id, scheduled_time).
    #[error("duplicate execution record for strategy {strategy_id} at {scheduled_time}")]
    DuplicateExecution {
        strategy_id: i64,
        scheduled_time: chrono::DateTime<chrono::Utc>,
    },

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("store error: {0}")]
    Store(String),

    #[error("market data error: {0}")]
    MarketData(String),

    #[error("invalid schedule: {0}")]
    Schedule(String),
}

impl CadenceError {
    /// Transient failures are retried on the next natural tick; terminal
    /// ones complete or fail the strategy.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            CadenceError::GatewayTimeout { .. }
                | CadenceError::GatewayRejected { .. }
                | CadenceError::MarketData(_)
        )
    }

    /// Owner-facing message: status text without internal detail.
    pub fn owner_message(&self) -> String {
        match self {
            CadenceError::GatewayTimeout { .. } => {
                "order gateway unavailable, will retry on next cycle".to_string()
            }
            CadenceError::GatewayRejected { .. } => {
                "order was rejected, will retry on next cycle".to_string()
            }
            CadenceError::LimitExceeded(detail) => format!("strategy completed: {}", detail),
            CadenceError::ConcurrencyConflict { .. } => {
                "an execution is already in progress".to_string()
            }
            other => other.to_string(),
        }
    }
}
