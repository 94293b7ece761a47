//! Injected persistence seam.
//!
//! The reactive storage/sync layer is an external collaborator; the engine
//! only talks to this trait. The in-memory implementation backs tests and
//! single-process deployments.

pub mod memory;

use crate::errors::Result;
use crate::models::execution::ExecutionRecord;
use crate::models::indicators::IndicatorSet;
use crate::models::signal::Signal;
use crate::models::strategy::StrategyDefinition;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

pub use memory::MemoryStore;

#[async_trait]
pub trait Store: Send + Sync {
    /// Persist a new strategy and return its assigned id.
    async fn insert_strategy(&self, definition: StrategyDefinition) -> Result<i64>;

    async fn get_strategy(&self, id: i64) -> Result<StrategyDefinition>;

    async fn update_strategy(&self, definition: &StrategyDefinition) -> Result<()>;

    /// Active strategies with next_execution_at <= now.
    async fn list_due(&self, now: DateTime<Utc>) -> Result<Vec<StrategyDefinition>>;

    async fn count_active(&self) -> Result<usize>;

    /// Append an execution record. Fails with `DuplicateExecution` when a
    /// record for (strategy_id, scheduled_time) already exists.
    async fn insert_execution(&self, record: ExecutionRecord) -> Result<()>;

    async fn list_executions(&self, strategy_id: i64) -> Result<Vec<ExecutionRecord>>;

    /// Replace the cached indicator snapshot for an asset.
    async fn put_indicators(&self, set: IndicatorSet) -> Result<()>;

    async fn get_indicators(&self, asset: &str) -> Result<Option<IndicatorSet>>;

    /// Replace the cached signal for an asset.
    async fn put_signal(&self, signal: Signal) -> Result<()>;

    async fn get_signal(&self, asset: &str) -> Result<Option<Signal>>;
}
