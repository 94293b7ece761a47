use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Outcome of a due check. Skips and failures are kept for audit alongside
/// fills; none are silently dropped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "lowercase")]
pub enum ExecutionOutcome {
    Filled { amount_out: f64, price: f64 },
    Skipped { reason: String },
    Failed { reason: String },
}

/// Append-only execution record. (strategy_id, scheduled_time) is unique;
/// the store rejects duplicates, which is the primary defense against
/// double fills from overlapping ticks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionRecord {
    pub strategy_id: i64,
    pub scheduled_time: DateTime<Utc>,
    pub executed_at: DateTime<Utc>,
    pub amount_in: f64,
    pub outcome: ExecutionOutcome,
}

impl ExecutionRecord {
    pub fn is_fill(&self) -> bool {
        matches!(self.outcome, ExecutionOutcome::Filled { .. })
    }
}

/// Aggregate execution statistics for a strategy, surfaced with its status.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExecutionStats {
    pub fills: u32,
    pub skips: u32,
    pub failures: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_execution_at: Option<DateTime<Utc>>,
}

impl ExecutionStats {
    pub fn from_records(records: &[ExecutionRecord]) -> Self {
        let mut stats = Self::default();
        for record in records {
            match record.outcome {
                ExecutionOutcome::Filled { .. } => stats.fills += 1,
                ExecutionOutcome::Skipped { .. } => stats.skips += 1,
                ExecutionOutcome::Failed { .. } => stats.failures += 1,
            }
            stats.last_execution_at = Some(
                stats
                    .last_execution_at
                    .map_or(record.executed_at, |t| t.max(record.executed_at)),
            );
        }
        stats
    }
}
