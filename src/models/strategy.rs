//! Recurring-purchase strategy models.
//!
//! A definition is created by its owner; the runtime block is mutated only
//! by the scheduler and the execution coordinator.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StrategyStatus {
    Active,
    Paused,
    Completed,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntervalUnit {
    Minutes,
    Hours,
    Days,
    Weeks,
}

/// How often a strategy comes due. Each variant is matched exhaustively by
/// the scheduler; there is no string-keyed dispatch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FrequencyModel {
    /// Fixed duration added to the last run.
    Interval { value: u32, unit: IntervalUnit },
    /// Standard 5-field cron expression; next fire is a pure function of
    /// (expression, now).
    Cron { expression: String },
    /// Volatility-adaptive spacing between `min_minutes` and `max_minutes`.
    Dynamic {
        base_minutes: u32,
        min_minutes: u32,
        max_minutes: u32,
    },
}

/// Gate conditions checked on every due tick, in order: price bounds,
/// then dip-only.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StrategyConditions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_price: Option<f64>,
    #[serde(default)]
    pub only_on_dip: bool,
    /// Negative percentage; executes only when the trailing 24h change is
    /// at or below this value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dip_threshold_pct: Option<f64>,
}

/// Terminal limits; reaching any of them completes the strategy.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StrategyLimits {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_total_invested: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_executions: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdvancedConfig {
    /// Target a growing invested value instead of a fixed periodic amount.
    #[serde(default)]
    pub value_averaging: bool,
    /// Multiply the per-execution amount on Saturdays and Sundays.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weekend_boost_factor: Option<f64>,
}

/// Mutable runtime block. Owned by the scheduler and coordinator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyRuntime {
    pub total_executions: u32,
    pub total_invested: f64,
    pub total_received: f64,
    pub next_execution_at: DateTime<Utc>,
    pub status: StrategyStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_outcome: Option<String>,
}

impl StrategyRuntime {
    pub fn starting_at(next_execution_at: DateTime<Utc>) -> Self {
        Self {
            total_executions: 0,
            total_invested: 0.0,
            total_received: 0.0,
            next_execution_at,
            status: StrategyStatus::Active,
            last_outcome: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyDefinition {
    pub id: Option<i64>,
    pub owner: String,
    /// Asset spent on each execution (the funding asset).
    pub asset_in: String,
    /// Asset accumulated.
    pub asset_out: String,
    pub per_execution_amount: f64,
    pub frequency: FrequencyModel,
    #[serde(default)]
    pub conditions: StrategyConditions,
    #[serde(default)]
    pub limits: StrategyLimits,
    #[serde(default)]
    pub advanced: AdvancedConfig,
    pub max_slippage_bps: u16,
    pub created_at: DateTime<Utc>,
    pub runtime: StrategyRuntime,
}

impl StrategyDefinition {
    pub fn is_active(&self) -> bool {
        self.runtime.status == StrategyStatus::Active
    }

    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.is_active() && self.runtime.next_execution_at <= now
    }
}
