//! Next-execution-time computation for every frequency model.
//!
//! Cron next-fire is a pure function of (expression, now) so it can be
//! tested independently of the tick loop.

use crate::errors::{CadenceError, Result};
use crate::models::strategy::{FrequencyModel, IntervalUnit};
use chrono::{DateTime, Duration, Utc};
use cron::Schedule;
use std::str::FromStr;

/// Fixed duration for an interval model.
pub fn interval_duration(value: u32, unit: IntervalUnit) -> Duration {
    match unit {
        IntervalUnit::Minutes => Duration::minutes(value as i64),
        IntervalUnit::Hours => Duration::hours(value as i64),
        IntervalUnit::Days => Duration::days(value as i64),
        IntervalUnit::Weeks => Duration::weeks(value as i64),
    }
}

/// Next fire time for a standard 5-field cron expression, strictly after
/// `now`. The `cron` crate wants a seconds field, so 5-field input is
/// normalized by prepending one.
pub fn next_fire_time(expression: &str, now: DateTime<Utc>) -> Result<DateTime<Utc>> {
    let normalized = if expression.split_whitespace().count() == 5 {
        format!("0 {}", expression)
    } else {
        expression.to_string()
    };
    let schedule = Schedule::from_str(&normalized)
        .map_err(|e| CadenceError::Schedule(format!("invalid cron '{}': {}", expression, e)))?;
    schedule
        .after(&now)
        .next()
        .ok_or_else(|| CadenceError::Schedule(format!("cron '{}' never fires again", expression)))
}

/// Pluggable spacing policy for dynamic frequency models.
pub trait SpacingPolicy: Send + Sync {
    fn next_execution(
        &self,
        now: DateTime<Utc>,
        base_minutes: u32,
        min_minutes: u32,
        max_minutes: u32,
        volatility_score: Option<f64>,
    ) -> DateTime<Utc>;
}

/// Default policy: widen spacing as volatility rises, so choppy markets
/// get fewer, better-amortized entries. Spacing is clamped to
/// [min_minutes, max_minutes]; unknown volatility falls back to the base.
pub struct VolatilityAdaptiveSpacing;

impl SpacingPolicy for VolatilityAdaptiveSpacing {
    fn next_execution(
        &self,
        now: DateTime<Utc>,
        base_minutes: u32,
        min_minutes: u32,
        max_minutes: u32,
        volatility_score: Option<f64>,
    ) -> DateTime<Utc> {
        let scale = match volatility_score {
            Some(score) => 1.0 + (score.clamp(0.0, 100.0) / 100.0),
            None => 1.0,
        };
        let minutes = (base_minutes as f64 * scale)
            .round()
            .clamp(min_minutes as f64, max_minutes as f64) as i64;
        now + Duration::minutes(minutes)
    }
}

/// Compute the next normal slot for a strategy from `now`.
pub fn next_execution_for(
    frequency: &FrequencyModel,
    now: DateTime<Utc>,
    spacing: &dyn SpacingPolicy,
    volatility_score: Option<f64>,
) -> Result<DateTime<Utc>> {
    match frequency {
        FrequencyModel::Interval { value, unit } => {
            if *value == 0 {
                return Err(CadenceError::Schedule(
                    "interval value must be positive".to_string(),
                ));
            }
            Ok(now + interval_duration(*value, *unit))
        }
        FrequencyModel::Cron { expression } => next_fire_time(expression, now),
        FrequencyModel::Dynamic {
            base_minutes,
            min_minutes,
            max_minutes,
        } => Ok(spacing.next_execution(
            now,
            *base_minutes,
            *min_minutes,
            *max_minutes,
            volatility_score,
        )),
    }
}
