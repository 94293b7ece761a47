//! Due-check condition evaluation.
//!
//! Pure decision function: given a strategy, the latest price tick and the
//! current position market value, decide whether the slot executes, skips,
//! or completes the strategy. Evaluation order: terminal limits, price
//! bounds, dip-only, then amount sizing (value averaging, weekend boost).

use crate::models::strategy::StrategyDefinition;
use crate::services::market_data::PriceTick;
use chrono::{DateTime, Datelike, Utc, Weekday};

#[derive(Debug, Clone, PartialEq)]
pub enum DueDecision {
    Execute { amount: f64 },
    Skip { reason: String },
    Complete { reason: String },
}

pub fn evaluate(
    strategy: &StrategyDefinition,
    tick: PriceTick,
    position_market_value: f64,
    now: DateTime<Utc>,
) -> DueDecision {
    if let Some(reason) = terminal_limit_reached(strategy, now) {
        return DueDecision::Complete { reason };
    }

    if let Some(min) = strategy.conditions.min_price {
        if tick.price < min {
            return DueDecision::Skip {
                reason: format!("price {:.4} below minimum {:.4}", tick.price, min),
            };
        }
    }
    if let Some(max) = strategy.conditions.max_price {
        if tick.price > max {
            return DueDecision::Skip {
                reason: format!("price {:.4} above maximum {:.4}", tick.price, max),
            };
        }
    }

    if strategy.conditions.only_on_dip {
        // dip_threshold_pct is negative; execute only when the trailing
        // 24h change is at or below it.
        let threshold = strategy.conditions.dip_threshold_pct.unwrap_or(0.0);
        if tick.change_24h_pct > threshold {
            return DueDecision::Skip {
                reason: format!(
                    "24h change {:.2}% above dip threshold {:.2}%",
                    tick.change_24h_pct, threshold
                ),
            };
        }
    }

    let mut amount = strategy.per_execution_amount;

    if strategy.advanced.value_averaging {
        let target =
            strategy.per_execution_amount * (strategy.runtime.total_executions as f64 + 1.0);
        let invest = target - position_market_value;
        if invest <= 0.0 {
            return DueDecision::Skip {
                reason: format!(
                    "value averaging target {:.2} already met by position value {:.2}",
                    target, position_market_value
                ),
            };
        }
        amount = invest;
    }

    if let Some(factor) = strategy.advanced.weekend_boost_factor {
        if is_weekend(now) {
            amount *= factor;
        }
    }

    // Never overshoot the invested-capital cap with the final purchase.
    if let Some(max_invested) = strategy.limits.max_total_invested {
        let remaining = max_invested - strategy.runtime.total_invested;
        if remaining <= 0.0 {
            return DueDecision::Complete {
                reason: format!("max total invested {:.2} reached", max_invested),
            };
        }
        amount = amount.min(remaining);
    }

    DueDecision::Execute { amount }
}

fn terminal_limit_reached(strategy: &StrategyDefinition, now: DateTime<Utc>) -> Option<String> {
    if let Some(end_time) = strategy.limits.end_time {
        if now >= end_time {
            return Some(format!("end time {} passed", end_time));
        }
    }
    if let Some(max_executions) = strategy.limits.max_executions {
        if strategy.runtime.total_executions >= max_executions {
            return Some(format!("max executions {} reached", max_executions));
        }
    }
    if let Some(max_invested) = strategy.limits.max_total_invested {
        if strategy.runtime.total_invested >= max_invested {
            return Some(format!("max total invested {:.2} reached", max_invested));
        }
    }
    None
}

pub fn is_weekend(now: DateTime<Utc>) -> bool {
    matches!(now.weekday(), Weekday::Sat | Weekday::Sun)
}
