//! Unit tests for due-check condition evaluation

use cadence::models::strategy::{
    AdvancedConfig, FrequencyModel, IntervalUnit, StrategyConditions, StrategyDefinition,
    StrategyLimits, StrategyRuntime,
};
use cadence::scheduler::conditions::{evaluate, is_weekend, DueDecision};
use cadence::services::market_data::PriceTick;
use chrono::{DateTime, TimeZone, Utc};

fn at(y: i32, mo: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, mo, d, 12, 0, 0).unwrap()
}

fn tick(price: f64, change_24h_pct: f64) -> PriceTick {
    PriceTick {
        price,
        change_24h_pct,
    }
}

fn base_strategy() -> StrategyDefinition {
    let now = at(2026, 3, 2); // a Monday
    StrategyDefinition {
        id: Some(1),
        owner: "alice".to_string(),
        asset_in: "USDC".to_string(),
        asset_out: "BTC".to_string(),
        per_execution_amount: 50.0,
        frequency: FrequencyModel::Interval {
            value: 1,
            unit: IntervalUnit::Days,
        },
        conditions: StrategyConditions::default(),
        limits: StrategyLimits::default(),
        advanced: AdvancedConfig::default(),
        max_slippage_bps: 100,
        created_at: now,
        runtime: StrategyRuntime::starting_at(now),
    }
}

#[test]
fn test_unconditional_strategy_executes_full_amount() {
    let strategy = base_strategy();
    let decision = evaluate(&strategy, tick(100.0, 1.0), 0.0, at(2026, 3, 2));
    assert_eq!(decision, DueDecision::Execute { amount: 50.0 });
}

#[test]
fn test_price_below_minimum_skips() {
    let mut strategy = base_strategy();
    strategy.conditions.min_price = Some(90.0);
    match evaluate(&strategy, tick(85.0, 0.0), 0.0, at(2026, 3, 2)) {
        DueDecision::Skip { reason } => assert!(reason.contains("below minimum")),
        other => panic!("expected skip, got {:?}", other),
    }
}

#[test]
fn test_price_above_maximum_skips() {
    let mut strategy = base_strategy();
    strategy.conditions.max_price = Some(110.0);
    match evaluate(&strategy, tick(120.0, 0.0), 0.0, at(2026, 3, 2)) {
        DueDecision::Skip { reason } => assert!(reason.contains("above maximum")),
        other => panic!("expected skip, got {:?}", other),
    }
}

#[test]
fn test_dip_threshold_gates_execution() {
    let mut strategy = base_strategy();
    strategy.conditions.only_on_dip = true;
    strategy.conditions.dip_threshold_pct = Some(-5.0);

    // Down 3% on the day: not deep enough.
    match evaluate(&strategy, tick(100.0, -3.0), 0.0, at(2026, 3, 2)) {
        DueDecision::Skip { reason } => assert!(reason.contains("dip threshold")),
        other => panic!("expected skip, got {:?}", other),
    }

    // Down 8%: executes.
    assert_eq!(
        evaluate(&strategy, tick(100.0, -8.0), 0.0, at(2026, 3, 2)),
        DueDecision::Execute { amount: 50.0 }
    );
}

#[test]
fn test_max_executions_completes() {
    let mut strategy = base_strategy();
    strategy.limits.max_executions = Some(10);
    strategy.runtime.total_executions = 10;
    match evaluate(&strategy, tick(100.0, 0.0), 0.0, at(2026, 3, 2)) {
        DueDecision::Complete { reason } => assert!(reason.contains("max executions")),
        other => panic!("expected complete, got {:?}", other),
    }
}

#[test]
fn test_end_time_completes() {
    let mut strategy = base_strategy();
    strategy.limits.end_time = Some(at(2026, 3, 1));
    match evaluate(&strategy, tick(100.0, 0.0), 0.0, at(2026, 3, 2)) {
        DueDecision::Complete { reason } => assert!(reason.contains("end time")),
        other => panic!("expected complete, got {:?}", other),
    }
}

#[test]
fn test_value_averaging_invests_shortfall() {
    let mut strategy = base_strategy();
    strategy.advanced.value_averaging = true;
    strategy.runtime.total_executions = 3;

    // Target after the 4th execution is 200; position is worth 150.
    assert_eq!(
        evaluate(&strategy, tick(100.0, 0.0), 150.0, at(2026, 3, 2)),
        DueDecision::Execute { amount: 50.0 }
    );

    // Appreciation already covers the target.
    match evaluate(&strategy, tick(100.0, 0.0), 230.0, at(2026, 3, 2)) {
        DueDecision::Skip { reason } => assert!(reason.contains("value averaging")),
        other => panic!("expected skip, got {:?}", other),
    }
}

#[test]
fn test_value_averaging_buys_more_after_drawdown() {
    let mut strategy = base_strategy();
    strategy.advanced.value_averaging = true;
    strategy.runtime.total_executions = 3;

    // Position crashed to 80; shortfall to the 200 target is 120.
    assert_eq!(
        evaluate(&strategy, tick(100.0, 0.0), 80.0, at(2026, 3, 2)),
        DueDecision::Execute { amount: 120.0 }
    );
}

#[test]
fn test_weekend_boost_applies_on_saturday_only() {
    let mut strategy = base_strategy();
    strategy.advanced.weekend_boost_factor = Some(1.5);

    let saturday = at(2026, 3, 7);
    let monday = at(2026, 3, 2);
    assert!(is_weekend(saturday));
    assert!(!is_weekend(monday));

    assert_eq!(
        evaluate(&strategy, tick(100.0, 0.0), 0.0, saturday),
        DueDecision::Execute { amount: 75.0 }
    );
    assert_eq!(
        evaluate(&strategy, tick(100.0, 0.0), 0.0, monday),
        DueDecision::Execute { amount: 50.0 }
    );
}

#[test]
fn test_final_purchase_clamped_to_remaining_budget() {
    let mut strategy = base_strategy();
    strategy.limits.max_total_invested = Some(500.0);
    strategy.runtime.total_invested = 470.0;

    assert_eq!(
        evaluate(&strategy, tick(100.0, 0.0), 0.0, at(2026, 3, 2)),
        DueDecision::Execute { amount: 30.0 }
    );
}

#[test]
fn test_exhausted_budget_completes() {
    let mut strategy = base_strategy();
    strategy.limits.max_total_invested = Some(500.0);
    strategy.runtime.total_invested = 500.0;

    match evaluate(&strategy, tick(100.0, 0.0), 0.0, at(2026, 3, 2)) {
        DueDecision::Complete { reason } => assert!(reason.contains("max total invested")),
        other => panic!("expected complete, got {:?}", other),
    }
}

#[test]
fn test_condition_order_limits_before_price_bounds() {
    // Both a terminal limit and a price-bound skip apply; completion wins.
    let mut strategy = base_strategy();
    strategy.limits.max_executions = Some(1);
    strategy.runtime.total_executions = 1;
    strategy.conditions.min_price = Some(200.0);

    match evaluate(&strategy, tick(100.0, 0.0), 0.0, at(2026, 3, 2)) {
        DueDecision::Complete { .. } => {}
        other => panic!("expected complete, got {:?}", other),
    }
}
