//! Unit tests for the in-memory store

use cadence::errors::CadenceError;
use cadence::models::execution::{ExecutionOutcome, ExecutionRecord};
use cadence::models::strategy::{
    AdvancedConfig, FrequencyModel, IntervalUnit, StrategyConditions, StrategyDefinition,
    StrategyLimits, StrategyRuntime, StrategyStatus,
};
use cadence::store::{MemoryStore, Store};
use chrono::{DateTime, Duration, TimeZone, Utc};

fn at(h: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 2, h, 0, 0).unwrap()
}

fn strategy(next_execution_at: DateTime<Utc>) -> StrategyDefinition {
    StrategyDefinition {
        id: None,
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
        created_at: at(0),
        runtime: StrategyRuntime::starting_at(next_execution_at),
    }
}

fn fill_record(strategy_id: i64, scheduled_time: DateTime<Utc>) -> ExecutionRecord {
    ExecutionRecord {
        strategy_id,
        scheduled_time,
        executed_at: scheduled_time + Duration::seconds(2),
        amount_in: 50.0,
        outcome: ExecutionOutcome::Filled {
            amount_out: 5.0,
            price: 10.0,
        },
    }
}

#[tokio::test]
async fn test_insert_assigns_sequential_ids() {
    let store = MemoryStore::new();
    let a = store.insert_strategy(strategy(at(8))).await.unwrap();
    let b = store.insert_strategy(strategy(at(9))).await.unwrap();
    assert_eq!(a, 1);
    assert_eq!(b, 2);

    let loaded = store.get_strategy(a).await.unwrap();
    assert_eq!(loaded.id, Some(a));
}

#[tokio::test]
async fn test_get_unknown_strategy_not_found() {
    let store = MemoryStore::new();
    assert!(matches!(
        store.get_strategy(42).await,
        Err(CadenceError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_update_roundtrip() {
    let store = MemoryStore::new();
    let id = store.insert_strategy(strategy(at(8))).await.unwrap();

    let mut loaded = store.get_strategy(id).await.unwrap();
    loaded.runtime.status = StrategyStatus::Paused;
    loaded.runtime.total_invested = 150.0;
    store.update_strategy(&loaded).await.unwrap();

    let reloaded = store.get_strategy(id).await.unwrap();
    assert_eq!(reloaded.runtime.status, StrategyStatus::Paused);
    assert_eq!(reloaded.runtime.total_invested, 150.0);
}

#[tokio::test]
async fn test_list_due_filters_by_time_and_status() {
    let store = MemoryStore::new();
    let due = store.insert_strategy(strategy(at(8))).await.unwrap();
    let _future = store.insert_strategy(strategy(at(18))).await.unwrap();

    let mut paused = strategy(at(8));
    paused.runtime.status = StrategyStatus::Paused;
    let _paused = store.insert_strategy(paused).await.unwrap();

    let due_list = store.list_due(at(9)).await.unwrap();
    assert_eq!(due_list.len(), 1);
    assert_eq!(due_list[0].id, Some(due));
}

#[tokio::test]
async fn test_count_active_excludes_terminal_states() {
    let store = MemoryStore::new();
    store.insert_strategy(strategy(at(8))).await.unwrap();

    let mut completed = strategy(at(8));
    completed.runtime.status = StrategyStatus::Completed;
    store.insert_strategy(completed).await.unwrap();

    assert_eq!(store.count_active().await.unwrap(), 1);
}

#[tokio::test]
async fn test_duplicate_execution_slot_rejected() {
    let store = MemoryStore::new();
    store.insert_execution(fill_record(1, at(8))).await.unwrap();

    let duplicate = store.insert_execution(fill_record(1, at(8))).await;
    assert!(matches!(
        duplicate,
        Err(CadenceError::DuplicateExecution { strategy_id: 1, .. })
    ));

    // Same strategy, different slot, and same slot for another strategy
    // are both fine.
    store.insert_execution(fill_record(1, at(9))).await.unwrap();
    store.insert_execution(fill_record(2, at(8))).await.unwrap();

    assert_eq!(store.list_executions(1).await.unwrap().len(), 2);
    assert_eq!(store.list_executions(2).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_signal_and_indicator_caches_replace() {
    use cadence::models::indicators::IndicatorSet;

    let store = MemoryStore::new();
    let mut first = IndicatorSet::empty("BTC".to_string(), 100.0);
    first.rsi_14 = Some(40.0);
    store.put_indicators(first).await.unwrap();

    let mut second = IndicatorSet::empty("BTC".to_string(), 110.0);
    second.rsi_14 = Some(60.0);
    store.put_indicators(second).await.unwrap();

    let cached = store.get_indicators("BTC").await.unwrap().unwrap();
    assert_eq!(cached.price, 110.0);
    assert_eq!(cached.rsi_14, Some(60.0));
    assert!(store.get_indicators("ETH").await.unwrap().is_none());
}
