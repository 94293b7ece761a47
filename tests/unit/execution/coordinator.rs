//! Unit tests for the execution coordinator

use async_trait::async_trait;
use cadence::errors::{CadenceError, Result};
use cadence::execution::{ExecutionCoordinator, ExecutionRequest, Fill, OrderGateway, Quote};
use cadence::ledger::PositionLedger;
use cadence::models::execution::ExecutionOutcome;
use cadence::store::{MemoryStore, Store};
use chrono::{TimeZone, Utc};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Gateway that always fills at a fixed price.
struct FixedPriceGateway {
    price: f64,
    submits: AtomicUsize,
}

impl FixedPriceGateway {
    fn new(price: f64) -> Self {
        Self {
            price,
            submits: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl OrderGateway for FixedPriceGateway {
    async fn quote(&self, _asset_in: &str, _asset_out: &str, amount: f64) -> Result<Quote> {
        Ok(Quote {
            expected_out: amount / self.price,
            price_impact: 0.0,
        })
    }

    async fn submit_order(
        &self,
        _asset_in: &str,
        _asset_out: &str,
        amount: f64,
        _max_slippage_bps: u16,
    ) -> Result<Fill> {
        self.submits.fetch_add(1, Ordering::SeqCst);
        Ok(Fill {
            actual_out: amount / self.price,
            actual_price: self.price,
        })
    }
}

/// Gateway that times out on every call.
struct UnreachableGateway;

#[async_trait]
impl OrderGateway for UnreachableGateway {
    async fn quote(&self, _asset_in: &str, _asset_out: &str, _amount: f64) -> Result<Quote> {
        Err(CadenceError::GatewayTimeout { timeout_secs: 10 })
    }

    async fn submit_order(
        &self,
        _asset_in: &str,
        _asset_out: &str,
        _amount: f64,
        _max_slippage_bps: u16,
    ) -> Result<Fill> {
        Err(CadenceError::GatewayTimeout { timeout_secs: 10 })
    }
}

fn request(strategy_id: i64, amount: f64) -> ExecutionRequest {
    ExecutionRequest {
        strategy_id,
        owner: "alice".to_string(),
        asset_in: "USDC".to_string(),
        asset_out: "BTC".to_string(),
        amount,
        max_slippage_bps: 100,
        scheduled_time: Utc.with_ymd_and_hms(2026, 3, 2, 12, 0, 0).unwrap(),
    }
}

fn build(
    gateway: Arc<dyn OrderGateway>,
) -> (Arc<MemoryStore>, Arc<PositionLedger>, ExecutionCoordinator) {
    let store = Arc::new(MemoryStore::new());
    let ledger = Arc::new(PositionLedger::new());
    let coordinator =
        ExecutionCoordinator::new(store.clone(), ledger.clone(), gateway, None);
    (store, ledger, coordinator)
}

#[tokio::test]
async fn test_fill_records_execution_and_updates_ledger() {
    let (store, ledger, coordinator) = build(Arc::new(FixedPriceGateway::new(10.0)));

    let record = coordinator.execute(request(1, 50.0)).await.unwrap();
    match record.outcome {
        ExecutionOutcome::Filled { amount_out, price } => {
            assert_eq!(amount_out, 5.0);
            assert_eq!(price, 10.0);
        }
        other => panic!("expected fill, got {:?}", other),
    }

    let records = store.list_executions(1).await.unwrap();
    assert_eq!(records.len(), 1);

    let position = ledger.get_position("alice", "BTC").await.unwrap();
    assert_eq!(position.quantity, 5.0);
    assert_eq!(position.average_cost, Some(10.0));
}

#[tokio::test]
async fn test_same_slot_executes_once() {
    let gateway = Arc::new(FixedPriceGateway::new(10.0));
    let (store, _ledger, coordinator) = build(gateway.clone());

    coordinator.execute(request(1, 50.0)).await.unwrap();
    let second = coordinator.execute(request(1, 50.0)).await;

    assert!(matches!(
        second,
        Err(CadenceError::ConcurrencyConflict { strategy_id: 1 })
    ));
    assert_eq!(gateway.submits.load(Ordering::SeqCst), 1);
    assert_eq!(store.list_executions(1).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_different_strategies_do_not_conflict() {
    let (_store, ledger, coordinator) = build(Arc::new(FixedPriceGateway::new(10.0)));

    coordinator.execute(request(1, 50.0)).await.unwrap();
    coordinator.execute(request(2, 30.0)).await.unwrap();

    let position = ledger.get_position("alice", "BTC").await.unwrap();
    assert_eq!(position.quantity, 8.0);
}

#[tokio::test]
async fn test_gateway_failure_records_failed_outcome() {
    let (store, ledger, coordinator) = build(Arc::new(UnreachableGateway));

    let result = coordinator.execute(request(1, 50.0)).await;
    match result {
        Err(e) => assert!(e.is_transient()),
        Ok(_) => panic!("expected failure"),
    }

    let records = store.list_executions(1).await.unwrap();
    assert_eq!(records.len(), 1);
    assert!(matches!(records[0].outcome, ExecutionOutcome::Failed { .. }));
    assert!(ledger.get_position("alice", "BTC").await.is_none());
}

#[tokio::test]
async fn test_record_skip_is_idempotent_per_slot() {
    let (store, _ledger, coordinator) = build(Arc::new(FixedPriceGateway::new(10.0)));
    let when = Utc.with_ymd_and_hms(2026, 3, 2, 12, 0, 0).unwrap();

    coordinator.record_skip(1, when, "price below minimum").await.unwrap();
    // Second attempt for the same slot is quietly dropped.
    coordinator.record_skip(1, when, "price below minimum").await.unwrap();

    let records = store.list_executions(1).await.unwrap();
    assert_eq!(records.len(), 1);
    assert!(matches!(records[0].outcome, ExecutionOutcome::Skipped { .. }));
}

#[tokio::test]
async fn test_failure_then_next_slot_succeeds() {
    let store = Arc::new(MemoryStore::new());
    let ledger = Arc::new(PositionLedger::new());

    let failing = ExecutionCoordinator::new(
        store.clone(),
        ledger.clone(),
        Arc::new(UnreachableGateway),
        None,
    );
    assert!(failing.execute(request(1, 50.0)).await.is_err());

    let working = ExecutionCoordinator::new(
        store.clone(),
        ledger.clone(),
        Arc::new(FixedPriceGateway::new(10.0)),
        None,
    );
    let mut retry = request(1, 50.0);
    retry.scheduled_time = retry.scheduled_time + chrono::Duration::days(1);
    working.execute(retry).await.unwrap();

    let records = store.list_executions(1).await.unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records.iter().filter(|r| r.is_fill()).count(), 1);
}
