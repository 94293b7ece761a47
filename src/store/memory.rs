//! In-memory store implementation.

use crate::errors::{CadenceError, Result};
use crate::models::execution::ExecutionRecord;
use crate::models::indicators::IndicatorSet;
use crate::models::signal::Signal;
use crate::models::strategy::{StrategyDefinition, StrategyStatus};
use crate::store::Store;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicI64, Ordering};
use tokio::sync::RwLock;

#[derive(Default)]
pub struct MemoryStore {
    next_id: AtomicI64,
    strategies: RwLock<HashMap<i64, StrategyDefinition>>,
    executions: RwLock<HashMap<i64, Vec<ExecutionRecord>>>,
    execution_keys: RwLock<HashSet<(i64, DateTime<Utc>)>>,
    indicator_cache: RwLock<HashMap<String, IndicatorSet>>,
    signal_cache: RwLock<HashMap<String, Signal>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            next_id: AtomicI64::new(1),
            ..Default::default()
        }
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn insert_strategy(&self, mut definition: StrategyDefinition) -> Result<i64> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        definition.id = Some(id);
        self.strategies.write().await.insert(id, definition);
        Ok(id)
    }

    async fn get_strategy(&self, id: i64) -> Result<StrategyDefinition> {
        self.strategies
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| CadenceError::NotFound(format!("strategy {}", id)))
    }

    async fn update_strategy(&self, definition: &StrategyDefinition) -> Result<()> {
        let id = definition
            .id
            .ok_or_else(|| CadenceError::Store("cannot update unsaved strategy".to_string()))?;
        let mut strategies = self.strategies.write().await;
        if !strategies.contains_key(&id) {
            return Err(CadenceError::NotFound(format!("strategy {}", id)));
        }
        strategies.insert(id, definition.clone());
        Ok(())
    }

    async fn list_due(&self, now: DateTime<Utc>) -> Result<Vec<StrategyDefinition>> {
        Ok(self
            .strategies
            .read()
            .await
            .values()
            .filter(|s| s.is_due(now))
            .cloned()
            .collect())
    }

    async fn count_active(&self) -> Result<usize> {
        Ok(self
            .strategies
            .read()
            .await
            .values()
            .filter(|s| s.runtime.status == StrategyStatus::Active)
            .count())
    }

    async fn insert_execution(&self, record: ExecutionRecord) -> Result<()> {
        let key = (record.strategy_id, record.scheduled_time);
        let mut keys = self.execution_keys.write().await;
        if !keys.insert(key) {
            return Err(CadenceError::DuplicateExecution {
                strategy_id: record.strategy_id,
                scheduled_time: record.scheduled_time,
            });
        }
        self.executions
            .write()
            .await
            .entry(record.strategy_id)
            .or_default()
            .push(record);
        Ok(())
    }

    async fn list_executions(&self, strategy_id: i64) -> Result<Vec<ExecutionRecord>> {
        Ok(self
            .executions
            .read()
            .await
            .get(&strategy_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn put_indicators(&self, set: IndicatorSet) -> Result<()> {
        self.indicator_cache
            .write()
            .await
            .insert(set.asset.clone(), set);
        Ok(())
    }

    async fn get_indicators(&self, asset: &str) -> Result<Option<IndicatorSet>> {
        Ok(self.indicator_cache.read().await.get(asset).cloned())
    }

    async fn put_signal(&self, signal: Signal) -> Result<()> {
        self.signal_cache
            .write()
            .await
            .insert(signal.asset.clone(), signal);
        Ok(())
    }

    async fn get_signal(&self, asset: &str) -> Result<Option<Signal>> {
        Ok(self.signal_cache.read().await.get(asset).cloned())
    }
}
