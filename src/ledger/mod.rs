//! Position ledger: weighted-average cost basis and PnL.
//!
//! Updates for the same (owner, asset) key are serialized behind a per-key
//! lock; independent keys proceed in parallel. Average cost changes only
//! on buys.

use crate::errors::{CadenceError, Result};
use crate::models::position::{FillSide, Position};
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info};

type PositionKey = (String, String);

/// Result of applying a fill.
#[derive(Debug, Clone)]
pub struct FillEffect {
    pub position: Position,
    /// Realized PnL for sells; `None` on buys.
    pub realized_pnl: Option<f64>,
    pub closed: bool,
}

#[derive(Default)]
pub struct PositionLedger {
    positions: RwLock<HashMap<PositionKey, Arc<Mutex<Position>>>>,
    archived: RwLock<Vec<Position>>,
}

impl PositionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    async fn entry(&self, owner: &str, asset: &str) -> Arc<Mutex<Position>> {
        let key = (owner.to_string(), asset.to_string());
        {
            let positions = self.positions.read().await;
            if let Some(entry) = positions.get(&key) {
                return entry.clone();
            }
        }
        let mut positions = self.positions.write().await;
        positions
            .entry(key)
            .or_insert_with(|| {
                Arc::new(Mutex::new(Position::open(
                    owner.to_string(),
                    asset.to_string(),
                )))
            })
            .clone()
    }

    /// Apply a fill to the (owner, asset) position. Buys move the
    /// weighted-average cost; sells realize PnL proportionally and close
    /// the position when the full quantity is sold.
    pub async fn apply_fill(
        &self,
        owner: &str,
        asset: &str,
        side: FillSide,
        quantity: f64,
        price: f64,
    ) -> Result<FillEffect> {
        if quantity <= 0.0 {
            return Err(CadenceError::Validation(
                "fill quantity must be positive".to_string(),
            ));
        }
        if price <= 0.0 {
            return Err(CadenceError::Validation(
                "fill price must be positive".to_string(),
            ));
        }

        let entry = self.entry(owner, asset).await;
        let mut position = entry.lock().await;

        match side {
            FillSide::Buy => {
                let old_quantity = position.quantity;
                let old_cost = position.average_cost.unwrap_or(0.0);
                let new_quantity = old_quantity + quantity;
                let new_average =
                    (old_quantity * old_cost + quantity * price) / new_quantity;

                position.quantity = new_quantity;
                position.average_cost = Some(new_average);
                position.refresh_market_value(price);

                debug!(
                    owner = %owner,
                    asset = %asset,
                    quantity = new_quantity,
                    average_cost = new_average,
                    "ledger: buy applied"
                );

                Ok(FillEffect {
                    position: position.clone(),
                    realized_pnl: None,
                    closed: false,
                })
            }
            FillSide::Sell => {
                if !position.is_open() {
                    return Err(CadenceError::Validation(format!(
                        "no open position for {}/{}",
                        owner, asset
                    )));
                }
                let average_cost = position.average_cost.unwrap_or(0.0);
                let old_quantity = position.quantity;

                if quantity >= old_quantity {
                    // Full close: realize over the whole position.
                    let realized = (price - average_cost) * old_quantity;
                    position.quantity = 0.0;
                    position.average_cost = None;
                    position.refresh_market_value(price);
                    position.updated_at = Utc::now();
                    let snapshot = position.clone();
                    drop(position);

                    self.archive(owner, asset, snapshot.clone()).await;
                    info!(
                        owner = %owner,
                        asset = %asset,
                        realized_pnl = realized,
                        "ledger: position closed"
                    );

                    Ok(FillEffect {
                        position: snapshot,
                        realized_pnl: Some(realized),
                        closed: true,
                    })
                } else {
                    // Partial sell: realize on the sold portion only,
                    // average cost unchanged.
                    let realized = (price - average_cost) * quantity;
                    position.quantity = old_quantity - quantity;
                    position.refresh_market_value(price);

                    Ok(FillEffect {
                        position: position.clone(),
                        realized_pnl: Some(realized),
                        closed: false,
                    })
                }
            }
        }
    }

    async fn archive(&self, owner: &str, asset: &str, snapshot: Position) {
        let key = (owner.to_string(), asset.to_string());
        self.positions.write().await.remove(&key);
        self.archived.write().await.push(snapshot);
    }

    /// Refresh market value and unrealized PnL for every open position in
    /// `asset`. Quantity and average cost are untouched.
    pub async fn mark_to_market(&self, asset: &str, price: f64) -> Result<()> {
        let entries: Vec<Arc<Mutex<Position>>> = {
            let positions = self.positions.read().await;
            positions
                .iter()
                .filter(|((_, a), _)| a == asset)
                .map(|(_, entry)| entry.clone())
                .collect()
        };
        for entry in entries {
            let mut position = entry.lock().await;
            position.refresh_market_value(price);
        }
        Ok(())
    }

    pub async fn get_position(&self, owner: &str, asset: &str) -> Option<Position> {
        let key = (owner.to_string(), asset.to_string());
        let entry = {
            let positions = self.positions.read().await;
            positions.get(&key).cloned()
        }?;
        let position = entry.lock().await;
        Some(position.clone())
    }

    /// Current market value of the (owner, asset) position, zero if none.
    pub async fn market_value(&self, owner: &str, asset: &str) -> f64 {
        self.get_position(owner, asset)
            .await
            .map(|p| p.market_value)
            .unwrap_or(0.0)
    }

    pub async fn open_positions(&self) -> usize {
        self.positions.read().await.len()
    }

    pub async fn archived_positions(&self) -> Vec<Position> {
        self.archived.read().await.clone()
    }
}
