use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FillSide {
    Buy,
    Sell,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct UnrealizedPnl {
    pub amount: f64,
    pub pct: f64,
}

/// Per-owner, per-asset holding with weighted-average cost basis.
/// Cost basis changes only on buys; price refreshes touch market value
/// and unrealized PnL only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Position {
    pub owner: String,
    pub asset: String,
    pub quantity: f64,
    /// Defined only while quantity > 0.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_cost: Option<f64>,
    pub last_price: f64,
    pub market_value: f64,
    pub unrealized_pnl: UnrealizedPnl,
    pub updated_at: DateTime<Utc>,
}

impl Position {
    pub fn open(owner: String, asset: String) -> Self {
        Self {
            owner,
            asset,
            quantity: 0.0,
            average_cost: None,
            last_price: 0.0,
            market_value: 0.0,
            unrealized_pnl: UnrealizedPnl::default(),
            updated_at: Utc::now(),
        }
    }

    pub fn is_open(&self) -> bool {
        self.quantity > 0.0
    }

    /// Recompute market value and unrealized PnL at `price`. Quantity and
    /// average cost are never touched here.
    pub fn refresh_market_value(&mut self, price: f64) {
        self.last_price = price;
        self.market_value = self.quantity * price;
        match self.average_cost {
            Some(avg) if self.quantity > 0.0 => {
                let cost = self.quantity * avg;
                let amount = self.market_value - cost;
                let pct = if cost > 0.0 { amount / cost * 100.0 } else { 0.0 };
                self.unrealized_pnl = UnrealizedPnl { amount, pct };
            }
            _ => self.unrealized_pnl = UnrealizedPnl::default(),
        }
        self.updated_at = Utc::now();
    }
}
