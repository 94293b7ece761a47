use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalDirection {
    Buy,
    Sell,
    Hold,
}

/// A single indicator's contribution to the final vote, kept for audit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndicatorVote {
    pub indicator: String,
    pub direction: SignalDirection,
    pub weight: i32,
}

/// Directional recommendation derived from an indicator snapshot.
/// Immutable once generated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Signal {
    pub asset: String,
    pub direction: SignalDirection,
    /// Normalized 0-100 confidence for the recommendation.
    pub strength: f64,
    pub contributing: Vec<IndicatorVote>,
    pub generated_at: DateTime<Utc>,
    pub valid_until: DateTime<Utc>,
}

impl Signal {
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        now <= self.valid_until
    }
}
