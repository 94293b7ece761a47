//! Strategy scheduling: frequency models, due-check conditions, and the
//! polling tick loop.

pub mod conditions;
pub mod engine;
pub mod frequency;

pub use engine::StrategyScheduler;
pub use frequency::{SpacingPolicy, VolatilityAdaptiveSpacing};
