//! Technical indicator computation engine.
//!
//! Pure functions over ordered candle series. Nothing in here errors on
//! short input; every indicator degrades to `None` below its minimum
//! window.

pub mod composite;
pub mod engine;
pub mod momentum;
pub mod structure;
pub mod trend;
pub mod volatility;
pub mod volume;
