//! Cadence: automated recurring-purchase (DCA) engine with
//! indicator-derived trading signals.
//!
//! Candles flow through the indicator engine into the signal synthesizer;
//! independently, the strategy scheduler drives due strategies through the
//! execution coordinator, and fills land in the position ledger.

pub mod common;
pub mod config;
pub mod core;
pub mod errors;
pub mod execution;
pub mod indicators;
pub mod ledger;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod scheduler;
pub mod services;
pub mod signals;
pub mod store;
