pub mod candle;
pub mod execution;
pub mod indicators;
pub mod position;
pub mod signal;
pub mod strategy;
