//! Order execution: gateway client and the execution coordinator.

pub mod coordinator;
pub mod gateway;

pub use coordinator::{ExecutionCoordinator, ExecutionRequest};
pub use gateway::{Fill, HttpOrderGateway, OrderGateway, Quote, RetryPolicy};
