//! Application wiring and HTTP surface.

pub mod context;
pub mod http;

pub use context::AppContext;
