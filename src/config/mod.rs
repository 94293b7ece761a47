//! Environment-based configuration helpers.
//!
//! All runtime knobs are read from the environment so the worker and the
//! API server can be configured per deployment without a config file.

use std::env;

/// Current deployment environment (`production`, `sandbox`, ...).
pub fn get_environment() -> String {
    env::var("ENVIRONMENT").unwrap_or_else(|_| "sandbox".to_string())
}

/// Base URL of the external order gateway.
pub fn get_gateway_url() -> String {
    env::var("GATEWAY_URL").unwrap_or_else(|_| "http://localhost:9300".to_string())
}

/// Base URL of the price feed service.
pub fn get_price_feed_url() -> String {
    env::var("PRICE_FEED_URL").unwrap_or_else(|_| "http://localhost:9301".to_string())
}

/// Scheduler polling interval in seconds.
pub fn get_tick_interval_seconds() -> u64 {
    env::var("TICK_INTERVAL_SECONDS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(30)
}

/// Bounded timeout applied to every outbound gateway call, in seconds.
pub fn get_gateway_timeout_seconds() -> u64 {
    env::var("GATEWAY_TIMEOUT_SECONDS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(10)
}

/// How long a generated signal stays valid, in minutes.
pub fn get_signal_horizon_minutes() -> i64 {
    env::var("SIGNAL_HORIZON_MINUTES")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(60)
}

/// Candle interval used when evaluating signals (e.g. "1h").
pub fn get_evaluation_interval() -> String {
    env::var("EVALUATION_INTERVAL").unwrap_or_else(|_| "1h".to_string())
}

/// HTTP port for the API server.
pub fn get_api_port() -> u16 {
    env::var("API_PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(8080)
}
