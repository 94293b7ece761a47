//! External order gateway client.
//!
//! Custody and transaction signing live behind the gateway service; this
//! client only quotes and submits. Every call carries a bounded timeout,
//! and transient failures are retried per an explicit policy before the
//! coordinator gives up until the next natural tick.

use crate::config;
use crate::errors::{CadenceError, Result};
use async_trait::async_trait;
use backon::{ExponentialBuilder, Retryable};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Quote {
    pub expected_out: f64,
    pub price_impact: f64,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Fill {
    pub actual_out: f64,
    pub actual_price: f64,
}

#[async_trait]
pub trait OrderGateway: Send + Sync {
    async fn quote(&self, asset_in: &str, asset_out: &str, amount: f64) -> Result<Quote>;

    async fn submit_order(
        &self,
        asset_in: &str,
        asset_out: &str,
        amount: f64,
        max_slippage_bps: u16,
    ) -> Result<Fill>;
}

/// Explicit retry policy for gateway calls: bounded attempts with
/// exponential backoff. Kept small so a failing gateway never turns a
/// scheduler tick into a retry storm.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: usize,
    pub min_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            min_delay: Duration::from_millis(200),
            max_delay: Duration::from_secs(2),
        }
    }
}

impl RetryPolicy {
    fn backoff(&self) -> ExponentialBuilder {
        ExponentialBuilder::default()
            .with_min_delay(self.min_delay)
            .with_max_delay(self.max_delay)
            .with_max_times(self.max_attempts.saturating_sub(1))
    }
}

#[derive(Debug, Serialize)]
struct OrderRequestBody<'a> {
    asset_in: &'a str,
    asset_out: &'a str,
    amount: f64,
    max_slippage_bps: u16,
}

/// HTTP gateway client.
pub struct HttpOrderGateway {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
    retry: RetryPolicy,
}

impl HttpOrderGateway {
    pub fn new(base_url: String, timeout: Duration, retry: RetryPolicy) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_default();
        Self {
            client,
            base_url,
            timeout,
            retry,
        }
    }

    pub fn from_env() -> Self {
        Self::new(
            config::get_gateway_url(),
            Duration::from_secs(config::get_gateway_timeout_seconds()),
            RetryPolicy::default(),
        )
    }

    async fn with_timeout<T>(
        &self,
        fut: impl std::future::Future<Output = Result<T>>,
    ) -> Result<T> {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(result) => result,
            Err(_) => Err(CadenceError::GatewayTimeout {
                timeout_secs: self.timeout.as_secs(),
            }),
        }
    }
}

fn map_request_error(e: reqwest::Error) -> CadenceError {
    if e.is_timeout() {
        CadenceError::GatewayTimeout { timeout_secs: 0 }
    } else {
        CadenceError::GatewayRejected {
            reason: e.to_string(),
        }
    }
}

#[async_trait]
impl OrderGateway for HttpOrderGateway {
    async fn quote(&self, asset_in: &str, asset_out: &str, amount: f64) -> Result<Quote> {
        let url = format!(
            "{}/quote?assetIn={}&assetOut={}&amount={}",
            self.base_url, asset_in, asset_out, amount
        );
        let call = || async {
            self.client
                .get(&url)
                .send()
                .await
                .map_err(map_request_error)?
                .error_for_status()
                .map_err(map_request_error)?
                .json::<Quote>()
                .await
                .map_err(map_request_error)
        };

        self.with_timeout(
            call.retry(self.retry.backoff())
                .when(|e: &CadenceError| e.is_transient()),
        )
        .await
    }

    async fn submit_order(
        &self,
        asset_in: &str,
        asset_out: &str,
        amount: f64,
        max_slippage_bps: u16,
    ) -> Result<Fill> {
        let url = format!("{}/orders", self.base_url);
        let body = OrderRequestBody {
            asset_in,
            asset_out,
            amount,
            max_slippage_bps,
        };
        let call = || async {
            self.client
                .post(&url)
                .json(&body)
                .send()
                .await
                .map_err(map_request_error)?
                .error_for_status()
                .map_err(map_request_error)?
                .json::<Fill>()
                .await
                .map_err(map_request_error)
        };

        // Submission is retried only on timeouts: a rejected order is a
        // decision, not a glitch, and re-sending it risks a double fill.
        self.with_timeout(
            call.retry(self.retry.backoff())
                .when(|e: &CadenceError| matches!(e, CadenceError::GatewayTimeout { .. })),
        )
        .await
    }
}
