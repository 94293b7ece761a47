//! HTTP endpoint server using Axum

use axum::{
    extract::{Path, Request, State},
    http::StatusCode,
    middleware::Next,
    response::{Json, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Instant;
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{error, info, Level};

use crate::core::context::AppContext;
use crate::errors::CadenceError;
use crate::models::execution::ExecutionStats;
use crate::models::strategy::{
    AdvancedConfig, FrequencyModel, StrategyConditions, StrategyDefinition, StrategyLimits,
    StrategyRuntime,
};

#[derive(Clone)]
pub struct AppState {
    pub context: Arc<AppContext>,
    pub start_time: Arc<Instant>,
}

fn status_for(error: &CadenceError) -> StatusCode {
    match error {
        CadenceError::NotFound(_) => StatusCode::NOT_FOUND,
        CadenceError::Validation(_) | CadenceError::Schedule(_) => StatusCode::BAD_REQUEST,
        CadenceError::ConcurrencyConflict { .. } | CadenceError::DuplicateExecution { .. } => {
            StatusCode::CONFLICT
        }
        CadenceError::GatewayTimeout { .. }
        | CadenceError::GatewayRejected { .. }
        | CadenceError::MarketData(_) => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn reject(error: CadenceError) -> (StatusCode, Json<Value>) {
    (status_for(&error), Json(json!({ "error": error.owner_message() })))
}

pub async fn health_check(State(state): State<AppState>) -> Json<Value> {
    let uptime_seconds = state.start_time.elapsed().as_secs();
    Json(json!({
        "status": "healthy",
        "uptime_seconds": uptime_seconds,
        "service": "cadence-engine"
    }))
}

pub async fn metrics_handler(State(state): State<AppState>) -> Result<String, StatusCode> {
    state
        .context
        .metrics
        .export()
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
}

/// Middleware to track HTTP request metrics
async fn metrics_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    let metrics = &state.context.metrics;
    metrics.http_requests_in_flight.inc();

    let response = next.run(request).await;
    let status = response.status();
    let duration = start.elapsed();

    metrics.http_requests_in_flight.dec();
    metrics.http_requests_total.inc();
    metrics
        .http_request_duration_seconds
        .observe(duration.as_secs_f64());

    if status.is_server_error() {
        error!(
            method = %method,
            path = %path,
            status = %status,
            duration_ms = duration.as_millis(),
            "HTTP request error"
        );
    }

    response
}

#[derive(Debug, Deserialize)]
struct CreateStrategyRequest {
    owner: String,
    asset_in: String,
    asset_out: String,
    per_execution_amount: f64,
    frequency: FrequencyModel,
    #[serde(default)]
    conditions: StrategyConditions,
    #[serde(default)]
    limits: StrategyLimits,
    #[serde(default)]
    advanced: AdvancedConfig,
    #[serde(default = "default_max_slippage_bps")]
    max_slippage_bps: u16,
}

fn default_max_slippage_bps() -> u16 {
    100
}

#[derive(Debug, Serialize)]
struct StrategyResponse {
    id: i64,
    owner: String,
    asset_in: String,
    asset_out: String,
    per_execution_amount: f64,
    frequency: FrequencyModel,
    conditions: StrategyConditions,
    limits: StrategyLimits,
    advanced: AdvancedConfig,
    max_slippage_bps: u16,
    created_at: chrono::DateTime<chrono::Utc>,
    runtime: StrategyRuntime,
}

impl From<StrategyDefinition> for StrategyResponse {
    fn from(strategy: StrategyDefinition) -> Self {
        Self {
            id: strategy.id.unwrap_or(0),
            owner: strategy.owner,
            asset_in: strategy.asset_in,
            asset_out: strategy.asset_out,
            per_execution_amount: strategy.per_execution_amount,
            frequency: strategy.frequency,
            conditions: strategy.conditions,
            limits: strategy.limits,
            advanced: strategy.advanced,
            max_slippage_bps: strategy.max_slippage_bps,
            created_at: strategy.created_at,
            runtime: strategy.runtime,
        }
    }
}

#[derive(Debug, Serialize)]
struct StrategyStatusResponse {
    #[serde(flatten)]
    strategy: StrategyResponse,
    stats: ExecutionStats,
}

/// Create a new strategy
async fn create_strategy(
    State(state): State<AppState>,
    Json(request): Json<CreateStrategyRequest>,
) -> Result<(StatusCode, Json<StrategyResponse>), (StatusCode, Json<Value>)> {
    let now = chrono::Utc::now();
    let definition = StrategyDefinition {
        id: None,
        owner: request.owner,
        asset_in: request.asset_in,
        asset_out: request.asset_out,
        per_execution_amount: request.per_execution_amount,
        frequency: request.frequency,
        conditions: request.conditions,
        limits: request.limits,
        advanced: request.advanced,
        max_slippage_bps: request.max_slippage_bps,
        created_at: now,
        // Placeholder; the scheduler initializes the real runtime block.
        runtime: StrategyRuntime::starting_at(now),
    };

    let id = state
        .context
        .scheduler
        .create_strategy(definition)
        .await
        .map_err(reject)?;

    let created = state.context.store.get_strategy(id).await.map_err(|e| {
        error!(error = %e, strategy_id = id, "Failed to load created strategy");
        reject(e)
    })?;

    Ok((StatusCode::CREATED, Json(created.into())))
}

/// Get a strategy by ID, joined with its execution statistics
async fn get_strategy(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<StrategyStatusResponse>, (StatusCode, Json<Value>)> {
    let (strategy, stats) = state.context.get_strategy_status(id).await.map_err(|e| {
        error!(error = %e, strategy_id = id, "Failed to load strategy");
        reject(e)
    })?;

    Ok(Json(StrategyStatusResponse {
        strategy: strategy.into(),
        stats,
    }))
}

/// Pause an active strategy
async fn pause_strategy(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<StrategyResponse>, (StatusCode, Json<Value>)> {
    state
        .context
        .scheduler
        .pause_strategy(id)
        .await
        .map_err(reject)?;
    let strategy = state.context.store.get_strategy(id).await.map_err(reject)?;
    Ok(Json(strategy.into()))
}

/// Resume a paused strategy
async fn resume_strategy(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<StrategyResponse>, (StatusCode, Json<Value>)> {
    state
        .context
        .scheduler
        .resume_strategy(id)
        .await
        .map_err(reject)?;
    let strategy = state.context.store.get_strategy(id).await.map_err(reject)?;
    Ok(Json(strategy.into()))
}

/// List execution records for a strategy
async fn list_strategy_executions(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    // 404 for unknown ids instead of an empty list.
    state.context.store.get_strategy(id).await.map_err(reject)?;
    let records = state.context.list_executions(id).await.map_err(reject)?;
    Ok(Json(json!(records)))
}

/// Current signal for an asset, computed on demand and cached
async fn get_signal(
    State(state): State<AppState>,
    Path(asset): Path<String>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let signal = state.context.get_signal(&asset).await.map_err(|e| {
        error!(error = %e, asset = %asset, "Failed to compute signal");
        reject(e)
    })?;
    Ok(Json(json!(signal)))
}

/// Latest cached indicator snapshot for an asset
async fn get_indicators(
    State(state): State<AppState>,
    Path(asset): Path<String>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let snapshot = state
        .context
        .get_indicators(&asset)
        .await
        .map_err(reject)?
        .ok_or_else(|| reject(CadenceError::NotFound(format!("no snapshot for {}", asset))))?;
    Ok(Json(json!(snapshot)))
}

/// Open position for (owner, asset)
async fn get_position(
    State(state): State<AppState>,
    Path((owner, asset)): Path<(String, String)>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let position = state
        .context
        .get_position(&owner, &asset)
        .await
        .ok_or_else(|| {
            reject(CadenceError::NotFound(format!(
                "no open position for {}/{}",
                owner, asset
            )))
        })?;
    Ok(Json(json!(position)))
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/metrics", get(metrics_handler))
        .route("/api/strategies", post(create_strategy))
        .route("/api/strategies/{id}", get(get_strategy))
        .route("/api/strategies/{id}/pause", post(pause_strategy))
        .route("/api/strategies/{id}/resume", post(resume_strategy))
        .route("/api/strategies/{id}/executions", get(list_strategy_executions))
        .route("/api/signals/{asset}", get(get_signal))
        .route("/api/indicators/{asset}", get(get_indicators))
        .route("/api/positions/{owner}/{asset}", get(get_position))
        .layer(
            ServiceBuilder::new()
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(DefaultMakeSpan::new().level(Level::DEBUG))
                        .on_request(DefaultOnRequest::new().level(Level::DEBUG))
                        .on_response(DefaultOnResponse::new().level(Level::DEBUG)),
                )
                .layer(axum::middleware::from_fn_with_state(
                    state.clone(),
                    metrics_middleware,
                ))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

pub async fn start_server(
    context: Arc<AppContext>,
    port: u16,
) -> Result<(), Box<dyn std::error::Error>> {
    let state = AppState {
        context,
        start_time: Arc::new(Instant::now()),
    };
    let app = create_router(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;

    info!(port = port, "HTTP server listening on port {}", port);
    info!(
        "Metrics endpoint available at http://0.0.0.0:{}/metrics",
        port
    );
    axum::serve(listener, app).await?;

    Ok(())
}
