//! Cadence Scheduler Worker
//!
//! Runs the strategy scheduler tick loop alongside the HTTP API so a
//! single-process deployment gets both. Due strategies are evaluated every
//! TICK_INTERVAL_SECONDS.

use cadence::core::context::AppContext;
use cadence::core::http::start_server;
use cadence::execution::HttpOrderGateway;
use cadence::logging::init_logging;
use cadence::metrics::Metrics;
use cadence::services::market_data::HttpMarketDataProvider;
use cadence::store::MemoryStore;
use std::sync::Arc;
use tokio::signal;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    init_logging();

    let port = cadence::config::get_api_port();
    let tick_interval = cadence::config::get_tick_interval_seconds();
    let env = cadence::config::get_environment();
    println!("Starting Cadence Scheduler Worker");
    println!("  Environment: {}", env);
    println!("  HTTP Server: http://0.0.0.0:{}", port);
    println!("  Scheduler Tick: every {} seconds", tick_interval);

    let metrics = Arc::new(Metrics::new()?);
    let context = AppContext::new(
        Arc::new(MemoryStore::new()),
        Arc::new(HttpMarketDataProvider::from_env()),
        Arc::new(HttpOrderGateway::from_env()),
        metrics,
    );

    context.scheduler.clone().start().await;

    let scheduler = context.scheduler.clone();
    let server_handle = tokio::spawn(async move {
        if let Err(e) = start_server(context, port).await {
            eprintln!("HTTP server error: {}", e);
        }
    });

    tokio::select! {
        _ = signal::ctrl_c() => {
            println!("\nShutting down...");
            scheduler.stop().await;
        }
        _ = server_handle => {
            eprintln!("HTTP server stopped");
        }
    }

    Ok(())
}
