//! Cadence API Server
//!
//! Serves the strategy, signal and position endpoints. The scheduler loop
//! runs in the worker binary; this process only reads and mutates strategy
//! lifecycle state on request.

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
    let env = cadence::config::get_environment();
    println!("Starting Cadence API Server");
    println!("  Environment: {}", env);
    println!("  HTTP Server: http://0.0.0.0:{}", port);

    let metrics = Arc::new(Metrics::new()?);
    let context = AppContext::new(
        Arc::new(MemoryStore::new()),
        Arc::new(HttpMarketDataProvider::from_env()),
        Arc::new(HttpOrderGateway::from_env()),
        metrics,
    );

    let server_handle = tokio::spawn(async move {
        if let Err(e) = start_server(context, port).await {
            eprintln!("HTTP server error: {}", e);
        }
    });

    tokio::select! {
        _ = signal::ctrl_c() => {
            println!("\nShutting down...");
        }
        _ = server_handle => {
            eprintln!("HTTP server stopped");
        }
    }

    Ok(())
}
