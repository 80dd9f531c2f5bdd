//! services/api/src/bin/api.rs

use api_lib::{
    adapters::JsonFileSnapshot,
    config::Config,
    error::ApiError,
    telemetry,
    web::{self, AppState},
};
use std::sync::Arc;
use tracing::{info, warn};
use vdr_core::store::SessionStore;

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    telemetry::init(config.log_level)?;
    info!("Configuration loaded. Starting server...");

    // --- 2. Load the Session Snapshot ---
    info!("Loading sessions from {}...", config.snapshot_path.display());
    let snapshot = Arc::new(JsonFileSnapshot::new(config.snapshot_path.clone()));
    let store = SessionStore::open(snapshot).await;
    info!("{} session(s) ready.", store.len());

    // --- 3. Build the Shared AppState and Router ---
    let app_state = Arc::new(AppState::new(store, config.clone()));
    let app = web::app(app_state);

    // --- 4. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped.");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received.");
}
