//! services/api/src/telemetry.rs
//!
//! Installs the global tracing subscriber.

use crate::error::ApiError;
use tracing::Level;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Sets up logging at `level`. Call once, before anything logs.
pub fn init(level: Level) -> Result<(), ApiError> {
    tracing_subscriber::registry()
        .with(EnvFilter::new(level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .try_init()
        .map_err(|e| ApiError::Internal(format!("Failed to install logger: {}", e)))
}
