//! crates/vdr_core/src/ports.rs
//!
//! Defines the service contracts (traits) the core depends on.
//! The session store only ever talks to durable storage through these traits,
//! so it can be exercised in tests without touching the filesystem.

use crate::domain::Session;
use async_trait::async_trait;

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Storage I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("Snapshot could not be encoded: {0}")]
    Encoding(#[from] serde_json::Error),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

/// Durable storage for the complete session collection.
#[async_trait]
pub trait SnapshotService: Send + Sync {
    /// Reads every stored session, in stored order.
    ///
    /// Never fails: an absent or unreadable snapshot is an empty collection.
    async fn load(&self) -> Vec<Session>;

    /// Replaces the snapshot with `sessions`.
    async fn save(&self, sessions: &[Session]) -> PortResult<()>;

    /// Deletes the snapshot. Deleting an absent snapshot succeeds.
    async fn remove(&self) -> PortResult<()>;
}
