//! services/api/src/adapters/snapshot.rs
//!
//! This module contains the snapshot adapter, which is the concrete implementation
//! of the `SnapshotService` port from the `core` crate. The whole session
//! collection lives in one pretty-printed JSON file that is rewritten in full
//! after every mutation.

use async_trait::async_trait;
use serde_json::Value;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::{error, info, warn};
use vdr_core::domain::Session;
use vdr_core::ports::{PortError, PortResult, SnapshotService};
use vdr_core::schema;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A file-backed adapter that implements the `SnapshotService` port.
#[derive(Clone, Debug)]
pub struct JsonFileSnapshot {
    path: PathBuf,
}

impl JsonFileSnapshot {
    /// Creates a new `JsonFileSnapshot`. The file is not touched until first use.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Sibling file the next snapshot is written to before it replaces the old one.
    fn temp_path(&self) -> PortResult<PathBuf> {
        let file_name = self.path.file_name().ok_or_else(|| {
            PortError::Unexpected(format!("{} has no file name", self.path.display()))
        })?;
        let tmp_name = format!(".{}.tmp", file_name.to_string_lossy());
        Ok(self.path.with_file_name(tmp_name))
    }
}

//=========================================================================================
// Snapshot Shapes
//=========================================================================================

/// Reduces whatever the snapshot file holds to a list of candidate documents.
///
/// Two shapes are understood: a list of sessions, and (from older versions)
/// one bare session object. Anything else is treated as no sessions at all.
fn normalize(parsed: Value) -> Vec<Value> {
    match parsed {
        Value::Array(documents) => {
            info!(
                "Loaded {} session document(s) from snapshot (array format).",
                documents.len()
            );
            documents
        }
        Value::Object(ref object) if object.get("data").is_some_and(|d| !d.is_null()) => {
            info!("Loaded 1 session document from snapshot (single object wrapped into array).");
            vec![parsed]
        }
        _ => {
            warn!("Snapshot format not recognized. Starting with an empty store.");
            Vec::new()
        }
    }
}

//=========================================================================================
// `SnapshotService` Trait Implementation
//=========================================================================================

#[async_trait]
impl SnapshotService for JsonFileSnapshot {
    async fn load(&self) -> Vec<Session> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!(
                    "{} not found. Starting with an empty store.",
                    self.path.display()
                );
                return Vec::new();
            }
            Err(e) => {
                error!("Failed to read {}: {}", self.path.display(), e);
                return Vec::new();
            }
        };

        let parsed: Value = match serde_json::from_str(&raw) {
            Ok(parsed) => parsed,
            Err(e) => {
                error!("Failed to parse {}: {}", self.path.display(), e);
                return Vec::new();
            }
        };

        normalize(parsed)
            .into_iter()
            .enumerate()
            .filter_map(|(index, document)| match schema::validate(document) {
                Ok(session) => Some(session),
                Err(e) => {
                    warn!(index, errors = ?e.errors, "Skipping invalid session in snapshot");
                    None
                }
            })
            .collect()
    }

    async fn save(&self, sessions: &[Session]) -> PortResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let json = serde_json::to_vec_pretty(sessions)?;

        let tmp_path = self.temp_path()?;
        let written = match write_synced(&tmp_path, &json).await {
            Ok(()) => tokio::fs::rename(&tmp_path, &self.path).await,
            Err(e) => Err(e),
        };
        if let Err(e) = written {
            let _ = tokio::fs::remove_file(&tmp_path).await;
            return Err(e.into());
        }
        Ok(())
    }

    async fn remove(&self) -> PortResult<()> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Writes `bytes` to a fresh file at `path` and flushes it to disk.
async fn write_synced(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = tokio::fs::File::create(path).await?;
    file.write_all(bytes).await?;
    file.sync_all().await
}
