//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use crate::config::Config;
use std::sync::Arc;
use tokio::sync::Mutex;
use vdr_core::store::SessionStore;

//=========================================================================================
// AppState (Shared Across All Requests)
//=========================================================================================

/// The shared application state, created once at startup and passed to all handlers.
///
/// The store sits behind one async lock: a request holds it for the whole
/// operation, including the snapshot write, so operations never interleave.
pub struct AppState {
    pub store: Mutex<SessionStore>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(store: SessionStore, config: Arc<Config>) -> Self {
        Self {
            store: Mutex::new(store),
            config,
        }
    }
}
