//! Application state with a shared `CatalogService` for concurrent access.
//!
//! [`AppState`] wraps the service in `Arc<tokio::sync::Mutex<>>` for use with
//! axum handlers. `tokio::sync::Mutex` lets handlers await the lock without
//! blocking the runtime; `rusqlite::Connection` is `!Sync`, so a `RwLock`
//! is not an option.

use std::sync::Arc;

use gm_storage::SqliteStore;

use crate::error::ApiError;
use crate::service::CatalogService;

/// Shared application state for the HTTP server.
#[derive(Clone)]
pub struct AppState {
    /// The catalog service. One request at a time holds it.
    pub service: Arc<tokio::sync::Mutex<CatalogService<SqliteStore>>>,
}

impl AppState {
    /// Creates a new `AppState` backed by the SQLite catalog at `db_path`.
    pub fn new(db_path: &str) -> Result<Self, ApiError> {
        Ok(Self::from_service(CatalogService::open(db_path)?))
    }

    /// Creates a new `AppState` with an in-memory database (for testing).
    pub fn in_memory() -> Result<Self, ApiError> {
        Ok(Self::from_service(CatalogService::sqlite_in_memory()?))
    }

    pub fn from_service(service: CatalogService<SqliteStore>) -> Self {
        AppState {
            service: Arc::new(tokio::sync::Mutex::new(service)),
        }
    }
}
