//! CatalogService: the single coordinator between callers (HTTP handlers,
//! the CLI, seeding) and the rules/storage crates.
//!
//! Every public operation runs inside one [`CatalogStore::atomically`] unit:
//! references are resolved, rules are checked, and only then are rows
//! written. Any error rolls the whole unit back.
//!
//! The operations are split by concern:
//!
//! - [`entities`]: create/read/list/delete of the named entities and the rows
//!   programs and functions own
//! - [`associations`]: function-node, node-graph and program-graph links
//! - [`compose`]: nested read views
//! - [`cascade`]: dependents-first deletion
//! - [`seed`]: declarative snapshots applied at start

pub mod associations;
pub mod cascade;
pub mod compose;
pub mod entities;
pub mod error;
pub mod seed;

use std::fmt;

use gm_storage::{CatalogStore, InMemoryStore, SqliteStore, StorageError};

pub use entities::{FunctionQuery, GraphQuery, NodeQuery, ProgramQuery};
pub use error::CatalogError;
pub use seed::{SeedReport, Snapshot};

/// The catalog service over a storage backend.
pub struct CatalogService<S: CatalogStore> {
    store: S,
}

impl<S: CatalogStore> CatalogService<S> {
    /// Wraps an already opened store.
    pub fn new(store: S) -> Self {
        CatalogService { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Runs `op` against the store as one all-or-nothing unit.
    fn unit<T>(
        &mut self,
        op: impl FnOnce(&mut S) -> Result<T, CatalogError>,
    ) -> Result<T, CatalogError> {
        self.store.atomically(op)
    }
}

impl CatalogService<SqliteStore> {
    /// Opens (or creates) the SQLite catalog at `db_path`.
    pub fn open(db_path: &str) -> Result<Self, CatalogError> {
        Ok(CatalogService::new(SqliteStore::new(db_path)?))
    }

    /// Opens a private in-memory SQLite catalog.
    pub fn sqlite_in_memory() -> Result<Self, CatalogError> {
        Ok(CatalogService::new(SqliteStore::in_memory()?))
    }
}

impl CatalogService<InMemoryStore> {
    /// A service over the map-backed store.
    pub fn in_memory() -> Self {
        CatalogService::new(InMemoryStore::new())
    }
}

/// Maps a lookup failure on a row another row points at: the row is expected
/// to exist, so its absence is an integrity fault.
pub(crate) fn dangling(context: impl fmt::Display) -> impl FnOnce(StorageError) -> CatalogError {
    move |err| match err {
        StorageError::NotFound { kind, key } => {
            tracing::error!("dangling reference: {} points at missing {} {}", context, kind, key);
            CatalogError::Integrity(format!("{} references missing {} {}", context, kind, key))
        }
        other => other.into(),
    }
}
