//! Storage error types for gm-storage.
//!
//! [`StorageError`] covers all anticipated failure modes in the storage layer:
//! missing rows, uniqueness and foreign-key violations reported by the
//! backend, and engine failures.

use gm_core::EntityKind;
use thiserror::Error;

/// Errors produced by storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// SQLite engine failure.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Applying schema migrations failed.
    #[error("migration error: {0}")]
    Migration(String),

    /// No row of this kind matches the key.
    #[error("{kind} not found: {key}")]
    NotFound { kind: EntityKind, key: String },

    /// A uniqueness constraint rejected the row.
    #[error("{kind} already exists: {key}")]
    Duplicate { kind: EntityKind, key: String },

    /// A referential constraint was violated, or stored data is inconsistent.
    #[error("integrity error: {reason}")]
    IntegrityError { reason: String },

    /// Undoing a failed atomic unit failed as well.
    #[error("rollback failed after '{original}': {source}")]
    RollbackFailed {
        original: String,
        source: rusqlite::Error,
    },
}

impl StorageError {
    pub fn not_found(kind: EntityKind, key: impl ToString) -> Self {
        StorageError::NotFound {
            kind,
            key: key.to_string(),
        }
    }

    pub fn duplicate(kind: EntityKind, key: impl ToString) -> Self {
        StorageError::Duplicate {
            kind,
            key: key.to_string(),
        }
    }

    pub fn integrity(reason: impl Into<String>) -> Self {
        StorageError::IntegrityError {
            reason: reason.into(),
        }
    }
}
