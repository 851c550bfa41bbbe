//! Service-level errors.
//!
//! [`CatalogError`] folds rule violations and storage failures into the three
//! caller-facing kinds (not found, already exists, validation) plus integrity
//! faults and raw storage failures.

use gm_check::{RuleViolation, ViolationKind};
use gm_core::EntityKind;
use gm_storage::StorageError;

/// Errors produced by [`CatalogService`](super::CatalogService) operations.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// No entity of this kind matches the reference.
    #[error("{kind} not found: {key}")]
    NotFound { kind: EntityKind, key: String },

    /// A uniqueness or exclusivity rule rejected the mutation.
    #[error("{message}")]
    AlreadyExists {
        kind: EntityKind,
        key: String,
        message: String,
    },

    /// A type, arity, tree-structure or filter rule rejected the mutation.
    #[error("{message}")]
    Validation {
        kind: EntityKind,
        key: String,
        message: String,
    },

    /// Stored data references a row that does not exist.
    #[error("integrity fault: {0}")]
    Integrity(String),

    #[error(transparent)]
    Storage(StorageError),
}

impl CatalogError {
    pub fn not_found(kind: EntityKind, key: impl ToString) -> Self {
        CatalogError::NotFound {
            kind,
            key: key.to_string(),
        }
    }
}

impl From<RuleViolation> for CatalogError {
    fn from(violation: RuleViolation) -> Self {
        let kind = violation.entity_kind();
        let key = violation.key();
        let message = violation.to_string();
        match violation.kind() {
            ViolationKind::AlreadyExists => CatalogError::AlreadyExists { kind, key, message },
            ViolationKind::Validation => CatalogError::Validation { kind, key, message },
        }
    }
}

impl From<StorageError> for CatalogError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound { kind, key } => CatalogError::NotFound { kind, key },
            StorageError::Duplicate { kind, key } => CatalogError::AlreadyExists {
                message: format!("{} '{}' already exists", kind, key),
                kind,
                key,
            },
            StorageError::IntegrityError { reason } => CatalogError::Integrity(reason),
            other => CatalogError::Storage(other),
        }
    }
}
