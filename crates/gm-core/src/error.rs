//! Core error types for gm-core.

use thiserror::Error;

/// Errors produced while interpreting raw values as core vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// A node type spelling that is not one of the known node kinds.
    #[error("unknown node type: '{value}'")]
    UnknownNodeType { value: String },

    /// A function type spelling that is not one of the known roles.
    #[error("unknown function type: '{value}'")]
    UnknownFunctionType { value: String },
}
