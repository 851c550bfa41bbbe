//! API error types with HTTP status code mapping.
//!
//! [`ApiError`] is the unified error type for all API endpoints. It implements
//! `axum::response::IntoResponse` to produce structured JSON error responses
//! with appropriate HTTP status codes.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use gm_core::EntityKind;
use serde::Serialize;

use crate::service::CatalogError;

/// Structured error detail in API responses.
#[derive(Debug, Clone, Serialize)]
pub struct ApiErrorDetail {
    /// Machine-readable error code (e.g., "NOT_FOUND", "CONFLICT").
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// The entity kind and identifying value the error is about, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// The entity an error refers to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorSubject {
    pub kind: EntityKind,
    pub key: String,
}

/// API errors with HTTP status code mapping.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Entity not found (404).
    #[error("not found: {message}")]
    NotFound {
        message: String,
        subject: Option<ErrorSubject>,
    },

    /// Invalid request (400).
    #[error("bad request: {0}")]
    BadRequest(String),

    /// A type, arity, tree or filter rule rejected the request (422).
    #[error("validation failed: {message}")]
    ValidationFailed {
        message: String,
        subject: Option<ErrorSubject>,
    },

    /// Internal server error (500).
    #[error("internal error: {0}")]
    InternalError(String),

    /// A uniqueness or exclusivity rule rejected the request (409).
    #[error("conflict: {message}")]
    Conflict {
        message: String,
        subject: Option<ErrorSubject>,
    },
}

fn detail(code: &str, message: &str, subject: &Option<ErrorSubject>) -> ApiErrorDetail {
    ApiErrorDetail {
        code: code.to_string(),
        message: message.to_string(),
        details: subject.as_ref().and_then(|s| serde_json::to_value(s).ok()),
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match &self {
            ApiError::NotFound { message, subject } => {
                (StatusCode::NOT_FOUND, detail("NOT_FOUND", message, subject))
            }
            ApiError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, detail("BAD_REQUEST", msg, &None))
            }
            ApiError::ValidationFailed { message, subject } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                detail("VALIDATION_FAILED", message, subject),
            ),
            ApiError::InternalError(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                detail("INTERNAL_ERROR", msg, &None),
            ),
            ApiError::Conflict { message, subject } => {
                (StatusCode::CONFLICT, detail("CONFLICT", message, subject))
            }
        };

        let body = serde_json::json!({
            "success": false,
            "error": detail,
        });

        (status, axum::Json(body)).into_response()
    }
}

impl From<CatalogError> for ApiError {
    fn from(err: CatalogError) -> Self {
        let message = err.to_string();
        match err {
            CatalogError::NotFound { kind, key } => ApiError::NotFound {
                message,
                subject: Some(ErrorSubject { kind, key }),
            },
            CatalogError::AlreadyExists { kind, key, .. } => ApiError::Conflict {
                message,
                subject: Some(ErrorSubject { kind, key }),
            },
            CatalogError::Validation { kind, key, .. } => ApiError::ValidationFailed {
                message,
                subject: Some(ErrorSubject { kind, key }),
            },
            CatalogError::Integrity(_) | CatalogError::Storage(_) => {
                tracing::error!("request failed: {}", message);
                ApiError::InternalError(message)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_errors_map_to_status_codes() {
        let cases = [
            (
                CatalogError::not_found(EntityKind::Node, "n1"),
                StatusCode::NOT_FOUND,
            ),
            (
                CatalogError::AlreadyExists {
                    kind: EntityKind::Graph,
                    key: "g".into(),
                    message: "graph 'g' already exists".into(),
                },
                StatusCode::CONFLICT,
            ),
            (
                CatalogError::Validation {
                    kind: EntityKind::FunctionNode,
                    key: "f/n".into(),
                    message: "gene type mismatch".into(),
                },
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                CatalogError::Integrity("dangling".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            let response = ApiError::from(err).into_response();
            assert_eq!(response.status(), status);
        }
    }
}
