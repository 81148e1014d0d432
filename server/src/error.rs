//! API Error Types
//!
//! One error type for every content, community and admin route. Visibility
//! failures and absent rows share `NotFound` so hidden content is never
//! distinguishable from missing content.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::json;
use validator::ValidationErrors;

use crate::auth::AuthError;
use crate::permissions::{Capability, RoleAssignmentError};

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Entity absent, or present but not visible to the viewer.
    #[error("{0} not found")]
    NotFound(&'static str),

    /// Mutating route reached without an authenticated viewer.
    #[error("Authentication required")]
    Unauthenticated,

    /// Viewer lacks the capability a mutating route requires.
    #[error("Permission required: {}", .0.description())]
    Forbidden(Capability),

    #[error("Role change not permitted: {0}")]
    RoleAssignment(#[from] RoleAssignmentError),

    #[error("Validation failed")]
    Validation(#[from] ValidationErrors),

    /// Single-message validation failure outside a `Validate` derive.
    #[error("{0}")]
    InvalidInput(String),

    #[error("{0}")]
    Conflict(String),

    /// Programming error; never a user-facing condition.
    #[error("Invariant violated: {0}")]
    Invariant(String),

    /// Account errors raised on admin paths (hashing, duplicate email).
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// Result alias for handlers and queries that surface [`ApiError`].
pub type ApiResult<T> = Result<T, ApiError>;

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let Self::Auth(err) = self {
            return err.into_response();
        }

        let (status, code) = match &self {
            Self::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            Self::Unauthenticated => (StatusCode::UNAUTHORIZED, "UNAUTHENTICATED"),
            Self::Forbidden(_) | Self::RoleAssignment(_) => (StatusCode::FORBIDDEN, "FORBIDDEN"),
            Self::Validation(_) | Self::InvalidInput(_) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_FAILED")
            }
            Self::Conflict(_) => (StatusCode::CONFLICT, "CONFLICT"),
            Self::Invariant(_) | Self::Database(_) | Self::Auth(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
            }
        };

        let body = match &self {
            Self::Validation(errors) => json!({
                "error": code,
                "message": self.to_string(),
                "fields": field_messages(errors),
            }),
            Self::Invariant(detail) => {
                tracing::error!(detail = %detail, "Invariant violation reached the API boundary");
                json!({ "error": code, "message": "Internal server error" })
            }
            Self::Database(e) => {
                tracing::error!(error = %e, "Database error");
                json!({ "error": code, "message": "Internal server error" })
            }
            _ => json!({ "error": code, "message": self.to_string() }),
        };

        (status, Json(body)).into_response()
    }
}

/// Flatten `validator` errors into `{ field: [messages] }`.
fn field_messages(errors: &ValidationErrors) -> serde_json::Map<String, serde_json::Value> {
    errors
        .field_errors()
        .into_iter()
        .map(|(field, errs)| {
            let messages: Vec<String> = errs
                .iter()
                .map(|e| {
                    e.message
                        .as_ref()
                        .map_or_else(|| format!("Invalid value ({})", e.code), ToString::to_string)
                })
                .collect();
            (field.to_string(), json!(messages))
        })
        .collect()
}

/// Map a unique-constraint violation to `Conflict`, leaving other errors as-is.
pub fn conflict_on_unique(err: sqlx::Error, message: &str) -> ApiError {
    if let sqlx::Error::Database(ref db_err) = err {
        if db_err.is_unique_violation() {
            return ApiError::Conflict(message.to_string());
        }
    }
    ApiError::Database(err)
}

/// Map a foreign-key violation to `InvalidInput`, leaving other errors as-is.
pub fn invalid_reference(err: sqlx::Error, message: &str) -> ApiError {
    if let sqlx::Error::Database(ref db_err) = err {
        if db_err.is_foreign_key_violation() {
            return ApiError::InvalidInput(message.to_string());
        }
    }
    ApiError::Database(err)
}

/// Successful mutation: a status message plus the affected entity.
#[derive(Debug, Serialize)]
pub struct Ack<T> {
    pub message: &'static str,
    pub data: T,
}

impl<T: Serialize> Ack<T> {
    pub const fn new(message: &'static str, data: T) -> Self {
        Self { message, data }
    }
}

impl<T: Serialize> IntoResponse for Ack<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}
