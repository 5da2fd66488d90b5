use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use lattice_core::error::CoreError;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and adds HTTP-specific variants.
/// Implements [`IntoResponse`] to produce consistent JSON error responses.
///
/// The query gateway does not go through this type: it answers every branch
/// with a response envelope (see `handlers::query`). This error shape
/// serves the management surface.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// A domain-level error from `lattice_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A database error from sqlx.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Credential verification failed at the auth boundary.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Convenience type alias for handler return values.
pub type ApiResult<T> = Result<T, ApiError>;

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            // --- CoreError variants ---
            ApiError::Core(core) => match core {
                CoreError::MissingToken | CoreError::InvalidToken | CoreError::TokenNotActive => {
                    (StatusCode::BAD_REQUEST, "AUTH_ERROR", core.to_string())
                }
                CoreError::MissingQuery | CoreError::InvalidDatabaseName(_) => {
                    (StatusCode::BAD_REQUEST, "REQUEST_ERROR", core.to_string())
                }
                CoreError::InvalidActivationCode => {
                    (StatusCode::BAD_REQUEST, "INVALID_ACTIVATION_CODE", core.to_string())
                }
                CoreError::NotFound { .. } => {
                    (StatusCode::NOT_FOUND, "NOT_FOUND", core.to_string())
                }
                CoreError::Conflict(_) => (StatusCode::CONFLICT, "CONFLICT", core.to_string()),
                CoreError::TokenCreationFailed
                | CoreError::UpdateFailed(_)
                | CoreError::Storage(_) => {
                    tracing::error!(error = %core, "Storage-level core error");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "INTERNAL_ERROR",
                        "An internal error occurred".to_string(),
                    )
                }
            },

            // --- Database errors ---
            ApiError::Database(err) => classify_sqlx_error(err),

            // --- HTTP-specific errors ---
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone()),
            ApiError::Internal(msg) => {
                tracing::error!(error = %msg, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

/// Whether a sqlx error is a SQLite unique-constraint violation
/// (extended result codes 2067 = UNIQUE, 1555 = PRIMARY KEY).
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => {
            matches!(db_err.code().as_deref(), Some("2067") | Some("1555"))
        }
        _ => false,
    }
}

/// Classify a sqlx error into an HTTP status, error code, and message.
///
/// - `RowNotFound` maps to 404.
/// - Unique-constraint violations map to 409.
/// - Everything else maps to 500 with a sanitized message.
fn classify_sqlx_error(err: &sqlx::Error) -> (StatusCode, &'static str, String) {
    match err {
        sqlx::Error::RowNotFound => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            "Resource not found".to_string(),
        ),
        _ if is_unique_violation(err) => (
            StatusCode::CONFLICT,
            "CONFLICT",
            "Duplicate value violates a unique constraint".to_string(),
        ),
        other => {
            tracing::error!(error = %other, "Database error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An internal error occurred".to_string(),
            )
        }
    }
}
