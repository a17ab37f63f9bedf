//! Application error type and HTTP error mapping.
//!
//! Every fallible operation in the service returns [`AppError`]. Each variant carries a
//! human-readable message and a JSON `details` payload, and maps to exactly one HTTP
//! status code when returned from a handler.
//!
//! # Response Format
//!
//! ```json
//! {
//!   "error": {
//!     "code": "expired",
//!     "message": "Short URL has expired",
//!     "details": { "token": "xYz" }
//!   }
//! }
//! ```

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::{Value, json};

use crate::utils::hash_id::HashIdError;

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorInfo,
}

/// Serializable error payload.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorInfo {
    pub code: &'static str,
    pub message: String,
    pub details: Value,
}

/// Errors produced by the shortening service.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Malformed request shape (missing URL, inverted validity window).
    #[error("{message}")]
    Validation { message: String, details: Value },

    /// The long URL failed structural or security checks.
    #[error("{message}")]
    InvalidUrl { message: String, details: Value },

    /// The short token could not be decoded.
    #[error("{message}")]
    InvalidToken { message: String, details: Value },

    #[error("{message}")]
    NotFound { message: String, details: Value },

    /// The entry's validity window ended.
    #[error("{message}")]
    Expired { message: String, details: Value },

    /// The entry's validity window has not started yet.
    #[error("{message}")]
    NotYetActive { message: String, details: Value },

    /// Multi-tenant mode with no host mapping for the derived tenant.
    #[error("{message}")]
    TenantNotConfigured { message: String, details: Value },

    /// Uniqueness violation in the backing store.
    #[error("{message}")]
    Conflict { message: String, details: Value },

    /// Backend connectivity or query failure.
    #[error("{message}")]
    Storage { message: String, details: Value },

    /// The request deadline elapsed before the operation completed.
    #[error("{message}")]
    Timeout { message: String, details: Value },

    #[error("{message}")]
    Internal { message: String, details: Value },
}

impl AppError {
    pub fn bad_request(message: impl Into<String>, details: Value) -> Self {
        Self::Validation {
            message: message.into(),
            details,
        }
    }

    pub fn invalid_url(message: impl Into<String>, details: Value) -> Self {
        Self::InvalidUrl {
            message: message.into(),
            details,
        }
    }

    pub fn invalid_token(message: impl Into<String>, details: Value) -> Self {
        Self::InvalidToken {
            message: message.into(),
            details,
        }
    }

    pub fn not_found(message: impl Into<String>, details: Value) -> Self {
        Self::NotFound {
            message: message.into(),
            details,
        }
    }

    pub fn expired(message: impl Into<String>, details: Value) -> Self {
        Self::Expired {
            message: message.into(),
            details,
        }
    }

    pub fn not_yet_active(message: impl Into<String>, details: Value) -> Self {
        Self::NotYetActive {
            message: message.into(),
            details,
        }
    }

    pub fn tenant_not_configured(message: impl Into<String>, details: Value) -> Self {
        Self::TenantNotConfigured {
            message: message.into(),
            details,
        }
    }

    pub fn conflict(message: impl Into<String>, details: Value) -> Self {
        Self::Conflict {
            message: message.into(),
            details,
        }
    }

    pub fn storage(message: impl Into<String>, details: Value) -> Self {
        Self::Storage {
            message: message.into(),
            details,
        }
    }

    pub fn timeout(message: impl Into<String>, details: Value) -> Self {
        Self::Timeout {
            message: message.into(),
            details,
        }
    }

    pub fn internal(message: impl Into<String>, details: Value) -> Self {
        Self::Internal {
            message: message.into(),
            details,
        }
    }

    /// HTTP status and machine-readable code for this error.
    pub fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::Validation { .. } => (StatusCode::BAD_REQUEST, "validation_error"),
            AppError::InvalidUrl { .. } => (StatusCode::BAD_REQUEST, "invalid_url"),
            AppError::InvalidToken { .. } => (StatusCode::NOT_FOUND, "invalid_token"),
            AppError::NotFound { .. } => (StatusCode::NOT_FOUND, "not_found"),
            AppError::Expired { .. } => (StatusCode::GONE, "expired"),
            AppError::NotYetActive { .. } => (StatusCode::NOT_FOUND, "not_yet_active"),
            AppError::TenantNotConfigured { .. } => {
                (StatusCode::BAD_REQUEST, "tenant_not_configured")
            }
            AppError::Conflict { .. } => (StatusCode::CONFLICT, "conflict"),
            AppError::Storage { .. } => (StatusCode::INTERNAL_SERVER_ERROR, "storage_error"),
            AppError::Timeout { .. } => (StatusCode::GATEWAY_TIMEOUT, "timeout"),
            AppError::Internal { .. } => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        }
    }

    /// Converts the error into its serializable payload.
    pub fn to_error_info(&self) -> ErrorInfo {
        let (_, code) = self.status_and_code();
        let (message, details) = self.parts();
        ErrorInfo {
            code,
            message: message.to_string(),
            details: details.clone(),
        }
    }

    fn parts(&self) -> (&str, &Value) {
        match self {
            AppError::Validation { message, details }
            | AppError::InvalidUrl { message, details }
            | AppError::InvalidToken { message, details }
            | AppError::NotFound { message, details }
            | AppError::Expired { message, details }
            | AppError::NotYetActive { message, details }
            | AppError::TenantNotConfigured { message, details }
            | AppError::Conflict { message, details }
            | AppError::Storage { message, details }
            | AppError::Timeout { message, details }
            | AppError::Internal { message, details } => (message, details),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        if status.is_server_error() {
            tracing::error!(code, error = %self, "Request failed");
        } else {
            tracing::debug!(code, error = %self, "Request rejected");
        }

        let body = ErrorBody {
            error: self.to_error_info(),
        };

        (status, Json(body)).into_response()
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        if let Some(db) = e.as_database_error()
            && db.is_unique_violation()
        {
            return AppError::conflict(
                "Unique constraint violation",
                json!({ "constraint": db.constraint() }),
            );
        }

        AppError::storage("Database error", json!({ "reason": e.to_string() }))
    }
}

impl From<redis::RedisError> for AppError {
    fn from(e: redis::RedisError) -> Self {
        AppError::storage("Redis error", json!({ "reason": e.to_string() }))
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(e: validator::ValidationErrors) -> Self {
        AppError::bad_request("Request validation failed", json!(e))
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::bad_request(
            "Malformed request body",
            json!({
                "reason": rejection.body_text(),
                "rejection_status": rejection.status().as_u16(),
            }),
        )
    }
}

impl From<HashIdError> for AppError {
    fn from(e: HashIdError) -> Self {
        match e {
            HashIdError::InvalidToken(token) => {
                AppError::invalid_token("Invalid short URL token", json!({ "token": token }))
            }
            other => AppError::internal("Encoder failure", json!({ "reason": other.to_string() })),
        }
    }
}
