// SPDX-License-Identifier: MIT

//! Application error types with consistent API responses.
//!
//! Every error renders the standard `{success:false, error}` envelope;
//! store and internal errors are logged but never leaked to the client.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Application error type that converts to HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Authentication required")]
    Unauthorized,

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("OAuth exchange failed: {0}")]
    ExchangeFailed(String),

    /// Unique-constraint race on first login; the caller retries the
    /// lookup before surfacing `ReconciliationFailed`.
    #[error("Duplicate identity for provider id")]
    DuplicateIdentity,

    #[error("Reconciliation failed")]
    ReconciliationFailed,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// JSON error envelope, matching the API response shape.
#[derive(Serialize)]
struct ErrorBody {
    success: bool,
    error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error) = match &self {
            AppError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "Unauthorized – please log in via Google OAuth".to_string(),
            ),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::ExchangeFailed(msg) => {
                tracing::warn!(error = %msg, "OAuth exchange failed");
                (
                    StatusCode::BAD_GATEWAY,
                    "Google authentication failed".to_string(),
                )
            }
            AppError::DuplicateIdentity | AppError::ReconciliationFailed => {
                tracing::error!(error = %self, "User reconciliation failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to sign in".to_string(),
                )
            }
            AppError::Database(msg) => {
                tracing::error!(error = %msg, "Database error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Database error".to_string(),
                )
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "Internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = ErrorBody {
            success: false,
            error,
        };

        (status, Json(body)).into_response()
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::Database(err.to_string())
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;
