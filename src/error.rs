/// Error types shared by storage and HTTP layers
///
/// Storage functions return `HrmsError`; handlers return it directly and the
/// `IntoResponse` impl turns it into the standard JSON envelope.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Result alias used across storage and API code
pub type HrmsResult<T> = Result<T, HrmsError>;

#[derive(Debug, thiserror::Error)]
pub enum HrmsError {
    /// Request body or query failed validation
    #[error("{0}")]
    Validation(String),

    /// Referenced record does not exist
    #[error("{0}")]
    NotFound(String),

    /// Record collides with an existing one (duplicate key or id)
    #[error("{0}")]
    Conflict(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Stored data could not be decoded
    #[error("internal error: {0}")]
    Internal(String),
}

impl HrmsError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }

    /// HTTP status this error maps to
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Database(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// True when the sqlx error is a UNIQUE / PRIMARY KEY violation
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.is_unique_violation(),
        _ => false,
    }
}

impl IntoResponse for HrmsError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = if status.is_server_error() {
            tracing::error!("❌ Request failed: {}", self);
            json!({
                "success": false,
                "message": "Internal server error",
                "error": self.to_string(),
            })
        } else {
            tracing::warn!("⚠️ Request rejected ({}): {}", status.as_u16(), self);
            json!({
                "success": false,
                "message": self.to_string(),
            })
        };
        (status, Json(body)).into_response()
    }
}
