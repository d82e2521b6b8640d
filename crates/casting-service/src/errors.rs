//! Casting service error types.
//!
//! All errors map to HTTP status codes via the `IntoResponse` impl and are
//! rendered in one envelope:
//!
//! ```json
//! {"success": false, "error": 404, "message": "resource not found"}
//! ```
//!
//! Authorization failures add a `code` field. Persistence and body parsing
//! failures are logged server-side and returned as a generic 422.

use crate::auth::AuthError;
use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Casting service error type.
///
/// Maps to HTTP status codes:
/// - Auth: per `AuthError::status_code`
/// - NotFound: 404 Not Found
/// - Unprocessable, Conflict, Database: 422 Unprocessable Entity
///
/// Framework-level 400, 405 and 500 responses are enveloped by
/// `middleware::error_envelope`.
#[derive(Debug, Error)]
pub enum CastingError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("Not found")]
    NotFound,

    /// Request body could not be parsed or violates a field rule.
    #[error("Unprocessable: {0}")]
    Unprocessable(String),

    /// Unique constraint violated.
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl CastingError {
    /// Returns the HTTP status code for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            CastingError::Auth(err) => err.status_code(),
            CastingError::NotFound => 404,
            CastingError::Unprocessable(_)
            | CastingError::Conflict(_)
            | CastingError::Database(_) => 422,
        }
    }
}

/// Uniform error envelope.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: u16,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<&'static str>,
}

impl ErrorResponse {
    pub fn new(status: u16, message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: status,
            message: message.into(),
            code: None,
        }
    }
}

impl IntoResponse for CastingError {
    fn into_response(self) -> Response {
        let status_code = self.status_code();
        let body = match &self {
            CastingError::Auth(err) => {
                tracing::debug!(target: "casting.auth", code = err.code(), "Request rejected");
                ErrorResponse {
                    code: Some(err.code()),
                    ..ErrorResponse::new(status_code, err.description())
                }
            }
            CastingError::NotFound => ErrorResponse::new(status_code, "resource not found"),
            CastingError::Unprocessable(reason) => {
                tracing::debug!(target: "casting.request", reason = %reason, "Unprocessable request");
                ErrorResponse::new(status_code, "unprocessable")
            }
            CastingError::Conflict(reason) => {
                tracing::info!(target: "casting.database", reason = %reason, "Unique constraint rejected write");
                ErrorResponse::new(status_code, "unprocessable")
            }
            CastingError::Database(err) => {
                // Log actual error server-side, return generic message to client
                tracing::error!(target: "casting.database", error = %err, "Database operation failed");
                ErrorResponse::new(status_code, "unprocessable")
            }
        };

        let status = StatusCode::from_u16(status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let mut response = (status, Json(body)).into_response();

        if status == StatusCode::UNAUTHORIZED {
            response.headers_mut().insert(
                header::WWW_AUTHENTICATE,
                HeaderValue::from_static("Bearer realm=\"casting-api\", error=\"invalid_token\""),
            );
        }

        response
    }
}

/// Convert sqlx errors to CastingError
impl From<sqlx::Error> for CastingError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                CastingError::Conflict(db_err.message().to_string())
            }
            _ => CastingError::Database(err.to_string()),
        }
    }
}
