//! Error types for the Airlift Gateway Service.
//!
//! Every failure that reaches a handler boundary is converted into a
//! structured JSON response here; nothing is allowed to crash the process.

use airlift_sdk::error::ErrorResponse;
use axum::{Json, http::StatusCode, response::IntoResponse};
use tracing::error;

/// Errors that can occur in the Airlift Gateway Service.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Request is missing the device identifier.
    #[error("identifier required")]
    IdentifierRequired,

    /// The external build tool failed, timed out, or could not be started.
    #[error(transparent)]
    Invoke(#[from] airlift_io::error::Error),

    #[error(transparent)]
    IO(#[from] std::io::Error),

    /// `PORT` environment variable is not a valid port number.
    #[error("Invalid PORT value '{0}'")]
    InvalidPort(String),
}

impl IntoResponse for Error {
    fn into_response(self) -> axum::response::Response {
        error!("Creating API error response for error: {:?}", self);
        let (status, body) = match self {
            Error::IdentifierRequired => (
                StatusCode::BAD_REQUEST,
                ErrorResponse {
                    success: false,
                    error: "identifier required".to_string(),
                    details: None,
                    stderr: None,
                },
            ),
            Error::Invoke(err) => {
                let summary = match &err {
                    airlift_io::error::Error::Timeout { .. } => "build tool timed out",
                    _ => "build tool failed",
                };
                let stderr = match &err {
                    airlift_io::error::Error::CommandFailed { stderr, .. }
                        if !stderr.is_empty() =>
                    {
                        Some(stderr.clone())
                    }
                    _ => None,
                };
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse {
                        success: false,
                        error: summary.to_string(),
                        details: Some(err.to_string()),
                        stderr,
                    },
                )
            }
            Error::IO(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorResponse {
                    success: false,
                    error: "Internal server error".to_string(),
                    details: Some(err.to_string()),
                    stderr: None,
                },
            ),
            Error::InvalidPort(port) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorResponse {
                    success: false,
                    error: "Internal server error".to_string(),
                    details: Some(format!("Invalid PORT value '{port}'")),
                    stderr: None,
                },
            ),
        };
        (status, Json(body)).into_response()
    }
}
