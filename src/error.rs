//! Error handling for the QR check-in relay

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Error types
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Request used a method other than POST
    #[error("{0}")]
    MethodNotAllowed(String),

    /// Validation error (malformed request body, bad format rule)
    #[error("{0}")]
    Validation(String),

    /// Upstream call failed: network error, timeout, or unparseable body
    #[error("{0}")]
    RelayFailure(String),

    /// Config error
    #[error("Config error: {0}")]
    Config(String),
}

impl Error {
    /// HTTP status this error is reported with
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            Error::Validation(_) => StatusCode::BAD_REQUEST,
            Error::RelayFailure(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Error::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = self.to_string();

        if status.is_server_error() {
            tracing::error!(status = %status, message = %message, "Request error");
        } else {
            tracing::warn!(status = %status, message = %message, "Request rejected");
        }

        let body = Json(json!({
            "status": "error",
            "message": message
        }));

        (status, body).into_response()
    }
}
