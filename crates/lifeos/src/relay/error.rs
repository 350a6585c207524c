//! Agent relay error types.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Result type for relay operations.
pub type RelayResult<T> = Result<T, RelayError>;

/// Errors that can occur while relaying to the agent webhook.
#[derive(Debug, Error)]
pub enum RelayError {
    /// Webhook URL or shared secret is missing.
    #[error("Server not configured")]
    NotConfigured,

    /// The caller's body is not valid JSON.
    #[error("invalid JSON body: {0}")]
    InvalidPayload(String),

    /// Sending the request or reading the upstream body failed.
    #[error("{0}")]
    Transport(String),

    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    Client(String),
}

impl From<reqwest::Error> for RelayError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.to_string())
    }
}

/// Relay failures keep their fixed wire shapes:
/// `{ "error": "Server not configured" }` or
/// `{ "error": "Proxy failed", "detail": "..." }`, both with status 500.
impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let body = match &self {
            RelayError::NotConfigured => {
                error!("agent relay missing webhook URL or shared secret");
                json!({ "error": "Server not configured" })
            }
            other => {
                error!(detail = %other, "agent relay failed");
                json!({ "error": "Proxy failed", "detail": other.to_string() })
            }
        };

        (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
    }
}
