//! Authentication failures.
//!
//! Responses go through [`ApiError`], so a rejected request gets the same
//! `{error, code}` body as any other API error.

use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::api::ApiError;

#[derive(Debug, Error)]
pub enum AuthError {
    /// No bearer header, cookie or dev user on the request.
    #[error("missing authorization header")]
    MissingAuthHeader,

    /// Authorization header is not `Bearer <token>`.
    #[error("invalid authorization header format")]
    InvalidAuthHeader,

    #[error("invalid token: {0}")]
    InvalidToken(String),

    #[error("token expired")]
    TokenExpired,

    /// `X-Dev-User` names no configured dev user.
    #[error("unknown dev user: {0}")]
    UnknownDevUser(String),

    /// Signing or secret setup failed.
    #[error("internal auth error: {0}")]
    Internal(String),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        ApiError::from(self).into_response()
    }
}
