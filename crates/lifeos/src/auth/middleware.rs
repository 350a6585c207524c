//! Authentication middleware.

use axum::{
    extract::{FromRequestParts, State},
    http::{header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::Response,
};
use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use log::{debug, warn};
use std::sync::Arc;

use super::{AuthConfig, AuthError, Claims};

/// Header naming the dev user in dev mode.
pub const DEV_USER_HEADER: &str = "X-Dev-User";

/// Cookie carrying a token for browser clients.
pub const AUTH_COOKIE: &str = "auth_token";

/// Extract a Bearer token from an Authorization header value.
fn bearer_token_from_header(header_value: &str) -> Result<&str, AuthError> {
    let mut parts = header_value.split_whitespace();
    let scheme = parts.next().ok_or(AuthError::InvalidAuthHeader)?;

    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(AuthError::InvalidAuthHeader);
    }

    let token = parts.next().ok_or(AuthError::InvalidAuthHeader)?;
    if token.is_empty() {
        return Err(AuthError::InvalidAuthHeader);
    }

    if parts.next().is_some() {
        return Err(AuthError::InvalidAuthHeader);
    }

    Ok(token)
}

fn token_from_cookie_header<'a>(cookie_header: &'a str, cookie_name: &str) -> Option<&'a str> {
    cookie_header.split(';').map(str::trim).find_map(|pair| {
        let (name, value) = pair.split_once('=')?;
        if name.trim() == cookie_name {
            Some(value.trim())
        } else {
            None
        }
    })
}

/// Authentication middleware.
///
/// Validates tokens and injects `CurrentUser` into request extensions.
/// Sources, in priority order:
/// 1. Authorization: Bearer <token> header
/// 2. auth_token cookie
/// 3. X-Dev-User header (dev mode only)
pub async fn auth_middleware(
    State(auth): State<AuthState>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, AuthError> {
    let auth_header = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let cookie_token = req
        .headers()
        .get(axum::http::header::COOKIE)
        .and_then(|h| h.to_str().ok())
        .and_then(|cookie_header| token_from_cookie_header(cookie_header, AUTH_COOKIE));

    let claims = if let Some(header) = auth_header {
        let token = bearer_token_from_header(header)?;
        auth.validate_token(token)?
    } else if let Some(token) = cookie_token {
        auth.validate_token(token)?
    } else if auth.is_dev_mode() {
        let user_id = req
            .headers()
            .get(DEV_USER_HEADER)
            .and_then(|h| h.to_str().ok())
            .ok_or(AuthError::MissingAuthHeader)?;
        debug!("Using dev user: {}", user_id);
        auth.dev_user_claims(user_id)?
    } else {
        return Err(AuthError::MissingAuthHeader);
    };

    let user = CurrentUser { claims };
    debug!("Authenticated {} ({})", user.id(), user.display_name());
    req.extensions_mut().insert(user);

    Ok(next.run(req).await)
}
