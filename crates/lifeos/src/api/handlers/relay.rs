//! Agent proxy endpoint.

use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::instrument;

use super::super::state::AppState;
use crate::relay::RelayError;

/// Forward the request body to the agent webhook.
///
/// The upstream status is passed through; the body is the upstream JSON or
/// `{ "reply": text }` when the webhook answered with plain text.
#[instrument(skip(state, body), fields(body_len = body.len()))]
pub async fn agent_proxy(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Response, RelayError> {
    let response = state.relay.forward_bytes(&body).await?;
    let status = StatusCode::from_u16(response.status).unwrap_or(StatusCode::BAD_GATEWAY);

    Ok((status, Json(response.reply.into_body())).into_response())
}
