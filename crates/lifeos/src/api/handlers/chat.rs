//! Chat handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use tracing::instrument;

use super::super::error::ApiResult;
use super::super::state::AppState;
use crate::auth::CurrentUser;
use crate::chat::{ChatMessage, SendMessageRequest, Turn, TurnOutcome};

/// Conversation selector; no `project_id` means the global conversation.
#[derive(Debug, Default, Deserialize)]
pub struct ChatScopeQuery {
    pub project_id: Option<String>,
}

/// List messages of a conversation.
#[instrument(skip(state, user), fields(user_id = %user.id()))]
pub async fn list_messages(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(query): Query<ChatScopeQuery>,
) -> ApiResult<Json<Vec<ChatMessage>>> {
    let messages = state.chat.list_messages(user.id(), query.project_id).await?;
    Ok(Json(messages))
}

/// Send a message and wait for the agent's answer.
///
/// Relay failures come back as a `failed` turn with status 200.
#[instrument(skip(state, user, request), fields(user_id = %user.id()))]
pub async fn send_message(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(request): Json<SendMessageRequest>,
) -> ApiResult<Json<TurnOutcome>> {
    let outcome = state.chat.send_message(user.id(), request).await?;
    Ok(Json(outcome))
}

/// Pending and failed turns of a conversation.
pub async fn list_turns(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(query): Query<ChatScopeQuery>,
) -> ApiResult<Json<Vec<Turn>>> {
    let turns = state.chat.unsettled_turns(user.id(), query.project_id).await?;
    Ok(Json(turns))
}

/// Re-relay a failed turn.
#[instrument(skip(state, user), fields(user_id = %user.id()))]
pub async fn retry_turn(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(turn_id): Path<String>,
) -> ApiResult<Json<TurnOutcome>> {
    let outcome = state.chat.retry_turn(user.id(), &turn_id).await?;
    Ok(Json(outcome))
}
