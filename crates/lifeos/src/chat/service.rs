//! Chat service: the send/acknowledge loop between a user and the agent.

use std::sync::Arc;

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{Instrument, debug, info, instrument, warn};

use super::conversation::Conversation;
use super::error::ChatError;
use super::models::{ChatMessage, ConversationScope, CreateChatMessage, MessageRole};
use super::repository::ChatRepository;
use super::turn::Turn;
use crate::projects::ProjectRepository;
use crate::relay::AgentRelay;

/// Request to send a chat message.
#[derive(Debug, Clone, Deserialize)]
pub struct SendMessageRequest {
    pub content: String,
    #[serde(default)]
    pub project_id: Option<String>,
    #[serde(default)]
    pub agent_id: Option<String>,
}

/// Result of a send or retry.
#[derive(Debug, Clone, Serialize)]
pub struct TurnOutcome {
    pub turn: Turn,
    pub user_message: Option<ChatMessage>,
    /// Present when the turn is confirmed.
    pub assistant_message: Option<ChatMessage>,
}

/// Service driving chat turns.
///
/// Cheap to clone; clones share the turn registry.
#[derive(Clone)]
pub struct ChatService {
    messages: ChatRepository,
    projects: ProjectRepository,
    relay: AgentRelay,
    conversations: Arc<DashMap<ConversationScope, Conversation>>,
    /// Turn ID to the conversation holding it.
    turn_index: Arc<DashMap<String, ConversationScope>>,
}

impl ChatService {
    pub fn new(messages: ChatRepository, projects: ProjectRepository, relay: AgentRelay) -> Self {
        Self {
            messages,
            projects,
            relay,
            conversations: Arc::new(DashMap::new()),
            turn_index: Arc::new(DashMap::new()),
        }
    }

    /// Messages of a conversation, oldest first.
    pub async fn list_messages(
        &self,
        user_id: &str,
        project_id: Option<String>,
    ) -> Result<Vec<ChatMessage>, ChatError> {
        let scope = self.scope_for(user_id, project_id).await?;
        Ok(self.messages.list(&scope).await?)
    }

    /// Pending and failed turns of a conversation.
    pub async fn unsettled_turns(
        &self,
        user_id: &str,
        project_id: Option<String>,
    ) -> Result<Vec<Turn>, ChatError> {
        let scope = self.scope_for(user_id, project_id).await?;
        Ok(self
            .conversations
            .get(&scope)
            .map(|c| c.unsettled())
            .unwrap_or_default())
    }

    /// Store the user's message, relay it, and store the agent's reply.
    ///
    /// A relay failure is not an error: the turn comes back `failed` with the
    /// user message kept, ready for [`ChatService::retry_turn`]. Once the turn
    /// has begun it runs to a settled state even if the caller goes away.
    #[instrument(skip(self, request))]
    pub async fn send_message(
        &self,
        user_id: &str,
        request: SendMessageRequest,
    ) -> Result<TurnOutcome, ChatError> {
        if request.content.trim().is_empty() {
            return Err(ChatError::EmptyMessage);
        }
        let scope = self.scope_for(user_id, request.project_id).await?;

        let turn = self
            .conversations
            .entry(scope.clone())
            .or_default()
            .begin(&request.content, request.agent_id)?;
        self.turn_index.insert(turn.id.clone(), scope.clone());

        run_detached(self.clone().store_and_relay(scope, turn)).await
    }

    /// Re-relay a failed turn without storing its user message again.
    #[instrument(skip(self))]
    pub async fn retry_turn(&self, user_id: &str, turn_id: &str) -> Result<TurnOutcome, ChatError> {
        let scope = self
            .turn_index
            .get(turn_id)
            .map(|entry| entry.value().clone())
            .filter(|scope| scope.user_id == user_id)
            .ok_or_else(|| ChatError::TurnNotFound(turn_id.to_string()))?;

        let turn = self.with_conversation(&scope, turn_id, |c| c.begin_retry(turn_id))?;
        info!("Retrying turn {} (attempt {})", turn.id, turn.attempts);

        run_detached(self.clone().relay_again(scope, turn)).await
    }

    async fn store_and_relay(
        self,
        scope: ConversationScope,
        turn: Turn,
    ) -> Result<TurnOutcome, ChatError> {
        let stored = self
            .messages
            .add(CreateChatMessage {
                user_id: scope.user_id.clone(),
                project_id: scope.project_id.clone(),
                role: MessageRole::User,
                content: turn.content.clone(),
                agent_id: turn.agent_id.clone(),
                metadata: Some(json!({ "turn_id": turn.id })),
            })
            .await;

        let user_message = match stored {
            Ok(message) => message,
            Err(e) => {
                warn!("Dropping turn {}: user message not stored: {:#}", turn.id, e);
                if let Some(mut conversation) = self.conversations.get_mut(&scope) {
                    conversation.abandon(&turn.id);
                }
                self.turn_index.remove(&turn.id);
                self.release_if_idle(&scope);
                return Err(ChatError::Storage(e));
            }
        };

        let turn = self.with_conversation(&scope, &turn.id, |c| {
            c.attach_user_message(&turn.id, &user_message.id)
        })?;

        self.complete_turn(&scope, turn, Some(user_message)).await
    }

    async fn relay_again(
        self,
        scope: ConversationScope,
        turn: Turn,
    ) -> Result<TurnOutcome, ChatError> {
        let user_message = match &turn.user_message_id {
            Some(id) => match self.messages.get(&scope.user_id, id).await {
                Ok(message) => message,
                Err(e) => {
                    warn!("Turn {}: user message lookup failed: {:#}", turn.id, e);
                    None
                }
            },
            None => None,
        };

        self.complete_turn(&scope, turn, user_message).await
    }

    async fn complete_turn(
        &self,
        scope: &ConversationScope,
        turn: Turn,
        user_message: Option<ChatMessage>,
    ) -> Result<TurnOutcome, ChatError> {
        let payload = json!({
            "message": turn.content,
            "user_id": scope.user_id,
            "project_id": scope.project_id,
            "agent_id": turn.agent_id,
        });

        let failure = match self.relay.forward(&payload).await {
            Ok(response) if response.is_success() => {
                let status = response.status;
                let stored = self
                    .messages
                    .add(CreateChatMessage {
                        user_id: scope.user_id.clone(),
                        project_id: scope.project_id.clone(),
                        role: MessageRole::Assistant,
                        content: response.reply.reply_text(),
                        agent_id: turn.agent_id.clone(),
                        metadata: Some(json!({ "turn_id": turn.id, "relay_status": status })),
                    })
                    .await;

                match stored {
                    Ok(reply) => {
                        let turn = self.with_conversation(scope, &turn.id, |c| {
                            c.confirm(&turn.id, &reply.id)
                        })?;
                        self.turn_index.remove(&turn.id);
                        self.release_if_idle(scope);
                        return Ok(TurnOutcome {
                            turn,
                            user_message,
                            assistant_message: Some(reply),
                        });
                    }
                    Err(e) => format!("failed to store agent reply: {e:#}"),
                }
            }
            Ok(response) => format!("agent webhook returned status {}", response.status),
            Err(e) => e.to_string(),
        };

        warn!("Turn {} failed: {}", turn.id, failure);
        let (turn, evicted) =
            self.with_conversation(scope, &turn.id, |c| c.fail(&turn.id, &failure))?;
        for id in evicted {
            debug!("Evicting failed turn {}", id);
            self.turn_index.remove(&id);
        }
        Ok(TurnOutcome {
            turn,
            user_message,
            assistant_message: None,
        })
    }

    /// Run `f` against the conversation of `scope` without holding the
    /// registry lock across an await.
    fn with_conversation<T>(
        &self,
        scope: &ConversationScope,
        turn_id: &str,
        f: impl FnOnce(&mut Conversation) -> Result<T, ChatError>,
    ) -> Result<T, ChatError> {
        let mut conversation = self
            .conversations
            .get_mut(scope)
            .ok_or_else(|| ChatError::TurnNotFound(turn_id.to_string()))?;
        f(&mut conversation)
    }

    /// Forget a conversation with nothing left to settle.
    fn release_if_idle(&self, scope: &ConversationScope) {
        self.conversations.remove_if(scope, |_, c| c.is_empty());
    }

    async fn scope_for(
        &self,
        user_id: &str,
        project_id: Option<String>,
    ) -> Result<ConversationScope, ChatError> {
        let project_id = project_id.filter(|p| !p.trim().is_empty());
        if let Some(project_id) = &project_id {
            if self.projects.get_active(user_id, project_id).await?.is_none() {
                return Err(ChatError::ProjectNotFound(project_id.clone()));
            }
        }
        Ok(ConversationScope::new(user_id, project_id))
    }
}

/// Drive a turn on its own task so a dropped request cannot leave it pending.
async fn run_detached<F>(turn: F) -> Result<TurnOutcome, ChatError>
where
    F: Future<Output = Result<TurnOutcome, ChatError>> + Send + 'static,
{
    tokio::spawn(turn.in_current_span())
        .await
        .map_err(|e| ChatError::Storage(anyhow::anyhow!("turn task failed: {e}")))?
}
