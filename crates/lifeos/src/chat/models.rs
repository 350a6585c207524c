//! Chat data models.

use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;
use sqlx::FromRow;
use std::fmt;

/// Role of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageRole {
    User,
    Assistant,
    System,
}

impl fmt::Display for MessageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::Assistant => write!(f, "assistant"),
            Self::System => write!(f, "system"),
        }
    }
}

impl std::str::FromStr for MessageRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "user" => Ok(Self::User),
            "assistant" => Ok(Self::Assistant),
            "system" => Ok(Self::System),
            _ => Err(format!("Unknown message role: {}", s)),
        }
    }
}

// Implement conversion from String for SQLx
impl TryFrom<String> for MessageRole {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// A persisted chat message. Never updated once written.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ChatMessage {
    /// Message ID (UUID).
    pub id: String,
    /// Owning user.
    pub user_id: String,
    /// Owning project; `None` is the global conversation.
    pub project_id: Option<String>,
    /// Conversation participant.
    #[sqlx(try_from = "String")]
    pub role: MessageRole,
    /// Message text.
    pub content: String,
    /// Agent that produced or was addressed by the message.
    pub agent_id: Option<String>,
    /// JSON metadata blob.
    #[serde(serialize_with = "serialize_json_text")]
    pub message_metadata: Option<String>,
    /// RFC 3339 creation time.
    pub created_at: String,
}

/// Emit stored JSON text as a JSON value rather than an escaped string.
fn serialize_json_text<S>(value: &Option<String>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let parsed = value
        .as_deref()
        .and_then(|text| serde_json::from_str::<Value>(text).ok());
    parsed.serialize(serializer)
}

/// Input for creating a chat message.
#[derive(Debug, Clone)]
pub struct CreateChatMessage {
    pub user_id: String,
    pub project_id: Option<String>,
    pub role: MessageRole,
    pub content: String,
    pub agent_id: Option<String>,
    pub metadata: Option<Value>,
}

/// A conversation: one user's messages, globally or within one project.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ConversationScope {
    pub user_id: String,
    pub project_id: Option<String>,
}

impl ConversationScope {
    pub fn new(user_id: impl Into<String>, project_id: Option<String>) -> Self {
        Self {
            user_id: user_id.into(),
            project_id,
        }
    }

    /// Scope of the user's global (project-less) conversation.
    pub fn global(user_id: impl Into<String>) -> Self {
        Self::new(user_id, None)
    }
}

impl fmt::Display for ConversationScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.project_id {
            Some(project_id) => write!(f, "{}/{}", self.user_id, project_id),
            None => write!(f, "{}/global", self.user_id),
        }
    }
}
