//! Send/acknowledge state machine for one user message.
//!
//! A turn starts `Pending` when the user sends a message and settles exactly
//! once: `Confirmed` when the agent's reply is stored, `Failed` when the relay
//! or storage gives up. Only a failed turn may go back to `Pending` (retry).

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use uuid::Uuid;

use super::error::ChatError;

/// Lifecycle state of a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnState {
    Pending,
    Confirmed,
    Failed,
}

impl fmt::Display for TurnState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Confirmed => write!(f, "confirmed"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// One send attempt and its outcome.
#[derive(Debug, Clone, Serialize)]
pub struct Turn {
    pub id: String,
    pub state: TurnState,
    /// Trimmed message text, re-sent on retry.
    pub content: String,
    pub agent_id: Option<String>,
    /// Stored user message; set once the row is written.
    pub user_message_id: Option<String>,
    /// Stored assistant message; set on confirmation.
    pub reply_message_id: Option<String>,
    /// Last failure reason.
    pub error: Option<String>,
    /// Number of relay attempts started.
    pub attempts: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Turn {
    pub fn new(content: impl Into<String>, agent_id: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            state: TurnState::Pending,
            content: content.into(),
            agent_id,
            user_message_id: None,
            reply_message_id: None,
            error: None,
            attempts: 1,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.state == TurnState::Pending
    }

    pub fn is_settled(&self) -> bool {
        !self.is_pending()
    }

    /// Pending -> Confirmed.
    pub fn confirm(&mut self, reply_message_id: impl Into<String>) -> Result<(), ChatError> {
        self.transition(TurnState::Confirmed)?;
        self.reply_message_id = Some(reply_message_id.into());
        self.error = None;
        Ok(())
    }

    /// Pending -> Failed.
    pub fn fail(&mut self, error: impl Into<String>) -> Result<(), ChatError> {
        self.transition(TurnState::Failed)?;
        self.error = Some(error.into());
        Ok(())
    }

    /// Failed -> Pending.
    pub fn retry(&mut self) -> Result<(), ChatError> {
        self.transition(TurnState::Pending)?;
        self.attempts += 1;
        Ok(())
    }

    fn transition(&mut self, to: TurnState) -> Result<(), ChatError> {
        let allowed = matches!(
            (self.state, to),
            (TurnState::Pending, TurnState::Confirmed)
                | (TurnState::Pending, TurnState::Failed)
                | (TurnState::Failed, TurnState::Pending)
        );
        if !allowed {
            return Err(ChatError::InvalidTransition {
                from: self.state,
                to,
            });
        }
        self.state = to;
        self.updated_at = Utc::now();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_turn_is_pending() {
        let turn = Turn::new("hello", None);
        assert!(turn.is_pending());
        assert_eq!(turn.attempts, 1);
        assert!(turn.error.is_none());
    }

    #[test]
    fn test_confirm_settles_once() {
        let mut turn = Turn::new("hello", None);
        turn.confirm("reply-1").unwrap();
        assert_eq!(turn.state, TurnState::Confirmed);
        assert_eq!(turn.reply_message_id.as_deref(), Some("reply-1"));

        assert!(matches!(
            turn.fail("late"),
            Err(ChatError::InvalidTransition {
                from: TurnState::Confirmed,
                to: TurnState::Failed
            })
        ));
        assert!(turn.confirm("reply-2").is_err());
        assert!(turn.retry().is_err());
    }

    #[test]
    fn test_fail_then_retry_then_confirm() {
        let mut turn = Turn::new("hello", Some("agent-1".into()));
        turn.fail("webhook down").unwrap();
        assert_eq!(turn.state, TurnState::Failed);
        assert_eq!(turn.error.as_deref(), Some("webhook down"));

        turn.retry().unwrap();
        assert!(turn.is_pending());
        assert_eq!(turn.attempts, 2);

        turn.confirm("reply").unwrap();
        assert!(turn.is_settled());
        assert!(turn.error.is_none());
    }

    #[test]
    fn test_pending_cannot_retry() {
        let mut turn = Turn::new("hello", None);
        assert!(turn.retry().is_err());
        assert_eq!(turn.attempts, 1);
    }

    #[test]
    fn test_state_serializes_lowercase() {
        let turn = Turn::new("hi", None);
        let json = serde_json::to_value(&turn).unwrap();
        assert_eq!(json["state"], "pending");
    }
}
