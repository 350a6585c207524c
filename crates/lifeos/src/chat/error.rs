//! Chat error types.

use thiserror::Error;

use super::turn::TurnState;

/// Errors raised by the chat loop.
#[derive(Debug, Error)]
pub enum ChatError {
    /// Message text is empty after trimming.
    #[error("message content cannot be empty")]
    EmptyMessage,

    /// A turn in the same conversation is still pending.
    #[error("a message is already being sent in this conversation")]
    TurnInFlight,

    /// Turn is unknown or belongs to another user.
    #[error("turn not found: {0}")]
    TurnNotFound(String),

    /// Project is unknown or belongs to another user.
    #[error("project not found: {0}")]
    ProjectNotFound(String),

    /// Turn state machine rejected a transition.
    #[error("invalid turn transition from {from} to {to}")]
    InvalidTransition { from: TurnState, to: TurnState },

    /// Database failure.
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}
