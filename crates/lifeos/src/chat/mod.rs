//! Chat module.
//!
//! A user message becomes a [`Turn`]: the message is stored, relayed to the
//! agent, and the agent's reply is stored when the relay succeeds. Each
//! conversation (user plus optional project) allows one pending turn at a
//! time, and failed turns can be retried.

mod conversation;
mod error;
mod models;
mod repository;
mod service;
mod turn;

pub use conversation::Conversation;
pub use error::ChatError;
pub use models::{ChatMessage, ConversationScope, CreateChatMessage, MessageRole};
pub use repository::ChatRepository;
pub use service::{ChatService, SendMessageRequest, TurnOutcome};
pub use turn::{Turn, TurnState};
