//! Per-conversation turn bookkeeping.

use super::error::ChatError;
use super::turn::{Turn, TurnState};

/// Failed turns kept for retry; older ones are evicted first.
pub const MAX_FAILED_TURNS: usize = 16;

/// Unsettled turns of one conversation. At most one turn is pending at a
/// time. Confirmed turns leave the conversation.
#[derive(Debug, Clone, Default)]
pub struct Conversation {
    turns: Vec<Turn>,
}

impl Conversation {
    /// Whether a turn is waiting on the agent.
    pub fn in_flight(&self) -> bool {
        self.turns.iter().any(Turn::is_pending)
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Start a new turn for `content`.
    pub fn begin(&mut self, content: &str, agent_id: Option<String>) -> Result<Turn, ChatError> {
        let content = content.trim();
        if content.is_empty() {
            return Err(ChatError::EmptyMessage);
        }
        if self.in_flight() {
            return Err(ChatError::TurnInFlight);
        }

        let turn = Turn::new(content, agent_id);
        self.turns.push(turn.clone());
        Ok(turn)
    }

    /// Move a failed turn back to pending.
    pub fn begin_retry(&mut self, turn_id: &str) -> Result<Turn, ChatError> {
        if self.in_flight() {
            return Err(ChatError::TurnInFlight);
        }
        let turn = self.turn_mut(turn_id)?;
        turn.retry()?;
        Ok(turn.clone())
    }

    /// Record the stored user message for a turn.
    pub fn attach_user_message(
        &mut self,
        turn_id: &str,
        message_id: &str,
    ) -> Result<Turn, ChatError> {
        let turn = self.turn_mut(turn_id)?;
        turn.user_message_id = Some(message_id.to_string());
        Ok(turn.clone())
    }

    /// Confirm a turn and take it out of the conversation.
    pub fn confirm(&mut self, turn_id: &str, reply_message_id: &str) -> Result<Turn, ChatError> {
        self.turn_mut(turn_id)?.confirm(reply_message_id)?;
        let idx = self
            .turns
            .iter()
            .position(|t| t.id == turn_id)
            .ok_or_else(|| ChatError::TurnNotFound(turn_id.to_string()))?;
        Ok(self.turns.remove(idx))
    }

    /// Fail a turn. Returns the failed turn and the IDs of older failed
    /// turns evicted to stay within [`MAX_FAILED_TURNS`].
    pub fn fail(&mut self, turn_id: &str, error: &str) -> Result<(Turn, Vec<String>), ChatError> {
        let turn = self.turn_mut(turn_id)?;
        turn.fail(error)?;
        let turn = turn.clone();
        Ok((turn, self.evict_failed()))
    }

    /// Drop a turn whose user message never made it to storage.
    pub fn abandon(&mut self, turn_id: &str) -> Option<Turn> {
        let idx = self.turns.iter().position(|t| t.id == turn_id)?;
        Some(self.turns.remove(idx))
    }

    pub fn turn(&self, turn_id: &str) -> Option<&Turn> {
        self.turns.iter().find(|t| t.id == turn_id)
    }

    /// Turns still pending or failed, oldest first.
    pub fn unsettled(&self) -> Vec<Turn> {
        self.turns.clone()
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    fn turn_mut(&mut self, turn_id: &str) -> Result<&mut Turn, ChatError> {
        self.turns
            .iter_mut()
            .find(|t| t.id == turn_id)
            .ok_or_else(|| ChatError::TurnNotFound(turn_id.to_string()))
    }

    fn evict_failed(&mut self) -> Vec<String> {
        let failed = self
            .turns
            .iter()
            .filter(|t| t.state == TurnState::Failed)
            .count();
        let mut excess = failed.saturating_sub(MAX_FAILED_TURNS);
        let mut evicted = Vec::with_capacity(excess);
        self.turns.retain(|t| {
            if excess > 0 && t.state == TurnState::Failed {
                excess -= 1;
                evicted.push(t.id.clone());
                false
            } else {
                true
            }
        });
        evicted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn conversation() -> Conversation {
        Conversation::default()
    }

    #[test]
    fn test_begin_trims_and_rejects_blank() {
        let mut conv = conversation();
        assert!(matches!(conv.begin("   \n", None), Err(ChatError::EmptyMessage)));
        assert!(conv.turns().is_empty());

        let turn = conv.begin("  hello  ", None).unwrap();
        assert_eq!(turn.content, "hello");
        assert!(conv.in_flight());
    }

    #[test]
    fn test_second_send_rejected_while_pending() {
        let mut conv = conversation();
        let first = conv.begin("one", None).unwrap();

        assert!(matches!(conv.begin("two", None), Err(ChatError::TurnInFlight)));
        assert_eq!(conv.turns().len(), 1);

        conv.confirm(&first.id, "r1").unwrap();
        assert!(!conv.in_flight());
        conv.begin("two", None).unwrap();
    }

    #[test]
    fn test_failed_turn_can_be_retried() {
        let mut conv = conversation();
        let turn = conv.begin("one", None).unwrap();
        conv.fail(&turn.id, "down").unwrap();
        assert!(!conv.in_flight());
        assert_eq!(conv.unsettled().len(), 1);

        let retried = conv.begin_retry(&turn.id).unwrap();
        assert_eq!(retried.state, TurnState::Pending);
        assert_eq!(retried.attempts, 2);

        conv.confirm(&turn.id, "r1").unwrap();
        assert!(conv.unsettled().is_empty());
    }

    #[test]
    fn test_retry_blocked_by_other_pending_turn() {
        let mut conv = conversation();
        let failed = conv.begin("one", None).unwrap();
        conv.fail(&failed.id, "down").unwrap();
        conv.begin("two", None).unwrap();

        assert!(matches!(
            conv.begin_retry(&failed.id),
            Err(ChatError::TurnInFlight)
        ));
    }

    #[test]
    fn test_unknown_turn() {
        let mut conv = conversation();
        assert!(matches!(
            conv.begin_retry("missing"),
            Err(ChatError::TurnNotFound(_))
        ));
    }

    #[test]
    fn test_abandon_clears_in_flight() {
        let mut conv = conversation();
        let turn = conv.begin("one", None).unwrap();
        assert!(conv.abandon(&turn.id).is_some());
        assert!(!conv.in_flight());
        assert!(conv.turn(&turn.id).is_none());
    }

    #[test]
    fn test_confirmed_turns_leave_the_conversation() {
        let mut conv = conversation();
        let turn = conv.begin("one", None).unwrap();
        let confirmed = conv.confirm(&turn.id, "r1").unwrap();

        assert_eq!(confirmed.state, TurnState::Confirmed);
        assert_eq!(confirmed.reply_message_id.as_deref(), Some("r1"));
        assert!(conv.is_empty());
    }

    #[test]
    fn test_failed_turns_are_capped() {
        let mut conv = conversation();
        let mut ids = Vec::new();
        let mut evicted = Vec::new();
        for i in 0..1000 {
            let turn = conv.begin(&format!("m{i}"), None).unwrap();
            ids.push(turn.id.clone());
            let (failed, dropped) = conv.fail(&turn.id, "down").unwrap();
            assert_eq!(failed.state, TurnState::Failed);
            assert!(conv.turns().len() <= MAX_FAILED_TURNS);
            evicted.extend(dropped);
        }

        assert_eq!(conv.turns().len(), MAX_FAILED_TURNS);
        assert_eq!(conv.turns()[0].content, format!("m{}", 1000 - MAX_FAILED_TURNS));
        // Oldest go first, each exactly once.
        assert_eq!(evicted, ids[..1000 - MAX_FAILED_TURNS].to_vec());
    }
}
