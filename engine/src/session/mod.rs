//! Conversation State
//!
//! Per-session record of the last classified intent, its entities, and the
//! ordered transcript. A session is an owned value passed to the pipeline
//! for each turn; nothing here is process-global.
//!
//! The transcript is unbounded by default. With a bound configured, the
//! oldest turns are dropped once the transcript grows past it.

use serde::{Deserialize, Serialize};

use crate::intent::Intent;
use sdk::types::Turn;

/// Conversation state for one session
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConversationState {
    /// Intent recorded by the most recent update
    pub last_intent: Option<Intent>,

    /// Entities recorded by the most recent update
    pub last_entities: Vec<String>,

    /// Transcript, oldest first
    history: Vec<Turn>,

    /// Maximum number of turns kept in the transcript
    #[serde(skip)]
    max_turns: Option<usize>,
}

impl ConversationState {
    /// Create an unbounded session
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a session keeping at most `max_turns` turns (`None` = unbounded)
    pub fn with_max_turns(max_turns: Option<usize>) -> Self {
        Self {
            max_turns,
            ..Self::default()
        }
    }

    /// Record an update.
    ///
    /// Always overwrites the last intent and entities, even with `None`.
    /// Appends a user turn when `user_query` is non-empty, then an assistant
    /// turn when `assistant_response` is non-empty.
    pub fn update_state(
        &mut self,
        intent: Option<Intent>,
        entities: Vec<String>,
        user_query: Option<&str>,
        assistant_response: Option<&str>,
    ) {
        self.last_intent = intent;
        self.last_entities = entities;

        if let Some(query) = user_query.filter(|q| !q.is_empty()) {
            self.history.push(Turn::user(query));
        }
        if let Some(response) = assistant_response.filter(|r| !r.is_empty()) {
            self.history.push(Turn::assistant(response));
        }

        self.trim_history();
    }

    /// Copy of the whole state, safe to hold across later updates
    pub fn snapshot(&self) -> ConversationState {
        self.clone()
    }

    /// Live transcript
    pub fn history(&self) -> &[Turn] {
        &self.history
    }

    /// Configured transcript bound
    pub fn max_turns(&self) -> Option<usize> {
        self.max_turns
    }

    /// Forget everything recorded so far, keeping the bound
    pub fn clear(&mut self) {
        self.last_intent = None;
        self.last_entities.clear();
        self.history.clear();
    }

    /// Drop the oldest turns until the transcript fits the bound
    fn trim_history(&mut self) {
        if let Some(max) = self.max_turns {
            if self.history.len() > max {
                let excess = self.history.len() - max;
                self.history.drain(..excess);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sdk::types::TurnRole;

    #[test]
    fn test_new_state_is_empty() {
        let state = ConversationState::new();
        assert!(state.history().is_empty());
        assert_eq!(state.last_intent, None);
        assert!(state.last_entities.is_empty());
        assert_eq!(state.max_turns(), None);
    }

    #[test]
    fn test_user_then_assistant_update() {
        let mut state = ConversationState::new();

        state.update_state(None, vec![], Some("Search WW2"), None);
        assert_eq!(state.history().len(), 1);
        assert_eq!(state.last_intent, None);

        state.update_state(
            Some(Intent::Search),
            vec!["WW2".to_string()],
            None,
            Some("Here's what I found:\n\nangles"),
        );

        assert_eq!(state.history().len(), 2);
        assert_eq!(state.history()[0], Turn::user("Search WW2"));
        assert_eq!(state.history()[1].role, TurnRole::Assistant);
        assert_eq!(state.last_intent, Some(Intent::Search));
        assert_eq!(state.last_entities, vec!["WW2"]);
    }

    #[test]
    fn test_single_call_orders_user_before_assistant() {
        let mut state = ConversationState::new();
        state.update_state(None, vec![], Some("question"), Some("answer"));

        assert_eq!(
            state.history(),
            &[Turn::user("question"), Turn::assistant("answer")]
        );
    }

    #[test]
    fn test_update_always_overwrites_intent() {
        let mut state = ConversationState::new();
        state.update_state(Some(Intent::Elaborate), vec!["x".to_string()], None, None);
        state.update_state(None, vec![], None, None);

        assert_eq!(state.last_intent, None);
        assert!(state.last_entities.is_empty());
        assert!(state.history().is_empty());
    }

    #[test]
    fn test_empty_strings_are_not_recorded() {
        let mut state = ConversationState::new();
        state.update_state(None, vec![], Some(""), Some(""));
        assert!(state.history().is_empty());
    }

    #[test]
    fn test_snapshot_is_detached() {
        let mut state = ConversationState::new();
        state.update_state(None, vec![], Some("first"), None);

        let snapshot = state.snapshot();
        state.update_state(None, vec![], Some("second"), None);

        assert_eq!(snapshot.history().len(), 1);
        assert_eq!(state.history().len(), 2);
    }

    #[test]
    fn test_bounded_history_keeps_recent_turns() {
        let mut state = ConversationState::with_max_turns(Some(4));

        for i in 0..5 {
            state.update_state(None, vec![], Some(&format!("User {}", i)), None);
            state.update_state(
                Some(Intent::Search),
                vec![],
                None,
                Some(&format!("Assistant {}", i)),
            );
        }

        assert_eq!(state.history().len(), 4);
        assert_eq!(state.history()[0], Turn::user("User 3"));
        assert_eq!(state.history()[3], Turn::assistant("Assistant 4"));
    }

    #[test]
    fn test_clear_keeps_bound() {
        let mut state = ConversationState::with_max_turns(Some(2));
        state.update_state(Some(Intent::Summarize), vec!["a".to_string()], Some("q"), Some("r"));

        state.clear();

        assert!(state.history().is_empty());
        assert_eq!(state.last_intent, None);
        assert_eq!(state.max_turns(), Some(2));
    }
}
