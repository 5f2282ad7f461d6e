//! Conversation history
//!
//! History belongs to the caller's session. Each exchange produces a new
//! value; nothing is mutated in place or retained by the pipeline.

use crate::llm::{ChatMessage, Role};
use serde::{Deserialize, Serialize};

/// Flattened (user, assistant) turns, oldest first
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConversationHistory {
    messages: Vec<ChatMessage>,
}

impl ConversationHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Completed turns, which is also the index of the next message in the session
    pub fn turns(&self) -> usize {
        self.messages
            .iter()
            .filter(|m| m.role == Role::Assistant)
            .count()
    }

    /// Append one exchange and keep only the latest `max_turns` turns
    pub fn with_turn(
        mut self,
        user: impl Into<String>,
        assistant: impl Into<String>,
        max_turns: usize,
    ) -> Self {
        self.messages.push(ChatMessage::user(user));
        self.messages.push(ChatMessage::assistant(assistant));

        let keep = max_turns * 2;
        if self.messages.len() > keep {
            let excess = self.messages.len() - keep;
            self.messages.drain(..excess);
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_turn_appends_pair() {
        let history = ConversationHistory::new().with_turn("hi", "hello", 5);
        assert_eq!(history.len(), 2);
        assert_eq!(history.messages()[0], ChatMessage::user("hi"));
        assert_eq!(history.messages()[1], ChatMessage::assistant("hello"));
        assert_eq!(history.turns(), 1);
    }

    #[test]
    fn test_bounded_to_most_recent_turns() {
        let max_turns = 3;
        let mut history = ConversationHistory::new();
        for i in 0..10 {
            history = history.with_turn(format!("q{}", i), format!("a{}", i), max_turns);
            assert!(history.len() <= 2 * max_turns);
        }
        let contents: Vec<_> = history.messages().iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["q7", "a7", "q8", "a8", "q9", "a9"]);
    }

    #[test]
    fn test_original_value_untouched() {
        let before = ConversationHistory::new().with_turn("q0", "a0", 2);
        let after = before.clone().with_turn("q1", "a1", 2);
        assert_eq!(before.len(), 2);
        assert_eq!(after.len(), 4);
    }

    #[test]
    fn test_serializes_as_message_list() {
        let history = ConversationHistory::new().with_turn("q", "a", 1);
        let json = serde_json::to_string(&history).unwrap();
        assert_eq!(
            json,
            r#"[{"role":"user","content":"q"},{"role":"assistant","content":"a"}]"#
        );
        let back: ConversationHistory = serde_json::from_str(&json).unwrap();
        assert_eq!(back, history);
    }
}
