use std::collections::VecDeque;
use std::num::NonZeroUsize;

use crate::message::{ChatMessage, Role};

/// Number of entries sent along with every request.
pub const DEFAULT_HISTORY_LIMIT: usize = 10;
/// Largest accepted limit; bigger values are clamped down to it.
pub const MAX_HISTORY_LIMIT: usize = 1_000;

/// Bounded buffer of the most recent chat messages, oldest first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatHistory {
    entries: VecDeque<ChatMessage>,
    limit: NonZeroUsize,
}

impl Default for ChatHistory {
    fn default() -> Self {
        Self::with_limit(DEFAULT_HISTORY_LIMIT)
    }
}

impl ChatHistory {
    /// Creates an empty history. The limit is clamped to
    /// `1..=MAX_HISTORY_LIMIT`.
    pub fn with_limit(limit: usize) -> Self {
        let limit = NonZeroUsize::new(limit.min(MAX_HISTORY_LIMIT)).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: VecDeque::new(),
            limit,
        }
    }

    pub fn limit(&self) -> usize {
        self.limit.get()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Appends a message, evicting from the front once the limit is exceeded.
    pub fn record(&mut self, role: Role, content: impl Into<String>) {
        self.entries.push_back(ChatMessage::new(role, content));
        while self.entries.len() > self.limit.get() {
            self.entries.pop_front();
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &ChatMessage> {
        self.entries.iter()
    }

    pub fn to_vec(&self) -> Vec<ChatMessage> {
        self.entries.iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eleventh_entry_evicts_the_oldest() {
        let mut history = ChatHistory::default();
        for index in 0..11 {
            history.record(Role::User, format!("message-{index}"));
            assert!(history.len() <= DEFAULT_HISTORY_LIMIT);
        }

        assert_eq!(history.len(), 10);
        let first = history.iter().next().map(|message| message.content.as_str());
        assert_eq!(first, Some("message-1"));
        let last = history.iter().last().map(|message| message.content.as_str());
        assert_eq!(last, Some("message-10"));
    }

    #[test]
    fn zero_limit_keeps_latest_entry() {
        let mut history = ChatHistory::with_limit(0);
        history.record(Role::User, "a");
        history.record(Role::Assistant, "b");

        assert_eq!(history.limit(), 1);
        assert_eq!(history.to_vec(), vec![ChatMessage::assistant("b")]);
    }

    #[test]
    fn oversized_limit_is_clamped() {
        let mut history = ChatHistory::with_limit(usize::MAX);
        assert_eq!(history.limit(), MAX_HISTORY_LIMIT);

        for index in 0..=MAX_HISTORY_LIMIT {
            history.record(Role::User, format!("message-{index}"));
        }
        assert_eq!(history.len(), MAX_HISTORY_LIMIT);
        let first = history.iter().next().map(|message| message.content.as_str());
        assert_eq!(first, Some("message-1"));
    }
}
