//! Short-term memory — a sliding window over the active conversation.
//!
//! Keeps the most recent messages within a token budget. The system message
//! is always preserved; oldest user/assistant messages are trimmed first
//! when the budget is exceeded. Trimming stops once only the most recent
//! `MIN_KEEP_PAIRS` exchanges remain — under severe budget pressure the
//! window is allowed to exceed the budget rather than destroy recent
//! context.

use localclaw_core::message::{Message, Role};
use tracing::debug;

use crate::token::{TokenEstimator, estimate_tokens};

/// Always keep at least this many user exchanges, budget or not.
const MIN_KEEP_PAIRS: usize = 2;

/// A token-budgeted ordered buffer of transcript messages.
pub struct ShortTermMemory {
    messages: Vec<Message>,
    max_tokens: usize,
    min_keep_pairs: usize,
    estimator: TokenEstimator,
}

impl ShortTermMemory {
    /// Create a new buffer with the given token budget.
    pub fn new(max_tokens: usize) -> Self {
        Self {
            messages: Vec::new(),
            max_tokens,
            min_keep_pairs: MIN_KEEP_PAIRS,
            estimator: estimate_tokens,
        }
    }

    /// Replace the token estimator (tests, alternative tokenizers).
    pub fn with_estimator(mut self, estimator: TokenEstimator) -> Self {
        self.estimator = estimator;
        self
    }

    /// Set or replace the system message (always index 0).
    pub fn set_system(&mut self, content: impl Into<String>) {
        let message = Message::system(content);
        match self.messages.first() {
            Some(m) if m.is_system() => self.messages[0] = message,
            _ => self.messages.insert(0, message),
        }
    }

    /// Append a message. Does not trim — callers decide when to enforce
    /// the budget via [`trim`](Self::trim).
    pub fn add(&mut self, role: Role, content: impl Into<String>) {
        self.messages.push(Message::new(role, content));
    }

    /// Remove oldest non-system messages until within budget.
    ///
    /// The system message is never removed. Trimming refuses to go below
    /// the `min_keep_pairs` most recent user exchanges even if the window
    /// is still over budget.
    pub fn trim(&mut self) {
        while self.token_count() > self.max_tokens {
            let user_count = self
                .messages
                .iter()
                .filter(|m| m.role == Role::User)
                .count();
            if user_count <= self.min_keep_pairs {
                break;
            }

            let Some(oldest) = self.messages.iter().position(|m| !m.is_system()) else {
                break;
            };
            let removed = self.messages.remove(oldest);
            debug!(role = %removed.role, "Trimmed oldest message from short-term memory");
        }
    }

    /// The current message window, in order.
    pub fn get_messages(&self) -> &[Message] {
        &self.messages
    }

    /// Approximate total tokens across all messages.
    pub fn token_count(&self) -> usize {
        self.messages
            .iter()
            .map(|m| (self.estimator)(&m.content))
            .sum()
    }

    /// The configured token budget.
    pub fn max_tokens(&self) -> usize {
        self.max_tokens
    }

    /// Remove all messages except the system message.
    pub fn clear(&mut self) {
        self.messages.retain(|m| m.is_system());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exchange(stm: &mut ShortTermMemory, n: usize) {
        stm.add(Role::User, format!("question number {n} padded out a bit"));
        stm.add(Role::Assistant, format!("answer number {n} padded out a bit"));
    }

    #[test]
    fn set_system_pins_index_zero() {
        let mut stm = ShortTermMemory::new(100);
        stm.add(Role::User, "hi");
        stm.set_system("You are helpful.");

        assert!(stm.get_messages()[0].is_system());
        assert_eq!(stm.get_messages().len(), 2);

        // Replacing does not duplicate
        stm.set_system("You are terse.");
        assert_eq!(stm.get_messages().len(), 2);
        assert_eq!(stm.get_messages()[0].content, "You are terse.");
    }

    #[test]
    fn add_does_not_trim_eagerly() {
        let mut stm = ShortTermMemory::new(1);
        for n in 0..5 {
            exchange(&mut stm, n);
        }
        // All ten messages still present until trim() is called.
        assert_eq!(stm.get_messages().len(), 10);
    }

    #[test]
    fn trim_preserves_system_message() {
        let mut stm = ShortTermMemory::new(50);
        stm.set_system("system prompt that must survive trimming");
        for n in 0..10 {
            exchange(&mut stm, n);
        }
        stm.trim();

        assert!(stm.get_messages()[0].is_system());
    }

    #[test]
    fn trim_removes_oldest_first() {
        let mut stm = ShortTermMemory::new(50);
        stm.set_system("sys");
        for n in 0..10 {
            exchange(&mut stm, n);
        }
        stm.trim();

        let non_system: Vec<&Message> = stm
            .get_messages()
            .iter()
            .filter(|m| !m.is_system())
            .collect();
        // The survivors are the most recent exchanges.
        assert!(non_system[0].content.contains("number 8"));
    }

    #[test]
    fn trim_floor_keeps_two_exchanges_even_over_budget() {
        // Budget of 1 token is always exceeded; trimming must still stop.
        let mut stm = ShortTermMemory::new(1);
        stm.set_system("sys");
        for n in 0..10 {
            exchange(&mut stm, n);
        }
        stm.trim();

        let user_count = stm
            .get_messages()
            .iter()
            .filter(|m| m.role == Role::User)
            .count();
        assert_eq!(user_count, 2);
        assert!(stm.token_count() > stm.max_tokens());
    }

    #[test]
    fn trim_scenario_budget_50() {
        let mut stm = ShortTermMemory::new(50);
        stm.set_system("sys");
        for n in 0..10 {
            exchange(&mut stm, n);
        }
        stm.trim();

        assert!(stm.get_messages()[0].is_system());
        let user_count = stm
            .get_messages()
            .iter()
            .filter(|m| m.role == Role::User)
            .count();
        assert!(user_count >= 2);
        // Either within budget, or at the recency floor.
        assert!(stm.token_count() <= 50 || user_count == 2);
    }

    #[test]
    fn trim_noop_when_under_budget() {
        let mut stm = ShortTermMemory::new(10_000);
        stm.set_system("sys");
        exchange(&mut stm, 0);

        let before = stm.get_messages().len();
        stm.trim();
        assert_eq!(stm.get_messages().len(), before);
    }

    #[test]
    fn token_count_uses_pluggable_estimator() {
        // Every message counts as exactly 10 tokens.
        let mut stm = ShortTermMemory::new(100).with_estimator(|_| 10);
        stm.add(Role::User, "a");
        stm.add(Role::Assistant, "b");
        assert_eq!(stm.token_count(), 20);
    }

    #[test]
    fn clear_keeps_system() {
        let mut stm = ShortTermMemory::new(100);
        stm.set_system("sys");
        exchange(&mut stm, 0);
        stm.clear();

        assert_eq!(stm.get_messages().len(), 1);
        assert!(stm.get_messages()[0].is_system());
    }

    #[test]
    fn clear_without_system_empties() {
        let mut stm = ShortTermMemory::new(100);
        exchange(&mut stm, 0);
        stm.clear();
        assert!(stm.get_messages().is_empty());
    }
}
