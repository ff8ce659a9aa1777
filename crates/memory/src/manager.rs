//! Memory manager — the unified facade over both memory tiers.
//!
//! The reasoning loop talks to this type instead of touching the short-term
//! window or the vector store directly. It owns the recall policy and builds
//! the per-turn context window: system prompt, recalled facts, transcript.
//!
//! The manager never auto-saves to long-term memory — `save` runs only when
//! the agent dispatches the save-memory tool.

use localclaw_core::error::MemoryError;
use localclaw_core::message::{Message, Role};
use localclaw_core::vector::{MemoryRecord, MemoryResult, VectorStore};
use std::sync::Arc;
use tracing::debug;

use crate::short_term::ShortTermMemory;

const DEFAULT_RECALL_LIMIT: usize = 5;
const DEFAULT_DISTANCE_THRESHOLD: f32 = 1.0;

/// Composes short-term and long-term memory.
pub struct MemoryManager {
    stm: ShortTermMemory,
    ltm: Arc<dyn VectorStore>,
    recall_limit: usize,
    distance_threshold: f32,
}

impl MemoryManager {
    pub fn new(stm: ShortTermMemory, ltm: Arc<dyn VectorStore>) -> Self {
        Self {
            stm,
            ltm,
            recall_limit: DEFAULT_RECALL_LIMIT,
            distance_threshold: DEFAULT_DISTANCE_THRESHOLD,
        }
    }

    /// Maximum recalled facts injected per turn.
    pub fn with_recall_limit(mut self, limit: usize) -> Self {
        self.recall_limit = limit;
        self
    }

    /// Recall results at or above this distance are discarded as noise.
    pub fn with_distance_threshold(mut self, threshold: f32) -> Self {
        self.distance_threshold = threshold;
        self
    }

    // -- short-term --------------------------------------------------------

    /// Set or update the system prompt in the transcript window.
    pub fn set_system(&mut self, content: impl Into<String>) {
        self.stm.set_system(content);
    }

    /// Append a message to the transcript window and enforce the budget.
    pub fn add_message(&mut self, role: Role, content: impl Into<String>) {
        self.stm.add(role, content);
        self.stm.trim();
    }

    /// The raw transcript window (debug/inspection).
    pub fn get_working_memory(&self) -> &[Message] {
        self.stm.get_messages()
    }

    /// Approximate token count of the transcript window.
    pub fn token_count(&self) -> usize {
        self.stm.token_count()
    }

    // -- long-term ---------------------------------------------------------

    /// Persist a fact to the vector store. Returns the record id.
    pub async fn save(
        &self,
        text: &str,
        metadata: serde_json::Map<String, serde_json::Value>,
    ) -> Result<String, MemoryError> {
        self.ltm.store(text, metadata).await
    }

    /// Search long-term memory for relevant snippets.
    pub async fn recall(&self, query: &str, n: usize) -> Result<Vec<MemoryResult>, MemoryError> {
        self.ltm.query(query, n).await
    }

    /// Every stored long-term record (inspection tooling).
    pub async fn get_long_term_records(&self) -> Result<Vec<MemoryRecord>, MemoryError> {
        self.ltm.get_all().await
    }

    /// Delete a long-term record by id.
    pub async fn delete_long_term(&self, id: &str) -> Result<(), MemoryError> {
        self.ltm.delete(id).await
    }

    /// Handle to the underlying vector store (shared with tools).
    pub fn long_term(&self) -> Arc<dyn VectorStore> {
        Arc::clone(&self.ltm)
    }

    // -- context assembly --------------------------------------------------

    /// Build the full message list for a model call.
    ///
    /// Order:
    /// 1. System message (always first when present)
    /// 2. Recalled long-term facts as one synthetic system note, when the
    ///    query is non-empty and relevant results survive the distance
    ///    threshold
    /// 3. The current (already trimmed) transcript window
    ///
    /// Read-only: no side effects on either tier. Store failures propagate —
    /// a dropped recall must not masquerade as "nothing relevant".
    pub async fn build_context(&self, query: &str) -> Result<Vec<Message>, MemoryError> {
        let mut messages: Vec<Message> = Vec::new();

        let mut transcript = self.stm.get_messages();
        if let Some(first) = transcript.first()
            && first.is_system()
        {
            messages.push(first.clone());
            transcript = &transcript[1..];
        }

        if !query.trim().is_empty() {
            let recalled = self.recall(query, self.recall_limit).await?;
            let relevant: Vec<&MemoryResult> = recalled
                .iter()
                .filter(|r| r.distance < self.distance_threshold)
                .collect();

            if !relevant.is_empty() {
                debug!(count = relevant.len(), "Injecting recalled facts into context");
                let facts = relevant
                    .iter()
                    .map(|r| format!("- {}", r.text))
                    .collect::<Vec<_>>()
                    .join("\n");
                messages.push(Message::system(format!(
                    "Recalled facts from long-term memory:\n{facts}"
                )));
            }
        }

        messages.extend(transcript.iter().cloned());
        Ok(messages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::in_memory::InMemoryStore;

    fn manager() -> MemoryManager {
        MemoryManager::new(ShortTermMemory::new(4096), Arc::new(InMemoryStore::new()))
    }

    #[tokio::test]
    async fn build_context_orders_system_facts_transcript() {
        let mut mgr = manager();
        mgr.set_system("You are helpful.");
        mgr.save("the user prefers dark mode", serde_json::Map::new())
            .await
            .unwrap();
        mgr.add_message(Role::User, "what theme do I like?");

        let context = mgr.build_context("user prefers dark mode theme").await.unwrap();

        assert!(context[0].is_system());
        assert_eq!(context[0].content, "You are helpful.");
        assert!(context[1].is_system());
        assert!(context[1].content.contains("Recalled facts"));
        assert!(context[1].content.contains("dark mode"));
        assert_eq!(context[2].role, Role::User);
    }

    #[tokio::test]
    async fn build_context_empty_query_skips_recall() {
        let mut mgr = manager();
        mgr.set_system("sys");
        mgr.save("a stored fact", serde_json::Map::new()).await.unwrap();
        mgr.add_message(Role::User, "hello");

        let context = mgr.build_context("").await.unwrap();
        assert_eq!(context.len(), 2); // system + user, no recall block
    }

    #[tokio::test]
    async fn build_context_filters_by_distance_threshold() {
        let mut mgr = manager().with_distance_threshold(0.05);
        mgr.set_system("sys");
        mgr.save("completely different topic entirely", serde_json::Map::new())
            .await
            .unwrap();
        mgr.add_message(Role::User, "hi");

        // Query shares no vocabulary — distance is far above 0.05.
        let context = mgr.build_context("quantum chromodynamics lattice").await.unwrap();
        assert!(!context.iter().any(|m| m.content.contains("Recalled facts")));
    }

    #[tokio::test]
    async fn build_context_without_system_message() {
        let mut mgr = manager();
        mgr.add_message(Role::User, "no system prompt set");

        let context = mgr.build_context("").await.unwrap();
        assert_eq!(context.len(), 1);
        assert_eq!(context[0].role, Role::User);
    }

    #[tokio::test]
    async fn build_context_has_no_side_effects() {
        let mut mgr = manager();
        mgr.set_system("sys");
        mgr.add_message(Role::User, "hello");

        let before = mgr.get_working_memory().to_vec();
        let _ = mgr.build_context("hello").await.unwrap();
        assert_eq!(mgr.get_working_memory(), before.as_slice());
        assert_eq!(mgr.get_long_term_records().await.unwrap().len(), 0);
    }

    #[tokio::test]
    async fn recall_sorted_and_bounded() {
        let mgr = manager();
        for n in 0..8 {
            mgr.save(&format!("note about topic {n}"), serde_json::Map::new())
                .await
                .unwrap();
        }

        let results = mgr.recall("note about topic 4", 3).await.unwrap();
        assert!(results.len() <= 3);
        for pair in results.windows(2) {
            assert!(pair[0].distance <= pair[1].distance);
        }
    }

    #[tokio::test]
    async fn add_message_trims_to_budget() {
        let mut mgr = MemoryManager::new(
            ShortTermMemory::new(30),
            Arc::new(InMemoryStore::new()),
        );
        mgr.set_system("sys");
        for n in 0..10 {
            mgr.add_message(Role::User, format!("user message number {n}"));
            mgr.add_message(Role::Assistant, format!("assistant reply number {n}"));
        }

        // System survived; window respects the recency floor.
        assert!(mgr.get_working_memory()[0].is_system());
        let users = mgr
            .get_working_memory()
            .iter()
            .filter(|m| m.role == Role::User)
            .count();
        assert!(users >= 2);
    }

    #[tokio::test]
    async fn delete_long_term_roundtrip() {
        let mgr = manager();
        let id = mgr.save("temp fact", serde_json::Map::new()).await.unwrap();
        assert_eq!(mgr.get_long_term_records().await.unwrap().len(), 1);

        mgr.delete_long_term(&id).await.unwrap();
        assert!(mgr.get_long_term_records().await.unwrap().is_empty());
    }
}
