//! AgentCore — the composition root and public API.
//!
//! Constructs and owns every sub-component; external callers (the CLI, or
//! any other front end) never instantiate the client, memory manager, or
//! registry directly. One instance serves one conversation: turns are
//! serialized by `handle_message` taking `&mut self`, so a second turn
//! cannot start while one is in flight.

use localclaw_config::AppSettings;
use localclaw_core::error::Error;
use localclaw_core::message::Message;
use localclaw_core::tool::ToolRegistry;
use localclaw_core::vector::{MemoryRecord, MemoryResult};
use localclaw_memory::{FileStore, MemoryManager, ShortTermMemory};
use localclaw_providers::OllamaClient;
use localclaw_todo::{TodoItem, TodoStore};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use crate::proactivity::ProactivityEngine;
use crate::prompts::build_system_prompt;
use crate::reasoning::{AgentResponse, ReasoningLoop, ThoughtStep};

/// Public API consumed by the presentation layer.
pub struct AgentCore {
    settings: AppSettings,
    client: Arc<OllamaClient>,
    todo_store: Arc<TodoStore>,
    memory: MemoryManager,
    tools: Arc<ToolRegistry>,
    reasoning: ReasoningLoop,
    proactivity: ProactivityEngine,
    last_trace: Vec<ThoughtStep>,
}

impl AgentCore {
    /// Build an agent from settings, with data files in the default
    /// localclaw directory.
    pub fn new(settings: AppSettings) -> Result<Self, Error> {
        Self::with_paths(
            settings,
            AppSettings::todos_path(),
            AppSettings::memory_path(),
        )
    }

    /// Build an agent with explicit data file locations (tests, sandboxes).
    pub fn with_paths(
        settings: AppSettings,
        todos_path: PathBuf,
        memory_path: PathBuf,
    ) -> Result<Self, Error> {
        let client = Arc::new(OllamaClient::new(&settings.ollama));
        let todo_store = Arc::new(TodoStore::new(todos_path));
        let long_term = Arc::new(FileStore::new(memory_path));

        let memory = MemoryManager::new(
            ShortTermMemory::new(settings.ollama.context_window),
            long_term.clone(),
        )
        .with_recall_limit(settings.memory.recall_limit)
        .with_distance_threshold(settings.memory.distance_threshold);

        let tools = Arc::new(localclaw_tools::default_registry(
            Arc::clone(&todo_store),
            long_term,
        )?);

        let llm: Arc<dyn localclaw_core::client::LlmClient> = client.clone();
        let reasoning = ReasoningLoop::new(llm, Arc::clone(&tools));
        let proactivity = ProactivityEngine::new(Arc::clone(&todo_store));

        let mut agent = Self {
            settings,
            client,
            todo_store,
            memory,
            tools,
            reasoning,
            proactivity,
            last_trace: Vec::new(),
        };
        agent.refresh_system_prompt();

        info!(tool_count = agent.tools.len(), "Agent core initialized");
        Ok(agent)
    }

    // -- message handling --------------------------------------------------

    /// Process a user message through the full pipeline.
    pub async fn handle_message(&mut self, user_input: &str) -> Result<AgentResponse, Error> {
        self.refresh_system_prompt();
        let response = self.reasoning.run(&mut self.memory, user_input).await?;
        self.last_trace = response.thought_trace.clone();
        Ok(response)
    }

    // -- proactivity -------------------------------------------------------

    /// Check startup and task-update triggers for a suggestion to display.
    pub async fn get_proactive_message(&mut self) -> Option<String> {
        if let Some(msg) = self.proactivity.check_on_startup().await {
            return Some(msg);
        }
        self.proactivity.check_after_task_update().await
    }

    // -- introspection -----------------------------------------------------

    /// The raw transcript window (debug tooling).
    pub fn get_working_memory(&self) -> &[Message] {
        self.memory.get_working_memory()
    }

    /// The most recent turn's thought trace.
    pub fn get_thought_trace(&self) -> &[ThoughtStep] {
        &self.last_trace
    }

    /// Every long-term memory record.
    pub async fn get_long_term_records(&self) -> Result<Vec<MemoryRecord>, Error> {
        Ok(self.memory.get_long_term_records().await?)
    }

    /// Search long-term memory (debug query tester).
    pub async fn query_long_term(
        &self,
        query: &str,
        n: usize,
    ) -> Result<Vec<MemoryResult>, Error> {
        Ok(self.memory.recall(query, n).await?)
    }

    /// Delete a long-term memory record by id.
    pub async fn delete_memory(&self, id: &str) -> Result<(), Error> {
        Ok(self.memory.delete_long_term(id).await?)
    }

    /// All to-do items.
    pub async fn get_todos(&self) -> Vec<TodoItem> {
        self.todo_store.get_all().await
    }

    // -- settings ----------------------------------------------------------

    /// Hot-reload persona / model settings without recreating memory.
    pub fn reload_settings(&mut self, settings: AppSettings) {
        self.client.set_model(settings.ollama.model.clone());
        self.settings = settings;
        self.refresh_system_prompt();
    }

    /// Is the backend reachable with the configured model?
    pub async fn health_check(&self) -> bool {
        use localclaw_core::client::LlmClient;
        self.client.health_check().await
    }

    /// Model names available on the backend.
    pub async fn list_models(&self) -> Result<Vec<String>, Error> {
        use localclaw_core::client::LlmClient;
        Ok(self.client.list_models().await?)
    }

    // -- internal ----------------------------------------------------------

    /// Rebuild the system prompt from current settings and tools.
    fn refresh_system_prompt(&mut self) {
        let prompt = build_system_prompt(
            &self.settings.persona,
            &self.settings.user,
            &self.tools.describe(),
        );
        self.memory.set_system(prompt);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_agent() -> (AgentCore, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let agent = AgentCore::with_paths(
            AppSettings::default(),
            dir.path().join("todos.json"),
            dir.path().join("memory.jsonl"),
        )
        .unwrap();
        (agent, dir)
    }

    #[test]
    fn system_prompt_set_on_construction() {
        let (agent, _dir) = test_agent();
        let window = agent.get_working_memory();
        assert_eq!(window.len(), 1);
        assert!(window[0].is_system());
        assert!(window[0].content.contains("You are Claw"));
        assert!(window[0].content.contains("search_internet"));
    }

    #[test]
    fn reload_settings_updates_persona() {
        let (mut agent, _dir) = test_agent();

        let mut settings = AppSettings::default();
        settings.persona.name = "Scout".into();
        settings.ollama.model = "qwen2.5:3b".into();
        agent.reload_settings(settings);

        assert!(agent.get_working_memory()[0].content.contains("You are Scout"));
    }

    #[tokio::test]
    async fn proactive_message_reflects_pending_todos() {
        let (mut agent, _dir) = test_agent();
        assert!(agent.get_proactive_message().await.is_none());

        agent
            .todo_store
            .add("check the weather tomorrow", "General")
            .await
            .unwrap();

        // Startup already latched; the task-update heuristic fires instead.
        let msg = agent.get_proactive_message().await.unwrap();
        assert!(msg.contains("check the weather tomorrow"));
    }

    #[tokio::test]
    async fn long_term_accessors_roundtrip() {
        let (agent, _dir) = test_agent();

        let tool = agent.tools.get("save_memory").unwrap();
        tool.invoke("the user's cat is named Miso").await.unwrap();

        let records = agent.get_long_term_records().await.unwrap();
        assert_eq!(records.len(), 1);

        let results = agent
            .query_long_term("the user's cat is named Miso", 3)
            .await
            .unwrap();
        assert_eq!(results[0].text, "the user's cat is named Miso");

        agent.delete_memory(&records[0].id).await.unwrap();
        assert!(agent.get_long_term_records().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn thought_trace_starts_empty() {
        let (agent, _dir) = test_agent();
        assert!(agent.get_thought_trace().is_empty());
    }
}
