//! Save-memory tool — persists facts and preferences to long-term memory.

use async_trait::async_trait;
use localclaw_core::error::ToolError;
use localclaw_core::tool::Tool;
use localclaw_core::vector::VectorStore;
use std::sync::Arc;

pub struct SaveMemoryTool {
    long_term: Arc<dyn VectorStore>,
}

impl SaveMemoryTool {
    pub fn new(long_term: Arc<dyn VectorStore>) -> Self {
        Self { long_term }
    }
}

#[async_trait]
impl Tool for SaveMemoryTool {
    fn name(&self) -> &str {
        "save_memory"
    }

    fn description(&self) -> &str {
        "Remember a fact or user preference permanently."
    }

    fn parameter_hint(&self) -> &str {
        "fact text to store"
    }

    async fn invoke(&self, input: &str) -> Result<String, ToolError> {
        let text = input.trim();
        if text.is_empty() {
            return Ok("Error: nothing to remember.".into());
        }

        let mut metadata = serde_json::Map::new();
        metadata.insert("source".into(), serde_json::Value::String("agent".into()));

        let id = self
            .long_term
            .store(text, metadata)
            .await
            .map_err(|e| ToolError::ExecutionFailed {
                tool_name: "save_memory".into(),
                reason: e.to_string(),
            })?;

        Ok(format!("Saved to memory (id={id}): {text}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use localclaw_memory::InMemoryStore;

    #[tokio::test]
    async fn saves_and_reports_id() {
        let store = Arc::new(InMemoryStore::new());
        let tool = SaveMemoryTool::new(Arc::clone(&store) as Arc<dyn VectorStore>);

        let out = tool.invoke("User prefers dark mode").await.unwrap();
        assert!(out.starts_with("Saved to memory (id="));
        assert!(out.contains("User prefers dark mode"));
        assert_eq!(store.count().await.unwrap(), 1);

        let records = store.get_all().await.unwrap();
        assert_eq!(records[0].metadata["source"], "agent");
    }

    #[tokio::test]
    async fn empty_input_is_reported_not_raised() {
        let tool = SaveMemoryTool::new(Arc::new(InMemoryStore::new()));
        let out = tool.invoke("   ").await.unwrap();
        assert!(out.contains("nothing to remember"));
    }
}
