//! In-memory vector store — useful for testing and ephemeral sessions.

use async_trait::async_trait;
use chrono::Utc;
use localclaw_core::error::MemoryError;
use localclaw_core::vector::{MemoryRecord, MemoryResult, VectorStore};
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::embedding::{embed, rank_records};

/// A vector store that keeps records in a Vec. Nothing is persisted.
pub struct InMemoryStore {
    records: Arc<RwLock<Vec<MemoryRecord>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            records: Arc::new(RwLock::new(Vec::new())),
        }
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Build a record with a fresh id, computed embedding, and store timestamp.
pub(crate) fn new_record(
    text: &str,
    mut metadata: serde_json::Map<String, serde_json::Value>,
) -> MemoryRecord {
    metadata
        .entry("stored_at".to_string())
        .or_insert_with(|| serde_json::Value::String(Utc::now().to_rfc3339()));

    MemoryRecord {
        id: Uuid::new_v4().simple().to_string()[..12].to_string(),
        text: text.to_string(),
        metadata,
        embedding: Some(embed(text)),
    }
}

#[async_trait]
impl VectorStore for InMemoryStore {
    fn name(&self) -> &str {
        "in_memory"
    }

    async fn store(
        &self,
        text: &str,
        metadata: serde_json::Map<String, serde_json::Value>,
    ) -> Result<String, MemoryError> {
        let record = new_record(text, metadata);
        let id = record.id.clone();
        self.records.write().await.push(record);
        Ok(id)
    }

    async fn query(&self, text: &str, n: usize) -> Result<Vec<MemoryResult>, MemoryError> {
        let records = self.records.read().await;
        Ok(rank_records(&records, text, n))
    }

    async fn get_all(&self) -> Result<Vec<MemoryRecord>, MemoryError> {
        Ok(self.records.read().await.clone())
    }

    async fn delete(&self, id: &str) -> Result<(), MemoryError> {
        self.records.write().await.retain(|r| r.id != id);
        Ok(())
    }

    async fn count(&self) -> Result<usize, MemoryError> {
        Ok(self.records.read().await.len())
    }
}
