//! File-based vector store — persistent JSON-lines storage.
//!
//! Each line of the file is a JSON-encoded `MemoryRecord`, embedding
//! included. Records are loaded into memory on open and flushed to disk on
//! every mutation, giving fast reads with durable writes. Corrupted lines
//! are skipped with a warning rather than poisoning the whole store.
//!
//! Storage location: `~/.localclaw/memory.jsonl`

use async_trait::async_trait;
use localclaw_core::error::MemoryError;
use localclaw_core::vector::{MemoryRecord, MemoryResult, VectorStore};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::embedding::rank_records;
use crate::in_memory::new_record;

/// A JSONL-backed vector store.
pub struct FileStore {
    path: PathBuf,
    records: Arc<RwLock<Vec<MemoryRecord>>>,
}

impl FileStore {
    /// Open a store at the given path.
    ///
    /// If the file exists, records are loaded from it; otherwise the store
    /// starts empty and the file is created on first write.
    pub fn new(path: PathBuf) -> Self {
        let records = Self::load_from_disk(&path);
        debug!(path = %path.display(), count = records.len(), "File vector store loaded");
        Self {
            path,
            records: Arc::new(RwLock::new(records)),
        }
    }

    fn load_from_disk(path: &PathBuf) -> Vec<MemoryRecord> {
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(_) => return Vec::new(),
        };

        content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .filter_map(|line| match serde_json::from_str::<MemoryRecord>(line) {
                Ok(record) => Some(record),
                Err(e) => {
                    warn!(error = %e, "Skipping corrupted memory record");
                    None
                }
            })
            .collect()
    }

    async fn flush(&self) -> Result<(), MemoryError> {
        let records = self.records.read().await;

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                MemoryError::Storage(format!("Failed to create memory directory: {e}"))
            })?;
        }

        let mut content = String::new();
        for record in records.iter() {
            let line = serde_json::to_string(record).map_err(|e| {
                MemoryError::Storage(format!("Failed to serialize memory record: {e}"))
            })?;
            content.push_str(&line);
            content.push('\n');
        }

        std::fs::write(&self.path, &content)
            .map_err(|e| MemoryError::Storage(format!("Failed to write memory file: {e}")))
    }
}

#[async_trait]
impl VectorStore for FileStore {
    fn name(&self) -> &str {
        "file"
    }

    async fn store(
        &self,
        text: &str,
        metadata: serde_json::Map<String, serde_json::Value>,
    ) -> Result<String, MemoryError> {
        let record = new_record(text, metadata);
        let id = record.id.clone();
        self.records.write().await.push(record);
        self.flush().await?;
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
        let mut records = self.records.write().await;
        let len_before = records.len();
        records.retain(|r| r.id != id);
        let deleted = records.len() < len_before;
        drop(records);
        if deleted {
            self.flush().await?;
        }
        Ok(())
    }

    async fn count(&self) -> Result<usize, MemoryError> {
        Ok(self.records.read().await.len())
    }
}
