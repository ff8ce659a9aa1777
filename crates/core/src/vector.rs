//! VectorStore trait — the gateway to persistent long-term memory.
//!
//! Long-term memory is a similarity-searchable store of text snippets. The
//! agent core only proxies: records are owned by the backing store, and the
//! trait is the complete consumed surface. Implementations live in the
//! memory crate (in-memory for tests, JSONL file for persistence).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::MemoryError;

/// A stored long-term memory record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryRecord {
    /// Unique ID assigned by the store
    pub id: String,

    /// The remembered text
    pub text: String,

    /// Arbitrary metadata (source, timestamps, tags)
    #[serde(default)]
    pub metadata: serde_json::Map<String, serde_json::Value>,

    /// Embedding vector, when the backend stores one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,
}

/// A single similarity-search result.
///
/// `distance` is non-negative; smaller means more relevant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryResult {
    pub id: String,
    pub text: String,
    pub distance: f32,
    #[serde(default)]
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

/// The long-term memory gateway trait.
///
/// Contract notes:
/// - `store` is not idempotent — storing identical text twice creates two
///   distinct records.
/// - `query` results are sorted by ascending distance and number at most `n`.
/// - `delete` of an unknown id is a no-op, not an error.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// The backend name (e.g., "in_memory", "file").
    fn name(&self) -> &str;

    /// Embed and store a text snippet. Returns the new record's ID.
    async fn store(
        &self,
        text: &str,
        metadata: serde_json::Map<String, serde_json::Value>,
    ) -> std::result::Result<String, MemoryError>;

    /// Retrieve the up-to-`n` most relevant records for `text`.
    async fn query(
        &self,
        text: &str,
        n: usize,
    ) -> std::result::Result<Vec<MemoryResult>, MemoryError>;

    /// Return every stored record (inspection tooling).
    async fn get_all(&self) -> std::result::Result<Vec<MemoryRecord>, MemoryError>;

    /// Remove a record by ID. No-op if absent.
    async fn delete(&self, id: &str) -> std::result::Result<(), MemoryError>;

    /// Number of stored records.
    async fn count(&self) -> std::result::Result<usize, MemoryError>;
}
