//! JSON-file backed persistence for to-do items.
//!
//! Items are grouped into named lists (categories). The whole collection
//! lives in one JSON file, loaded on open and flushed on every mutation.
//! An older on-disk format (a bare array of items) is migrated on load.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, warn};
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum TodoError {
    #[error("Storage error: {0}")]
    Storage(String),
}

/// Status of a to-do item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TodoStatus {
    Pending,
    Done,
}

/// A single to-do entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TodoItem {
    pub id: String,

    pub text: String,

    /// The list this item belongs to.
    #[serde(default = "default_category")]
    pub category: String,

    #[serde(default = "default_status")]
    pub status: TodoStatus,

    pub created_at: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

fn default_category() -> String {
    "General".into()
}
fn default_status() -> TodoStatus {
    TodoStatus::Pending
}

impl TodoItem {
    fn new(text: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().simple().to_string()[..8].to_string(),
            text: text.into(),
            category: category.into(),
            status: TodoStatus::Pending,
            created_at: Utc::now(),
            completed_at: None,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == TodoStatus::Pending
    }
}

/// On-disk shape: items plus explicitly registered category names
/// (so an emptied list keeps existing).
#[derive(Debug, Default, Serialize, Deserialize)]
struct TodoFile {
    #[serde(default)]
    items: Vec<TodoItem>,

    #[serde(default)]
    categories: Vec<String>,
}

/// CRUD operations over to-do items, persisted as a JSON file.
pub struct TodoStore {
    path: PathBuf,
    data: Arc<RwLock<TodoFile>>,
}

impl TodoStore {
    /// Open a store at the given path; starts empty if the file is missing.
    pub fn new(path: PathBuf) -> Self {
        let data = Self::load_from_disk(&path);
        debug!(path = %path.display(), count = data.items.len(), "To-do store loaded");
        Self {
            path,
            data: Arc::new(RwLock::new(data)),
        }
    }

    fn load_from_disk(path: &PathBuf) -> TodoFile {
        let raw = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(_) => {
                return TodoFile {
                    items: Vec::new(),
                    categories: vec![default_category()],
                };
            }
        };

        // Current format: {items, categories}. Legacy format: bare item list.
        if let Ok(file) = serde_json::from_str::<TodoFile>(&raw)
            && (!file.items.is_empty() || !file.categories.is_empty())
        {
            return file;
        }
        match serde_json::from_str::<Vec<TodoItem>>(&raw) {
            Ok(items) => {
                let mut categories: Vec<String> =
                    items.iter().map(|i| i.category.clone()).collect();
                categories.push(default_category());
                categories.sort();
                categories.dedup();
                TodoFile { items, categories }
            }
            Err(e) => {
                warn!(error = %e, "Unreadable to-do file, starting empty");
                TodoFile {
                    items: Vec::new(),
                    categories: vec![default_category()],
                }
            }
        }
    }

    async fn flush(&self) -> Result<(), TodoError> {
        let data = self.data.read().await;

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| TodoError::Storage(format!("Failed to create data directory: {e}")))?;
        }

        let json = serde_json::to_string_pretty(&*data)
            .map_err(|e| TodoError::Storage(format!("Failed to serialize to-dos: {e}")))?;
        std::fs::write(&self.path, json)
            .map_err(|e| TodoError::Storage(format!("Failed to write to-do file: {e}")))
    }

    // -- read --------------------------------------------------------------

    /// Every to-do item.
    pub async fn get_all(&self) -> Vec<TodoItem> {
        self.data.read().await.items.clone()
    }

    /// Only items still pending.
    pub async fn get_pending(&self) -> Vec<TodoItem> {
        self.data
            .read()
            .await
            .items
            .iter()
            .filter(|i| i.is_pending())
            .cloned()
            .collect()
    }

    /// All known list names, including empty lists.
    pub async fn get_categories(&self) -> Vec<String> {
        let data = self.data.read().await;
        let mut categories = data.categories.clone();
        categories.extend(data.items.iter().map(|i| i.category.clone()));
        categories.sort();
        categories.dedup();
        categories
    }

    // -- write -------------------------------------------------------------

    /// Register a list name even if it has no items yet.
    pub async fn ensure_category(&self, category: &str) -> Result<(), TodoError> {
        {
            let mut data = self.data.write().await;
            if data.categories.iter().any(|c| c == category) {
                return Ok(());
            }
            data.categories.push(category.to_string());
        }
        self.flush().await
    }

    /// Create and persist a new item. Returns the created item.
    pub async fn add(&self, text: &str, category: &str) -> Result<TodoItem, TodoError> {
        let item = TodoItem::new(text, category);
        {
            let mut data = self.data.write().await;
            if !data.categories.iter().any(|c| c == category) {
                data.categories.push(category.to_string());
            }
            data.items.push(item.clone());
        }
        self.flush().await?;
        Ok(item)
    }

    /// Add multiple items at once, skipping blank texts.
    pub async fn bulk_add(
        &self,
        texts: &[String],
        category: &str,
    ) -> Result<Vec<TodoItem>, TodoError> {
        let new_items: Vec<TodoItem> = texts
            .iter()
            .filter(|t| !t.trim().is_empty())
            .map(|t| TodoItem::new(t.trim(), category))
            .collect();
        {
            let mut data = self.data.write().await;
            if !data.categories.iter().any(|c| c == category) {
                data.categories.push(category.to_string());
            }
            data.items.extend(new_items.iter().cloned());
        }
        self.flush().await?;
        Ok(new_items)
    }

    /// Toggle an item between pending and done. Returns the updated item,
    /// or `None` if the id is unknown.
    pub async fn toggle_status(&self, item_id: &str) -> Result<Option<TodoItem>, TodoError> {
        let updated = {
            let mut data = self.data.write().await;
            let Some(item) = data.items.iter_mut().find(|i| i.id == item_id) else {
                return Ok(None);
            };
            item.status = match item.status {
                TodoStatus::Pending => TodoStatus::Done,
                TodoStatus::Done => TodoStatus::Pending,
            };
            item.completed_at = match item.status {
                TodoStatus::Done => Some(Utc::now()),
                TodoStatus::Pending => None,
            };
            item.clone()
        };
        self.flush().await?;
        Ok(Some(updated))
    }

    /// Remove an item by id. Returns whether anything was removed.
    pub async fn delete_item(&self, item_id: &str) -> Result<bool, TodoError> {
        let deleted = {
            let mut data = self.data.write().await;
            let before = data.items.len();
            data.items.retain(|i| i.id != item_id);
            data.items.len() < before
        };
        if deleted {
            self.flush().await?;
        }
        Ok(deleted)
    }

    /// Remove an entire list by name. Returns the number of deleted items.
    pub async fn delete_category(&self, category: &str) -> Result<usize, TodoError> {
        let count = {
            let mut data = self.data.write().await;
            let before = data.items.len();
            data.items.retain(|i| i.category != category);
            data.categories.retain(|c| c != category);
            before - data.items.len()
        };
        self.flush().await?;
        Ok(count)
    }
}
