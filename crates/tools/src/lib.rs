//! Built-in tool implementations for localclaw.
//!
//! Tools give the agent the ability to act: search the web, manage to-do
//! lists, and save facts to long-term memory. Every tool captures its
//! dependencies at construction — there is no process-wide mutable state.

pub mod memory_save;
pub mod search;
pub mod todo;

use localclaw_core::error::ToolError;
use localclaw_core::tool::ToolRegistry;
use localclaw_core::vector::VectorStore;
use localclaw_todo::TodoStore;
use std::sync::Arc;

pub use memory_save::SaveMemoryTool;
pub use search::SearchInternetTool;
pub use todo::{TodoAddTool, TodoDeleteTool, TodoReadTool, TodoToggleTool};

/// Create the default tool registry with all built-in tools.
///
/// Registration order is stable — it determines the catalogue order in the
/// system prompt.
pub fn default_registry(
    todo_store: Arc<TodoStore>,
    long_term: Arc<dyn VectorStore>,
) -> Result<ToolRegistry, ToolError> {
    let mut registry = ToolRegistry::new();
    registry.register(Arc::new(SearchInternetTool::new()))?;
    registry.register(Arc::new(TodoReadTool::new(Arc::clone(&todo_store))))?;
    registry.register(Arc::new(TodoAddTool::new(Arc::clone(&todo_store))))?;
    registry.register(Arc::new(TodoDeleteTool::new(Arc::clone(&todo_store))))?;
    registry.register(Arc::new(TodoToggleTool::new(todo_store)))?;
    registry.register(Arc::new(SaveMemoryTool::new(long_term)))?;
    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use localclaw_memory::InMemoryStore;
    use tempfile::NamedTempFile;

    #[test]
    fn default_registry_order_is_stable() {
        let tmp = NamedTempFile::new().unwrap();
        let path = tmp.path().to_path_buf();
        drop(tmp);

        let registry = default_registry(
            Arc::new(TodoStore::new(path)),
            Arc::new(InMemoryStore::new()),
        )
        .unwrap();

        let names: Vec<&str> = registry.list().iter().map(|t| t.name()).collect();
        assert_eq!(
            names,
            vec![
                "search_internet",
                "todo_read",
                "todo_add",
                "todo_delete",
                "todo_toggle",
                "save_memory",
            ]
        );

        let catalogue = registry.describe();
        assert!(catalogue.contains("search_internet"));
        assert!(catalogue.contains("save_memory"));
    }
}
