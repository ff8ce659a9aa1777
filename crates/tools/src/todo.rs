//! To-do list tools consumed by the agent.
//!
//! Tools:
//! - `todo_read`   — show all lists, or tasks in a specific list
//! - `todo_add`    — add one or more tasks to a list (auto-creates list)
//! - `todo_delete` — delete a task by ID, or an entire list by name
//! - `todo_toggle` — invert task status (pending <-> done)
//!
//! The input protocol is plain strings with `|` separators, chosen because
//! small local models produce it far more reliably than nested JSON.

use async_trait::async_trait;
use localclaw_core::error::ToolError;
use localclaw_core::tool::Tool;
use localclaw_todo::{TodoItem, TodoStatus, TodoStore};
use std::collections::BTreeMap;
use std::sync::Arc;

const DEFAULT_LIST: &str = "General";

fn storage_error(e: localclaw_todo::TodoError) -> ToolError {
    ToolError::ExecutionFailed {
        tool_name: "todo".into(),
        reason: e.to_string(),
    }
}

fn render_item(item: &TodoItem) -> String {
    let mark = match item.status {
        TodoStatus::Done => "[x]",
        TodoStatus::Pending => "[ ]",
    };
    format!("  {mark} {} | {}", item.id, item.text)
}

/// Group items by list name, preserving a stable (sorted) order.
fn group_by_category(items: Vec<TodoItem>) -> BTreeMap<String, Vec<TodoItem>> {
    let mut grouped: BTreeMap<String, Vec<TodoItem>> = BTreeMap::new();
    for item in items {
        grouped.entry(item.category.clone()).or_default().push(item);
    }
    grouped
}

// ---- todo_read -----------------------------------------------------------

pub struct TodoReadTool {
    store: Arc<TodoStore>,
}

impl TodoReadTool {
    pub fn new(store: Arc<TodoStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Tool for TodoReadTool {
    fn name(&self) -> &str {
        "todo_read"
    }

    fn description(&self) -> &str {
        "Read all lists and tasks, or a specific list. ALWAYS call this before any other todo tool."
    }

    fn parameter_hint(&self) -> &str {
        "'all' to see everything, or a list name to see one list"
    }

    async fn invoke(&self, input: &str) -> Result<String, ToolError> {
        let items = self.store.get_all().await;
        if items.is_empty() {
            return Ok("No lists or tasks exist yet.".into());
        }

        let grouped = group_by_category(items);
        let query = input.trim().to_lowercase();

        if !query.is_empty() && query != "all" {
            for (category, cat_items) in &grouped {
                if category.to_lowercase() == query {
                    let mut lines = vec![format!("== {category} ==")];
                    lines.extend(cat_items.iter().map(render_item));
                    return Ok(lines.join("\n"));
                }
            }
            let available: Vec<&str> = grouped.keys().map(|c| c.as_str()).collect();
            return Ok(format!(
                "List '{}' not found. Available lists: {}",
                input.trim(),
                available.join(", ")
            ));
        }

        let mut lines: Vec<String> = Vec::new();
        for (category, cat_items) in &grouped {
            lines.push(format!("== {category} =="));
            lines.extend(cat_items.iter().map(render_item));
            lines.push(String::new());
        }
        Ok(lines.join("\n").trim().to_string())
    }
}

// ---- todo_add ------------------------------------------------------------

pub struct TodoAddTool {
    store: Arc<TodoStore>,
}

impl TodoAddTool {
    pub fn new(store: Arc<TodoStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Tool for TodoAddTool {
    fn name(&self) -> &str {
        "todo_add"
    }

    fn description(&self) -> &str {
        "Add tasks to a list. List is created automatically if it does not exist."
    }

    fn parameter_hint(&self) -> &str {
        "ListName | task1 | task2 (or just: task text for General)"
    }

    async fn invoke(&self, input: &str) -> Result<String, ToolError> {
        let parts: Vec<&str> = input.split('|').map(str::trim).collect();

        if parts.len() == 1 {
            // No pipe: single task in the default list.
            let text = parts[0];
            if text.is_empty() {
                return Ok("Error: empty task.".into());
            }
            let item = self
                .store
                .add(text, DEFAULT_LIST)
                .await
                .map_err(storage_error)?;
            return Ok(format!(
                "Added to '{DEFAULT_LIST}': [{}] {}",
                item.id, item.text
            ));
        }

        // First segment is the list name, the rest are tasks.
        let category = parts[0];
        let tasks: Vec<String> = parts[1..]
            .iter()
            .filter(|t| !t.is_empty())
            .map(|t| t.to_string())
            .collect();

        if category.is_empty() {
            return Ok("Error: empty list name.".into());
        }
        if tasks.is_empty() {
            return Ok("Error: no tasks provided.".into());
        }

        let added = self
            .store
            .bulk_add(&tasks, category)
            .await
            .map_err(storage_error)?;
        let lines: Vec<String> = added
            .iter()
            .map(|i| format!("  [{}] {}", i.id, i.text))
            .collect();
        Ok(format!(
            "Added {} task(s) to '{category}':\n{}",
            added.len(),
            lines.join("\n")
        ))
    }
}

// ---- todo_delete ---------------------------------------------------------

pub struct TodoDeleteTool {
    store: Arc<TodoStore>,
}

impl TodoDeleteTool {
    pub fn new(store: Arc<TodoStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Tool for TodoDeleteTool {
    fn name(&self) -> &str {
        "todo_delete"
    }

    fn description(&self) -> &str {
        "Delete a task by its ID, or delete an entire list by its name."
    }

    fn parameter_hint(&self) -> &str {
        "task ID (e.g. a1b2c3d4) or list name (e.g. Shopping)"
    }

    async fn invoke(&self, input: &str) -> Result<String, ToolError> {
        let target = input.trim();
        if target.is_empty() {
            return Ok("Error: specify a task ID or list name.".into());
        }

        // Try as task ID first.
        if self.store.delete_item(target).await.map_err(storage_error)? {
            return Ok(format!("Deleted task '{target}'."));
        }

        // Fall back to whole-list deletion.
        let count = self
            .store
            .delete_category(target)
            .await
            .map_err(storage_error)?;
        if count > 0 {
            return Ok(format!("Deleted list '{target}' ({count} task(s) removed)."));
        }

        Ok(format!("Nothing found with ID or list name '{target}'."))
    }
}

// ---- todo_toggle ---------------------------------------------------------

pub struct TodoToggleTool {
    store: Arc<TodoStore>,
}

impl TodoToggleTool {
    pub fn new(store: Arc<TodoStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Tool for TodoToggleTool {
    fn name(&self) -> &str {
        "todo_toggle"
    }

    fn description(&self) -> &str {
        "Toggle a task between pending and done. Use the task ID from todo_read."
    }

    fn parameter_hint(&self) -> &str {
        "task ID (e.g. a1b2c3d4)"
    }

    async fn invoke(&self, input: &str) -> Result<String, ToolError> {
        let item_id = input.trim();
        if item_id.is_empty() {
            return Ok("Error: specify a task ID.".into());
        }

        match self
            .store
            .toggle_status(item_id)
            .await
            .map_err(storage_error)?
        {
            Some(item) => {
                let status = match item.status {
                    TodoStatus::Done => "done",
                    TodoStatus::Pending => "pending",
                };
                Ok(format!("Toggled [{}] {} -> {status}", item.id, item.text))
            }
            None => Ok(format!("No task found with ID '{item_id}'.")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::NamedTempFile;

    fn temp_store() -> Arc<TodoStore> {
        let tmp = NamedTempFile::new().unwrap();
        let path: PathBuf = tmp.path().to_path_buf();
        drop(tmp);
        Arc::new(TodoStore::new(path))
    }

    #[tokio::test]
    async fn read_empty_store() {
        let tool = TodoReadTool::new(temp_store());
        let out = tool.invoke("all").await.unwrap();
        assert_eq!(out, "No lists or tasks exist yet.");
    }

    #[tokio::test]
    async fn add_single_task_to_general() {
        let store = temp_store();
        let tool = TodoAddTool::new(Arc::clone(&store));

        let out = tool.invoke("Buy groceries").await.unwrap();
        assert!(out.contains("Added to 'General'"));
        assert!(out.contains("Buy groceries"));
        assert_eq!(store.get_all().await.len(), 1);
    }

    #[tokio::test]
    async fn add_piped_tasks_to_named_list() {
        let store = temp_store();
        let tool = TodoAddTool::new(Arc::clone(&store));

        let out = tool
            .invoke("Fitness | Run 5km | Do push-ups")
            .await
            .unwrap();
        assert!(out.contains("Added 2 task(s) to 'Fitness'"));

        let items = store.get_all().await;
        assert_eq!(items.len(), 2);
        assert!(items.iter().all(|i| i.category == "Fitness"));
    }

    #[tokio::test]
    async fn add_rejects_empty_input_as_text() {
        let tool = TodoAddTool::new(temp_store());
        assert!(tool.invoke("").await.unwrap().contains("Error: empty task"));
        assert!(
            tool.invoke("| only separators |")
                .await
                .unwrap()
                .contains("Error: empty list name")
        );
        assert!(
            tool.invoke("List | |")
                .await
                .unwrap()
                .contains("Error: no tasks provided")
        );
    }

    #[tokio::test]
    async fn read_specific_list_case_insensitive() {
        let store = temp_store();
        store.add("milk", "Shopping").await.unwrap();
        store.add("run", "Fitness").await.unwrap();

        let tool = TodoReadTool::new(store);
        let out = tool.invoke("shopping").await.unwrap();
        assert!(out.contains("== Shopping =="));
        assert!(out.contains("milk"));
        assert!(!out.contains("run"));
    }

    #[tokio::test]
    async fn read_unknown_list_reports_available() {
        let store = temp_store();
        store.add("milk", "Shopping").await.unwrap();

        let tool = TodoReadTool::new(store);
        let out = tool.invoke("Work").await.unwrap();
        assert!(out.contains("List 'Work' not found"));
        assert!(out.contains("Shopping"));
    }

    #[tokio::test]
    async fn read_all_groups_by_list() {
        let store = temp_store();
        store.add("milk", "Shopping").await.unwrap();
        store.add("run", "Fitness").await.unwrap();

        let tool = TodoReadTool::new(store);
        let out = tool.invoke("all").await.unwrap();
        assert!(out.contains("== Fitness =="));
        assert!(out.contains("== Shopping =="));
        assert!(out.contains("[ ]"));
    }

    #[tokio::test]
    async fn delete_by_id_then_by_list_name() {
        let store = temp_store();
        let item = store.add("milk", "Shopping").await.unwrap();
        store.add("eggs", "Shopping").await.unwrap();

        let tool = TodoDeleteTool::new(Arc::clone(&store));

        let out = tool.invoke(&item.id).await.unwrap();
        assert!(out.contains(&format!("Deleted task '{}'", item.id)));

        let out = tool.invoke("Shopping").await.unwrap();
        assert!(out.contains("Deleted list 'Shopping' (1 task(s) removed)"));

        let out = tool.invoke("Shopping").await.unwrap();
        assert!(out.contains("Nothing found"));
    }

    #[tokio::test]
    async fn toggle_round_trip() {
        let store = temp_store();
        let item = store.add("milk", "General").await.unwrap();

        let tool = TodoToggleTool::new(store);

        let out = tool.invoke(&item.id).await.unwrap();
        assert!(out.contains("-> done"));

        let out = tool.invoke(&item.id).await.unwrap();
        assert!(out.contains("-> pending"));

        let out = tool.invoke("zzzzzzzz").await.unwrap();
        assert!(out.contains("No task found"));
    }

    #[tokio::test]
    async fn tools_tolerate_empty_input() {
        let store = temp_store();
        let delete = TodoDeleteTool::new(Arc::clone(&store));
        let toggle = TodoToggleTool::new(store);

        assert!(delete.invoke("").await.unwrap().starts_with("Error:"));
        assert!(toggle.invoke("").await.unwrap().starts_with("Error:"));
    }
}
