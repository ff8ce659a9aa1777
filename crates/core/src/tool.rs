//! Tool trait — the abstraction over agent capabilities.
//!
//! Tools are what let the agent act in the world: search the web, manage
//! to-do lists, save facts to long-term memory. The input protocol is a
//! single plain string because the agent targets small local models that
//! handle one free-form argument far more reliably than nested JSON.

use async_trait::async_trait;
use std::sync::Arc;

use crate::error::ToolError;

/// The core Tool trait.
///
/// Each tool implements this trait and is registered in the [`ToolRegistry`].
/// Tools must tolerate empty input and report their own validation problems
/// in the returned text — a tool failure is data for the reasoning loop,
/// never a control-flow exception.
#[async_trait]
pub trait Tool: Send + Sync {
    /// The unique name of this tool (e.g., "search_internet").
    fn name(&self) -> &str;

    /// What this tool does (injected into the system prompt).
    fn description(&self) -> &str;

    /// Human-readable description of the expected `action_input` string.
    fn parameter_hint(&self) -> &str;

    /// Execute the tool with the given input string.
    async fn invoke(&self, input: &str) -> std::result::Result<String, ToolError>;
}

/// A registry of available tools.
///
/// The reasoning loop uses this to:
/// 1. Render the tool catalogue for the system prompt
/// 2. Look up and invoke tools when the model requests them
///
/// Registration order is preserved — `describe()` must be deterministic so
/// the system prompt is stable across runs (prompt caching, reproducible
/// test fixtures).
#[derive(Default)]
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self { tools: Vec::new() }
    }

    /// Register a tool. Rejects duplicate names — silent shadowing of an
    /// already-registered tool is a configuration bug, not a feature.
    pub fn register(&mut self, tool: Arc<dyn Tool>) -> std::result::Result<(), ToolError> {
        if self.tools.iter().any(|t| t.name() == tool.name()) {
            return Err(ToolError::DuplicateName(tool.name().to_string()));
        }
        self.tools.push(tool);
        Ok(())
    }

    /// Look up a tool by exact name. Never an error for unknown names.
    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.iter().find(|t| t.name() == name).cloned()
    }

    /// All registered tools, in registration order.
    pub fn list(&self) -> &[Arc<dyn Tool>] {
        &self.tools
    }

    /// Number of registered tools.
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Render the tool catalogue for injection into the system prompt.
    ///
    /// One line per tool, in registration order.
    pub fn describe(&self) -> String {
        let mut lines = Vec::with_capacity(self.tools.len());
        for tool in &self.tools {
            lines.push(format!(
                "- {}: {} (action_input: {})",
                tool.name(),
                tool.description(),
                tool.parameter_hint()
            ));
        }
        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A simple test tool for unit tests.
    struct EchoTool;

    #[async_trait]
    impl Tool for EchoTool {
        fn name(&self) -> &str {
            "echo"
        }
        fn description(&self) -> &str {
            "Echoes back the input"
        }
        fn parameter_hint(&self) -> &str {
            "any text"
        }
        async fn invoke(&self, input: &str) -> std::result::Result<String, ToolError> {
            Ok(input.to_string())
        }
    }

    struct UpperTool;

    #[async_trait]
    impl Tool for UpperTool {
        fn name(&self) -> &str {
            "upper"
        }
        fn description(&self) -> &str {
            "Uppercases the input"
        }
        fn parameter_hint(&self) -> &str {
            "any text"
        }
        async fn invoke(&self, input: &str) -> std::result::Result<String, ToolError> {
            Ok(input.to_uppercase())
        }
    }

    #[test]
    fn register_and_lookup() {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(EchoTool)).unwrap();
        assert!(registry.get("echo").is_some());
        assert!(registry.get("nonexistent").is_none());
    }

    #[test]
    fn duplicate_registration_rejected() {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(EchoTool)).unwrap();
        let err = registry.register(Arc::new(EchoTool)).unwrap_err();
        assert!(matches!(err, ToolError::DuplicateName(name) if name == "echo"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn list_preserves_registration_order() {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(UpperTool)).unwrap();
        registry.register(Arc::new(EchoTool)).unwrap();

        let names: Vec<&str> = registry.list().iter().map(|t| t.name()).collect();
        assert_eq!(names, vec!["upper", "echo"]);
    }

    #[test]
    fn describe_is_deterministic_and_ordered() {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(EchoTool)).unwrap();
        registry.register(Arc::new(UpperTool)).unwrap();

        let first = registry.describe();
        let second = registry.describe();
        assert_eq!(first, second);

        let echo_pos = first.find("echo").unwrap();
        let upper_pos = first.find("upper").unwrap();
        assert!(echo_pos < upper_pos);
        assert!(first.contains("(action_input: any text)"));
    }

    #[tokio::test]
    async fn invoke_tool() {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(UpperTool)).unwrap();

        let tool = registry.get("upper").unwrap();
        let out = tool.invoke("hello").await.unwrap();
        assert_eq!(out, "HELLO");
    }

    #[tokio::test]
    async fn tools_tolerate_empty_input() {
        let tool = EchoTool;
        let out = tool.invoke("").await.unwrap();
        assert_eq!(out, "");
    }
}
