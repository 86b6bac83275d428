//! Tool registry consulted when the model asks for a function call

use std::sync::Arc;

use async_trait::async_trait;
use indexmap::IndexMap;
use serde_json::Value;
use thiserror::Error;

use crate::types::ToolDefinition;

/// Errors a tool can report
#[derive(Debug, Error)]
pub enum ToolError {
    /// Arguments did not match the tool's schema
    #[error("invalid arguments: {0}")]
    InvalidArguments(String),

    /// The tool ran and failed
    #[error("{0}")]
    Failed(String),
}

/// Named async capability the model can invoke
#[async_trait]
pub trait Tool: Send + Sync {
    /// Schema advertised to the backend
    fn definition(&self) -> ToolDefinition;

    /// Run the tool on behalf of a user and return its textual result
    async fn call(&self, app_id: &str, user_id: &str, channel: &str, arguments: Value) -> Result<String, ToolError>;
}

/// Registered tools keyed by name
///
/// Populated once at startup and read-only afterwards, so it is shared
/// across requests behind an `Arc` without locking.
#[derive(Default, Clone)]
pub struct ToolRegistry {
    tools: IndexMap<String, (ToolDefinition, Arc<dyn Tool>)>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool under its definition's name, replacing any previous one
    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        let definition = tool.definition();
        tracing::debug!(tool = %definition.name, "registered tool");
        self.tools.insert(definition.name.clone(), (definition, tool));
    }

    /// Resolve a tool by name
    pub fn lookup(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).map(|(_, tool)| Arc::clone(tool))
    }

    /// Definitions of every registered tool, in registration order
    pub fn schemas(&self) -> Vec<ToolDefinition> {
        self.tools.values().map(|(definition, _)| definition.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.tools.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    struct Echo(&'static str);

    #[async_trait]
    impl Tool for Echo {
        fn definition(&self) -> ToolDefinition {
            ToolDefinition {
                name: self.0.to_owned(),
                description: "Echo the arguments".to_owned(),
                parameters: json!({"type": "object"}),
            }
        }

        async fn call(&self, _: &str, user_id: &str, _: &str, arguments: Value) -> Result<String, ToolError> {
            Ok(format!("{user_id}:{arguments}"))
        }
    }

    #[test]
    fn unknown_name_is_unresolved() {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(Echo("echo")));
        assert!(registry.lookup("foo").is_none());
        assert!(registry.lookup("echo").is_some());
    }

    #[test]
    fn schemas_keep_registration_order() {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(Echo("b")));
        registry.register(Arc::new(Echo("a")));
        let names: Vec<_> = registry.schemas().into_iter().map(|d| d.name).collect();
        assert_eq!(names, ["b", "a"]);
        assert_eq!(registry.len(), 2);
    }

    #[tokio::test]
    async fn resolved_tool_is_callable() {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(Echo("echo")));
        let tool = registry.lookup("echo").unwrap();
        let out = tool.call("app", "u1", "room", json!({"x": 1})).await.unwrap();
        assert_eq!(out, r#"u1:{"x":1}"#);
    }
}
