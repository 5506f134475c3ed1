//! Tool registry

use crate::Tool;
use chatbot_core::{Error, Result};
use std::sync::Arc;
use tracing::debug;

/// Ordered set of tools, looked up by name
///
/// Registration order is kept so the tool list sent to the model is stable
/// across calls.
#[derive(Default)]
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
}

impl ToolRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool; names must be unique
    pub fn register(&mut self, tool: Arc<dyn Tool>) -> Result<()> {
        if self.get(tool.name()).is_some() {
            return Err(Error::InitializationFailed(format!(
                "Tool '{}' is already registered",
                tool.name()
            )));
        }
        debug!(tool = tool.name(), "Registering tool");
        self.tools.push(tool);
        Ok(())
    }

    /// Builder-style registration
    pub fn with_tool(mut self, tool: Arc<dyn Tool>) -> Result<Self> {
        self.register(tool)?;
        Ok(self)
    }

    /// Get a tool by name
    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.iter().find(|t| t.name() == name).cloned()
    }

    /// All tools in registration order
    pub fn list_tools(&self) -> &[Arc<dyn Tool>] {
        &self.tools
    }

    /// Tool names in registration order
    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    /// Get the number of registered tools
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Check if the registry is empty
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::{Value, json};

    struct Named(&'static str);

    #[async_trait]
    impl Tool for Named {
        async fn execute(&self, params: Value) -> Result<Value> {
            Ok(params)
        }

        fn name(&self) -> &str {
            self.0
        }

        fn description(&self) -> &str {
            "test tool"
        }

        fn input_schema(&self) -> Value {
            json!({"type": "object"})
        }
    }

    #[test]
    fn test_registration_order_is_kept() {
        let registry = ToolRegistry::new()
            .with_tool(Arc::new(Named("search_tool")))
            .and_then(|r| r.with_tool(Arc::new(Named("get_weather"))))
            .and_then(|r| r.with_tool(Arc::new(Named("write_file"))))
            .unwrap();

        assert_eq!(registry.len(), 3);
        assert_eq!(registry.names(), vec!["search_tool", "get_weather", "write_file"]);
        assert!(registry.get("get_weather").is_some());
        assert!(registry.get("missing").is_none());
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(Named("get_weather"))).unwrap();

        let err = registry.register(Arc::new(Named("get_weather"))).unwrap_err();
        assert!(matches!(err, Error::InitializationFailed(_)));
        assert_eq!(registry.len(), 1);
    }

    #[tokio::test]
    async fn test_lookup_and_execute() {
        let mut registry = ToolRegistry::new();
        assert!(registry.is_empty());
        registry.register(Arc::new(Named("echo"))).unwrap();

        let tool = registry.get("echo").unwrap();
        let out = tool.execute(json!({"loc": "Hangzhou"})).await.unwrap();
        assert_eq!(out["loc"], "Hangzhou");
    }
}
