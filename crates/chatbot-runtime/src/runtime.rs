//! Agent factory
//!
//! The AgentRuntime holds the shared provider and tool registry and hands out
//! agents built on them.

use chatbot_core::Result;
use chatbot_llm::LLMProvider;
use chatbot_tools::ToolRegistry;
use std::sync::Arc;
use tracing::info;

use crate::agents::ToolAgent;
use crate::executor::{AgentExecutor, ExecutorConfig, ExecutorEventHandler};

/// Shared resources for building agents
///
/// # Example
///
/// ```no_run
/// use chatbot_runtime::{AgentRuntime, ExecutorConfig};
/// use chatbot_tools::ToolRegistry;
/// use std::sync::Arc;
///
/// # fn example(provider: Arc<dyn chatbot_llm::LLMProvider>) -> chatbot_core::Result<()> {
/// let runtime = AgentRuntime::builder()
///     .provider(provider)
///     .tool_registry(Arc::new(ToolRegistry::new()))
///     .build()?;
///
/// let agent = runtime.create_tool_agent(ExecutorConfig::default(), "assistant");
/// # Ok(())
/// # }
/// ```
pub struct AgentRuntime {
    provider: Arc<dyn LLMProvider>,
    tool_registry: Arc<ToolRegistry>,
    event_handler: Option<Arc<dyn ExecutorEventHandler>>,
}

impl AgentRuntime {
    /// Create a new runtime builder
    pub fn builder() -> AgentRuntimeBuilder {
        AgentRuntimeBuilder::new()
    }

    /// Get a reference to the LLM provider
    pub fn provider(&self) -> &Arc<dyn LLMProvider> {
        &self.provider
    }

    /// Get a reference to the tool registry
    pub fn tools(&self) -> &Arc<ToolRegistry> {
        &self.tool_registry
    }

    /// Create an agent that runs the model/tool loop over the shared registry
    pub fn create_tool_agent(&self, config: ExecutorConfig, name: impl Into<String>) -> ToolAgent {
        let name = name.into();
        info!(
            agent = %name,
            provider = self.provider.name(),
            model = %config.model,
            tools = ?self.tool_registry.names(),
            "Creating tool agent"
        );

        let mut executor =
            AgentExecutor::new(self.provider.clone(), self.tool_registry.clone(), config);
        if let Some(handler) = &self.event_handler {
            executor = executor.with_event_handler(handler.clone());
        }
        ToolAgent::new(executor, name)
    }
}

/// Builder for AgentRuntime
#[derive(Default)]
pub struct AgentRuntimeBuilder {
    provider: Option<Arc<dyn LLMProvider>>,
    tool_registry: Option<Arc<ToolRegistry>>,
    event_handler: Option<Arc<dyn ExecutorEventHandler>>,
}

impl AgentRuntimeBuilder {
    /// Create a new runtime builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the LLM provider
    pub fn provider(mut self, provider: Arc<dyn LLMProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Set the tool registry
    pub fn tool_registry(mut self, registry: Arc<ToolRegistry>) -> Self {
        self.tool_registry = Some(registry);
        self
    }

    /// Attach an event handler to every agent created by the runtime
    pub fn event_handler(mut self, handler: Arc<dyn ExecutorEventHandler>) -> Self {
        self.event_handler = Some(handler);
        self
    }

    /// Build the runtime
    ///
    /// # Errors
    ///
    /// Returns an error if the provider is not set
    pub fn build(self) -> Result<AgentRuntime> {
        let provider = self.provider.ok_or_else(|| {
            chatbot_core::Error::InitializationFailed("Provider not set".to_string())
        })?;

        Ok(AgentRuntime {
            provider,
            tool_registry: self
                .tool_registry
                .unwrap_or_else(|| Arc::new(ToolRegistry::new())),
            event_handler: self.event_handler,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chatbot_llm::{CompletionRequest, CompletionResponse, LLMError};

    struct NeverCalled;

    #[async_trait::async_trait]
    impl LLMProvider for NeverCalled {
        async fn complete(
            &self,
            _request: CompletionRequest,
        ) -> chatbot_llm::Result<CompletionResponse> {
            Err(LLMError::RequestFailed("not expected".to_string()))
        }

        fn name(&self) -> &str {
            "never"
        }
    }

    #[test]
    fn test_builder_requires_provider() {
        assert!(AgentRuntimeBuilder::new().build().is_err());
    }

    #[test]
    fn test_create_tool_agent_shares_registry() {
        let registry = Arc::new(ToolRegistry::new());
        let runtime = AgentRuntime::builder()
            .provider(Arc::new(NeverCalled))
            .tool_registry(registry.clone())
            .build()
            .unwrap();

        let config = ExecutorConfig {
            model: "qwen-flash".to_string(),
            system_prompt: Some("prompt".to_string()),
            ..ExecutorConfig::default()
        };
        let agent = runtime.create_tool_agent(config, "assistant");

        assert_eq!(runtime.provider().name(), "never");
        assert!(Arc::ptr_eq(agent.executor().tools(), &registry));
        assert_eq!(agent.executor().config().system_prompt.as_deref(), Some("prompt"));
    }
}
