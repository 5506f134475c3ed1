//! Assembles the tool-using assistant agent

use chatbot_llm::LLMProvider;
use chatbot_llm::providers::OpenAIProvider;
use chatbot_runtime::{AgentRuntime, ExecutorEventHandler, ToolAgent};
use chatbot_tools::ToolRegistry;
use std::sync::Arc;
use tracing::info;

use crate::config::AssistantConfig;
use crate::error::Result;
use crate::prompts::SYSTEM_PROMPT;
use crate::tools::{FileWriterTool, SearchTool, WeatherTool};
use crate::transport::{HttpTransport, ReqwestTransport};

/// Agent name reported through [`chatbot_core::Agent::name`]
pub const ASSISTANT_NAME: &str = "chatbot";

/// Registry holding the search, weather and file-writer tools, in that order
pub fn build_tool_registry(
    config: &AssistantConfig,
    transport: Arc<dyn HttpTransport>,
) -> Result<ToolRegistry> {
    let registry = ToolRegistry::new()
        .with_tool(Arc::new(SearchTool::new(config.search.clone(), transport.clone())))?
        .with_tool(Arc::new(WeatherTool::new(config.weather.clone(), transport)))?
        .with_tool(Arc::new(FileWriterTool::new(config.output_dir.clone())))?;
    Ok(registry)
}

/// Chat provider for the configured model endpoint
///
/// # Errors
///
/// Fails when no model API key is configured or the HTTP client cannot be
/// built
pub fn create_provider(config: &AssistantConfig) -> Result<Arc<dyn LLMProvider>> {
    let provider = OpenAIProvider::with_config(config.llm_config()?)?;
    Ok(Arc::new(provider))
}

/// Create the assistant over `provider` with live HTTP tools
///
/// # Example
///
/// ```no_run
/// use chatbot_assistant::{AssistantConfig, create_assistant, create_provider};
/// use chatbot_core::{Agent, Context};
///
/// # async fn example() -> chatbot_assistant::Result<()> {
/// let config = AssistantConfig::from_env();
/// let agent = create_assistant(create_provider(&config)?, &config)?;
///
/// let reply = agent.process("杭州今天天气怎么样？".to_string(), &mut Context::new()).await?;
/// println!("{reply}");
/// # Ok(())
/// # }
/// ```
pub fn create_assistant(
    provider: Arc<dyn LLMProvider>,
    config: &AssistantConfig,
) -> Result<ToolAgent> {
    let transport = Arc::new(ReqwestTransport::new(config.request_timeout)?);
    create_assistant_with(provider, config, transport, None)
}

/// Create the assistant with an explicit transport and optional event handler
pub fn create_assistant_with(
    provider: Arc<dyn LLMProvider>,
    config: &AssistantConfig,
    transport: Arc<dyn HttpTransport>,
    event_handler: Option<Arc<dyn ExecutorEventHandler>>,
) -> Result<ToolAgent> {
    config.validate()?;

    let registry = build_tool_registry(config, transport)?;
    let mut builder = AgentRuntime::builder()
        .provider(provider)
        .tool_registry(Arc::new(registry));
    if let Some(handler) = event_handler {
        builder = builder.event_handler(handler);
    }
    let runtime = builder.build()?;

    info!(
        model = %config.model,
        output_dir = %config.output_dir.display(),
        "Assistant ready"
    );
    Ok(runtime.create_tool_agent(config.executor_config(SYSTEM_PROMPT), ASSISTANT_NAME))
}
