//! Tool agent implementation (wraps AgentExecutor)

use crate::executor::AgentExecutor;
use async_trait::async_trait;
use chatbot_core::{Agent, Context, Result};

/// An agent that answers through the model/tool loop
///
/// Each call to [`Agent::process`] is an independent turn; the turn's tool
/// calls, iteration count and token usage are written into the context.
///
/// # Example
///
/// ```no_run
/// use chatbot_core::{Agent, Context};
/// use chatbot_runtime::{AgentRuntime, ExecutorConfig};
///
/// # async fn example(runtime: AgentRuntime) -> chatbot_core::Result<()> {
/// let agent = runtime.create_tool_agent(ExecutorConfig::default(), "assistant");
///
/// let mut context = Context::new();
/// let reply = agent.process("杭州今天天气怎么样？".to_string(), &mut context).await?;
/// println!("{reply} (tools: {:?})", context.tools_called());
/// # Ok(())
/// # }
/// ```
pub struct ToolAgent {
    executor: AgentExecutor,
    name: String,
}

impl ToolAgent {
    /// Create a new tool agent
    pub fn new(executor: AgentExecutor, name: impl Into<String>) -> Self {
        Self {
            executor,
            name: name.into(),
        }
    }

    /// Get a reference to the underlying executor
    pub fn executor(&self) -> &AgentExecutor {
        &self.executor
    }
}

#[async_trait]
impl Agent for ToolAgent {
    async fn process(&self, input: String, context: &mut Context) -> Result<String> {
        context.reset_turn();
        let report = self.executor.run_detailed(input).await?;

        context.set_tools_called(report.tools_called);
        context.set_iterations(report.iterations);
        context.set_token_usage(report.usage.input_tokens, report.usage.output_tokens);

        Ok(report.text)
    }

    fn name(&self) -> &str {
        &self.name
    }
}
