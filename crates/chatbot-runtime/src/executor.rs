//! Agent executor for running the tool-use loop
//!
//! One turn goes:
//! 1. Call the model with the conversation and the registered tools
//! 2. On `tool_use`, run every requested tool in order, append the results
//!    and go back to 1
//! 3. On `end_turn`, return the text
//!
//! Which tools run, and in what order, is entirely up to the model.

use async_trait::async_trait;
use chatbot_core::Result;
use chatbot_llm::{
    CompletionRequest, ContentBlock, LLMProvider, Message, StopReason, TokenUsage, ToolDefinition,
    malformed_arguments,
};
use chatbot_tools::ToolRegistry;
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Default reply when the iteration cap is hit
pub const MAX_ITERATIONS_REPLY: &str = "已达到最大处理轮数，未能完成回答，请尝试简化问题后重试。";

/// Default reply when the model hits the token limit before writing any text
pub const TRUNCATED_REPLY: &str = "回答因长度限制被截断。";

/// Callbacks fired while a turn runs
///
/// The CLI uses this to show which tools the model picked.
#[async_trait]
pub trait ExecutorEventHandler: Send + Sync {
    /// A tool is about to run
    async fn on_tool_start(&self, _id: &str, _name: &str, _input: &Value) {}

    /// A tool finished; `result` is the text handed back to the model
    async fn on_tool_done(
        &self,
        _id: &str,
        _name: &str,
        _result: std::result::Result<&str, &str>,
        _duration_ms: u64,
    ) {
    }

    /// The turn finished with a reply
    async fn on_complete(&self, _result: &str) {}
}

/// Configuration for agent execution
#[derive(Debug, Clone)]
pub struct ExecutorConfig {
    /// Upper bound on model round-trips per turn
    pub max_iterations: usize,

    /// Model to use
    pub model: String,

    /// System prompt
    pub system_prompt: Option<String>,

    /// Max tokens per completion
    pub max_tokens: usize,

    /// Temperature; `None` leaves the provider default
    pub temperature: Option<f32>,

    /// Reply returned when `max_iterations` runs out
    pub max_iterations_reply: String,

    /// Reply returned when a completion is cut off with no text
    pub truncated_reply: String,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            max_iterations: 10,
            model: "qwen-flash".to_string(),
            system_prompt: None,
            max_tokens: 4096,
            temperature: None,
            max_iterations_reply: MAX_ITERATIONS_REPLY.to_string(),
            truncated_reply: TRUNCATED_REPLY.to_string(),
        }
    }
}

/// What happened during one turn
#[derive(Debug, Clone, Default)]
pub struct ExecutionReport {
    /// Final reply text
    pub text: String,
    /// Model round-trips used
    pub iterations: usize,
    /// Tools invoked, in call order
    pub tools_called: Vec<String>,
    /// Token usage summed over the turn
    pub usage: TokenUsage,
}

/// Drives the model ↔ tool loop for one provider and one tool registry
pub struct AgentExecutor {
    provider: Arc<dyn LLMProvider>,
    tool_registry: Arc<ToolRegistry>,
    config: ExecutorConfig,
    event_handler: Option<Arc<dyn ExecutorEventHandler>>,
}

impl AgentExecutor {
    /// Create a new agent executor
    pub fn new(
        provider: Arc<dyn LLMProvider>,
        tool_registry: Arc<ToolRegistry>,
        config: ExecutorConfig,
    ) -> Self {
        Self {
            provider,
            tool_registry,
            config,
            event_handler: None,
        }
    }

    /// Create a new builder
    pub fn builder() -> AgentExecutorBuilder {
        AgentExecutorBuilder::new()
    }

    /// Set the event handler for receiving execution events
    pub fn with_event_handler(mut self, handler: Arc<dyn ExecutorEventHandler>) -> Self {
        self.event_handler = Some(handler);
        self
    }

    /// Get the executor configuration
    pub fn config(&self) -> &ExecutorConfig {
        &self.config
    }

    /// Get the tool registry
    pub fn tools(&self) -> &Arc<ToolRegistry> {
        &self.tool_registry
    }

    /// Run one turn and return the reply text
    pub async fn run(&self, user_message: String) -> Result<String> {
        self.run_detailed(user_message).await.map(|report| report.text)
    }

    /// Run one turn and return the reply with bookkeeping
    pub async fn run_detailed(&self, user_message: String) -> Result<ExecutionReport> {
        self.run_with_history(user_message, Vec::new()).await
    }

    /// Run one turn on top of earlier messages
    pub async fn run_with_history(
        &self,
        user_message: String,
        history: Vec<Message>,
    ) -> Result<ExecutionReport> {
        let mut conversation = history;
        conversation.push(Message::user(user_message));
        self.run_conversation(conversation).await
    }

    async fn run_conversation(&self, mut conversation: Vec<Message>) -> Result<ExecutionReport> {
        let tools = self.build_tool_definitions();
        let mut report = ExecutionReport::default();

        loop {
            if report.iterations >= self.config.max_iterations {
                warn!(
                    max_iterations = self.config.max_iterations,
                    "Max iterations reached, stopping"
                );
                report.text = self.config.max_iterations_reply.clone();
                return Ok(report);
            }
            report.iterations += 1;

            info!(
                iteration = report.iterations,
                model = %self.config.model,
                tool_count = tools.len(),
                "Sending request to LLM"
            );

            let mut builder = CompletionRequest::builder(&self.config.model)
                .messages(conversation.clone())
                .max_tokens(self.config.max_tokens)
                .tools(tools.clone());
            if let Some(system) = &self.config.system_prompt {
                builder = builder.system(system.clone());
            }
            if let Some(temperature) = self.config.temperature {
                builder = builder.temperature(temperature);
            }

            let response = self.provider.complete(builder.build()).await?;
            report.usage.add(response.usage);

            info!(
                stop_reason = ?response.stop_reason,
                input_tokens = response.usage.input_tokens,
                output_tokens = response.usage.output_tokens,
                "LLM response received"
            );

            let text = response.message.text().unwrap_or_default().to_string();
            let preview: String = text.chars().take(300).collect();
            debug!(response_preview = %preview, "LLM response content preview");

            match response.stop_reason {
                StopReason::ToolUse if response.message.has_tool_uses() => {
                    let results = self.execute_tools(&response.message, &mut report).await;
                    conversation.push(response.message);
                    conversation.extend(results);
                }
                StopReason::ToolUse => {
                    warn!("ToolUse stop reason without tool calls, treating as end of turn");
                    return self.finish(report, text).await;
                }
                StopReason::EndTurn => {
                    info!(iterations = report.iterations, "Agent completed naturally");
                    return self.finish(report, text).await;
                }
                StopReason::MaxTokens => {
                    warn!("Hit max tokens in LLM response");
                    let text = if text.is_empty() {
                        self.config.truncated_reply.clone()
                    } else {
                        text
                    };
                    return self.finish(report, text).await;
                }
            }
        }
    }

    async fn finish(&self, mut report: ExecutionReport, text: String) -> Result<ExecutionReport> {
        if let Some(handler) = &self.event_handler {
            handler.on_complete(&text).await;
        }
        report.text = text;
        Ok(report)
    }

    fn build_tool_definitions(&self) -> Vec<ToolDefinition> {
        self.tool_registry
            .list_tools()
            .iter()
            .map(|tool| ToolDefinition::new(tool.name(), tool.description(), tool.input_schema()))
            .collect()
    }

    /// Run the tool calls of an assistant message; failures become error results
    async fn execute_tools(&self, message: &Message, report: &mut ExecutionReport) -> Vec<Message> {
        let mut results = Vec::new();

        for block in message.tool_uses() {
            let ContentBlock::ToolUse { id, name, input } = block else {
                continue;
            };

            let input_preview: String = input.to_string().chars().take(500).collect();
            info!(tool_name = %name, tool_id = %id, input_preview = %input_preview, "Executing tool");
            report.tools_called.push(name.clone());

            if let Some(handler) = &self.event_handler {
                handler.on_tool_start(id, name, input).await;
            }

            let start = Instant::now();
            let outcome = if let Some((_, error)) = malformed_arguments(input) {
                Err(format!("Invalid tool arguments: {error}"))
            } else {
                match self.tool_registry.get(name) {
                    Some(tool) => tool
                        .execute(input.clone())
                        .await
                        .map(|value| result_text(&value))
                        .map_err(|e| e.to_string()),
                    None => Err(format!("Tool not found: {name}")),
                }
            };
            let duration_ms = start.elapsed().as_millis() as u64;

            if let Some(handler) = &self.event_handler {
                handler
                    .on_tool_done(id, name, outcome.as_deref().map_err(String::as_str), duration_ms)
                    .await;
            }

            match outcome {
                Ok(text) => {
                    info!(tool_name = %name, duration_ms, result_length = text.len(), "Tool execution succeeded");
                    results.push(Message::tool_result(id.clone(), text));
                }
                Err(error) => {
                    warn!(tool_name = %name, duration_ms, error = %error, "Tool execution failed");
                    results.push(Message::tool_error(id.clone(), format!("Error: {error}")));
                }
            }
        }

        results
    }
}

/// Strings go to the model verbatim, everything else as JSON
fn result_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Builder for AgentExecutor
pub struct AgentExecutorBuilder {
    provider: Option<Arc<dyn LLMProvider>>,
    tool_registry: Arc<ToolRegistry>,
    config: ExecutorConfig,
}

impl AgentExecutorBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self {
            provider: None,
            tool_registry: Arc::new(ToolRegistry::new()),
            config: ExecutorConfig::default(),
        }
    }

    /// Set the LLM provider
    pub fn provider(mut self, provider: Arc<dyn LLMProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Set the tool registry
    pub fn tool_registry(mut self, registry: Arc<ToolRegistry>) -> Self {
        self.tool_registry = registry;
        self
    }

    /// Set the full configuration
    pub fn config(mut self, config: ExecutorConfig) -> Self {
        self.config = config;
        self
    }

    /// Set maximum iterations
    pub fn max_iterations(mut self, max: usize) -> Self {
        self.config.max_iterations = max;
        self
    }

    /// Set the model
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    /// Set the system prompt
    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.system_prompt = Some(prompt.into());
        self
    }

    /// Build the executor
    pub fn build(self) -> Result<AgentExecutor> {
        let provider = self.provider.ok_or_else(|| {
            chatbot_core::Error::InitializationFailed("Provider not set".to_string())
        })?;

        Ok(AgentExecutor::new(provider, self.tool_registry, self.config))
    }
}

impl Default for AgentExecutorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chatbot_llm::{CompletionResponse, LLMError};
    use chatbot_tools::Tool;
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Replays canned responses and records every request
    struct ScriptedProvider {
        responses: Mutex<VecDeque<CompletionResponse>>,
        requests: Mutex<Vec<CompletionRequest>>,
    }

    impl ScriptedProvider {
        fn new(responses: Vec<CompletionResponse>) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
                requests: Mutex::new(Vec::new()),
            }
        }

        fn requests(&self) -> Vec<CompletionRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl LLMProvider for ScriptedProvider {
        async fn complete(
            &self,
            request: CompletionRequest,
        ) -> chatbot_llm::Result<CompletionResponse> {
            self.requests.lock().unwrap().push(request);
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .ok_or_else(|| LLMError::RequestFailed("script exhausted".to_string()))
        }

        fn name(&self) -> &str {
            "scripted"
        }
    }

    struct UpperTool;

    #[async_trait]
    impl Tool for UpperTool {
        async fn execute(&self, params: Value) -> Result<Value> {
            let text = params["text"]
                .as_str()
                .ok_or_else(|| chatbot_core::Error::processing("missing text"))?;
            Ok(Value::String(text.to_uppercase()))
        }

        fn name(&self) -> &str {
            "upper"
        }

        fn description(&self) -> &str {
            "Uppercase text"
        }

        fn input_schema(&self) -> Value {
            json!({"type": "object", "properties": {"text": {"type": "string"}}})
        }
    }

    fn usage(input: usize, output: usize) -> TokenUsage {
        TokenUsage {
            input_tokens: input,
            output_tokens: output,
        }
    }

    fn tool_call(id: &str, name: &str, input: Value) -> CompletionResponse {
        CompletionResponse {
            message: Message::assistant_blocks(vec![ContentBlock::ToolUse {
                id: id.to_string(),
                name: name.to_string(),
                input,
            }]),
            stop_reason: StopReason::ToolUse,
            usage: usage(10, 2),
        }
    }

    fn final_text(text: &str) -> CompletionResponse {
        CompletionResponse {
            message: Message::assistant(text),
            stop_reason: StopReason::EndTurn,
            usage: usage(20, 5),
        }
    }

    fn executor(provider: Arc<ScriptedProvider>) -> AgentExecutor {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(UpperTool)).unwrap();
        AgentExecutor::builder()
            .provider(provider)
            .tool_registry(Arc::new(registry))
            .system_prompt("be brief")
            .max_iterations(4)
            .build()
            .unwrap()
    }

    fn tool_result_of(message: &Message) -> (String, Option<bool>) {
        match message.content.as_ref() {
            Some(chatbot_llm::MessageContent::Blocks(blocks)) => match &blocks[0] {
                ContentBlock::ToolResult {
                    content, is_error, ..
                } => (content.clone(), *is_error),
                other => panic!("expected tool result, got {other:?}"),
            },
            other => panic!("expected blocks, got {other:?}"),
        }
    }

    #[test]
    fn test_builder() {
        let builder = AgentExecutorBuilder::new()
            .model("test-model")
            .max_iterations(5)
            .system_prompt("Test prompt");

        assert_eq!(builder.config.model, "test-model");
        assert_eq!(builder.config.max_iterations, 5);
        assert_eq!(builder.config.system_prompt, Some("Test prompt".to_string()));
        assert!(builder.build().is_err());
    }

    #[test]
    fn test_default_config() {
        let config = ExecutorConfig::default();
        assert_eq!(config.max_iterations, 10);
        assert_eq!(config.model, "qwen-flash");
        assert!(config.temperature.is_none());
        assert_eq!(config.max_iterations_reply, MAX_ITERATIONS_REPLY);
        assert_eq!(config.truncated_reply, TRUNCATED_REPLY);
    }

    #[tokio::test]
    async fn test_tool_round_trip() {
        let provider = Arc::new(ScriptedProvider::new(vec![
            tool_call("call_1", "upper", json!({"text": "hangzhou"})),
            final_text("HANGZHOU it is"),
        ]));
        let report = executor(provider.clone())
            .run_detailed("shout hangzhou".to_string())
            .await
            .unwrap();

        assert_eq!(report.text, "HANGZHOU it is");
        assert_eq!(report.iterations, 2);
        assert_eq!(report.tools_called, vec!["upper"]);
        assert_eq!(report.usage, usage(30, 7));

        let requests = provider.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].system.as_deref(), Some("be brief"));
        assert_eq!(requests[0].tool_names(), vec!["upper"]);

        // Second call carries: user, assistant tool call, tool result
        let second = &requests[1].messages;
        assert_eq!(second.len(), 3);
        assert!(second[1].has_tool_uses());
        assert_eq!(tool_result_of(&second[2]), ("HANGZHOU".to_string(), None));
    }

    #[tokio::test]
    async fn test_unknown_tool_becomes_error_result() {
        let provider = Arc::new(ScriptedProvider::new(vec![
            tool_call("call_1", "teleport", json!({})),
            final_text("cannot do that"),
        ]));
        let reply = executor(provider.clone()).run("go".to_string()).await.unwrap();
        assert_eq!(reply, "cannot do that");

        let requests = provider.requests();
        let (content, is_error) = tool_result_of(&requests[1].messages[2]);
        assert_eq!(content, "Error: Tool not found: teleport");
        assert_eq!(is_error, Some(true));
    }

    #[tokio::test]
    async fn test_tool_failure_is_reported_to_model() {
        let provider = Arc::new(ScriptedProvider::new(vec![
            tool_call("call_1", "upper", json!({"wrong": 1})),
            final_text("sorry"),
        ]));
        let reply = executor(provider.clone()).run("go".to_string()).await.unwrap();
        assert_eq!(reply, "sorry");

        let (content, is_error) = tool_result_of(&provider.requests()[1].messages[2]);
        assert!(content.contains("missing text"));
        assert_eq!(is_error, Some(true));
    }

    #[tokio::test]
    async fn test_malformed_arguments_become_error_result() {
        let provider = Arc::new(ScriptedProvider::new(vec![
            CompletionResponse {
                message: Message::assistant_blocks(vec![ContentBlock::malformed_tool_use(
                    "call_1",
                    "upper",
                    r#"{"text": "hang"#,
                    "EOF while parsing a string at line 1 column 14",
                )]),
                stop_reason: StopReason::ToolUse,
                usage: usage(10, 2),
            },
            final_text("请重新描述一下"),
        ]));
        let report = executor(provider.clone())
            .run_detailed("shout".to_string())
            .await
            .unwrap();

        assert_eq!(report.text, "请重新描述一下");
        assert_eq!(report.iterations, 2);
        assert_eq!(report.tools_called, vec!["upper"]);

        let (content, is_error) = tool_result_of(&provider.requests()[1].messages[2]);
        assert_eq!(
            content,
            "Error: Invalid tool arguments: EOF while parsing a string at line 1 column 14"
        );
        assert_eq!(is_error, Some(true));
    }

    #[tokio::test]
    async fn test_truncated_reply_without_text() {
        let provider = Arc::new(ScriptedProvider::new(vec![CompletionResponse {
            message: Message::assistant(""),
            stop_reason: StopReason::MaxTokens,
            usage: usage(10, 4096),
        }]));
        let reply = executor(provider).run("长文".to_string()).await.unwrap();
        assert_eq!(reply, TRUNCATED_REPLY);
    }

    #[tokio::test]
    async fn test_iteration_cap_reply_is_configurable() {
        let provider = Arc::new(ScriptedProvider::new(vec![tool_call(
            "call_0",
            "upper",
            json!({"text": "x"}),
        )]));
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(UpperTool)).unwrap();
        let executor = AgentExecutor::new(
            provider,
            Arc::new(registry),
            ExecutorConfig {
                max_iterations: 1,
                max_iterations_reply: "stopped".to_string(),
                ..ExecutorConfig::default()
            },
        );

        assert_eq!(executor.run("loop".to_string()).await.unwrap(), "stopped");
    }

    #[tokio::test]
    async fn test_iteration_cap() {
        let provider = Arc::new(ScriptedProvider::new(
            (0..4)
                .map(|i| tool_call(&format!("call_{i}"), "upper", json!({"text": "x"})))
                .collect(),
        ));
        let report = executor(provider.clone())
            .run_detailed("loop forever".to_string())
            .await
            .unwrap();

        assert_eq!(report.text, MAX_ITERATIONS_REPLY);
        assert_eq!(report.iterations, 4);
        assert_eq!(provider.requests().len(), 4);
    }

    #[tokio::test]
    async fn test_provider_error_propagates() {
        let provider = Arc::new(ScriptedProvider::new(Vec::new()));
        let err = executor(provider).run("hi".to_string()).await.unwrap_err();
        assert!(err.to_string().contains("script exhausted"));
    }

    #[tokio::test]
    async fn test_event_handler_sees_tool_calls() {
        #[derive(Default)]
        struct Recorder(Mutex<Vec<String>>);

        #[async_trait]
        impl ExecutorEventHandler for Recorder {
            async fn on_tool_start(&self, _id: &str, name: &str, _input: &Value) {
                self.0.lock().unwrap().push(format!("start:{name}"));
            }

            async fn on_tool_done(
                &self,
                _id: &str,
                name: &str,
                result: std::result::Result<&str, &str>,
                _duration_ms: u64,
            ) {
                self.0
                    .lock()
                    .unwrap()
                    .push(format!("done:{name}:{}", result.unwrap_or("ERR")));
            }

            async fn on_complete(&self, result: &str) {
                self.0.lock().unwrap().push(format!("complete:{result}"));
            }
        }

        let recorder = Arc::new(Recorder::default());
        let provider = Arc::new(ScriptedProvider::new(vec![
            tool_call("call_1", "upper", json!({"text": "ok"})),
            final_text("done"),
        ]));
        executor(provider)
            .with_event_handler(recorder.clone())
            .run("go".to_string())
            .await
            .unwrap();

        assert_eq!(
            *recorder.0.lock().unwrap(),
            vec!["start:upper", "done:upper:OK", "complete:done"]
        );
    }
}
