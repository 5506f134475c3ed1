//! LLM provider layer for chatbot-rs
//!
//! Provider-agnostic conversation types plus the `LLMProvider` trait. The
//! `openai` feature (on by default) adds a provider for any endpoint speaking
//! the OpenAI chat-completions format, including Qwen on DashScope.

pub mod completion;
pub mod error;
pub mod messages;
pub mod provider;
pub mod tools;

pub use completion::{CompletionRequest, CompletionResponse, StopReason, TokenUsage};
pub use error::{LLMError, Result};
pub use messages::{ContentBlock, Message, MessageContent, Role, malformed_arguments};
pub use provider::LLMProvider;
pub use tools::ToolDefinition;

#[cfg(feature = "openai")]
pub mod providers;
