//! LLM provider trait definition

use crate::{CompletionRequest, CompletionResponse, Result};
use async_trait::async_trait;

/// A model endpoint the executor can call
#[async_trait]
pub trait LLMProvider: Send + Sync {
    /// Generate one completion for the given conversation
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse>;

    /// Short provider name used in logs (e.g. "openai")
    fn name(&self) -> &str;
}
