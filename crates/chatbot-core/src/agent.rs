//! Core Agent trait definition

use crate::{Context, Result};
use async_trait::async_trait;

/// A conversational agent: takes one user message, returns one reply.
///
/// Implementations decide internally whether to call tools. Whatever they
/// learn about the turn (tools used, token usage) goes into `context`.
#[async_trait]
pub trait Agent: Send + Sync {
    /// Handle a single user message
    async fn process(&self, input: String, context: &mut Context) -> Result<String>;

    /// Get the agent's name
    fn name(&self) -> &str;
}
