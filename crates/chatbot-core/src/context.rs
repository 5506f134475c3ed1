//! Per-turn execution context
//!
//! Front-ends hand a `Context` to [`Agent::process`](crate::Agent::process);
//! agents write back what happened during the turn (which tools ran, how many
//! model round-trips it took, token usage). Nothing in here outlives the
//! process.

use serde::de::DeserializeOwned;
use std::collections::HashMap;

/// Well-known context keys
pub mod keys {
    /// Identifier of the interactive session the turn belongs to
    pub const SESSION_ID: &str = "session_id";
    /// Names of the tools invoked during the turn, in call order
    pub const TOOLS_CALLED: &str = "tools_called";
    /// Number of model round-trips the turn took
    pub const ITERATIONS: &str = "iterations";
    /// Prompt tokens summed over the turn
    pub const INPUT_TOKENS: &str = "input_tokens";
    /// Completion tokens summed over the turn
    pub const OUTPUT_TOKENS: &str = "output_tokens";
}

/// Key-value bag passed to agents for one turn
///
/// # Example
///
/// ```
/// use chatbot_core::Context;
///
/// let mut ctx = Context::new().with_session_id("sess-1");
/// ctx.set_tools_called(vec!["get_weather".to_string()]);
///
/// assert_eq!(ctx.session_id(), Some("sess-1"));
/// assert_eq!(ctx.tools_called(), vec!["get_weather".to_string()]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Context {
    data: HashMap<String, serde_json::Value>,
}

impl Context {
    /// Create a new empty context
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the session ID
    pub fn with_session_id(mut self, session_id: impl Into<String>) -> Self {
        self.insert(keys::SESSION_ID, serde_json::json!(session_id.into()));
        self
    }

    /// Get the session ID
    pub fn session_id(&self) -> Option<&str> {
        self.get(keys::SESSION_ID).and_then(|v| v.as_str())
    }

    /// Record the tools invoked during the turn
    pub fn set_tools_called(&mut self, tools: Vec<String>) {
        self.insert(keys::TOOLS_CALLED, serde_json::json!(tools));
    }

    /// Tools invoked during the last turn (empty when none were recorded)
    pub fn tools_called(&self) -> Vec<String> {
        self.get_typed(keys::TOOLS_CALLED)
            .ok()
            .flatten()
            .unwrap_or_default()
    }

    /// Record the number of model round-trips
    pub fn set_iterations(&mut self, iterations: usize) {
        self.insert(keys::ITERATIONS, serde_json::json!(iterations));
    }

    /// Number of model round-trips of the last turn
    pub fn iterations(&self) -> Option<usize> {
        self.get(keys::ITERATIONS)
            .and_then(serde_json::Value::as_u64)
            .map(|n| n as usize)
    }

    /// Record token usage for the turn
    pub fn set_token_usage(&mut self, input_tokens: usize, output_tokens: usize) {
        self.insert(keys::INPUT_TOKENS, serde_json::json!(input_tokens));
        self.insert(keys::OUTPUT_TOKENS, serde_json::json!(output_tokens));
    }

    /// Token usage of the last turn as `(input, output)`
    pub fn token_usage(&self) -> Option<(usize, usize)> {
        let input = self.get(keys::INPUT_TOKENS)?.as_u64()?;
        let output = self.get(keys::OUTPUT_TOKENS)?.as_u64()?;
        Some((input as usize, output as usize))
    }

    /// Drop the per-turn entries but keep the session ID
    pub fn reset_turn(&mut self) {
        self.data.retain(|k, _| k == keys::SESSION_ID);
    }

    /// Insert a raw value
    pub fn insert(&mut self, key: impl Into<String>, value: serde_json::Value) {
        self.data.insert(key.into(), value);
    }

    /// Get a raw value
    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.data.get(key)
    }

    /// Get a value deserialized into `T`
    pub fn get_typed<T: DeserializeOwned>(&self, key: &str) -> crate::Result<Option<T>> {
        match self.data.get(key) {
            None => Ok(None),
            Some(value) => serde_json::from_value(value.clone()).map(Some).map_err(|e| {
                crate::Error::ProcessingFailed(format!("Failed to deserialize context value: {e}"))
            }),
        }
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the context holds no entries
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_turn_report_roundtrip() {
        let mut ctx = Context::new();
        assert!(ctx.is_empty());
        assert!(ctx.tools_called().is_empty());
        assert_eq!(ctx.iterations(), None);
        assert_eq!(ctx.token_usage(), None);

        ctx.set_tools_called(vec!["search_tool".to_string(), "write_file".to_string()]);
        ctx.set_iterations(3);
        ctx.set_token_usage(120, 45);

        assert_eq!(ctx.tools_called(), vec!["search_tool", "write_file"]);
        assert_eq!(ctx.iterations(), Some(3));
        assert_eq!(ctx.token_usage(), Some((120, 45)));
    }

    #[test]
    fn test_reset_turn_keeps_session() {
        let mut ctx = Context::new().with_session_id("sess-42");
        ctx.set_iterations(2);
        ctx.set_tools_called(vec!["get_weather".to_string()]);
        assert_eq!(ctx.len(), 3);

        ctx.reset_turn();
        assert_eq!(ctx.len(), 1);
        assert_eq!(ctx.session_id(), Some("sess-42"));
        assert_eq!(ctx.iterations(), None);
    }

    #[test]
    fn test_get_typed_type_mismatch() {
        let mut ctx = Context::new();
        ctx.insert(keys::TOOLS_CALLED, serde_json::json!("not-a-list"));

        let typed: crate::Result<Option<Vec<String>>> = ctx.get_typed(keys::TOOLS_CALLED);
        assert!(typed.is_err());
        // The convenience accessor degrades to empty instead of failing
        assert!(ctx.tools_called().is_empty());
    }
}
