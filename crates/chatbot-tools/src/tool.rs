//! Tool trait definition

use async_trait::async_trait;
use chatbot_core::Result;
use serde_json::Value;

/// A capability the model can invoke
///
/// Returning `Value::String` hands the text to the model verbatim; any other
/// value is serialized to JSON first.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Run the tool with arguments produced by the model
    ///
    /// `params` should match [`Tool::input_schema`]. An `Err` is reported back
    /// to the model as a failed tool result; it does not abort the turn.
    async fn execute(&self, params: Value) -> Result<Value>;

    /// Unique name the model uses to call the tool
    fn name(&self) -> &str;

    /// Tells the model when to use the tool
    fn description(&self) -> &str;

    /// JSON Schema of the arguments
    fn input_schema(&self) -> Value;
}
