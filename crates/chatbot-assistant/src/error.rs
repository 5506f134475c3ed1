//! Error types for the assistant crate

use thiserror::Error;

/// Assistant-level errors
#[derive(Debug, Error)]
pub enum AssistantError {
    /// Network or HTTP error
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Filesystem error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Tool arguments did not match the schema
    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    /// A required API key is not configured
    #[error("Missing API key: {0} is not set")]
    MissingApiKey(&'static str),

    /// The search API answered with a non-success status
    #[error("Search API returned HTTP {status}: {body}")]
    SearchApi {
        /// HTTP status code
        status: u16,
        /// Response body
        body: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Error raised by the agent layer
    #[error(transparent)]
    Agent(#[from] chatbot_core::Error),

    /// Error raised by the model provider
    #[error(transparent)]
    Llm(#[from] chatbot_llm::LLMError),
}

/// Result type alias for assistant operations
pub type Result<T> = std::result::Result<T, AssistantError>;

impl From<AssistantError> for chatbot_core::Error {
    fn from(err: AssistantError) -> Self {
        match err {
            AssistantError::Agent(inner) => inner,
            AssistantError::Config(msg) => chatbot_core::Error::InitializationFailed(msg),
            AssistantError::MissingApiKey(var) => {
                chatbot_core::Error::InitializationFailed(format!("{var} is not set"))
            }
            other => chatbot_core::Error::ProcessingFailed(other.to_string()),
        }
    }
}
