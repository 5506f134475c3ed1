//! Error types for chatbot-core

use thiserror::Error;

/// Result type alias for chatbot-core
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for agent operations
#[derive(Error, Debug)]
pub enum Error {
    /// Agent or tool construction failed
    #[error("Agent initialization failed: {0}")]
    InitializationFailed(String),

    /// A turn could not be completed
    #[error("Agent processing failed: {0}")]
    ProcessingFailed(String),
}

impl Error {
    /// Shorthand for a processing failure
    pub fn processing(msg: impl Into<String>) -> Self {
        Self::ProcessingFailed(msg.into())
    }
}
