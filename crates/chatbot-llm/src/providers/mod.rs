//! Concrete LLM provider implementations

pub mod openai;

pub use openai::{DASHSCOPE_API_BASE, OpenAIConfig, OpenAIProvider};
