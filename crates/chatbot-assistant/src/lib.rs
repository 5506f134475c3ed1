//! Tool-selecting chat assistant
//!
//! A Qwen chat model that answers questions by picking among three tools:
//!
//! - `search_tool`: web search for news and live events (Tavily)
//! - `get_weather`: current weather for a city (OpenWeather)
//! - `write_file`: saves markdown into a timestamped local file
//!
//! [`create_assistant`] wires the tools, the system prompt and a provider into
//! a single [`chatbot_runtime::ToolAgent`].

pub mod assistant;
pub mod config;
pub mod error;
pub mod prompts;
pub mod tools;
pub mod transport;

pub use assistant::{
    ASSISTANT_NAME, build_tool_registry, create_assistant, create_assistant_with, create_provider,
};
pub use config::{AssistantConfig, AssistantConfigBuilder, SearchConfig, WeatherConfig};
pub use error::{AssistantError, Result};
pub use prompts::SYSTEM_PROMPT;
pub use tools::{FileWriterTool, SearchHit, SearchTool, WeatherTool};
pub use transport::{HttpResponse, HttpTransport, ReqwestTransport};
