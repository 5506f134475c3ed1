//! Configuration for the assistant and its tools

use crate::error::{AssistantError, Result};
use chatbot_llm::providers::{DASHSCOPE_API_BASE, OpenAIConfig};
use chatbot_runtime::ExecutorConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Model API key
pub const DASHSCOPE_API_KEY_ENV: &str = "DASHSCOPE_API_KEY";
/// Weather API key
pub const OPENWEATHER_API_KEY_ENV: &str = "OPENWEATHER_API_KEY";
/// Search API key
pub const TAVILY_API_KEY_ENV: &str = "TAVILY_API_KEY";
/// Model name override
pub const MODEL_ENV: &str = "CHATBOT_MODEL";
/// Model API base URL override
pub const API_BASE_ENV: &str = "CHATBOT_API_BASE";
/// Output directory override for the file writer
pub const OUTPUT_DIR_ENV: &str = "CHATBOT_OUTPUT_DIR";

/// Default model
pub const DEFAULT_MODEL: &str = "qwen-flash";
/// Current-weather endpoint
pub const OPENWEATHER_ENDPOINT: &str = "https://api.openweathermap.org/data/2.5/weather";
/// Search endpoint
pub const TAVILY_ENDPOINT: &str = "https://api.tavily.com/search";
/// Default directory for `write_file`
pub const DEFAULT_OUTPUT_DIR: &str = "/data/pythonProjects/Chatbot/output";

/// Settings for the weather tool
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    /// Endpoint queried with a GET request
    pub endpoint: String,

    /// OpenWeather API key; the `APPID` parameter is omitted when unset
    pub api_key: Option<String>,

    /// Unit system (`metric`)
    pub units: String,

    /// Response language (`zh_cn`)
    pub lang: String,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            endpoint: OPENWEATHER_ENDPOINT.to_string(),
            api_key: None,
            units: "metric".to_string(),
            lang: "zh_cn".to_string(),
        }
    }
}

/// Settings for the search tool
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Endpoint receiving the JSON POST
    pub endpoint: String,

    /// Tavily API key
    pub api_key: Option<String>,

    /// Number of results requested per query
    pub max_results: u32,

    /// Search topic
    pub topic: String,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            endpoint: TAVILY_ENDPOINT.to_string(),
            api_key: None,
            max_results: 5,
            topic: "general".to_string(),
        }
    }
}

/// Configuration for the assistant
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssistantConfig {
    /// Chat model name
    pub model: String,

    /// Base URL of the OpenAI-compatible model API
    pub api_base: String,

    /// Model API key
    pub api_key: Option<String>,

    /// Executor iteration cap per turn
    pub max_iterations: usize,

    /// Completion token limit per model call
    pub max_tokens: usize,

    /// Sampling temperature; provider default when unset
    pub temperature: Option<f32>,

    /// Timeout applied to every outbound HTTP request
    pub request_timeout: Duration,

    /// Directory `write_file` writes into
    pub output_dir: PathBuf,

    /// Weather tool settings
    pub weather: WeatherConfig,

    /// Search tool settings
    pub search: SearchConfig,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            api_base: DASHSCOPE_API_BASE.to_string(),
            api_key: None,
            max_iterations: 10,
            max_tokens: 4096,
            temperature: None,
            request_timeout: Duration::from_secs(60),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            weather: WeatherConfig::default(),
            search: SearchConfig::default(),
        }
    }
}

impl AssistantConfig {
    /// Create a new configuration builder
    pub fn builder() -> AssistantConfigBuilder {
        AssistantConfigBuilder::default()
    }

    /// Defaults overlaid with the process environment
    pub fn from_env() -> Self {
        Self::default().with_env()
    }

    /// Overlay keys and overrides found in the process environment
    #[must_use]
    pub fn with_env(self) -> Self {
        self.with_vars(|name| std::env::var(name).ok())
    }

    fn with_vars(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(key) = var(DASHSCOPE_API_KEY_ENV) {
            self.api_key = Some(key);
        }
        if let Some(key) = var(OPENWEATHER_API_KEY_ENV) {
            self.weather.api_key = Some(key);
        }
        if let Some(key) = var(TAVILY_API_KEY_ENV) {
            self.search.api_key = Some(key);
        }
        if let Some(model) = var(MODEL_ENV) {
            self.model = model;
        }
        if let Some(base) = var(API_BASE_ENV) {
            self.api_base = base;
        }
        if let Some(dir) = var(OUTPUT_DIR_ENV) {
            self.output_dir = PathBuf::from(dir);
        }
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.model.trim().is_empty() {
            return Err(AssistantError::Config("model must not be empty".to_string()));
        }

        if self.max_iterations == 0 {
            return Err(AssistantError::Config(
                "max_iterations must be greater than 0".to_string(),
            ));
        }

        if self.search.max_results == 0 {
            return Err(AssistantError::Config(
                "search max_results must be greater than 0".to_string(),
            ));
        }

        if self.output_dir.as_os_str().is_empty() {
            return Err(AssistantError::Config(
                "output_dir must not be empty".to_string(),
            ));
        }

        for (field, value) in [
            ("api_base", &self.api_base),
            ("weather endpoint", &self.weather.endpoint),
            ("search endpoint", &self.search.endpoint),
        ] {
            url::Url::parse(value)
                .map_err(|e| AssistantError::Config(format!("invalid {field} '{value}': {e}")))?;
        }

        Ok(())
    }

    /// Provider configuration for the chat model
    ///
    /// # Errors
    ///
    /// Returns [`AssistantError::MissingApiKey`] if no model key is configured
    pub fn llm_config(&self) -> Result<OpenAIConfig> {
        let api_key = self
            .api_key
            .clone()
            .ok_or(AssistantError::MissingApiKey(DASHSCOPE_API_KEY_ENV))?;

        Ok(OpenAIConfig::dashscope(api_key)
            .with_api_base(self.api_base.clone())
            .with_timeout(self.request_timeout.as_secs()))
    }

    /// Executor settings for one assistant agent
    pub fn executor_config(&self, system_prompt: &str) -> ExecutorConfig {
        ExecutorConfig {
            max_iterations: self.max_iterations,
            model: self.model.clone(),
            system_prompt: Some(system_prompt.to_string()),
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            ..ExecutorConfig::default()
        }
    }
}

/// Builder for AssistantConfig
#[derive(Debug, Default)]
pub struct AssistantConfigBuilder {
    config: Option<AssistantConfig>,
    model: Option<String>,
    api_base: Option<String>,
    api_key: Option<String>,
    max_iterations: Option<usize>,
    temperature: Option<f32>,
    request_timeout: Option<Duration>,
    output_dir: Option<PathBuf>,
    weather_api_key: Option<String>,
    search_api_key: Option<String>,
}

impl AssistantConfigBuilder {
    /// Start from an existing configuration instead of the defaults
    pub fn base(mut self, config: AssistantConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the chat model
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Set the model API base URL
    pub fn api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = Some(api_base.into());
        self
    }

    /// Set the model API key
    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Set the executor iteration cap
    pub fn max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = Some(max);
        self
    }

    /// Set the sampling temperature
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Set the HTTP request timeout
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Set the `write_file` output directory
    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    /// Set the OpenWeather API key
    pub fn weather_api_key(mut self, key: impl Into<String>) -> Self {
        self.weather_api_key = Some(key.into());
        self
    }

    /// Set the Tavily API key
    pub fn search_api_key(mut self, key: impl Into<String>) -> Self {
        self.search_api_key = Some(key.into());
        self
    }

    /// Build and validate the configuration
    pub fn build(self) -> Result<AssistantConfig> {
        let mut config = self.config.unwrap_or_default();

        if let Some(model) = self.model {
            config.model = model;
        }
        if let Some(api_base) = self.api_base {
            config.api_base = api_base;
        }
        if self.api_key.is_some() {
            config.api_key = self.api_key;
        }
        if let Some(max) = self.max_iterations {
            config.max_iterations = max;
        }
        if self.temperature.is_some() {
            config.temperature = self.temperature;
        }
        if let Some(timeout) = self.request_timeout {
            config.request_timeout = timeout;
        }
        if let Some(dir) = self.output_dir {
            config.output_dir = dir;
        }
        if self.weather_api_key.is_some() {
            config.weather.api_key = self.weather_api_key;
        }
        if self.search_api_key.is_some() {
            config.search.api_key = self.search_api_key;
        }

        config.validate()?;
        Ok(config)
    }
}
