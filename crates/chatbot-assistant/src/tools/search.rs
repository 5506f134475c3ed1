//! Web search through the Tavily API

use async_trait::async_trait;
use chatbot_core::Result as AgentResult;
use chatbot_llm::tools::schema;
use chatbot_tools::Tool;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::{debug, info};

use crate::config::{SearchConfig, TAVILY_API_KEY_ENV};
use crate::error::{AssistantError, Result};
use crate::transport::HttpTransport;

/// Tool name the model calls
pub const SEARCH_TOOL_NAME: &str = "search_tool";

const DESCRIPTION: &str = "A search engine optimized for comprehensive, accurate, and trusted \
results. Useful for when you need to answer questions about current events. Input should be a \
search query.";

#[derive(Debug, Deserialize)]
struct SearchParams {
    query: String,
}

#[derive(Debug, Serialize)]
struct SearchRequest<'a> {
    query: &'a str,
    max_results: u32,
    topic: &'a str,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchHit>,
}

/// One search result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    /// Page title
    #[serde(default)]
    pub title: String,
    /// Page URL
    pub url: String,
    /// Relevant excerpt
    #[serde(default)]
    pub content: String,
    /// Relevance score
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

/// Searches the web for news, events and other live information
pub struct SearchTool {
    transport: Arc<dyn HttpTransport>,
    config: SearchConfig,
}

impl SearchTool {
    /// Create a new search tool
    pub fn new(config: SearchConfig, transport: Arc<dyn HttpTransport>) -> Self {
        Self { transport, config }
    }

    /// Run `query` and return the hits in ranking order
    pub async fn search(&self, query: &str) -> Result<Vec<SearchHit>> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or(AssistantError::MissingApiKey(TAVILY_API_KEY_ENV))?;

        info!(query, max_results = self.config.max_results, "Searching the web");
        let body = serde_json::to_value(SearchRequest {
            query,
            max_results: self.config.max_results,
            topic: &self.config.topic,
        })?;

        let response = self
            .transport
            .post_json(&self.config.endpoint, api_key, body)
            .await?;
        if !response.is_success() {
            return Err(AssistantError::SearchApi {
                status: response.status,
                body: response.body,
            });
        }

        let parsed: SearchResponse = serde_json::from_str(&response.body)?;
        debug!(hits = parsed.results.len(), "Search completed");
        Ok(parsed.results)
    }
}

#[async_trait]
impl Tool for SearchTool {
    async fn execute(&self, params: Value) -> AgentResult<Value> {
        let params: SearchParams = serde_json::from_value(params)
            .map_err(|e| AssistantError::InvalidParameters(e.to_string()))?;

        let hits = self.search(&params.query).await?;
        Ok(serde_json::to_value(hits).map_err(AssistantError::from)?)
    }

    fn name(&self) -> &str {
        SEARCH_TOOL_NAME
    }

    fn description(&self) -> &str {
        DESCRIPTION
    }

    fn input_schema(&self) -> Value {
        schema::object(
            json!({ "query": schema::string("search query to look up") }),
            &["query"],
        )
    }
}
