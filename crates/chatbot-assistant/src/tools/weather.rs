//! Current weather lookup against OpenWeather

use async_trait::async_trait;
use chatbot_core::Result as AgentResult;
use chatbot_llm::tools::schema;
use chatbot_tools::Tool;
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::{debug, info};

use crate::config::WeatherConfig;
use crate::error::{AssistantError, Result};
use crate::transport::HttpTransport;

/// Tool name the model calls
pub const WEATHER_TOOL_NAME: &str = "get_weather";

const DESCRIPTION: &str = "查询即时天气。参数 loc 为城市名称；中国城市需使用对应的英文名称，\
例如查询杭州市天气时 loc 传入 \"Hangzhou\"。返回 OpenWeather 即时天气接口 \
(https://api.openweathermap.org/data/2.5/weather) 的原始 JSON 文本，包含全部重要天气信息。";

#[derive(Debug, Deserialize)]
struct WeatherParams {
    loc: String,
}

/// Looks up current weather for a city
///
/// The response body is handed back untouched, whatever the status code, so
/// the model also sees OpenWeather's own error payloads.
pub struct WeatherTool {
    transport: Arc<dyn HttpTransport>,
    config: WeatherConfig,
}

impl WeatherTool {
    /// Create a new weather tool
    pub fn new(config: WeatherConfig, transport: Arc<dyn HttpTransport>) -> Self {
        Self { transport, config }
    }

    /// Query parameters sent for `loc`
    pub fn query_params(&self, loc: &str) -> Vec<(String, String)> {
        let mut params = vec![("q".to_string(), loc.to_string())];
        if let Some(key) = &self.config.api_key {
            params.push(("APPID".to_string(), key.clone()));
        }
        params.push(("units".to_string(), self.config.units.clone()));
        params.push(("lang".to_string(), self.config.lang.clone()));
        params
    }

    /// Fetch the raw weather body for `loc`
    pub async fn fetch(&self, loc: &str) -> Result<String> {
        info!(loc, "Querying current weather");
        let response = self
            .transport
            .get(&self.config.endpoint, self.query_params(loc))
            .await?;
        debug!(status = response.status, "Weather response");
        Ok(response.body)
    }
}

#[async_trait]
impl Tool for WeatherTool {
    async fn execute(&self, params: Value) -> AgentResult<Value> {
        let params: WeatherParams = serde_json::from_value(params)
            .map_err(|e| AssistantError::InvalidParameters(e.to_string()))?;

        let body = self.fetch(&params.loc).await?;
        Ok(Value::String(body))
    }

    fn name(&self) -> &str {
        WEATHER_TOOL_NAME
    }

    fn description(&self) -> &str {
        DESCRIPTION
    }

    fn input_schema(&self) -> Value {
        schema::object(json!({ "loc": schema::string("城市名称") }), &["loc"])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OPENWEATHER_ENDPOINT;
    use crate::transport::{HttpResponse, MockHttpTransport};

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    fn keyed_config() -> WeatherConfig {
        WeatherConfig {
            api_key: Some("test-key".to_string()),
            ..WeatherConfig::default()
        }
    }

    #[tokio::test]
    async fn test_get_request_and_verbatim_body() {
        let body = r#"{"name":"Hangzhou","main":{"temp":21.5},"weather":[{"description":"多云"}]}"#;

        let expected = pairs(&[
            ("q", "Hangzhou"),
            ("APPID", "test-key"),
            ("units", "metric"),
            ("lang", "zh_cn"),
        ]);

        let mut transport = MockHttpTransport::new();
        transport
            .expect_get()
            .withf(move |url, query| url == OPENWEATHER_ENDPOINT && *query == expected)
            .times(1)
            .returning(move |_, _| {
                Ok(HttpResponse {
                    status: 200,
                    body: body.to_string(),
                })
            });

        let tool = WeatherTool::new(keyed_config(), Arc::new(transport));
        let result = tool.execute(json!({"loc": "Hangzhou"})).await.unwrap();

        assert_eq!(result, Value::String(body.to_string()));
    }

    #[tokio::test]
    async fn test_error_status_body_is_returned() {
        let body = r#"{"cod":"404","message":"city not found"}"#;

        let mut transport = MockHttpTransport::new();
        transport.expect_get().times(1).returning(move |_, _| {
            Ok(HttpResponse {
                status: 404,
                body: body.to_string(),
            })
        });

        let tool = WeatherTool::new(keyed_config(), Arc::new(transport));
        let result = tool.execute(json!({"loc": "Atlantis"})).await.unwrap();

        assert_eq!(result.as_str(), Some(body));
    }

    #[tokio::test]
    async fn test_malformed_body_is_returned() {
        let mut transport = MockHttpTransport::new();
        transport.expect_get().returning(|_, _| {
            Ok(HttpResponse {
                status: 502,
                body: "<html>Bad Gateway</html>".to_string(),
            })
        });

        let tool = WeatherTool::new(keyed_config(), Arc::new(transport));
        let result = tool.execute(json!({"loc": "Hangzhou"})).await.unwrap();

        assert_eq!(result.as_str(), Some("<html>Bad Gateway</html>"));
    }

    #[test]
    fn test_appid_omitted_without_key() {
        let tool = WeatherTool::new(WeatherConfig::default(), Arc::new(MockHttpTransport::new()));
        let params = tool.query_params("Beijing");

        assert_eq!(
            params,
            pairs(&[("q", "Beijing"), ("units", "metric"), ("lang", "zh_cn")])
        );
    }

    #[tokio::test]
    async fn test_transport_failure_is_tool_error() {
        let mut transport = MockHttpTransport::new();
        transport.expect_get().returning(|_, _| {
            Err(AssistantError::Io(std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                "connection refused",
            )))
        });

        let tool = WeatherTool::new(keyed_config(), Arc::new(transport));
        let err = tool.execute(json!({"loc": "Hangzhou"})).await.unwrap_err();

        assert!(err.to_string().contains("connection refused"));
    }

    #[tokio::test]
    async fn test_missing_loc_is_rejected() {
        let tool = WeatherTool::new(keyed_config(), Arc::new(MockHttpTransport::new()));
        let err = tool.execute(json!({"city": "Hangzhou"})).await.unwrap_err();

        assert!(err.to_string().contains("loc"));
    }

    #[test]
    fn test_schema() {
        let tool = WeatherTool::new(WeatherConfig::default(), Arc::new(MockHttpTransport::new()));
        let schema = tool.input_schema();

        assert_eq!(tool.name(), "get_weather");
        assert_eq!(schema["required"], json!(["loc"]));
        assert_eq!(schema["properties"]["loc"]["type"], "string");
    }
}
