//! HTTP transport used by the network-backed tools

use crate::error::Result;
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// Status and raw body of an HTTP response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// HTTP status code
    pub status: u16,
    /// Body decoded as text
    pub body: String,
}

impl HttpResponse {
    /// Whether the status is 2xx
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Outbound HTTP calls made by tools
///
/// Non-2xx responses are returned as values; only transport failures are
/// errors.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// GET `url` with the given query parameters
    async fn get(&self, url: &str, query: Vec<(String, String)>) -> Result<HttpResponse>;

    /// POST `body` as JSON to `url` with a bearer token
    async fn post_json(&self, url: &str, bearer: &str, body: Value) -> Result<HttpResponse>;
}

/// [`HttpTransport`] backed by a shared `reqwest` client
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Create a transport whose requests time out after `timeout`
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }

    async fn read(response: reqwest::Response) -> Result<HttpResponse> {
        let status = response.status().as_u16();
        let body = response.text().await?;
        debug!(status, bytes = body.len(), "HTTP response received");
        Ok(HttpResponse { status, body })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get(&self, url: &str, query: Vec<(String, String)>) -> Result<HttpResponse> {
        debug!(url, params = query.len(), "GET");
        let response = self.client.get(url).query(&query).send().await?;
        Self::read(response).await
    }

    async fn post_json(&self, url: &str, bearer: &str, body: Value) -> Result<HttpResponse> {
        debug!(url, "POST");
        let response = self
            .client
            .post(url)
            .bearer_auth(bearer)
            .json(&body)
            .send()
            .await?;
        Self::read(response).await
    }
}
