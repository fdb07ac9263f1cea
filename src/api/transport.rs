//! HTTP transport seam
//!
//! The executor only ever talks to a [`Transport`]. [`ReqwestTransport`] is
//! the real one; tests substitute an in-memory stub.

use super::error::{WebApiError, WebApiResult};
use super::request::{HttpRequest, HttpResponse};
use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;

#[async_trait]
pub trait Transport: Send + Sync {
    /// Perform one exchange. Non-2xx statuses are responses, not errors.
    async fn send(&self, request: HttpRequest) -> WebApiResult<HttpResponse>;
}

/// Transport backed by a shared `reqwest::Client`
#[derive(Clone)]
pub struct ReqwestTransport {
    http_client: reqwest::Client,
    access_token: Option<String>,
}

impl ReqwestTransport {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

    pub fn new(access_token: Option<String>) -> WebApiResult<Self> {
        Self::with_timeout(access_token, Self::DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(access_token: Option<String>, timeout: Duration) -> WebApiResult<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)                          // Request timeout
            .connect_timeout(Duration::from_secs(10))  // Connection timeout
            .user_agent(concat!("xrm-webapi/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http_client,
            access_token,
        })
    }

    /// Wrap an already configured HTTP client
    pub fn with_custom_client(http_client: reqwest::Client, access_token: Option<String>) -> Self {
        Self {
            http_client,
            access_token,
        }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> WebApiResult<HttpResponse> {
        let mut builder = self.http_client.request(request.method, request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(token) = &self.access_token {
            builder = builder.bearer_auth(token);
        }

        let response = builder.body(request.body).send().await.map_err(WebApiError::from)?;

        let status = response.status();
        let mut headers = HashMap::new();
        for (name, value) in response.headers() {
            if let Ok(value_str) = value.to_str() {
                headers.insert(name.to_string(), value_str.to_string());
            }
        }
        let body = response.text().await?;

        Ok(HttpResponse {
            status: status.as_u16(),
            status_text: status.canonical_reason().map(str::to_string),
            headers,
            body,
        })
    }
}
