//! HTTP boundary of the client.
//!
//! [`Transport`] is the only place the client touches the network, so tests
//! (and the batch processor's tests) swap in a [`MockTransport`](crate::MockTransport)
//! instead of a live registry.

use async_trait::async_trait;
use serde_json::Value;
use tracing::trace;

use crate::config::ClientConfig;
use crate::error::{ErrorKind, Result};

/// Status and body of an HTTP response, whatever the status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Sends requests to the registry.
///
/// Implementations only fail when no response was received at all; non-2xx
/// responses are returned as [`HttpResponse`]s for the client to interpret.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn post_json(&self, url: &str, body: &Value) -> Result<HttpResponse>;
    async fn get(&self, url: &str) -> Result<HttpResponse>;
}

/// [`Transport`] backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.timeout)
            .build()
            .map_err(|e| ErrorKind::Config(e.to_string()))?;
        Ok(Self { client })
    }

    async fn read(response: reqwest::Response) -> Result<HttpResponse> {
        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| ErrorKind::Transport(e.to_string()))?;
        trace!(status, bytes = body.len(), "Received response");
        Ok(HttpResponse { status, body })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn post_json(&self, url: &str, body: &Value) -> Result<HttpResponse> {
        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| ErrorKind::Transport(e.to_string()))?;
        Self::read(response).await
    }

    async fn get(&self, url: &str) -> Result<HttpResponse> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ErrorKind::Transport(e.to_string()))?;
        Self::read(response).await
    }
}
