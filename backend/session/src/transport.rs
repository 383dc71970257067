//! Outbound seam between a chat session and the agent proxy endpoints.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use tracing::debug;

use finnext_core::{ProxyReply, ProxyRequest};

/// Server error text used when a failure body cannot be parsed.
pub const UNKNOWN_ERROR: &str = "Unknown error";

/// What a proxy endpoint answered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    Reply(ProxyReply),
    /// Non-success status plus the server-supplied error text.
    Rejected { status: u16, error: String },
}

/// Sends one chat turn to an agent's proxy endpoint.
///
/// `Err` means no usable response was obtained at all.
#[async_trait]
pub trait AgentTransport: Send + Sync {
    async fn deliver(&self, endpoint: &str, request: &ProxyRequest) -> Result<Delivery>;
}

/// Posts chat turns as JSON to `<base_url><endpoint>`.
pub struct HttpTransport {
    client: Client,
    base_url: String,
    timeout: Option<Duration>,
}

impl HttpTransport {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl AgentTransport for HttpTransport {
    async fn deliver(&self, endpoint: &str, request: &ProxyRequest) -> Result<Delivery> {
        let url = format!("{}{}", self.base_url, endpoint);
        debug!(url = %url, history = request.history.len(), "Posting chat turn");

        let mut builder = self.client.post(&url).json(request);
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        let response = builder
            .send()
            .await
            .with_context(|| format!("agent endpoint {url} unreachable"))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Ok(Delivery::Rejected {
                status: status.as_u16(),
                error: server_error_text(&body, status),
            });
        }

        let reply: ProxyReply = response
            .json()
            .await
            .context("agent reply was not valid JSON")?;
        Ok(Delivery::Reply(reply))
    }
}

/// `error` field of a JSON body, else the reason phrase; unparseable bodies
/// yield [`UNKNOWN_ERROR`].
fn server_error_text(body: &str, status: StatusCode) -> String {
    match serde_json::from_str::<Value>(body) {
        Err(_) => UNKNOWN_ERROR.to_string(),
        Ok(value) => value
            .get("error")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| status.canonical_reason().unwrap_or_default().to_string()),
    }
}
