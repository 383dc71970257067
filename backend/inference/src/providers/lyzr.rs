use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use finnext_core::{FinnextError, InferenceProvider, InferenceRequest};

pub const DEFAULT_INFERENCE_URL: &str = "https://agent-prod.studio.lyzr.ai/v3/inference/chat/";

/// Lyzr agent-inference provider (`POST /v3/inference/chat/`).
pub struct LyzrProvider {
    client: Client,
    url: String,
    timeout: Option<Duration>,
}

impl LyzrProvider {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
            url: DEFAULT_INFERENCE_URL.to_string(),
            timeout: None,
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Bound each outbound call; an elapsed timeout surfaces as a transport failure.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

impl Default for LyzrProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Serialize)]
struct ChatBody<'a> {
    user_id: &'a str,
    agent_id: &'a str,
    session_id: &'a str,
    message: &'a str,
}

#[async_trait]
impl InferenceProvider for LyzrProvider {
    fn name(&self) -> &str {
        "lyzr"
    }

    async fn chat(&self, request: &InferenceRequest) -> Result<Value, FinnextError> {
        let start = Instant::now();

        let body = ChatBody {
            user_id: &request.user_id,
            agent_id: &request.agent_id,
            session_id: &request.session_id,
            message: &request.message,
        };

        debug!(
            agent_id = %request.agent_id,
            session_id = %request.session_id,
            "Sending request to inference service"
        );

        let mut builder = self
            .client
            .post(&self.url)
            .header("Content-Type", "application/json")
            .header("x-api-key", &request.api_key)
            .json(&body);
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                FinnextError::Transport("inference request timed out".into())
            } else {
                FinnextError::Transport(format!("inference request failed: {e}"))
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(FinnextError::Upstream {
                status: status.as_u16(),
                message: error_body,
            });
        }

        let reply: Value = response
            .json()
            .await
            .map_err(|e| FinnextError::Transport(format!("undecodable inference reply: {e}")))?;

        debug!(
            agent_id = %request.agent_id,
            latency_ms = start.elapsed().as_millis() as u64,
            "Inference reply received"
        );

        Ok(reply)
    }
}
