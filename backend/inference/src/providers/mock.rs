use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{json, Value};

use finnext_core::{FinnextError, InferenceProvider, InferenceRequest};

enum Behavior {
    Echo,
    Reply(Value),
    Upstream { status: u16, body: String },
    Transport(String),
}

/// A canned inference provider for offline runs and tests.
///
/// Every request is recorded so callers can assert on what would have been sent.
pub struct MockProvider {
    behavior: Behavior,
    calls: Mutex<Vec<InferenceRequest>>,
}

impl MockProvider {
    /// Echoes the incoming message back in the nested reply shape.
    pub fn new() -> Self {
        Self {
            behavior: Behavior::Echo,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_reply(mut self, reply: Value) -> Self {
        self.behavior = Behavior::Reply(reply);
        self
    }

    pub fn with_upstream_error(mut self, status: u16, body: impl Into<String>) -> Self {
        self.behavior = Behavior::Upstream {
            status,
            body: body.into(),
        };
        self
    }

    pub fn with_transport_error(mut self, detail: impl Into<String>) -> Self {
        self.behavior = Behavior::Transport(detail.into());
        self
    }

    pub fn calls(&self) -> Vec<InferenceRequest> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl InferenceProvider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    async fn chat(&self, request: &InferenceRequest) -> Result<Value, FinnextError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(request.clone());
        }
        match &self.behavior {
            Behavior::Echo => Ok(json!({
                "response": {
                    "content": format!("[{}] {}", request.agent_id, request.message),
                    "sources": [],
                }
            })),
            Behavior::Reply(value) => Ok(value.clone()),
            Behavior::Upstream { status, body } => Err(FinnextError::Upstream {
                status: *status,
                message: body.clone(),
            }),
            Behavior::Transport(detail) => Err(FinnextError::Transport(detail.clone())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(message: &str) -> InferenceRequest {
        InferenceRequest {
            user_id: "u".into(),
            agent_id: "risk-agent".into(),
            session_id: "risk-agent-s".into(),
            message: message.into(),
            api_key: "k".into(),
        }
    }

    #[tokio::test]
    async fn test_echo_records_calls() {
        let provider = MockProvider::new();
        let reply = provider.chat(&request("hi")).await.unwrap();
        assert_eq!(reply["response"]["content"], "[risk-agent] hi");
        assert_eq!(provider.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_scripted_failure() {
        let provider = MockProvider::new().with_upstream_error(429, "slow down");
        let err = provider.chat(&request("hi")).await.unwrap_err();
        assert_eq!(err.status_code(), 429);
    }
}
