use std::fmt;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::FinnextError;

/// Client for the external agent-inference service.
///
/// Implementations make exactly one outbound call per `chat` and return the raw
/// reply body; shaping it into a [`crate::ProxyReply`] is the caller's job.
#[async_trait]
pub trait InferenceProvider: Send + Sync {
    /// Provider name (e.g., "lyzr", "mock").
    fn name(&self) -> &str;

    async fn chat(&self, request: &InferenceRequest) -> Result<Value, FinnextError>;
}

/// One chat turn addressed to an external agent.
#[derive(Clone, PartialEq, Eq)]
pub struct InferenceRequest {
    pub user_id: String,
    pub agent_id: String,
    pub session_id: String,
    pub message: String,
    pub api_key: String,
}

// Keeps the credential out of logs.
impl fmt::Debug for InferenceRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InferenceRequest")
            .field("user_id", &self.user_id)
            .field("agent_id", &self.agent_id)
            .field("session_id", &self.session_id)
            .field("message", &self.message)
            .field("api_key", &"***")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_hides_api_key() {
        let req = InferenceRequest {
            user_id: "u".into(),
            agent_id: "a".into(),
            session_id: "a-s".into(),
            message: "hello".into(),
            api_key: "sk-live-secret".into(),
        };
        let rendered = format!("{req:?}");
        assert!(!rendered.contains("sk-live-secret"));
        assert!(rendered.contains("hello"));
    }
}
