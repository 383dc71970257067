//! FinNext runtime configuration schema.
//!
//! Every section has serde defaults so a partial (or missing) YAML file still
//! yields a runnable configuration.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::defaults;

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FinnextConfig {
    pub gateway: GatewayConfig,
    pub inference: InferenceConfig,
    pub client: ClientConfig,
    pub logging: LoggingConfig,
    /// Registry agent id → external inference binding.
    pub agents: BTreeMap<String, AgentBinding>,
}

// ---------------------------------------------------------------------------
// Gateway
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GatewayConfig {
    pub bind_address: String,
    pub port: u16,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            bind_address: defaults::DEFAULT_BIND_ADDRESS.to_string(),
            port: defaults::DEFAULT_PORT,
        }
    }
}

// ---------------------------------------------------------------------------
// Inference service
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct InferenceConfig {
    pub url: String,
    pub user_id: String,
    /// Appended to the external agent id to form the outbound session id.
    pub session_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
    /// Sent when a binding's credential env var is unset.
    pub api_key_placeholder: String,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            url: defaults::DEFAULT_INFERENCE_URL.to_string(),
            user_id: defaults::DEFAULT_USER_ID.to_string(),
            session_id: defaults::DEFAULT_SESSION_ID.to_string(),
            timeout_secs: Some(defaults::DEFAULT_TIMEOUT_SECS),
            api_key_placeholder: defaults::API_KEY_PLACEHOLDER.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Chat client
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ClientConfig {
    /// Base URL the chat session posts to; endpoint paths are appended.
    pub gateway_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            gateway_url: defaults::DEFAULT_GATEWAY_URL.to_string(),
            timeout_secs: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Logging
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LoggingConfig {
    pub level: String,
    /// Emit console logs as JSON instead of human-readable lines.
    pub json: bool,
    /// When set, also write daily-rotated NDJSON logs here.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            dir: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Agent bindings
// ---------------------------------------------------------------------------

/// Ties a registry persona to its external agent and credential.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentBinding {
    /// Agent identifier on the inference service.
    pub agent_id: String,
    /// Env var holding the API key, read on every request.
    #[serde(default)]
    pub api_key_env: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let raw = "gateway:\n  port: 8081\nagents:\n  risk:\n    agentId: abc123\n";
        let config: FinnextConfig = serde_yaml::from_str(raw).unwrap();
        assert_eq!(config.gateway.port, 8081);
        assert_eq!(config.gateway.bind_address, "0.0.0.0");
        assert_eq!(config.inference.user_id, "finnext-user");
        assert_eq!(config.agents["risk"].agent_id, "abc123");
        assert!(config.agents["risk"].api_key_env.is_empty());
    }
}
