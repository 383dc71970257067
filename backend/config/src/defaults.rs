//! Config defaults: constants plus per-agent binding fill-in.

use finnext_core::AgentRegistry;

use crate::schema::{AgentBinding, FinnextConfig};

pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_GATEWAY_URL: &str = "http://localhost:3000";
pub const DEFAULT_INFERENCE_URL: &str = "https://agent-prod.studio.lyzr.ai/v3/inference/chat/";
pub const DEFAULT_USER_ID: &str = "finnext-user";
pub const DEFAULT_SESSION_ID: &str = "finnext-session-1";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;
pub const API_KEY_PLACEHOLDER: &str = "YOUR_AGENT_API_KEY_HERE";

/// External agent id of the screener persona.
const SCREENER_AGENT_ID: &str = "69272a6274293a73c735c970";

/// Env var conventionally holding an agent's key, e.g. `SCREENER_AGENT_API_KEY`.
pub fn api_key_env_for(agent: &str) -> String {
    format!("{}_AGENT_API_KEY", agent.to_ascii_uppercase())
}

/// External agent id used when the config does not name one.
pub fn default_agent_id(agent: &str) -> String {
    match agent {
        "screener" => SCREENER_AGENT_ID.to_string(),
        other => format!("finnext-{other}"),
    }
}

/// Apply all defaults to a freshly loaded config.
pub fn apply_all_defaults(config: FinnextConfig, registry: &AgentRegistry) -> FinnextConfig {
    apply_agent_defaults(config, registry)
}

/// Ensure every registry agent has a binding and every binding names a key env var.
fn apply_agent_defaults(mut config: FinnextConfig, registry: &AgentRegistry) -> FinnextConfig {
    for id in registry.ids() {
        config
            .agents
            .entry(id.to_string())
            .or_insert_with(|| AgentBinding {
                agent_id: default_agent_id(id),
                api_key_env: String::new(),
            });
    }
    for (id, binding) in config.agents.iter_mut() {
        if binding.api_key_env.trim().is_empty() {
            binding.api_key_env = api_key_env_for(id);
        }
    }
    config
}
