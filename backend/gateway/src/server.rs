//! Main HTTP Gateway Server.

use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use axum::{Router, routing::get};
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, instrument, warn};

use finnext_config::{AgentBinding, FinnextConfig, InferenceConfig};
use finnext_core::{AgentRegistry, FinnextError, InferenceProvider};

use crate::{catalog, health_api, proxy};

/// Resolves a credential env var name to its current value.
pub type CredentialLookup = Arc<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Application state shared across routes. Holds no per-conversation data.
#[derive(Clone)]
pub struct GatewayState {
    pub registry: Arc<AgentRegistry>,
    pub bindings: Arc<BTreeMap<String, AgentBinding>>,
    pub inference: Arc<InferenceConfig>,
    pub provider: Arc<dyn InferenceProvider>,
    pub credentials: CredentialLookup,
    pub started_at: Instant,
}

impl GatewayState {
    /// Credentials are read from the process environment on every request.
    pub fn new(
        registry: Arc<AgentRegistry>,
        config: &FinnextConfig,
        provider: Arc<dyn InferenceProvider>,
    ) -> Self {
        Self {
            registry,
            bindings: Arc::new(config.agents.clone()),
            inference: Arc::new(config.inference.clone()),
            provider,
            credentials: Arc::new(|name: &str| std::env::var(name).ok()),
            started_at: Instant::now(),
        }
    }

    pub fn with_credentials(mut self, lookup: CredentialLookup) -> Self {
        self.credentials = lookup;
        self
    }

    /// Binding for a registry agent; unknown ids are a lookup failure.
    pub fn binding(&self, agent: &str) -> Result<&AgentBinding, FinnextError> {
        self.registry.get(agent)?;
        self.bindings
            .get(agent)
            .ok_or_else(|| FinnextError::Config(format!("agent '{agent}' has no inference binding")))
    }

    /// Current credential for a binding, falling back to the configured placeholder.
    pub fn credential(&self, binding: &AgentBinding) -> String {
        match (self.credentials)(&binding.api_key_env).filter(|k| !k.is_empty()) {
            Some(key) => key,
            None => {
                warn!(env = %binding.api_key_env, "Credential not set; sending placeholder key");
                self.inference.api_key_placeholder.clone()
            }
        }
    }
}

/// Build the Axum router with all gateway routes.
pub fn build_router(state: GatewayState) -> Router {
    Router::new()
        .route("/api/health", get(health_api::get_health))
        .route("/api/agents", get(catalog::list_agents))
        .route(
            "/api/agents/:agent",
            get(catalog::describe_agent).post(proxy::relay),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Serve the gateway on `addr` until Ctrl-C.
#[instrument(skip(state))]
pub async fn start_server(addr: SocketAddr, state: GatewayState) -> Result<()> {
    let agents = state.registry.list().len();
    let provider = state.provider.name().to_string();
    let app = build_router(state);

    let listener = TcpListener::bind(&addr).await?;
    info!(addr = %addr, agents, provider = %provider, "Gateway HTTP server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutdown signal received");
        })
        .await?;

    Ok(())
}


#[cfg(test)]
mod tests {
    use super::test_support::{spawn, state_with};
    use super::*;
    use finnext_core::Sender;
    use finnext_inference::MockProvider;
    use finnext_session::{ChatSession, HttpTransport, UNEXPECTED_ERROR};
    use serde_json::json;

    #[tokio::test]
    async fn test_session_through_gateway() {
        let provider = Arc::new(MockProvider::new().with_reply(json!({
            "response": { "content": "Your risk score is 6/10.", "sources": [] }
        })));
        let base = spawn(state_with(Arc::clone(&provider))).await;

        let mut session = ChatSession::new(Arc::new(AgentRegistry::builtin()));
        session.switch_agent("risk").unwrap();
        let transport = HttpTransport::new(base);
        session.submit("What is my risk score?", &transport).await.unwrap();

        let history = session.history("risk");
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].sender, Sender::User);
        assert_eq!(history[1].sender, Sender::Agent);
        assert_eq!(history[1].content, "Your risk score is 6/10.");
        assert_eq!(history[1].sources, Some(vec![]));

        let calls = provider.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].message, "What is my risk score?");
        assert_eq!(calls[0].api_key, "risk-secret");
    }

    #[tokio::test]
    async fn test_session_sees_upstream_failure() {
        let provider = Arc::new(MockProvider::new().with_upstream_error(503, "overloaded"));
        let base = spawn(state_with(provider)).await;

        let mut session = ChatSession::new(Arc::new(AgentRegistry::builtin()));
        let transport = HttpTransport::new(base);
        let reply = session.submit("hello", &transport).await.unwrap();

        assert!(reply.content.contains("503"));
        assert!(reply.content.contains("overloaded"));
    }

    #[tokio::test]
    async fn test_session_sees_gateway_down() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let mut session = ChatSession::new(Arc::new(AgentRegistry::builtin()));
        let transport = HttpTransport::new(format!("http://{addr}"));
        let reply = session.submit("hello", &transport).await.unwrap();
        assert_eq!(reply.content, UNEXPECTED_ERROR);
    }

    #[test]
    fn test_placeholder_credential() {
        let state = state_with(Arc::new(MockProvider::new()));
        let binding = state.binding("forecast").unwrap().clone();
        assert_eq!(state.credential(&binding), "YOUR_AGENT_API_KEY_HERE");
        let binding = state.binding("risk").unwrap().clone();
        assert_eq!(state.credential(&binding), "risk-secret");
    }

    #[test]
    fn test_unknown_agent_binding() {
        let state = state_with(Arc::new(MockProvider::new()));
        assert!(matches!(
            state.binding("astrology"),
            Err(FinnextError::AgentNotFound(_))
        ));
    }
}
