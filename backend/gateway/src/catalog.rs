//! Agent registry listing (`GET /api/agents`, `GET /api/agents/:agent`).

use axum::{
    Json,
    extract::{Path, State},
};
use serde_json::{Value, json};

use finnext_core::AgentConfig;

use crate::proxy::ProxyFailure;
use crate::server::GatewayState;

/// All agent personas, in display order.
pub async fn list_agents(State(state): State<GatewayState>) -> Json<Value> {
    Json(json!({ "agents": state.registry.list() }))
}

pub async fn describe_agent(
    State(state): State<GatewayState>,
    Path(agent): Path<String>,
) -> Result<Json<AgentConfig>, ProxyFailure> {
    let config = state.registry.get(&agent)?;
    Ok(Json(config.clone()))
}
