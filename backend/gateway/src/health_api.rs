//! Gateway Health API

use axum::{Json, extract::State};
use serde::Serialize;

use crate::server::GatewayState;

#[derive(Serialize)]
pub struct HealthReport {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
    pub provider: String,
    pub agents: usize,
    pub uptime_seconds: u64,
}

/// Handler for `GET /api/health`
pub async fn get_health(State(state): State<GatewayState>) -> Json<HealthReport> {
    Json(HealthReport {
        status: "ok",
        service: "finnext-gateway",
        version: env!("CARGO_PKG_VERSION"),
        provider: state.provider.name().to_string(),
        agents: state.registry.list().len(),
        uptime_seconds: state.started_at.elapsed().as_secs(),
    })
}
