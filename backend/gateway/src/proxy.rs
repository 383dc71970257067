//! Agent proxy endpoint (`POST /api/agents/:agent`).
//!
//! Relays one chat turn to the external inference service and answers with the
//! normalized `{reply, sources}` contract. Failures answer `{error}`.

use axum::{
    Json,
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::{error, info, warn};

use finnext_core::{ErrorBody, FinnextError, InferenceRequest, ProxyReply, ProxyRequest};
use finnext_inference::normalize_reply;
use finnext_logging::redact_secrets;

use crate::server::GatewayState;

pub const MISSING_INPUT: &str = "Missing 'input' in request body";
pub const INTERNAL_ERROR: &str = "Internal Server Error";

/// A failed relay, rendered as `{error}` with the matching status.
#[derive(Debug)]
pub struct ProxyFailure {
    pub status: StatusCode,
    pub error: String,
}

impl ProxyFailure {
    fn internal() -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            error: INTERNAL_ERROR.to_string(),
        }
    }
}

impl From<FinnextError> for ProxyFailure {
    fn from(err: FinnextError) -> Self {
        let status = StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::BAD_GATEWAY);
        let error = match err {
            FinnextError::Validation(message) => message,
            FinnextError::AgentNotFound(id) => format!("Unknown agent '{id}'"),
            FinnextError::Upstream { message, .. } => format!("Agent inference failed: {message}"),
            FinnextError::Transport(_) | FinnextError::Config(_) | FinnextError::Other(_) => {
                INTERNAL_ERROR.to_string()
            }
        };
        Self { status, error }
    }
}

impl IntoResponse for ProxyFailure {
    fn into_response(self) -> Response {
        (self.status, Json(ErrorBody::new(self.error))).into_response()
    }
}

/// Handler for `POST /api/agents/:agent`.
#[tracing::instrument(
    name = "relay",
    skip(state, body),
    fields(request_id = %uuid::Uuid::new_v4())
)]
pub async fn relay(
    State(state): State<GatewayState>,
    Path(agent): Path<String>,
    body: Bytes,
) -> Result<Json<ProxyReply>, ProxyFailure> {
    let binding = state.binding(&agent).map_err(|e| {
        warn!(error = %e, "Relay refused");
        ProxyFailure::from(e)
    })?;

    let request: ProxyRequest = serde_json::from_slice(&body).map_err(|e| {
        error!(error = %e, "Malformed relay body");
        ProxyFailure::internal()
    })?;

    let input = request
        .input
        .filter(|input| !input.is_empty())
        .ok_or_else(|| FinnextError::Validation(MISSING_INPUT.to_string()))?;

    let outbound = InferenceRequest {
        user_id: state.inference.user_id.clone(),
        agent_id: binding.agent_id.clone(),
        session_id: format!("{}-{}", binding.agent_id, state.inference.session_id),
        message: input,
        api_key: state.credential(binding),
    };

    let raw = state.provider.chat(&outbound).await.map_err(|e| {
        match &e {
            FinnextError::Upstream { status, message } => error!(
                status,
                body = %redact_secrets(message),
                "Inference service error"
            ),
            other => error!(error = %redact_secrets(&other.to_string()), "Inference call failed"),
        }
        ProxyFailure::from(e)
    })?;

    let reply = normalize_reply(&raw);
    info!(sources = reply.sources.len(), "Relayed agent reply");
    Ok(Json(reply))
}
