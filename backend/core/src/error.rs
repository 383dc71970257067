use thiserror::Error;

/// Top-level error type for the FinNext agent gateway.
#[derive(Debug, Error)]
pub enum FinnextError {
    /// A required field was missing or empty; no outbound call was made.
    #[error("validation failed: {0}")]
    Validation(String),

    /// The inference service answered with a non-success status.
    #[error("upstream returned {status}: {message}")]
    Upstream { status: u16, message: String },

    /// No usable response was obtained (connect failure, timeout, undecodable body).
    #[error("transport failure: {0}")]
    Transport(String),

    #[error("unknown agent '{0}'")]
    AgentNotFound(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl FinnextError {
    /// HTTP status that best describes this failure when surfaced by the gateway.
    pub fn status_code(&self) -> u16 {
        match self {
            FinnextError::Validation(_) => 400,
            FinnextError::AgentNotFound(_) => 404,
            FinnextError::Upstream { status, .. } => *status,
            FinnextError::Transport(_) | FinnextError::Config(_) | FinnextError::Other(_) => 500,
        }
    }
}
