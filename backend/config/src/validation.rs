//! Config validation with user-friendly error messages.

use finnext_core::AgentRegistry;
use thiserror::Error;

use crate::schema::FinnextConfig;

/// A config validation error with field path and message.
#[derive(Debug, Error)]
#[error("Config validation error at '{path}': {message}")]
pub struct ConfigValidationError {
    pub path: String,
    pub message: String,
}

/// A collection of validation errors found in one pass.
#[derive(Debug, Default)]
pub struct ValidationReport {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn error(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }

    fn warn(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }
}

/// Validate the config against the agent registry.
pub fn validate(config: &FinnextConfig, registry: &AgentRegistry) -> ValidationReport {
    let mut report = ValidationReport::default();
    validate_gateway(config, &mut report);
    validate_inference(config, &mut report);
    validate_agents(config, registry, &mut report);
    report
}

fn validate_gateway(config: &FinnextConfig, report: &mut ValidationReport) {
    if config.gateway.port == 0 {
        report.error("gateway.port", "Port must be non-zero");
    }
    if config.gateway.bind_address.trim().is_empty() {
        report.error("gateway.bindAddress", "Bind address cannot be empty");
    }
}

fn validate_inference(config: &FinnextConfig, report: &mut ValidationReport) {
    let url = &config.inference.url;
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        report.error("inference.url", format!("Expected an http(s) URL, got '{url}'"));
    }
    if config.inference.user_id.trim().is_empty() {
        report.error("inference.userId", "User id cannot be empty");
    }
    match config.inference.timeout_secs {
        None => report.warn(
            "inference.timeoutSecs",
            "No timeout set; a stalled inference call blocks its chat turn indefinitely",
        ),
        Some(0) => report.error("inference.timeoutSecs", "Timeout must be at least 1 second"),
        Some(_) => {}
    }
}

fn validate_agents(config: &FinnextConfig, registry: &AgentRegistry, report: &mut ValidationReport) {
    for id in registry.ids() {
        let path = format!("agents.{id}");
        match config.agents.get(id) {
            None => report.error(&path, "Agent has no inference binding"),
            Some(binding) if binding.agent_id.trim().is_empty() => {
                report.error(format!("{path}.agentId"), "Agent id cannot be empty")
            }
            Some(_) => {}
        }
    }
    for id in config.agents.keys() {
        if !registry.contains(id) {
            report.warn(format!("agents.{id}"), "Binding refers to an unknown agent; ignored");
        }
    }
}
