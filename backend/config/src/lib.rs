//! `finnext-config`: FinNext runtime configuration management.
//!
//! Provides:
//! - Typed config schema (gateway, inference service, chat client, logging, agent bindings)
//! - YAML loading from the config directory
//! - `${ENV_VAR}` substitution and `FINNEXT_*` env overrides
//! - Default agent bindings for the built-in registry
//! - Validation and redaction for safe display

pub mod defaults;
pub mod env;
pub mod io;
pub mod redact;
pub mod schema;
pub mod validation;

pub use defaults::{apply_all_defaults, api_key_env_for};
pub use env::{apply_env_overrides, resolve_env_vars, resolve_env_vars_with, MissingEnvVarError};
pub use io::{config_dir, config_file_path, load_raw_config, parse_yaml};
pub use redact::{mask_secret, redact};
pub use schema::{
    AgentBinding, ClientConfig, FinnextConfig, GatewayConfig, InferenceConfig, LoggingConfig,
};
pub use validation::{validate, ConfigValidationError, ValidationReport};

use anyhow::{bail, Context, Result};
use finnext_core::AgentRegistry;
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;

/// Read the config file and split out its logging section.
///
/// Callers install the logger from the returned [`LoggingConfig`] before
/// running [`prepare`], so load-time warnings are not lost.
pub async fn load_for_startup(path: &Path) -> Result<(Value, LoggingConfig)> {
    let raw = load_raw_config(path).await?;
    let logging = logging_section(&raw);
    Ok((raw, logging))
}

/// The `logging` section of a raw config with env vars resolved.
///
/// Anything unusable falls back to the default; [`prepare`] reports it properly later.
pub fn logging_section(raw: &Value) -> LoggingConfig {
    raw.get("logging")
        .and_then(|section| resolve_env_vars(section).ok())
        .and_then(|section| serde_json::from_value(section).ok())
        .unwrap_or_default()
}

/// The load pipeline minus file IO, parameterized over the environment.
pub fn prepare(
    raw: Value,
    env: &HashMap<String, String>,
    registry: &AgentRegistry,
) -> Result<FinnextConfig> {
    let value = resolve_env_vars_with(&raw, env).context("Failed to resolve env vars in config")?;

    let config: FinnextConfig =
        serde_json::from_value(value).context("Failed to deserialize config")?;
    let config = apply_env_overrides(config, env);
    let config = apply_all_defaults(config, registry);

    let report = validate(&config, registry);
    for warning in &report.warnings {
        tracing::warn!(path = %warning.path, message = %warning.message, "Config warning");
    }
    if !report.is_valid() {
        for error in &report.errors {
            tracing::error!(path = %error.path, message = %error.message, "Config error");
        }
        let summary: Vec<String> = report.errors.iter().map(|e| e.to_string()).collect();
        bail!("invalid configuration: {}", summary.join("; "));
    }

    Ok(config)
}
