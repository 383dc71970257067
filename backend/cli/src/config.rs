use std::collections::HashMap;

use anyhow::Result;
use serde_json::Value;

use finnext_config::{config_dir, config_file_path, load_for_startup, prepare, FinnextConfig, LoggingConfig};
use finnext_core::AgentRegistry;

/// Read `~/.finnext/config.yaml` (or `$FINNEXT_CONFIG_DIR`) without validating it.
///
/// A missing file yields an empty tree and default logging.
pub async fn read() -> Result<(Value, LoggingConfig)> {
    load_for_startup(&config_file_path(&config_dir())).await
}

/// Finish loading against the process environment; warnings go to the installed logger.
pub fn finish(raw: Value, registry: &AgentRegistry) -> Result<FinnextConfig> {
    let env: HashMap<String, String> = std::env::vars().collect();
    prepare(raw, &env, registry)
}
