//! Config file discovery and loading.

use anyhow::{Context, Result};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

/// Default config file name within the config directory.
const CONFIG_FILE_NAME: &str = "config.yaml";

/// Resolve the FinNext config directory.
/// Priority: `FINNEXT_CONFIG_DIR` env > `~/.finnext/`
pub fn config_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("FINNEXT_CONFIG_DIR") {
        return PathBuf::from(dir);
    }
    match dirs::home_dir() {
        Some(home) => home.join(".finnext"),
        None => PathBuf::from(".finnext"),
    }
}

/// Resolve the full path to the main config file.
pub fn config_file_path(config_dir: &Path) -> PathBuf {
    config_dir.join(CONFIG_FILE_NAME)
}

/// Read the config file as an untyped value tree.
///
/// Returns an empty object if the file doesn't exist (first run), so every
/// section falls back to its defaults.
pub async fn load_raw_config(path: &Path) -> Result<Value> {
    if !path.exists() {
        debug!(path = %path.display(), "Config file does not exist; using defaults");
        return Ok(Value::Object(serde_json::Map::new()));
    }

    let raw = fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let value = parse_yaml(&raw)
        .with_context(|| format!("Failed to parse config YAML at: {}", path.display()))?;

    info!(path = %path.display(), "Loaded config");
    Ok(value)
}

/// Parse YAML text; an empty document counts as an empty object.
pub fn parse_yaml(raw: &str) -> Result<Value> {
    let value: Value = serde_yaml::from_str(raw)?;
    Ok(match value {
        Value::Null => Value::Object(serde_json::Map::new()),
        other => other,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_is_empty_object() {
        assert_eq!(parse_yaml("").unwrap(), serde_json::json!({}));
    }

    #[test]
    fn test_invalid_yaml_errors() {
        assert!(parse_yaml("gateway: [unclosed").is_err());
    }

    #[tokio::test]
    async fn test_missing_file_yields_empty_object() {
        let value = load_raw_config(Path::new("/nonexistent/finnext/config.yaml"))
            .await
            .unwrap();
        assert_eq!(value, serde_json::json!({}));
    }
}
