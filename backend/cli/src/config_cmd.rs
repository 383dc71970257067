//! CLI Config Command

use anyhow::Result;

use finnext_config::{redact, FinnextConfig};

/// Print the effective configuration as pretty JSON with secrets masked.
pub fn run(config: &FinnextConfig) -> Result<()> {
    let value = serde_json::to_value(config)?;
    println!("{}", serde_json::to_string_pretty(&redact(&value))?);
    Ok(())
}
