//! CLI Status Command
//!
//! Probes the gateway's health endpoint.

use std::time::Duration;

use anyhow::Result;

use crate::terminal_output::{note_error, note_success};

pub async fn run(gateway_url: &str) -> Result<()> {
    let url = format!("{}/api/health", gateway_url.trim_end_matches('/'));
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(5))
        .build()?;

    match client.get(&url).send().await {
        Ok(resp) if resp.status().is_success() => {
            let body: serde_json::Value = resp.json().await?;
            note_success(&format!("FinNext gateway is up at {gateway_url}"));
            println!("{}", serde_json::to_string_pretty(&body)?);
        }
        Ok(resp) => {
            note_error(&format!("Gateway answered {} at {url}", resp.status()));
        }
        Err(_) => {
            note_error(&format!("FinNext gateway is not running at {gateway_url}"));
        }
    }

    Ok(())
}
