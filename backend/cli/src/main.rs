mod agents_cmd;
mod chat_cmd;
mod config;
mod config_cmd;
mod status_cmd;
mod terminal_output;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use finnext_config::FinnextConfig;
use finnext_core::{AgentRegistry, InferenceProvider};
use finnext_gateway::{GatewayState, start_server};
use finnext_inference::{LyzrProvider, MockProvider};

#[derive(Parser)]
#[command(name = "finnext")]
#[command(about = "FinNext multi-agent financial chat gateway")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the agent gateway
    Serve {
        /// Port to bind the HTTP server to
        #[arg(short, long)]
        port: Option<u16>,
        /// Answer with a local echo provider instead of the inference service
        #[arg(long)]
        mock: bool,
    },
    /// List the agent personas
    Agents,
    /// Chat with the agents through a running gateway
    Chat {
        /// Agent to start with
        #[arg(short, long)]
        agent: Option<String>,
        /// Gateway base URL
        #[arg(short, long)]
        gateway: Option<String>,
    },
    /// Print the effective configuration with secrets masked
    Config,
    /// Probe the gateway health endpoint
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let registry = Arc::new(AgentRegistry::builtin());

    let (raw, logging) = config::read().await?;
    finnext_logging::init_logger(&logging)?;
    let config = config::finish(raw, &registry)?;

    match cli.command {
        Commands::Serve { port, mock } => {
            let mut config = config;
            if let Some(port) = port {
                config.gateway.port = port;
            }
            run_server(config, registry, mock).await?;
        }
        Commands::Agents => agents_cmd::run(&registry),
        Commands::Chat { agent, gateway } => {
            let gateway = gateway.unwrap_or_else(|| config.client.gateway_url.clone());
            chat_cmd::run(registry, &config.client, agent.as_deref(), &gateway).await?;
        }
        Commands::Config => config_cmd::run(&config)?,
        Commands::Status => status_cmd::run(&config.client.gateway_url).await?,
    }

    Ok(())
}

async fn run_server(config: FinnextConfig, registry: Arc<AgentRegistry>, mock: bool) -> Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.gateway.bind_address, config.gateway.port)
        .parse()
        .context("Invalid gateway bind address")?;

    let provider: Arc<dyn InferenceProvider> = if mock {
        Arc::new(MockProvider::new())
    } else {
        let mut provider = LyzrProvider::new().with_url(&config.inference.url);
        if let Some(secs) = config.inference.timeout_secs {
            provider = provider.with_timeout(Duration::from_secs(secs));
        }
        Arc::new(provider)
    };

    info!(
        addr = %addr,
        provider = provider.name(),
        inference_url = %config.inference.url,
        "Starting FinNext gateway"
    );

    let state = GatewayState::new(registry, &config, provider);
    start_server(addr, state).await
}
