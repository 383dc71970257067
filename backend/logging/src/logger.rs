//! Structured Logger
//!
//! Wraps `tracing` with env-based level control, a console layer, and an
//! optional daily-rotated NDJSON file.

use anyhow::{Result, anyhow};
use finnext_config::LoggingConfig;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Build the level filter: `RUST_LOG` wins, then the configured level.
pub fn build_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
}

/// Initialize the global subscriber. Fails if one is already installed.
pub fn init_logger(config: &LoggingConfig) -> Result<()> {
    let console_layer = if config.json {
        fmt::layer()
            .json()
            .with_writer(std::io::stdout)
            .boxed()
    } else {
        fmt::layer()
            .with_writer(std::io::stdout)
            .with_target(false)
            .with_ansi(true)
            .boxed()
    };

    // Writes NDJSON to `<dir>/finnext.log.YYYY-MM-DD`
    let file_layer = config.dir.as_ref().map(|dir| {
        let file_appender = RollingFileAppender::new(Rotation::DAILY, dir, "finnext.log");
        fmt::layer()
            .json()
            .with_writer(file_appender)
            .with_ansi(false)
            .boxed()
    });

    tracing_subscriber::registry()
        .with(build_filter(&config.level))
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow!("failed to install logger: {e}"))
}

