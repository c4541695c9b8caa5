//! Tracing subscriber setup

use anyhow::{Result, anyhow};
use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;

/// Install the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over the configured level.
pub fn init(config: &LoggingConfig) -> Result<()> {
    let filter = build_filter(&config.level)?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    let installed = match config.format.as_str() {
        "json" => builder.json().try_init(),
        _ => builder.pretty().try_init(),
    };

    installed.map_err(|e| anyhow!("Failed to install tracing subscriber: {e}"))
}

fn build_filter(level: &str) -> Result<EnvFilter> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(format!("hotelkit={level}"))
            .map_err(|e| anyhow!("Invalid log level '{level}': {e}")),
    }
}
