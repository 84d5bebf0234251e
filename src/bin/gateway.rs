use anyhow::Context;
use tracing_subscriber::{EnvFilter, fmt};

use brew_gateway::{config::Config, gateway};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Load configuration
    let config = Config::from_env().context("Environment misconfigured")?;

    gateway::serve(config).await
}
