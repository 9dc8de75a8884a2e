//! nomad-rank MCP server entry point.
//!
//! Boots the MCP server on stdio transport. Logging goes to stderr to avoid
//! interfering with the JSON-RPC protocol on stdout.

use anyhow::{Context, Result};
use nomad_core::{AppConfig, Engine};
use rmcp::service::serve_server;
use rmcp::transport::io::stdio;
use tracing_subscriber::EnvFilter;

mod error;
mod handler;
mod tools;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = AppConfig::load()?;
    let sources = nomad_client::sources(&config).context("building HTTP sources")?;

    tracing::info!(
        cache_dir = %config.cache_dir.display(),
        cities = config.cities.len(),
        cache_only = config.cache_only,
        "Starting nomad-rank server on stdio transport"
    );

    let handler = handler::NomadServer::new(Engine::new(config, sources));
    let server = serve_server(handler, stdio()).await?;

    server.waiting().await?;

    Ok(())
}
