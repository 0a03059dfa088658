//! gifstash server entry point.
//!
//! This is the main binary that boots the MCP server on stdio transport.
//! Logging goes to stderr to avoid interfering with the JSON-RPC protocol on stdout.

use std::sync::Arc;

use anyhow::{Context, Result};
use gifstash_client::{FetchClient, FetchConfig};
use gifstash_core::{AppConfig, DiskStore};
use rmcp::service::serve_server;
use rmcp::transport::io::stdio;
use tracing_subscriber::EnvFilter;

mod handler;
mod tools;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = AppConfig::load().context("failed to load configuration")?;

    let store = DiskStore::open(&config.store_root).await?;
    let fetcher = FetchClient::new(FetchConfig::from(&config))?;

    tracing::info!(
        store_root = %config.store_root.display(),
        gifs = store.len().await,
        "Starting gifstash server on stdio transport"
    );

    let handler = handler::GifStashServer::new(Arc::new(store), Arc::new(fetcher), config.random_pin());
    let _sweeper = handler.spawn_pin_sweeper(config.random_pin());
    let transport = stdio();
    let server = serve_server(handler, transport).await?;

    server.waiting().await?;

    Ok(())
}
