//! # Directory Node
//!
//! Usage: `ds-node [config.json]`. Log level via `RUST_LOG` (default `info`).

use anyhow::Result;
use ds_node::{config_path, load_config, DirectoryNode};
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    // Load configuration
    let path = config_path(std::env::args().skip(1));
    let config = load_config(path.as_deref())?;

    let node = DirectoryNode::start(&config).await?;

    info!("Directory node is running. Press Ctrl+C to stop.");
    tokio::signal::ctrl_c().await?;

    node.shutdown().await;
    Ok(())
}
