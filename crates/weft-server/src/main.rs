use std::path::PathBuf;

use clap::Parser;
use tracing::info;

use weft_sdk::Database;
use weft_server::{ServerConfig, WeftServer};

/// Content-addressed object database server.
#[derive(Debug, Parser)]
#[command(name = "weft-server", version, about)]
struct Args {
    /// Address to listen on (overrides the config file).
    #[arg(long)]
    bind: Option<std::net::SocketAddr>,

    /// Path to a JSON configuration file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Per-connection window pre-allocation in bytes.
    #[arg(long)]
    initial_window: Option<usize>,

    /// Vertex cap on a single pull closure.
    #[arg(long)]
    max_pull_vertices: Option<usize>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => ServerConfig::load(path)?,
        None => ServerConfig::default(),
    };
    if let Some(bind) = args.bind {
        config.bind_addr = bind;
    }
    if let Some(window) = args.initial_window {
        config.initial_window = window;
    }
    if let Some(cap) = args.max_pull_vertices {
        config.max_pull_vertices = cap;
    }

    let server = WeftServer::bind(config, Database::in_memory()).await?;

    tokio::select! {
        result = server.serve() => result?,
        _ = tokio::signal::ctrl_c() => info!("shutting down"),
    }
    Ok(())
}
