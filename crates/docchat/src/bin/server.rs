//! docchat server binary
//!
//! Run with: cargo run -p docchat --bin docchat-server -- --config docchat.toml

use clap::Parser;
use docchat::{config::DocchatConfig, providers::ProcessInferencer, server::DocchatServer};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Document Q&A server backed by a local model runner
#[derive(Debug, Parser)]
#[command(name = "docchat-server", version, about)]
struct Args {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the listen host
    #[arg(long)]
    host: Option<String>,

    /// Override the listen port
    #[arg(short, long)]
    port: Option<u16>,

    /// Override the model passed to the runner
    #[arg(short, long)]
    model: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "docchat=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => DocchatConfig::from_file(path)?,
        None => DocchatConfig::default(),
    };
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(model) = args.model {
        config.llm.model = model;
    }

    tracing::info!("Configuration loaded");
    tracing::info!("  - Runner: {} {}", config.llm.command, config.llm.args().join(" "));
    tracing::info!("  - Timeout: {}s", config.llm.timeout_secs);
    tracing::info!("  - Database: {}", config.storage.database_path.display());
    tracing::info!("  - Uploads: {}", config.storage.upload_dir.display());

    if !ProcessInferencer::new(&config.llm).is_available().await {
        tracing::warn!("'{}' could not be started", config.llm.command);
        tracing::warn!("Questions will be answered with an error until it is installed:");
        tracing::warn!("  1. Install: https://ollama.com/download");
        tracing::warn!("  2. Pull the model: ollama pull {}", config.llm.model);
    }

    let server = DocchatServer::new(config)?;

    println!("\nServer starting...");
    println!("  API: http://{}", server.address());
    println!("\nEndpoints:");
    println!("  POST /upload  - Upload a document and/or ask a question");
    println!("  GET  /ask/?q= - Search stored documents");
    println!("  GET  /health  - Liveness");
    println!("\nPress Ctrl+C to stop\n");

    server.start().await?;

    Ok(())
}
