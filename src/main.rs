//! Hearth - Supportive AI Companion Backend
//!
//! Serves the chat API and owns process concerns: CLI parsing, logging,
//! configuration loading, and graceful shutdown.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use hearth::{
    api::{build_app, AppState},
    config::{HearthConfig, ModelConfig},
    engine::ConversationEngine,
    memory::MemoryStore,
    model::ChatCompletionClient,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "hearth")]
#[command(version)]
#[command(about = "Supportive AI companion backend with persistent conversational memory")]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "HEARTH_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the chat API server
    Serve {
        /// Host to bind to
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on
        #[arg(long)]
        port: Option<u16>,

        /// Override the data directory
        #[arg(long)]
        data_dir: Option<PathBuf>,
    },

    /// Show configuration
    Config {
        /// Show default configuration
        #[arg(long)]
        default: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("hearth={},tower_http=debug", log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = if let Some(config_path) = &cli.config {
        let content = std::fs::read_to_string(config_path)
            .with_context(|| format!("reading config {}", config_path.display()))?;
        toml::from_str(&content).context("parsing config")?
    } else {
        HearthConfig::default()
    };

    match cli.command {
        Commands::Serve {
            host,
            port,
            data_dir,
        } => {
            let mut config = config;
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            if let Some(data_dir) = data_dir {
                config.storage.data_dir = data_dir;
            }
            serve(config).await?;
        }
        Commands::Config { default } => {
            let shown = if default {
                HearthConfig::default()
            } else {
                config
            };
            println!("{}", toml::to_string_pretty(&shown)?);
        }
    }

    Ok(())
}

async fn serve(config: HearthConfig) -> Result<()> {
    let api_key = config.model.resolve_api_key().with_context(|| {
        format!(
            "no model API key: set model.api_key in the config or the {} environment variable",
            ModelConfig::API_KEY_ENV
        )
    })?;

    let store = MemoryStore::new(&config.storage.data_dir)
        .await
        .context("initializing memory store")?;
    let backend = Arc::new(ChatCompletionClient::new(&config.model, api_key)?);
    let engine = Arc::new(ConversationEngine::new(store, backend, &config));

    let app = build_app(AppState { engine }, &config.server.cors_origins);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {}", addr))?;

    tracing::info!(addr = %addr, model = %config.model.model, "Hearth is listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Shut down cleanly");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for ctrl_c: {}", e);
    }
    tracing::info!("Shutdown signal received");
}
