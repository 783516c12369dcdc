//! Rating service CLI
//!
//! ```sh
//! # Run with default config (~/.config/rating-service/config.toml)
//! MONGODB_URI=mongodb://localhost:27017 rating-service
//!
//! # Custom config path and port
//! rating-service --config /etc/rating-service/config.toml --port 9000
//!
//! # Local development without MongoDB
//! rating-service --in-memory --debug
//!
//! # Validate config without starting
//! rating-service --check
//! ```

use std::path::PathBuf;

use clap::Parser;
use tracing::{error, info};

use rating_service::config::{AppConfig, StorageBackend};
use rating_service::infrastructure::database::redact_uri;
use rating_service::server::{init_tracing, ServerHandle, ServerOptions};

/// Ratings that consumers give to professionals, over HTTP.
#[derive(Parser, Debug)]
#[command(
    name = "rating-service",
    version,
    about = "REST service for professional ratings backed by MongoDB",
    long_about = "Create, fetch, list and delete ratings of professionals.\n\n\
                  Default config: ~/.config/rating-service/config.toml"
)]
struct Cli {
    /// Path to the configuration file (TOML).
    #[arg(short, long, env = "RATING_CONFIG")]
    config: Option<PathBuf>,

    /// Override the listen host.
    #[arg(long)]
    host: Option<String>,

    /// Override the listen port.
    #[arg(short, long)]
    port: Option<u16>,

    /// Override the MongoDB connection string.
    #[arg(long)]
    mongodb_uri: Option<String>,

    /// Keep ratings in memory instead of MongoDB.
    #[arg(long)]
    in_memory: bool,

    /// Include raw error text in generic 500 responses.
    #[arg(long)]
    debug: bool,

    /// Override the log level (trace, debug, info, warn, error).
    #[arg(short, long)]
    log_level: Option<String>,

    /// Validate the configuration and exit without starting the server.
    #[arg(long)]
    check: bool,

    /// Skip creating the collection, validator and indexes on startup.
    #[arg(long)]
    no_bootstrap: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // ── Load configuration ──────────────────────────────────────
    let config_path = cli
        .config
        .unwrap_or_else(rating_service::default_config_path);

    let mut config = match AppConfig::load(&config_path) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Failed to load config from {}: {}", config_path.display(), e);
            eprintln!("Using default configuration.");
            AppConfig::from_env().unwrap_or_default()
        }
    };

    // ── Apply CLI overrides ─────────────────────────────────────
    if let Some(host) = cli.host {
        config.server.host = host;
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    if let Some(uri) = cli.mongodb_uri {
        config.database.uri = Some(uri);
    }
    if cli.in_memory {
        config.database.backend = StorageBackend::Memory;
    }
    if cli.debug {
        config.debug = true;
    }
    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }

    init_tracing(&config);
    info!("Configuration: {}", config_path.display());

    if let Err(e) = config.validate() {
        error!("Invalid configuration: {}", e);
        return Err(e.into());
    }

    // ── Config validation mode ──────────────────────────────────
    if cli.check {
        println!("Configuration is valid");
        println!("   Config file : {}", config_path.display());
        println!("   API address : {}", config.api_address());
        match config.database.backend {
            StorageBackend::Mongo => println!(
                "   Database    : {} ({}/{})",
                redact_uri(config.database_uri()?),
                config.database.name,
                config.database.collection
            ),
            StorageBackend::Memory => println!("   Database    : in-memory"),
        }
        println!("   Log level   : {}", config.logging.level);
        println!("   Debug       : {}", config.debug);
        return Ok(());
    }

    // ── Start server ────────────────────────────────────────────
    let handle = ServerHandle::start(ServerOptions {
        config,
        bootstrap_schema: !cli.no_bootstrap,
    })
    .await?;

    handle.install_signal_handler();
    info!("Press Ctrl+C to shutdown gracefully.");

    handle.shutdown_signal().wait().await;
    handle.wait().await;

    Ok(())
}
