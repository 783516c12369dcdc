//! Reusable rating-service runtime.
//!
//! Provides [`ServerHandle`] that encapsulates the full server lifecycle:
//! storage init, collection bootstrap, REST API, and graceful shutdown.

use std::net::SocketAddr;
use std::sync::Arc;

use mongodb::Client;
use tracing::{error, info, warn};

use crate::application::RatingService;
use crate::config::{AppConfig, StorageBackend};
use crate::domain::RatingRepository;
use crate::infrastructure::database::redact_uri;
use crate::infrastructure::{
    ensure_ratings_collection, init_database, InMemoryRatingRepository, MongoRatingRepository,
};
use crate::interfaces::create_api_router;
use crate::shared::shutdown::{ShutdownCoordinator, ShutdownSignal};

// ── Options ────────────────────────────────────────────────────────

/// Options for starting the rating service.
pub struct ServerOptions {
    /// Application configuration.
    pub config: AppConfig,
    /// Create the collection, schema validator and indexes on startup
    /// (default: true).
    pub bootstrap_schema: bool,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            config: AppConfig::default(),
            bootstrap_schema: true,
        }
    }
}

// ── ServerHandle ───────────────────────────────────────────────────

/// Handle to a running rating service.
///
/// # Examples
///
/// ```rust,no_run
/// use rating_service::server::{ServerHandle, ServerOptions};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let handle = ServerHandle::start(ServerOptions::default()).await?;
///     // ... wait for shutdown signal ...
///     handle.shutdown().await;
///     Ok(())
/// }
/// ```
pub struct ServerHandle {
    /// Service shared with the HTTP handlers.
    pub service: Arc<RatingService>,
    /// The configuration the server was started with.
    pub config: AppConfig,
    /// Address the API is actually bound to (port 0 resolves here).
    pub local_addr: SocketAddr,

    client: Option<Client>,
    shutdown: ShutdownCoordinator,
    api_task: tokio::task::JoinHandle<()>,
}

impl ServerHandle {
    /// Start the rating service with the given options.
    ///
    /// This will:
    /// 1. Connect to the configured storage backend
    /// 2. Ensure the ratings collection, validator and indexes (MongoDB only)
    /// 3. Start the REST API server (with Swagger UI)
    pub async fn start(opts: ServerOptions) -> Result<Self, Box<dyn std::error::Error>> {
        let app_cfg = opts.config;
        app_cfg.validate()?;

        info!("Starting rating service...");

        let (repo, client) = build_repository(&app_cfg, opts.bootstrap_schema).await?;
        let service = Arc::new(RatingService::new(repo));

        let shutdown = ShutdownCoordinator::new(app_cfg.server.shutdown_timeout);
        let shutdown_signal = shutdown.signal();

        if app_cfg.debug {
            warn!("Debug mode: unexpected error details are included in responses");
        }
        let api_router = create_api_router(service.clone(), app_cfg.debug);

        let api_addr = app_cfg.api_address();
        let listener = tokio::net::TcpListener::bind(&api_addr).await?;
        let local_addr = listener.local_addr()?;
        info!("REST API server listening on http://{}", local_addr);
        info!("Swagger UI available at http://{}/docs/", local_addr);

        let api_shutdown = shutdown_signal.clone();
        let api_server = axum::serve(listener, api_router).with_graceful_shutdown(async move {
            api_shutdown.wait().await;
            info!("REST API server received shutdown signal");
        });

        let api_task = tokio::spawn(async move {
            if let Err(e) = api_server.await {
                error!("REST API server error: {}", e);
            }
        });

        Ok(Self {
            service,
            config: app_cfg,
            local_addr,
            client,
            shutdown,
            api_task,
        })
    }

    /// Get a cloneable shutdown signal.
    pub fn shutdown_signal(&self) -> ShutdownSignal {
        self.shutdown.signal()
    }

    /// Install OS signal listeners (SIGTERM, SIGINT) that trigger shutdown.
    pub fn install_signal_handler(&self) {
        self.shutdown.start_signal_listener();
    }

    /// Trigger graceful shutdown (non-blocking).
    pub fn trigger_shutdown(&self) {
        self.shutdown.signal().trigger();
    }

    /// Wait for the server to stop after shutdown has been triggered, then
    /// release the database client.
    pub async fn wait(mut self) {
        info!("Waiting for in-flight requests to complete...");

        let task = &mut self.api_task;
        let drained = self
            .shutdown
            .drain(async {
                if let Err(e) = task.await {
                    error!("REST API server task panicked: {}", e);
                }
            })
            .await;
        if !drained {
            self.api_task.abort();
        }

        if let Some(client) = self.client.take() {
            client.shutdown().await;
            info!("MongoDB client closed");
        }

        info!("Rating service shutdown complete");
    }

    /// Trigger shutdown and wait for completion.
    pub async fn shutdown(self) {
        info!("Shutting down rating service...");
        self.trigger_shutdown();
        self.wait().await;
    }

    /// Check if the server is still running.
    pub fn is_running(&self) -> bool {
        !self.api_task.is_finished()
    }
}

// ── Helpers ────────────────────────────────────────────────────────

async fn build_repository(
    config: &AppConfig,
    bootstrap_schema: bool,
) -> Result<(Arc<dyn RatingRepository>, Option<Client>), Box<dyn std::error::Error>> {
    match config.database.backend {
        StorageBackend::Memory => {
            warn!("Using in-memory storage; ratings are lost on restart");
            Ok((Arc::new(InMemoryRatingRepository::new()), None))
        }
        StorageBackend::Mongo => {
            let db_config = config.database_config()?;
            info!("Database: {}", redact_uri(&db_config.uri));
            let db = init_database(&db_config).await?;

            let collection = if bootstrap_schema {
                ensure_ratings_collection(&db, &db_config.collection).await?
            } else {
                db.collection(&db_config.collection)
            };

            let repo = MongoRatingRepository::new(collection, db_config.operation_timeout);
            Ok((Arc::new(repo), Some(db.client().clone())))
        }
    }
}

/// Initialize tracing (logging) from the application config.
///
/// Call this once at process startup (before [`ServerHandle::start`]).
pub fn init_tracing(config: &AppConfig) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level));

    match config.logging.format.to_lowercase().as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer())
                .init();
        }
    }
}

#[cfg(test)]
mod tests {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    use super::*;

    fn memory_config() -> AppConfig {
        let mut config = AppConfig::default();
        config.server.host = "127.0.0.1".to_string();
        config.server.port = 0;
        config.server.shutdown_timeout = 5;
        config.database.backend = StorageBackend::Memory;
        config
    }

    async fn raw_get(addr: SocketAddr, path: &str) -> String {
        let mut stream = tokio::net::TcpStream::connect(addr).await.unwrap();
        let request = format!("GET {path} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n");
        stream.write_all(request.as_bytes()).await.unwrap();
        let mut response = String::new();
        stream.read_to_string(&mut response).await.unwrap();
        response
    }

    #[tokio::test]
    async fn serves_health_and_shuts_down() {
        let handle = ServerHandle::start(ServerOptions {
            config: memory_config(),
            bootstrap_schema: false,
        })
        .await
        .unwrap();
        assert!(handle.is_running());
        assert_ne!(handle.local_addr.port(), 0);

        let response = raw_get(handle.local_addr, "/health").await;
        assert!(response.starts_with("HTTP/1.1 200"));
        assert!(response.ends_with(r#"{"status":"healthy"}"#));

        let signal = handle.shutdown_signal();
        handle.shutdown().await;
        assert!(signal.is_triggered());
    }

    #[tokio::test]
    async fn refuses_to_start_without_database_uri() {
        let mut config = memory_config();
        config.database.backend = StorageBackend::Mongo;
        config.database.uri = None;

        let result = ServerHandle::start(ServerOptions {
            config,
            bootstrap_schema: false,
        })
        .await;
        assert!(result.is_err());
    }
}
