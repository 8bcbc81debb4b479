//! HTTP server for DriveClone.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tower_http::compression::CompressionLayer;

use crate::config::{Config, StorageBackend};
use crate::storage::{LocalObjectStore, ObjectStore, S3ObjectStore};
use crate::{mail, Database, DriveError, Result};

use super::handlers::AppState;
use super::middleware::JwtState;
use super::router::create_router;

/// HTTP server owning the shared handles.
pub struct WebServer {
    /// Server address.
    addr: SocketAddr,
    /// Application state.
    app_state: Arc<AppState>,
    /// JWT state.
    jwt_state: Arc<JwtState>,
    /// Allowed CORS origins.
    cors_origins: Vec<String>,
}

impl WebServer {
    /// Create a server from prepared state.
    pub fn new(config: &Config, app_state: AppState) -> Result<Self> {
        let addr = format!("{}:{}", config.server.host, config.server.port)
            .parse()
            .map_err(|e| DriveError::Config(format!("invalid server address: {e}")))?;

        Ok(Self {
            addr,
            app_state: Arc::new(app_state),
            jwt_state: Arc::new(JwtState::new(&config.auth.jwt_secret)),
            cors_origins: config.server.cors_origins.clone(),
        })
    }

    /// Open the database, object store and mailer described by `config`.
    pub async fn from_config(config: &Config) -> Result<Self> {
        let db = Arc::new(
            Database::open(&config.database.path, config.database.max_connections).await?,
        );
        let mailer = mail::from_config(&config.mail);

        let app_state = match config.storage.backend {
            StorageBackend::Local => {
                let store = Arc::new(
                    LocalObjectStore::new(
                        &config.storage.local_path,
                        &config.storage.public_base_url,
                        &config.storage.signing_secret,
                    )
                    .map_err(|e| DriveError::Config(format!("local storage: {e}")))?,
                );
                tracing::info!("Local object store at: {}", config.storage.local_path);
                let object_store: Arc<dyn ObjectStore> = store.clone();
                AppState::new(config, db, object_store, mailer).with_local_objects(store)
            }
            StorageBackend::S3 => {
                let store = S3ObjectStore::new(&config.storage)
                    .await
                    .map_err(|e| DriveError::Config(format!("s3 storage: {e}")))?;
                tracing::info!("S3 object store, bucket: {}", store.bucket());
                AppState::new(config, db, Arc::new(store), mailer)
            }
        };

        Self::new(config, app_state)
    }

    /// Get the server address.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Run until `shutdown` resolves, then drain connections and close the pool.
    pub async fn run_until<F>(self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let db = self.app_state.db.clone();

        let router = create_router(self.app_state, self.jwt_state, &self.cors_origins)
            .layer(CompressionLayer::new());

        let listener = TcpListener::bind(self.addr).await?;
        let local_addr = listener.local_addr()?;
        tracing::info!("Web server listening on http://{}", local_addr);

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown)
            .await?;

        tracing::info!("Web server stopped, closing database");
        db.close().await;
        Ok(())
    }

    /// Run until Ctrl-C or SIGTERM.
    pub async fn run(self) -> Result<()> {
        self.run_until(shutdown_signal()).await
    }
}

/// Resolves on Ctrl-C, or SIGTERM on Unix.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("Shutdown signal received");
}
