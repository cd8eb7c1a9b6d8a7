//! Web server for the modpack host.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::compression::CompressionLayer;

use crate::config::Config;
use crate::modpack::{ModpackStore, UploadStaging};
use crate::Result;

use super::handlers::AppState;
use super::router::{create_health_router, create_router, create_swagger_router};

/// Web server for the API.
pub struct WebServer {
    /// Server address.
    addr: SocketAddr,
    /// Application state.
    app_state: Arc<AppState>,
    /// Allowed CORS origins.
    cors_origins: Vec<String>,
    /// Request body limit in bytes.
    max_upload_bytes: usize,
}

impl WebServer {
    /// Create a new web server, preparing the modpack and staging
    /// directories.
    pub fn new(config: &Config) -> Result<Self> {
        let addr = config.server.socket_addr()?;

        let store = ModpackStore::new(&config.storage.modpacks_path)?;
        tracing::info!("Modpack store initialized at: {}", config.storage.modpacks_path);

        let staging = UploadStaging::new(&config.storage.temp_path)?;
        let purged = staging.purge_stale()?;
        if purged > 0 {
            tracing::info!(count = purged, "Removed stale uploads");
        }

        let app_state = AppState::new(store, staging)
            .with_token_required_for_all_mutations(config.storage.require_token_for_all_mutations);

        Ok(Self {
            addr,
            app_state: Arc::new(app_state),
            cors_origins: config.server.cors_origins.clone(),
            max_upload_bytes: config.storage.max_upload_bytes(),
        })
    }

    /// Get the server address.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Build the full application router.
    pub fn into_router(self) -> Router {
        create_router(self.app_state, &self.cors_origins, self.max_upload_bytes)
            .merge(create_health_router())
            .merge(create_swagger_router())
            .layer(CompressionLayer::new())
    }

    /// Run the web server.
    pub async fn run(self) -> std::result::Result<(), std::io::Error> {
        let listener = TcpListener::bind(self.addr).await?;
        let local_addr = listener.local_addr()?;
        let router = self.into_router();

        tracing::info!("Web server listening on http://{}", local_addr);

        axum::serve(listener, router).await
    }

    /// Run the server and return the actual bound address.
    ///
    /// This is useful for testing when binding to port 0.
    pub async fn run_with_addr(self) -> std::result::Result<SocketAddr, std::io::Error> {
        let listener = TcpListener::bind(self.addr).await?;
        let local_addr = listener.local_addr()?;
        let router = self.into_router();

        tracing::info!("Web server listening on http://{}", local_addr);

        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, router).await {
                tracing::error!("Web server error: {}", e);
            }
        });

        Ok(local_addr)
    }
}
