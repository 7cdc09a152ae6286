//! Placement Predictor Server Module
//!
//! Web form and JSON API serving predictions from a fitted pipeline artifact.

mod api;
mod error;
mod handlers;
mod state;

pub use api::create_router;
pub use error::ServerError;
pub use handlers::PredictResponse;
pub use state::{AppState, ModelHandle};

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub model_path: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: std::env::var("PLACEMENT_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: std::env::var("PLACEMENT_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8501),
            model_path: std::env::var("PLACEMENT_MODEL")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("placement_pipeline.bin")),
        }
    }
}

impl ServerConfig {
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_model_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.model_path = path.into();
        self
    }
}

/// Start the server with the given configuration.
///
/// The model artifact is loaded before the listener binds; a missing or
/// corrupt artifact aborts startup.
pub async fn run_server(config: ServerConfig) -> anyhow::Result<()> {
    let start_time = chrono::Utc::now();

    let state = Arc::new(AppState::new(config.clone()));
    if let Err(e) = state.model.get() {
        error!(path = %config.model_path.display(), error = %e, "Failed to load model artifact");
        return Err(anyhow::anyhow!(
            "cannot load model artifact {}: {}",
            config.model_path.display(),
            e
        ));
    }

    let app = create_router(Arc::clone(&state));

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    info!(
        address = %addr,
        model = %config.model_path.display(),
        started_at = %start_time.to_rfc3339(),
        "Placement predictor starting"
    );
    info!(url = %format!("http://{}", addr), "Web form available");
    info!(url = %format!("http://{}/api/health", addr), "Health endpoint available");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(address = %addr, pid = std::process::id(), "Server listening");

    let shutdown_signal = async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to install ctrl+c handler");
            std::future::pending::<()>().await;
        }
        let stop_time = chrono::Utc::now();
        let uptime = stop_time.signed_duration_since(start_time);
        info!(
            stopped_at = %stop_time.to_rfc3339(),
            uptime_secs = uptime.num_seconds(),
            "Shutdown signal received, stopping server gracefully"
        );
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await?;

    info!("Server shut down cleanly");
    Ok(())
}
