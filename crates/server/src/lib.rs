//! Static file server for the built site.
//!
//! Serves `public_dir` with an `index.html` fallback for client-side routes,
//! applies the shared cache policy from [`assets::policy`], blocks directory
//! listings and logs `/api` traffic.

mod error;
mod middleware;

use std::path::PathBuf;

use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use tokio::net::TcpListener;
use tower_http::compression::CompressionLayer;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

pub use error::ServeError;

pub const DEFAULT_PORT: u16 = 5000;

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    pub bind: String,
    pub port: u16,
    pub public_dir: PathBuf,
    pub compression: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            public_dir: PathBuf::from("dist/public"),
            compression: true,
        }
    }
}

impl ServerConfig {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

pub fn router(config: &ServerConfig) -> Router {
    let index = config.public_dir.join("index.html");
    let files = ServeDir::new(&config.public_dir).fallback(ServeFile::new(index));

    let app = Router::new()
        .route("/api/health", get(health))
        .fallback_service(files)
        .layer(axum::middleware::from_fn(middleware::cache_headers))
        .layer(axum::middleware::from_fn(middleware::block_directory_listing));

    let app = if config.compression {
        app.layer(CompressionLayer::new())
            .layer(axum::middleware::from_fn(middleware::skip_precompressed))
    } else {
        app
    };

    app.layer(axum::middleware::from_fn(middleware::log_api_requests))
        .layer(TraceLayer::new_for_http())
}

pub async fn serve(config: &ServerConfig) -> Result<(), ServeError> {
    if !config.public_dir.is_dir() {
        return Err(ServeError::MissingPublicDir(config.public_dir.clone()));
    }

    let addr = config.addr();
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|source| ServeError::Bind {
            addr: addr.clone(),
            source,
        })?;
    tracing::info!(
        "serving {} on http://{}",
        config.public_dir.display(),
        listener.local_addr()?
    );

    axum::serve(listener, router(config))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!("listening for ctrl-c failed: {err}");
        std::future::pending::<()>().await;
    }
}
