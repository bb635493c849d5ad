//! HTTP exposition: metrics, health probes, and the fleet report.

mod handlers;

pub use handlers::*;

use crate::config::ServerConfig;
use crate::gather::StatsTable;

use axum::{routing::get, Router};
use std::net::SocketAddr;
use tokio::sync::watch;
use tower_http::trace::TraceLayer;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub table: StatsTable,
    pub ready: watch::Receiver<bool>,
}

/// HTTP server exposing the aggregated fleet state.
pub struct Server {
    port: u16,
    state: AppState,
}

impl Server {
    /// Create a new server over the shared table and readiness handle.
    pub fn new(config: &ServerConfig, table: StatsTable, ready: watch::Receiver<bool>) -> Self {
        Self {
            port: config.http_port,
            state: AppState { table, ready },
        }
    }

    /// Build the router with all routes.
    fn routes(&self) -> Router {
        Router::new()
            .route("/", get(handlers::handle_report))
            .route("/metrics", get(handlers::handle_metrics))
            .route("/healthz", get(handlers::handle_healthz))
            .route("/readyz", get(handlers::handle_readyz))
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// Start the server on the configured port.
    pub async fn start(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let addr = SocketAddr::from(([0, 0, 0, 0], self.port));
        let router = self.routes();

        tracing::info!("Web server listening on {}", addr);

        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, router).await?;

        Ok(())
    }
}
