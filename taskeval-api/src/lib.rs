//! # taskeval API Server
//!
//! REST API for the taskeval service, designed to be consumed by the web frontend.
//!
//! ## Endpoints
//!
//! - `POST /api/v1/tasks` - Upload a code snippet
//! - `GET /api/v1/tasks/:id` - Fetch a task
//! - `GET /api/v1/tasks` - List tasks with filters
//! - `POST /api/v1/evaluate` - Run the evaluation workflow
//! - `GET /api/v1/evaluate/:id/status` - In-flight probe
//! - `GET /api/v1/evaluations/:task_id` - Fetch a report (redacted until unlocked)
//! - `POST /api/v1/evaluations/:task_id/unlock` - Unlock the full report
//! - `GET /api/v1/stats` - Service statistics
//!
//! ## Example
//!
//! ```rust,ignore
//! use taskeval_api::{ApiServer, ApiConfig};
//!
//! let config = ApiConfig::from_env();
//! let server = ApiServer::new(config);
//! server.run(([0, 0, 0, 0], 3001)).await?;
//! ```

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]

pub mod dto;
mod error;
mod handlers;
mod routes;
mod state;

pub use error::ApiError;
pub use routes::create_router;
pub use state::{ApiConfig, AppState};

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

/// API server for taskeval.
pub struct ApiServer {
    state: Arc<AppState>,
}

impl ApiServer {
    /// Creates a new API server with the given configuration.
    pub fn new(config: ApiConfig) -> Self {
        Self {
            state: Arc::new(AppState::new(config)),
        }
    }

    /// Creates the router with all routes configured.
    pub fn router(&self) -> Router {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);

        create_router(self.state.clone())
            .layer(cors)
            .layer(TraceLayer::new_for_http())
    }

    /// Runs the server on the given address.
    pub async fn run(self, addr: impl Into<SocketAddr>) -> std::io::Result<()> {
        let addr = addr.into();
        let listener = tokio::net::TcpListener::bind(addr).await?;

        info!("taskeval API server listening on {}", addr);

        axum::serve(listener, self.router()).await
    }
}

/// Starts the API server with configuration from the environment.
pub async fn start_server(port: u16) -> std::io::Result<()> {
    let config = ApiConfig::from_env();
    let server = ApiServer::new(config);
    server.run(([0, 0, 0, 0], port)).await
}
