//! API route configuration.

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers;
use crate::state::AppState;

/// Creates the API router with all routes configured.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Tasks
        .route("/api/v1/tasks", post(handlers::create_task))
        .route("/api/v1/tasks", get(handlers::list_tasks))
        .route("/api/v1/tasks/:id", get(handlers::get_task))
        // Evaluation workflow
        .route("/api/v1/evaluate", post(handlers::evaluate))
        .route("/api/v1/evaluate/:id/status", get(handlers::evaluation_status))
        // Reports
        .route("/api/v1/evaluations/:task_id", get(handlers::get_evaluation))
        .route(
            "/api/v1/evaluations/:task_id/unlock",
            post(handlers::unlock_evaluation),
        )
        // Observability
        .route("/api/v1/stats", get(handlers::stats))
        .with_state(state)
}
