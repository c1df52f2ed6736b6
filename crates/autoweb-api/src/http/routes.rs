//! HTTP route definitions.

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::http::{handlers, monitoring};
use crate::state::AppState;

/// Build the router.
///
/// ```text
/// /automation
///   POST   /automation                - Dispatch one action
///   GET    /automation/sessions       - List prepared runs
///   GET    /automation/sessions/{id}  - One prepared run
///
/// /health  - Detailed health check
/// /livez   - Liveness probe
/// ```
pub fn create_router(state: Arc<AppState>) -> Router {
    let automation_routes = Router::new()
        .route("/", post(handlers::automation))
        .route("/sessions", get(handlers::list_sessions))
        .route("/sessions/{id}", get(handlers::get_session))
        .with_state(state.clone());

    let monitoring_routes = Router::new()
        .route("/health", get(monitoring::health_check))
        .with_state(state);

    // Liveness probe has no state dependency
    let liveness_route = Router::new().route("/livez", get(monitoring::liveness_probe));

    Router::new()
        .nest("/automation", automation_routes)
        .merge(monitoring_routes)
        .merge(liveness_route)
        .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
#[path = "routes_tests.rs"]
mod tests;
