//! Automation handlers.

use std::sync::Arc;

use axum::extract::{FromRequest, Path, State};
use axum::Json;
use autoweb_engine::{AutomationRequest, AutomationResponse, SessionSummary};
use serde::Serialize;
use tracing::{debug, info};

use crate::error::ApiError;
use crate::state::AppState;

/// JSON body extractor whose rejection is an [`ApiError`].
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct AppJson<T>(pub T);

/// Dispatch one action.
///
/// Always answers 200; engine failures are reported in the body.
pub async fn automation(
    State(state): State<Arc<AppState>>,
    AppJson(request): AppJson<AutomationRequest>,
) -> Json<AutomationResponse> {
    state.increment_requests();
    info!(
        "POST /automation action={} run_id={}",
        request.action.as_str(),
        request.run_id.as_deref().unwrap_or("-")
    );
    let response = state.engine.handle(request).await;
    debug!("Action '{}' finished ok={}", response.action.as_str(), response.ok);
    Json(response)
}

/// Session listing.
#[derive(Debug, Serialize)]
pub struct SessionList {
    pub count: usize,
    pub sessions: Vec<SessionSummary>,
}

pub async fn list_sessions(State(state): State<Arc<AppState>>) -> Json<SessionList> {
    let sessions = state.engine.registry().list();
    Json(SessionList {
        count: sessions.len(),
        sessions,
    })
}

pub async fn get_session(
    State(state): State<Arc<AppState>>,
    Path(run_id): Path<String>,
) -> Result<Json<SessionSummary>, ApiError> {
    state
        .engine
        .registry()
        .peek(&run_id)
        .map(Json)
        .ok_or(ApiError::RunNotFound(run_id))
}
