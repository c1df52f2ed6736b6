//! Health check handlers.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::state::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    /// The browser has not been connected yet; it is connected lazily on
    /// first use, so this is not an error.
    Idle,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub version: String,
    pub uptime_seconds: u64,
    /// Prepared runs currently held in the registry.
    pub sessions: usize,
    pub browser_connected: bool,
    pub requests: u64,
}

pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let browser_connected = state.engine.browser().is_connected();
    let status = if browser_connected {
        HealthStatus::Healthy
    } else {
        HealthStatus::Idle
    };

    Json(HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.uptime().as_secs(),
        sessions: state.engine.registry().len(),
        browser_connected,
        requests: state.request_count(),
    })
}

/// Liveness probe.
pub async fn liveness_probe() -> &'static str {
    "ok"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_status_serialize() {
        assert_eq!(serde_json::to_string(&HealthStatus::Healthy).unwrap(), "\"healthy\"");
        assert_eq!(serde_json::to_string(&HealthStatus::Idle).unwrap(), "\"idle\"");
    }

    #[tokio::test]
    async fn test_liveness_probe() {
        assert_eq!(liveness_probe().await, "ok");
    }
}
