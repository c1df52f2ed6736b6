//! API error types.
//!
//! Engine failures never surface here: they travel as `ok:false` bodies with
//! status 200. Only malformed requests and unknown resources map to an HTTP
//! error status.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// The body could not be decoded into a request.
    #[error("Invalid request body: {0}")]
    InvalidBody(#[from] JsonRejection),

    #[error("Run not found: {0}")]
    RunNotFound(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidBody(rejection) => rejection.status(),
            ApiError::RunNotFound(_) => StatusCode::NOT_FOUND,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(serde_json::json!({
            "ok": false,
            "error": self.to_string(),
        }));
        (status, body).into_response()
    }
}
