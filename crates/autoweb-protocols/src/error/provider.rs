//! LLM Provider errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Provider not found: {0}")]
    NotFound(String),

    #[error("Model not found: {0}")]
    ModelNotFound(String),

    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },

    #[error("Rate limited: retry after {retry_after_seconds} seconds")]
    RateLimited { retry_after_seconds: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Empty response from model")]
    EmptyResponse,

    #[error("Network error: {0}")]
    Network(String),

    #[error("Timeout after {0} seconds")]
    Timeout(u64),
}

impl ProviderError {
    /// Classify a non-success HTTP response from a model API.
    pub fn from_api_response(status: u16, message: String) -> Self {
        match status {
            401 | 403 => ProviderError::AuthenticationFailed(message),
            429 => ProviderError::RateLimited {
                retry_after_seconds: 60,
            },
            400 => ProviderError::InvalidRequest(message),
            _ => ProviderError::ApiError { status, message },
        }
    }
}

#[cfg(test)]
#[path = "provider_tests.rs"]
mod tests;
