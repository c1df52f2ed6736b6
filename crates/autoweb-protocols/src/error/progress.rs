//! Progress channel errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProgressError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Send failed: {0}")]
    SendFailed(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_error_display() {
        let err = ProgressError::SendFailed("HTTP 500".to_string());
        assert!(err.to_string().contains("Send failed"));
        assert!(err.to_string().contains("500"));
    }
}
