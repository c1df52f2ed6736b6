//! CDP error types.

use autoweb_protocols::AutomationError;
use thiserror::Error;

/// CDP client errors.
#[derive(Debug, Error)]
pub enum CdpError {
    /// Failed to connect to Chrome.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Chrome not found or not running with remote debugging.
    #[error("Chrome not available at {0}. Start Chrome with: chrome --remote-debugging-port=9222")]
    ChromeNotAvailable(String),

    #[error("WebSocket error: {0}")]
    WebSocket(String),

    #[error("CDP error: {message} (code: {code})")]
    Protocol { code: i64, message: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// HTTP error (endpoint discovery).
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Frame not found: {0}")]
    FrameNotFound(String),

    #[error("Navigation failed: {0}")]
    NavigationFailed(String),

    /// Exception thrown by evaluated JavaScript.
    #[error("JavaScript error: {0}")]
    JavaScript(String),

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("Session closed")]
    SessionClosed,

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl CdpError {
    /// The evaluation lost its context because the document navigated away.
    pub fn is_context_destroyed(&self) -> bool {
        let message = match self {
            CdpError::Protocol { message, .. } | CdpError::JavaScript(message) => message,
            _ => return false,
        };
        let lower = message.to_lowercase();
        lower.contains("execution context was destroyed")
            || lower.contains("inspected target navigated")
            || lower.contains("cannot find context with specified id")
    }
}

impl From<tokio_tungstenite::tungstenite::Error> for CdpError {
    fn from(e: tokio_tungstenite::tungstenite::Error) -> Self {
        CdpError::WebSocket(e.to_string())
    }
}

impl From<reqwest::Error> for CdpError {
    fn from(e: reqwest::Error) -> Self {
        CdpError::Http(e.to_string())
    }
}

impl From<CdpError> for AutomationError {
    fn from(e: CdpError) -> Self {
        if e.is_context_destroyed() {
            return AutomationError::ContextDestroyed(e.to_string());
        }
        match e {
            CdpError::ConnectionFailed(msg) | CdpError::ChromeNotAvailable(msg) => {
                AutomationError::ConnectionFailed(msg)
            }
            CdpError::WebSocket(msg) => AutomationError::ConnectionFailed(msg),
            CdpError::SessionClosed => AutomationError::ConnectionFailed("session closed".to_string()),
            CdpError::FrameNotFound(id) => AutomationError::FrameNotFound(id),
            CdpError::NavigationFailed(msg) => AutomationError::NavigationFailed(msg),
            CdpError::JavaScript(msg) => AutomationError::Script(msg),
            CdpError::Timeout(msg) => AutomationError::Timeout(msg),
            other => AutomationError::Protocol(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_destroyed_detection() {
        let err = CdpError::Protocol {
            code: -32000,
            message: "Execution context was destroyed.".to_string(),
        };
        assert!(err.is_context_destroyed());
        assert!(matches!(AutomationError::from(err), AutomationError::ContextDestroyed(_)));

        let err = CdpError::Protocol {
            code: -32000,
            message: "Inspected target navigated or closed".to_string(),
        };
        assert!(err.is_context_destroyed());

        let err = CdpError::Protocol {
            code: -32601,
            message: "'Foo.bar' wasn't found".to_string(),
        };
        assert!(!err.is_context_destroyed());
    }

    #[test]
    fn test_conversion_to_automation_error() {
        assert!(AutomationError::from(CdpError::Timeout("x".into())).is_timeout());
        assert!(AutomationError::from(CdpError::SessionClosed).is_connection());
        assert!(matches!(
            AutomationError::from(CdpError::JavaScript("TypeError: x".into())),
            AutomationError::Script(_)
        ));
        assert!(matches!(
            AutomationError::from(CdpError::FrameNotFound("F9".into())),
            AutomationError::FrameNotFound(_)
        ));
    }

    #[test]
    fn test_chrome_not_available_display() {
        let err = CdpError::ChromeNotAvailable("http://localhost:9222".into());
        assert!(err.to_string().contains("--remote-debugging-port"));
    }
}
