//! Browser automation surface errors.

use thiserror::Error;

/// Errors raised by an [`AutomationPage`](crate::automation::AutomationPage).
#[derive(Debug, Error)]
pub enum AutomationError {
    /// The shared browser connection could not be established.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// No page has been opened yet.
    #[error("No page open")]
    NoPage,

    #[error("Navigation failed: {0}")]
    NavigationFailed(String),

    #[error("Frame not found: {0}")]
    FrameNotFound(String),

    #[error("Element not found: {0}")]
    ElementNotFound(String),

    /// Script raised an exception inside the page.
    #[error("Script error: {0}")]
    Script(String),

    /// The execution context disappeared mid-evaluation (the page navigated).
    #[error("Execution context destroyed: {0}")]
    ContextDestroyed(String),

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("Protocol error: {0}")]
    Protocol(String),
}

impl AutomationError {
    /// Whether this failure belongs to the timeout class.
    ///
    /// Script exceptions count when the page-side error names a timeout,
    /// e.g. a `waitFor` helper giving up.
    pub fn is_timeout(&self) -> bool {
        match self {
            AutomationError::Timeout(_) => true,
            AutomationError::Script(msg) => {
                let lower = msg.to_lowercase();
                lower.contains("timeouterror") || lower.contains("timed out")
            }
            _ => false,
        }
    }

    /// Whether the failure means the connection itself is unusable.
    pub fn is_connection(&self) -> bool {
        matches!(self, AutomationError::ConnectionFailed(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_classification() {
        assert!(AutomationError::Timeout("evaluate".into()).is_timeout());
        assert!(AutomationError::Script("TimeoutError: waitFor #x".into()).is_timeout());
        assert!(AutomationError::Script("selector timed out after 5000ms".into()).is_timeout());
        assert!(!AutomationError::Script("TypeError: x is null".into()).is_timeout());
        assert!(!AutomationError::NoPage.is_timeout());
    }

    #[test]
    fn test_connection_classification() {
        assert!(AutomationError::ConnectionFailed("refused".into()).is_connection());
        assert!(!AutomationError::Protocol("bad".into()).is_connection());
    }

    #[test]
    fn test_display() {
        let err = AutomationError::NavigationFailed("net::ERR_NAME_NOT_RESOLVED".into());
        assert_eq!(err.to_string(), "Navigation failed: net::ERR_NAME_NOT_RESOLVED");
    }
}
