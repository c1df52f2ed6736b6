//! Browser manager type definitions and configuration.

use std::path::PathBuf;

use autoweb_config::BrowserConfig;
use autoweb_protocols::AutomationError;
use thiserror::Error;

use crate::cdp::CdpError;

/// Browser manager errors.
#[derive(Debug, Error)]
pub enum BrowserError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Navigation failed: {0}")]
    NavigationFailed(String),

    #[error("Action failed: {0}")]
    ActionFailed(String),

    #[error("Browser not connected")]
    NotConnected,

    #[error("Chrome not found. Please install Google Chrome or set browser.chrome_path.")]
    ChromeNotFound,

    #[error("Failed to launch Chrome: {0}")]
    LaunchFailed(String),
}

impl From<CdpError> for BrowserError {
    fn from(e: CdpError) -> Self {
        match e {
            CdpError::ConnectionFailed(msg) => BrowserError::ConnectionFailed(msg),
            CdpError::ChromeNotAvailable(msg) => BrowserError::ConnectionFailed(msg),
            CdpError::WebSocket(msg) => BrowserError::ConnectionFailed(msg),
            CdpError::NavigationFailed(msg) => BrowserError::NavigationFailed(msg),
            CdpError::SessionClosed => BrowserError::NotConnected,
            _ => BrowserError::ActionFailed(e.to_string()),
        }
    }
}

impl From<BrowserError> for AutomationError {
    fn from(e: BrowserError) -> Self {
        match e {
            BrowserError::NavigationFailed(msg) => AutomationError::NavigationFailed(msg),
            other => AutomationError::ConnectionFailed(other.to_string()),
        }
    }
}

/// Browser configuration.
#[derive(Debug, Clone)]
pub struct BrowserManagerConfig {
    /// Chrome debugging port.
    pub debug_port: u16,
    pub viewport_width: u32,
    pub viewport_height: u32,
    /// Profile directory for persistent login state.
    pub profile_dir: Option<PathBuf>,
    /// Explicit Chrome binary.
    pub chrome_path: Option<PathBuf>,
    /// Whether to run Chrome in headless mode.
    pub headless: bool,
}

impl Default for BrowserManagerConfig {
    fn default() -> Self {
        Self::from(&BrowserConfig::default())
    }
}

impl From<&BrowserConfig> for BrowserManagerConfig {
    fn from(config: &BrowserConfig) -> Self {
        Self {
            debug_port: config.debug_port,
            viewport_width: config.viewport_width,
            viewport_height: config.viewport_height,
            profile_dir: config.profile_dir.as_ref().map(PathBuf::from),
            chrome_path: config.chrome_path.as_ref().map(PathBuf::from),
            headless: config.headless,
        }
    }
}

impl BrowserManagerConfig {
    /// Get the profile directory, falling back to `~/.autoweb/browser-profile`.
    pub fn get_profile_dir(&self) -> PathBuf {
        self.profile_dir.clone().unwrap_or_else(|| {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".autoweb")
                .join("browser-profile")
        })
    }

    /// Get the CDP endpoint URL.
    pub fn endpoint(&self) -> String {
        format!("http://localhost:{}", self.debug_port)
    }
}
