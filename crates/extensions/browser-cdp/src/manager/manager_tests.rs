use super::*;
use autoweb_config::BrowserConfig;
use autoweb_protocols::{AutomationBrowser, AutomationError};

#[test]
fn test_config_default() {
    let config = BrowserManagerConfig::default();
    assert_eq!(config.debug_port, 9222);
    assert_eq!(config.viewport_width, 1280);
    assert_eq!(config.viewport_height, 800);
    assert!(!config.headless);
    assert!(config.chrome_path.is_none());
}

#[test]
fn test_config_from_browser_config() {
    let browser = BrowserConfig {
        debug_port: 9333,
        headless: true,
        profile_dir: Some("/tmp/autoweb-profile".to_string()),
        chrome_path: Some("/opt/chrome/chrome".to_string()),
        viewport_width: 1440,
        viewport_height: 900,
    };
    let config = BrowserManagerConfig::from(&browser);
    assert_eq!(config.endpoint(), "http://localhost:9333");
    assert!(config.headless);
    assert_eq!(config.get_profile_dir(), std::path::PathBuf::from("/tmp/autoweb-profile"));
    assert_eq!(
        config.chrome_path.as_deref(),
        Some(std::path::Path::new("/opt/chrome/chrome"))
    );
}

#[test]
fn test_config_profile_dir_default() {
    let config = BrowserManagerConfig::default();
    assert!(config.get_profile_dir().ends_with(".autoweb/browser-profile"));
}

#[test]
fn test_browser_error_display() {
    let err = BrowserError::ConnectionFailed("timeout".to_string());
    assert_eq!(err.to_string(), "Connection failed: timeout");

    let err = BrowserError::LaunchFailed("permission denied".to_string());
    assert_eq!(err.to_string(), "Failed to launch Chrome: permission denied");
}

#[test]
fn test_browser_error_into_automation_error() {
    let err: AutomationError = BrowserError::ChromeNotFound.into();
    assert!(matches!(err, AutomationError::ConnectionFailed(_)));

    let err: AutomationError = BrowserError::NavigationFailed("net::ERR_NAME_NOT_RESOLVED".into()).into();
    assert!(matches!(err, AutomationError::NavigationFailed(_)));
}

#[test]
fn test_find_chrome() {
    let _result = BrowserManager::find_chrome();
}

#[tokio::test]
async fn test_not_connected_until_first_use() {
    let manager = BrowserManager::new(BrowserManagerConfig::default());
    assert!(!manager.is_connected());
}

#[tokio::test]
async fn test_shutdown_without_connect() {
    let manager = BrowserManager::new(BrowserManagerConfig::default());
    assert!(manager.shutdown().await.is_ok());
    assert!(!manager.is_connected());
}
