//! Integration tests against a real Chrome.
//!
//! Ignored by default. Run with:
//! cargo test -p autoweb-browser-cdp --test integration_test -- --ignored --nocapture

use std::path::PathBuf;

use autoweb_browser_cdp::{BrowserManager, BrowserManagerConfig};
use autoweb_protocols::{AutomationBrowser, ExecutionTarget};

fn test_config() -> BrowserManagerConfig {
    BrowserManagerConfig {
        debug_port: 9333,
        viewport_width: 1280,
        viewport_height: 800,
        profile_dir: Some(PathBuf::from("/tmp/autoweb-test-profile")),
        chrome_path: None,
        headless: true,
    }
}

const FORM_PAGE: &str = "data:text/html,<html><head><title>Orders</title></head><body>\
<input id=q><button id=go onclick=\"document.getElementById('out').textContent=document.getElementById('q').value\">Go</button>\
<div id=out></div></body></html>";

#[tokio::test]
#[ignore]
async fn test_lazy_connect_and_shutdown() {
    let manager = BrowserManager::new(test_config());
    assert!(!manager.is_connected());

    let page = manager.page().await.expect("connect");
    assert!(manager.is_connected());

    // second call reuses the same page
    let again = manager.page().await.expect("reuse");
    assert!(std::sync::Arc::ptr_eq(&page, &again));

    manager.shutdown().await.expect("shutdown");
    assert!(!manager.is_connected());
}

#[tokio::test]
#[ignore]
async fn test_navigate_evaluate_and_click() {
    let manager = BrowserManager::new(test_config());
    let page = manager.page().await.expect("connect");

    page.navigate(FORM_PAGE, 15_000).await.expect("navigate");
    assert_eq!(page.title().await.unwrap(), "Orders");

    let root = ExecutionTarget::Root;
    page.evaluate(&root, "document.getElementById('q').value = 'unpaid'", 5_000)
        .await
        .unwrap();
    page.click(&root, "#go").await.unwrap();
    assert_eq!(page.read_text(&root, "#out").await.unwrap(), "unpaid");

    let frames = page.frames().await.unwrap();
    assert_eq!(frames.len(), 1);
    assert!(frames[0].parent_id.is_none());

    let html = page.capture_html(&root).await.unwrap();
    assert!(html.contains("id=\"out\""));

    let aria = page.capture_aria(&root).await.unwrap();
    assert!(aria.iter().any(|n| n.role == "button" && n.name == "Go"));

    manager.shutdown().await.unwrap();
}

#[tokio::test]
#[ignore]
async fn test_script_exception_and_timeout() {
    let manager = BrowserManager::new(test_config());
    let page = manager.page().await.expect("connect");
    let root = ExecutionTarget::Root;

    let err = page
        .evaluate(&root, "(async () => { throw new Error('boom') })()", 5_000)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("boom"));

    let err = page
        .wait_for_selector(&root, "#never-there", 500)
        .await
        .unwrap_err();
    assert!(err.is_timeout());

    manager.shutdown().await.unwrap();
}

#[tokio::test]
#[ignore]
async fn test_screenshot_is_base64_jpeg() {
    let manager = BrowserManager::new(test_config());
    let page = manager.page().await.expect("connect");

    let data = page.screenshot().await.unwrap();
    // base64 of the JPEG SOI marker
    assert!(data.starts_with("/9j/"));

    manager.shutdown().await.unwrap();
}
