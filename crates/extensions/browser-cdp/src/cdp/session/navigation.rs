//! Navigation operations for CDP page session.

use std::time::{Duration, Instant};

use serde_json::json;
use tracing::debug;

use crate::cdp::error::CdpError;

use super::core::PageSession;

impl PageSession {
    /// Navigate to URL and wait for the document to load.
    pub async fn navigate(&self, url: &str, timeout_ms: u64) -> Result<String, CdpError> {
        let result = self
            .call_with_timeout(
                "Page.navigate",
                Some(json!({"url": url})),
                Duration::from_millis(timeout_ms),
            )
            .await?;

        if let Some(error) = result.get("errorText").and_then(|e| e.as_str()) {
            return Err(CdpError::NavigationFailed(format!("{}: {}", url, error)));
        }

        let frame_id = result["frameId"].as_str().unwrap_or("main").to_string();
        self.reset_frame_contexts();

        self.wait_for_load(timeout_ms).await?;

        debug!("Navigated to {}", url);
        Ok(frame_id)
    }

    /// Poll `document.readyState` until the page is usable.
    ///
    /// Context-destroyed errors while polling mean a navigation is still in
    /// flight and are retried.
    pub async fn wait_for_load(&self, timeout_ms: u64) -> Result<(), CdpError> {
        let start = Instant::now();
        let timeout = Duration::from_millis(timeout_ms);

        loop {
            match self.evaluate_in(None, "document.readyState", 5_000).await {
                Ok(state) => {
                    if matches!(state.as_str(), Some("complete") | Some("interactive")) {
                        return Ok(());
                    }
                }
                Err(e) if e.is_context_destroyed() => {}
                Err(e) => return Err(e),
            }

            if start.elapsed() > timeout {
                return Err(CdpError::Timeout(format!(
                    "page load did not finish within {}ms",
                    timeout_ms
                )));
            }

            tokio::time::sleep(Duration::from_millis(100)).await;
        }
    }

    /// Get current URL.
    pub async fn get_url(&self) -> Result<String, CdpError> {
        let result = self.evaluate("window.location.href").await?;
        Ok(result.as_str().unwrap_or("").to_string())
    }

    /// Get page title.
    pub async fn get_title(&self) -> Result<String, CdpError> {
        let result = self.evaluate("document.title").await?;
        Ok(result.as_str().unwrap_or("").to_string())
    }
}
