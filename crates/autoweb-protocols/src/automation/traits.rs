//! Automation surface traits.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use super::{AriaNode, ExecutionTarget, FrameInfo};
use crate::error::AutomationError;

/// Page/frame capability surface over one shared browser document.
///
/// Implementations serialize operations they cannot run in parallel
/// (navigation, capture, evaluation) behind their own document lock.
#[async_trait]
pub trait AutomationPage: Send + Sync {
    /// Navigate the top-level document and wait for it to load.
    async fn navigate(&self, url: &str, timeout_ms: u64) -> Result<(), AutomationError>;

    async fn current_url(&self) -> Result<String, AutomationError>;

    async fn title(&self) -> Result<String, AutomationError>;

    /// Wait until the top-level document reports a ready state.
    async fn wait_for_load(&self, timeout_ms: u64) -> Result<(), AutomationError>;

    /// All frames of the document. The first entry is the main frame.
    async fn frames(&self) -> Result<Vec<FrameInfo>, AutomationError>;

    /// Evaluate an expression in the target's context, awaiting promises and
    /// returning the result by value.
    async fn evaluate(
        &self,
        target: &ExecutionTarget,
        expression: &str,
        timeout_ms: u64,
    ) -> Result<Value, AutomationError>;

    /// Accessibility tree of the target, flattened depth-first.
    async fn capture_aria(&self, target: &ExecutionTarget) -> Result<Vec<AriaNode>, AutomationError>;

    /// Base64 JPEG of the viewport.
    async fn screenshot(&self) -> Result<String, AutomationError>;

    /// Outer HTML of the target document.
    async fn capture_html(&self, target: &ExecutionTarget) -> Result<String, AutomationError> {
        let value = self
            .evaluate(target, "document.documentElement ? document.documentElement.outerHTML : ''", 10_000)
            .await?;
        Ok(value.as_str().unwrap_or_default().to_string())
    }

    /// Number of elements matching a selector.
    async fn query(&self, target: &ExecutionTarget, selector: &str) -> Result<usize, AutomationError> {
        let expr = format!("document.querySelectorAll({}).length", js_string(selector));
        let value = self.evaluate(target, &expr, 10_000).await?;
        Ok(value.as_u64().unwrap_or(0) as usize)
    }

    async fn click(&self, target: &ExecutionTarget, selector: &str) -> Result<(), AutomationError> {
        let expr = format!(
            "(() => {{ const el = document.querySelector({sel}); if (!el) return false; el.scrollIntoView({{block: 'center'}}); el.click(); return true; }})()",
            sel = js_string(selector)
        );
        match self.evaluate(target, &expr, 10_000).await? {
            Value::Bool(true) => Ok(()),
            _ => Err(AutomationError::ElementNotFound(selector.to_string())),
        }
    }

    async fn read_text(&self, target: &ExecutionTarget, selector: &str) -> Result<String, AutomationError> {
        let expr = format!(
            "(() => {{ const el = document.querySelector({sel}); return el ? (el.innerText || el.textContent || '') : null; }})()",
            sel = js_string(selector)
        );
        match self.evaluate(target, &expr, 10_000).await? {
            Value::String(text) => Ok(text),
            _ => Err(AutomationError::ElementNotFound(selector.to_string())),
        }
    }

    /// Poll until the selector matches or the timeout elapses.
    async fn wait_for_selector(
        &self,
        target: &ExecutionTarget,
        selector: &str,
        timeout_ms: u64,
    ) -> Result<(), AutomationError> {
        let deadline = std::time::Instant::now() + std::time::Duration::from_millis(timeout_ms);
        loop {
            if self.query(target, selector).await? > 0 {
                return Ok(());
            }
            if std::time::Instant::now() >= deadline {
                return Err(AutomationError::Timeout(format!(
                    "waiting for selector '{}' timed out",
                    selector
                )));
            }
            tokio_sleep(100).await;
        }
    }
}

/// Owner of the shared browser connection.
#[async_trait]
pub trait AutomationBrowser: Send + Sync {
    /// The shared page, connecting lazily on first use.
    async fn page(&self) -> Result<Arc<dyn AutomationPage>, AutomationError>;

    /// Whether a connection has been established.
    fn is_connected(&self) -> bool;

    /// Close the connection and any browser process we started.
    async fn shutdown(&self) -> Result<(), AutomationError>;
}

/// Quote a string as a JavaScript literal.
pub fn js_string(s: &str) -> String {
    serde_json::to_string(s).unwrap_or_else(|_| "\"\"".to_string())
}

async fn tokio_sleep(ms: u64) {
    tokio::time::sleep(std::time::Duration::from_millis(ms)).await;
}
