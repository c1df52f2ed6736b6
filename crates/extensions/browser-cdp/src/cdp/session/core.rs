//! Core session struct and CDP command dispatch.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use serde_json::{Value, json};
use tokio::sync::mpsc;
use tracing::debug;

use crate::cdp::error::CdpError;
use crate::cdp::protocol::{CdpResponse, ScreenshotFormat};
use crate::cdp::transport::{DEFAULT_CALL_TIMEOUT, Transport};

/// A session attached to a single page/target.
pub struct PageSession {
    pub(super) target_id: String,
    pub(super) session_id: String,
    pub(super) transport: Arc<Transport>,
    /// Isolated-world execution contexts by frame ID.
    pub(super) frame_contexts: Mutex<HashMap<String, i64>>,
    /// Event receiver (kept alive to prevent sender errors).
    pub(super) _event_rx: mpsc::UnboundedReceiver<CdpResponse>,
}

impl PageSession {
    pub(crate) fn new(
        target_id: String,
        session_id: String,
        transport: Arc<Transport>,
        event_rx: mpsc::UnboundedReceiver<CdpResponse>,
    ) -> Self {
        Self {
            target_id,
            session_id,
            transport,
            frame_contexts: Mutex::new(HashMap::new()),
            _event_rx: event_rx,
        }
    }

    pub fn target_id(&self) -> &str {
        &self.target_id
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Send a CDP command to this page session.
    pub async fn call(&self, method: &str, params: Option<Value>) -> Result<Value, CdpError> {
        self.call_with_timeout(method, params, DEFAULT_CALL_TIMEOUT).await
    }

    /// Send a CDP command, waiting up to `timeout` for the reply.
    pub async fn call_with_timeout(
        &self,
        method: &str,
        params: Option<Value>,
        timeout: Duration,
    ) -> Result<Value, CdpError> {
        self.transport
            .call(method, params, Some(&self.session_id), timeout)
            .await
    }

    /// Enable required CDP domains.
    pub(crate) async fn enable_domains(&self) -> Result<(), CdpError> {
        self.call("Page.enable", None).await?;
        self.call("Runtime.enable", None).await?;
        self.call("Accessibility.enable", None).await?;

        debug!("Enabled CDP domains for session {}", self.session_id);
        Ok(())
    }

    /// Force a viewport size.
    pub async fn set_viewport(&self, width: u32, height: u32) -> Result<(), CdpError> {
        self.call(
            "Emulation.setDeviceMetricsOverride",
            Some(json!({
                "width": width,
                "height": height,
                "deviceScaleFactor": 1,
                "mobile": false,
            })),
        )
        .await?;
        Ok(())
    }

    /// Take a screenshot, returned as base64.
    pub async fn screenshot(
        &self,
        format: ScreenshotFormat,
        quality: Option<u8>,
    ) -> Result<String, CdpError> {
        let mut params = json!({ "format": format });
        if let Some(q) = quality {
            params["quality"] = json!(q);
        }

        let result = self.call("Page.captureScreenshot", Some(params)).await?;

        result["data"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| CdpError::InvalidResponse("Missing screenshot data".to_string()))
    }
}
