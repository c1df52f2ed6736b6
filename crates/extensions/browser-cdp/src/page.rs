//! `AutomationPage` over a CDP page session.

use async_trait::async_trait;
use autoweb_protocols::{AriaNode, AutomationError, AutomationPage, ExecutionTarget, FrameInfo};
use serde_json::Value;
use tokio::sync::Mutex;

use crate::cdp::PageSession;
use crate::cdp::ScreenshotFormat;

const SCREENSHOT_QUALITY: u8 = 60;

/// The shared page. Every document operation holds the document lock, so a
/// navigation never interleaves with a capture or a script.
pub struct CdpPage {
    session: PageSession,
    document: Mutex<()>,
}

impl CdpPage {
    pub(crate) fn new(session: PageSession) -> Self {
        Self {
            session,
            document: Mutex::new(()),
        }
    }

    pub fn session(&self) -> &PageSession {
        &self.session
    }
}

fn frame_id(target: &ExecutionTarget) -> Option<&str> {
    match target {
        ExecutionTarget::Root => None,
        ExecutionTarget::Frame { frame_id, .. } => Some(frame_id.as_str()),
    }
}

#[async_trait]
impl AutomationPage for CdpPage {
    async fn navigate(&self, url: &str, timeout_ms: u64) -> Result<(), AutomationError> {
        let _doc = self.document.lock().await;
        self.session.navigate(url, timeout_ms).await?;
        Ok(())
    }

    async fn current_url(&self) -> Result<String, AutomationError> {
        Ok(self.session.get_url().await?)
    }

    async fn title(&self) -> Result<String, AutomationError> {
        Ok(self.session.get_title().await?)
    }

    async fn wait_for_load(&self, timeout_ms: u64) -> Result<(), AutomationError> {
        let _doc = self.document.lock().await;
        self.session.reset_frame_contexts();
        Ok(self.session.wait_for_load(timeout_ms).await?)
    }

    async fn frames(&self) -> Result<Vec<FrameInfo>, AutomationError> {
        Ok(self.session.frames().await?)
    }

    async fn evaluate(
        &self,
        target: &ExecutionTarget,
        expression: &str,
        timeout_ms: u64,
    ) -> Result<Value, AutomationError> {
        let _doc = self.document.lock().await;
        Ok(self
            .session
            .evaluate_in(frame_id(target), expression, timeout_ms)
            .await?)
    }

    async fn capture_aria(&self, target: &ExecutionTarget) -> Result<Vec<AriaNode>, AutomationError> {
        let _doc = self.document.lock().await;
        Ok(self.session.accessibility_tree(frame_id(target)).await?)
    }

    async fn screenshot(&self) -> Result<String, AutomationError> {
        let _doc = self.document.lock().await;
        Ok(self
            .session
            .screenshot(ScreenshotFormat::Jpeg, Some(SCREENSHOT_QUALITY))
            .await?)
    }
}
