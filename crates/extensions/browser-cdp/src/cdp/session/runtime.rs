//! JavaScript evaluation in the main frame or a child frame's isolated world.

use std::time::Duration;

use serde_json::{Value, json};
use tracing::debug;

use crate::cdp::error::CdpError;
use crate::cdp::protocol::{ExceptionDetails, RemoteObject};

use super::core::PageSession;

const WORLD_NAME: &str = "autoweb";
/// Extra wait on top of the in-page timeout before giving up on the reply.
const REPLY_GRACE: Duration = Duration::from_secs(2);

impl PageSession {
    /// Evaluate an expression in the main frame.
    pub async fn evaluate(&self, expression: &str) -> Result<Value, CdpError> {
        self.evaluate_in(None, expression, 30_000).await
    }

    /// Evaluate an expression, optionally inside a child frame, awaiting
    /// promises and returning the result by value.
    pub async fn evaluate_in(
        &self,
        frame_id: Option<&str>,
        expression: &str,
        timeout_ms: u64,
    ) -> Result<Value, CdpError> {
        let Some(frame_id) = frame_id else {
            return self.runtime_evaluate(None, expression, timeout_ms).await;
        };

        let context_id = self.frame_context(frame_id).await?;
        match self.runtime_evaluate(Some(context_id), expression, timeout_ms).await {
            Err(e) if e.is_context_destroyed() => {
                // the frame navigated since the world was created
                debug!("Isolated world for frame {} is stale, recreating", frame_id);
                self.frame_contexts.lock().remove(frame_id);
                let context_id = self.frame_context(frame_id).await?;
                self.runtime_evaluate(Some(context_id), expression, timeout_ms).await
            }
            other => other,
        }
    }

    async fn runtime_evaluate(
        &self,
        context_id: Option<i64>,
        expression: &str,
        timeout_ms: u64,
    ) -> Result<Value, CdpError> {
        let mut params = json!({
            "expression": expression,
            "returnByValue": true,
            "awaitPromise": true,
            "timeout": timeout_ms,
        });
        if let Some(id) = context_id {
            params["contextId"] = json!(id);
        }

        let result = self
            .call_with_timeout(
                "Runtime.evaluate",
                Some(params),
                Duration::from_millis(timeout_ms) + REPLY_GRACE,
            )
            .await?;

        if let Some(exception) = result.get("exceptionDetails") {
            let details: ExceptionDetails = serde_json::from_value(exception.clone())?;
            return Err(CdpError::JavaScript(details.message()));
        }

        let remote: RemoteObject = serde_json::from_value(result["result"].clone())?;
        Ok(remote_value(remote))
    }

    /// Execution context of the isolated world for a frame, created on demand.
    async fn frame_context(&self, frame_id: &str) -> Result<i64, CdpError> {
        if let Some(id) = self.frame_contexts.lock().get(frame_id).copied() {
            return Ok(id);
        }

        let result = self
            .call(
                "Page.createIsolatedWorld",
                Some(json!({
                    "frameId": frame_id,
                    "worldName": WORLD_NAME,
                    "grantUniveralAccess": true,
                })),
            )
            .await
            .map_err(|e| match e {
                CdpError::Protocol { .. } => CdpError::FrameNotFound(frame_id.to_string()),
                other => other,
            })?;

        let context_id = result["executionContextId"]
            .as_i64()
            .ok_or_else(|| CdpError::InvalidResponse("Missing executionContextId".to_string()))?;

        self.frame_contexts
            .lock()
            .insert(frame_id.to_string(), context_id);
        Ok(context_id)
    }

    /// Forget all isolated worlds, e.g. after a top-level navigation.
    pub(crate) fn reset_frame_contexts(&self) {
        self.frame_contexts.lock().clear();
    }
}

/// Extract a by-value result, mapping `undefined` and unserializable numbers.
pub(super) fn remote_value(remote: RemoteObject) -> Value {
    if let Some(value) = remote.value {
        return value;
    }
    match remote.unserializable_value.as_deref() {
        Some(raw) => Value::String(raw.to_string()),
        None => Value::Null,
    }
}
