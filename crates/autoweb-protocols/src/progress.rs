//! Progress channel protocol.
//!
//! A progress sink receives human-readable markdown narration while a run
//! proceeds: page opened, plan generated, step N executing/succeeded/failed,
//! final result preview. Delivery is advisory; the engine never fails a run
//! because a sink could not deliver.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::ProgressError;

/// Kind of progress event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressKind {
    PageOpened,
    PlanGenerated,
    StepStarted,
    StepSucceeded,
    StepRepaired,
    StepFailed,
    RunFinished,
}

/// One narration message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressEvent {
    pub event_type: ProgressKind,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub run_id: Option<String>,
    pub content: String,
}

impl ProgressEvent {
    pub fn new(event_type: ProgressKind, run_id: Option<&str>, content: impl Into<String>) -> Self {
        Self {
            event_type,
            timestamp: Utc::now(),
            run_id: run_id.map(str::to_string),
            content: content.into(),
        }
    }
}

/// Advisory text channel.
#[async_trait]
pub trait ProgressSink: Send + Sync {
    /// Sink identifier, used in logs.
    fn id(&self) -> &str;

    async fn send(&self, event: ProgressEvent) -> Result<(), ProgressError>;
}

/// Writes narration to the tracing log.
#[derive(Debug, Default, Clone)]
pub struct LogSink;

#[async_trait]
impl ProgressSink for LogSink {
    fn id(&self) -> &str {
        "log"
    }

    async fn send(&self, event: ProgressEvent) -> Result<(), ProgressError> {
        info!(
            run_id = event.run_id.as_deref().unwrap_or("-"),
            kind = ?event.event_type,
            "{}",
            event.content
        );
        Ok(())
    }
}

/// Discards everything.
#[derive(Debug, Default, Clone)]
pub struct NullSink;

#[async_trait]
impl ProgressSink for NullSink {
    fn id(&self) -> &str {
        "null"
    }

    async fn send(&self, _event: ProgressEvent) -> Result<(), ProgressError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_serialization() {
        let event = ProgressEvent::new(ProgressKind::StepSucceeded, Some("run-1"), "Step 1 ok");
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event_type"], "step_succeeded");
        assert_eq!(json["run_id"], "run-1");
        assert_eq!(json["content"], "Step 1 ok");
        assert!(json["timestamp"].is_string());
    }

    #[test]
    fn test_event_without_run_id() {
        let event = ProgressEvent::new(ProgressKind::PageOpened, None, "opened");
        let json = serde_json::to_value(&event).unwrap();
        assert!(json.get("run_id").is_none());
    }

    #[tokio::test]
    async fn test_builtin_sinks_accept() {
        let event = ProgressEvent::new(ProgressKind::RunFinished, None, "done");
        assert!(LogSink.send(event.clone()).await.is_ok());
        assert!(NullSink.send(event).await.is_ok());
        assert_eq!(LogSink.id(), "log");
        assert_eq!(NullSink.id(), "null");
    }
}
