//! Markdown narration of a run for the progress channel.

use std::sync::Arc;

use autoweb_protocols::{ProgressEvent, ProgressKind, ProgressSink};
use tracing::warn;

use crate::normalize::chunk_message;
use crate::session::PlanStep;

/// Formats progress messages and hands them to the sink in chunks.
/// Delivery failures are logged and otherwise ignored.
#[derive(Clone)]
pub struct Narrator {
    sink: Arc<dyn ProgressSink>,
    chunk_chars: usize,
    preview_chars: usize,
}

impl Narrator {
    pub fn new(sink: Arc<dyn ProgressSink>, chunk_chars: usize, preview_chars: usize) -> Self {
        Self {
            sink,
            chunk_chars,
            preview_chars,
        }
    }

    pub fn preview_chars(&self) -> usize {
        self.preview_chars
    }

    async fn emit(&self, kind: ProgressKind, run_id: Option<&str>, text: &str) {
        for part in chunk_message(text, self.chunk_chars) {
            let event = ProgressEvent::new(kind, run_id, part);
            if let Err(e) = self.sink.send(event).await {
                warn!("Progress sink '{}' failed: {}", self.sink.id(), e);
            }
        }
    }

    pub async fn page_opened(&self, url: &str, title: &str) {
        let text = if title.trim().is_empty() {
            format!("🌐 Opened {}", url)
        } else {
            format!("🌐 Opened **{}** ({})", title.trim(), url)
        };
        self.emit(ProgressKind::PageOpened, None, &text).await;
    }

    pub async fn plan_generated(&self, run_id: &str, steps: &[PlanStep], confirmed: bool) {
        let mut text = format!(
            "📋 **Plan** ({} step{}{})\n",
            steps.len(),
            if steps.len() == 1 { "" } else { "s" },
            if confirmed { ", confirmed" } else { "" }
        );
        for step in steps {
            text.push_str(&format!("{}. {}\n", step.index, step.description));
        }
        self.emit(ProgressKind::PlanGenerated, Some(run_id), text.trim_end()).await;
    }

    pub async fn step_started(&self, run_id: &str, step: &PlanStep) {
        let text = format!("▶️ Step {}: {}", step.index, step.description);
        self.emit(ProgressKind::StepStarted, Some(run_id), &text).await;
    }

    pub async fn step_succeeded(&self, run_id: &str, index: usize, duration_ms: u64) {
        let text = format!("✅ Step {} done ({} ms)", index, duration_ms);
        self.emit(ProgressKind::StepSucceeded, Some(run_id), &text).await;
    }

    pub async fn step_repaired(&self, run_id: &str, index: usize, attempts: u32) {
        let text = format!("🔧 Step {} repaired after {} attempt(s)", index, attempts);
        self.emit(ProgressKind::StepRepaired, Some(run_id), &text).await;
    }

    pub async fn step_failed(&self, run_id: &str, index: usize, reason: &str) {
        let text = format!("❌ Step {} failed: {}", index, reason);
        self.emit(ProgressKind::StepFailed, Some(run_id), &text).await;
    }

    pub async fn run_finished(&self, run_id: &str, preview: Option<&str>) {
        let text = match preview {
            Some(p) if !p.trim().is_empty() => format!("🏁 Finished\n```\n{}\n```", clip_chars(p, self.preview_chars)),
            _ => "🏁 Finished".to_string(),
        };
        self.emit(ProgressKind::RunFinished, Some(run_id), &text).await;
    }
}

/// First `max` chars of `text`, with an ellipsis when cut.
pub fn clip_chars(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max).collect();
    out.push('…');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingSink;

    #[tokio::test]
    async fn test_plan_narration() {
        let sink = Arc::new(RecordingSink::default());
        let narrator = Narrator::new(sink.clone(), 1000, 100);
        let steps = vec![PlanStep::new(1, "Open orders"), PlanStep::new(2, "Count unpaid")];
        narrator.plan_generated("r-1", &steps, true).await;

        let events = sink.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event_type, ProgressKind::PlanGenerated);
        assert_eq!(events[0].run_id.as_deref(), Some("r-1"));
        assert!(events[0].content.contains("2 steps, confirmed"));
        assert!(events[0].content.contains("2. Count unpaid"));
    }

    #[tokio::test]
    async fn test_long_messages_are_chunked() {
        let sink = Arc::new(RecordingSink::default());
        let narrator = Narrator::new(sink.clone(), 60, 10_000);
        let preview = (0..20).map(|i| format!("row {},a,b", i)).collect::<Vec<_>>().join("\n");
        narrator.run_finished("r-1", Some(&preview)).await;

        let events = sink.events();
        assert!(events.len() > 1);
        assert!(events[0].content.starts_with(&format!("(1/{}) ", events.len())));
        assert!(events.iter().all(|e| e.content.chars().count() <= 60));
    }

    #[tokio::test]
    async fn test_sink_failure_is_ignored() {
        let sink = Arc::new(RecordingSink::failing());
        let narrator = Narrator::new(sink.clone(), 1000, 100);
        narrator.step_failed("r-1", 2, "boom").await;
        assert!(sink.events().is_empty());
    }

    #[test]
    fn test_clip_chars() {
        assert_eq!(clip_chars("abc", 5), "abc");
        assert_eq!(clip_chars("abcdef", 3), "abc…");
    }
}
