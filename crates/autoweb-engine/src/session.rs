//! Run session state kept between `prepare` and later `run`/`resume` calls.

use std::collections::VecDeque;

use autoweb_protocols::CaptureMode;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Target URL sentinel meaning "stay on the current page".
pub const CURRENT_PAGE: &str = "CURRENT_PAGE";

/// Lines kept in a session's log buffer.
const LOG_CAPACITY: usize = 500;

/// One parsed plan step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanStep {
    /// 1-based, strictly increasing in plan order.
    pub index: usize,
    pub description: String,
    /// URL hint; empty or [`CURRENT_PAGE`] means stay.
    pub target_url: String,
    pub entry_action: String,
    pub status: String,
}

impl PlanStep {
    pub fn new(index: usize, description: impl Into<String>) -> Self {
        Self {
            index,
            description: description.into(),
            ..Default::default()
        }
    }

    /// Concrete target URL, if the step names one.
    pub fn target_url(&self) -> Option<&str> {
        let url = self.target_url.trim();
        if url.is_empty() || url.eq_ignore_ascii_case(CURRENT_PAGE) || url == "-" {
            None
        } else {
            Some(url)
        }
    }

    /// Whether the entry action asks for a navigation before the step runs.
    pub fn navigates_first(&self) -> bool {
        self.entry_action
            .trim()
            .to_ascii_lowercase()
            .starts_with("navigate")
            && self.target_url().is_some()
    }
}

/// Bounded buffer of script console output.
#[derive(Debug, Clone, Default)]
pub struct LogBuffer {
    lines: VecDeque<String>,
}

impl LogBuffer {
    pub fn push(&mut self, line: impl Into<String>) {
        if self.lines.len() == LOG_CAPACITY {
            self.lines.pop_front();
        }
        self.lines.push_back(line.into());
    }

    pub fn extend<I: IntoIterator<Item = String>>(&mut self, lines: I) {
        for line in lines {
            self.push(line);
        }
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Last `n` lines joined with newlines.
    pub fn tail(&self, n: usize) -> String {
        let skip = self.lines.len().saturating_sub(n);
        self.lines
            .iter()
            .skip(skip)
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// A prepared run: plan plus generated code, addressable by run id.
#[derive(Debug, Clone)]
pub struct RunSession {
    pub run_id: String,
    pub entry_url: String,
    pub task: String,
    /// Prompt sent to the model for the plan.
    pub prompt: String,
    /// `provider:model` label.
    pub model: String,
    pub capture_mode: CaptureMode,
    pub plan_text: String,
    pub plan_confirmed: bool,
    pub steps: Vec<PlanStep>,
    /// Generated code with `// STEP <n>` blocks.
    pub code: String,
    pub created_at: DateTime<Utc>,
    pub plan_surfaced: bool,
    /// Next step to resume from.
    pub cursor: usize,
    pub logs: LogBuffer,
}

impl RunSession {
    pub fn new(entry_url: impl Into<String>, task: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            run_id: uuid::Uuid::new_v4().to_string(),
            entry_url: entry_url.into(),
            task: task.into(),
            prompt: String::new(),
            model: model.into(),
            capture_mode: CaptureMode::default(),
            plan_text: String::new(),
            plan_confirmed: false,
            steps: Vec::new(),
            code: String::new(),
            created_at: Utc::now(),
            plan_surfaced: false,
            cursor: 1,
            logs: LogBuffer::default(),
        }
    }

    pub fn step(&self, index: usize) -> Option<&PlanStep> {
        self.steps.iter().find(|s| s.index == index)
    }

    /// Steps in `[from, from + max)`; `max == 0` means unbounded.
    pub fn window(&self, from: usize, max: usize) -> Vec<PlanStep> {
        let from = from.max(1);
        self.steps
            .iter()
            .filter(|s| s.index >= from && (max == 0 || s.index < from + max))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session_with_steps(n: usize) -> RunSession {
        let mut session = RunSession::new("https://example.com", "task", "openai:gpt-4o");
        session.steps = (1..=n).map(|i| PlanStep::new(i, format!("step {}", i))).collect();
        session
    }

    #[test]
    fn test_target_url_sentinels() {
        let mut step = PlanStep::new(1, "x");
        assert!(step.target_url().is_none());
        step.target_url = "current_page".into();
        assert!(step.target_url().is_none());
        step.target_url = "https://example.com/orders".into();
        assert_eq!(step.target_url(), Some("https://example.com/orders"));
    }

    #[test]
    fn test_navigates_first_requires_url() {
        let mut step = PlanStep::new(1, "x");
        step.entry_action = "Navigate".into();
        assert!(!step.navigates_first());
        step.target_url = "https://example.com/a".into();
        assert!(step.navigates_first());
        step.entry_action = "click".into();
        assert!(!step.navigates_first());
    }

    #[test]
    fn test_window() {
        let session = session_with_steps(5);
        let idx: Vec<usize> = session.window(3, 2).iter().map(|s| s.index).collect();
        assert_eq!(idx, vec![3, 4]);
        let idx: Vec<usize> = session.window(4, 0).iter().map(|s| s.index).collect();
        assert_eq!(idx, vec![4, 5]);
        let idx: Vec<usize> = session.window(5, 3).iter().map(|s| s.index).collect();
        assert_eq!(idx, vec![5]);
        assert!(session.window(9, 0).is_empty());
    }

    #[test]
    fn test_log_buffer_bounded() {
        let mut logs = LogBuffer::default();
        for i in 0..(LOG_CAPACITY + 10) {
            logs.push(format!("line {}", i));
        }
        assert_eq!(logs.len(), LOG_CAPACITY);
        assert_eq!(logs.tail(2), format!("line {}\nline {}", LOG_CAPACITY + 8, LOG_CAPACITY + 9));
    }

    #[test]
    fn test_run_ids_unique() {
        let a = RunSession::new("u", "t", "m");
        let b = RunSession::new("u", "t", "m");
        assert_ne!(a.run_id, b.run_id);
        assert_eq!(a.cursor, 1);
    }
}
