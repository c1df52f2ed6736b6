//! Execution target selection for pages that embed frames.
//!
//! Each child frame gets a score from its name, its URL against the step's
//! URL hint, keyword overlap with the step description and a probe of its
//! visible content. The best frame at or above [`SCORE_THRESHOLD`] wins;
//! otherwise the step runs against the top-level document.

use std::collections::HashSet;
use std::time::{Duration, Instant};

use autoweb_protocols::{AutomationError, AutomationPage, ExecutionTarget, FrameInfo};
use serde_json::Value;
use tracing::debug;
use url::Url;

pub const SCORE_THRESHOLD: i32 = 20;
const POLL_INTERVAL_MS: u64 = 250;
const PROBE_TIMEOUT_MS: u64 = 2_000;
const KEYWORD_CAP: i32 = 20;

const PROBE_EXPR: &str = "(() => { const b = document.body; \
return { text: b ? (b.innerText || '').length : 0, \
interactive: document.querySelectorAll('a[href],button,input,select,textarea,[role=button]').length }; })()";

/// What the current step says about where it works.
#[derive(Debug, Clone, Default)]
pub struct TargetHint {
    pub url: Option<String>,
    pub description: String,
}

impl TargetHint {
    pub fn new(url: Option<&str>, description: impl Into<String>) -> Self {
        Self {
            url: url.map(str::to_string),
            description: description.into(),
        }
    }
}

/// Result of the in-frame content probe.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameProbe {
    pub text_len: u64,
    pub interactive: u64,
}

impl FrameProbe {
    fn from_value(value: &Value) -> Self {
        Self {
            text_len: value.get("text").and_then(Value::as_u64).unwrap_or(0),
            interactive: value.get("interactive").and_then(Value::as_u64).unwrap_or(0),
        }
    }
}

fn keywords(text: &str) -> HashSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| w.chars().count() >= 4)
        .map(str::to_lowercase)
        .collect()
}

/// Static part of a frame's score: name, URL and keywords.
pub fn score_frame(frame: &FrameInfo, hint: &TargetHint) -> i32 {
    let mut score = 0;
    let description = hint.description.to_lowercase();
    let name = frame.name.trim().to_lowercase();

    if !name.is_empty() && description.contains(&name) {
        score += 30;
    }

    if frame.url.is_empty() || frame.url == "about:blank" {
        score -= 30;
    }

    if let (Some(hint_url), Ok(frame_url)) = (hint.url.as_deref(), Url::parse(&frame.url)) {
        if let Ok(hint_url) = Url::parse(hint_url) {
            if hint_url.host_str().is_some() && hint_url.host_str() == frame_url.host_str() {
                score += 20;
                let path = hint_url.path();
                if path != "/" && frame_url.path().starts_with(path) {
                    score += 30;
                }
            }
        }
    }

    let words = keywords(&hint.description);
    let frame_words = keywords(&format!("{} {}", frame.name, frame.url));
    let overlap = words.intersection(&frame_words).count() as i32;
    score + (overlap * 5).min(KEYWORD_CAP)
}

/// Score contribution of the content probe.
pub fn probe_score(probe: FrameProbe) -> i32 {
    if probe.text_len == 0 && probe.interactive == 0 {
        return -20;
    }
    let mut score = 0;
    if probe.text_len > 200 {
        score += 5;
    }
    if probe.interactive > 0 {
        score += 5;
    }
    score
}

/// Choose where the next attempt runs. Called before every attempt, since
/// frames come and go between steps.
///
/// A page without child frames resolves to the root at once. Otherwise the
/// children are re-scored every poll until one qualifies or `frame_wait_ms`
/// runs out.
pub async fn choose_execution_target(
    page: &dyn AutomationPage,
    hint: &TargetHint,
    frame_wait_ms: u64,
) -> Result<ExecutionTarget, AutomationError> {
    let deadline = Instant::now() + Duration::from_millis(frame_wait_ms);
    loop {
        let frames = page.frames().await?;
        if frames.len() <= 1 {
            return Ok(ExecutionTarget::Root);
        }
        if let Some(target) = best_frame(page, &frames[1..], hint).await {
            return Ok(target);
        }
        if Instant::now() >= deadline {
            return Ok(ExecutionTarget::Root);
        }
        tokio::time::sleep(Duration::from_millis(POLL_INTERVAL_MS)).await;
    }
}

async fn best_frame(
    page: &dyn AutomationPage,
    children: &[FrameInfo],
    hint: &TargetHint,
) -> Option<ExecutionTarget> {
    let mut best: Option<(i32, &FrameInfo)> = None;
    for frame in children {
        let target = ExecutionTarget::from(frame);
        let probe = match page.evaluate(&target, PROBE_EXPR, PROBE_TIMEOUT_MS).await {
            Ok(value) => FrameProbe::from_value(&value),
            Err(e) => {
                debug!("Frame probe failed for {}: {}", target.label(), e);
                FrameProbe::default()
            }
        };
        let score = score_frame(frame, hint) + probe_score(probe);
        debug!("Frame {} scored {}", target.label(), score);
        if best.is_none_or(|(top, _)| score > top) {
            best = Some((score, frame));
        }
    }
    best.filter(|(score, _)| *score >= SCORE_THRESHOLD)
        .map(|(_, frame)| ExecutionTarget::from(frame))
}
