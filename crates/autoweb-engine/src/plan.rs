//! Plan generation: prompt the model for a step list and parse its reply.
//!
//! The reply is parsed line by line. Each line is first stripped of comment
//! decoration (`//`, `#`, `--`, `/*`, `*`, `*/`, `<!--`, `-->`) and markdown
//! fences, so a marker block wrapped in any comment syntax parses the same.

use std::sync::LazyLock;

use autoweb_protocols::CaptureMode;
use regex::Regex;
use tracing::{debug, info, warn};

use crate::error::EngineError;
use crate::models::ModelHandle;
use crate::session::{CURRENT_PAGE, PlanStep};

pub const PLAN_BEGIN: &str = "AUTOWEB_PLAN_BEGIN";
pub const PLAN_END: &str = "AUTOWEB_PLAN_END";
pub const PLAN_CONFIRMED: &str = "PLAN_CONFIRMED";

static STEP_HEADER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\**\s*step\s+(\d+)\s*\**\s*[:.)\-]?\s*\**\s*(.*)$").expect("valid step regex")
});

static FIELD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^\**\s*(description|target[ _]?url|url|entry[ _]?action|action|status)\s*\**\s*[:=]\s*(.*)$",
    )
    .expect("valid field regex")
});

const PLAN_SYSTEM_PROMPT: &str = "You plan browser automations. You see the current page and a task, \
and you break the task into a short ordered list of concrete steps a script can perform on the page. \
Answer only with the requested plan block.";

/// Parsed plan.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlanParseResult {
    pub steps: Vec<PlanStep>,
    /// True only when at least one step parsed and the confirmation marker
    /// is present.
    pub confirmed: bool,
    /// The plan block as returned, without the markers.
    pub plan_text: String,
}

/// Build the plan prompt for a task on a captured page.
pub fn build_plan_prompt(task: &str, entry_url: &str, mode: CaptureMode, captured: &str) -> String {
    let content_kind = match mode {
        CaptureMode::RawHtml => "sanitized HTML",
        CaptureMode::AriaSnapshot => "accessibility tree snapshot",
    };
    format!(
        "TASK:\n{task}\n\n\
ENTRY URL: {entry_url}\n\n\
CURRENT PAGE ({content_kind}):\n```\n{captured}\n```\n\n\
Write the plan between the markers below, one stanza per step, numbered from 1:\n\n\
{PLAN_BEGIN}\n\
STEP 1:\n\
Description: <what the step does, in one sentence>\n\
Target URL: <URL the step works on, or {CURRENT_PAGE} to stay on the current page>\n\
Entry action: <navigate | none>\n\
Status: <confirmed | unconfirmed>\n\
{PLAN_END}\n\n\
Keep steps small enough that each one can be written as a short script.\n\
If every step is grounded in the page content above, add a line {PLAN_CONFIRMED} after the end marker."
    )
}

/// Ask the model for a plan and parse it.
///
/// An empty reply or one without any step stanza is a `PlanParseFailure`.
pub async fn generate_plan(
    model: &ModelHandle,
    task: &str,
    entry_url: &str,
    mode: CaptureMode,
    captured: &str,
) -> Result<(String, PlanParseResult), EngineError> {
    let prompt = build_plan_prompt(task, entry_url, mode, captured);
    let reply = model.ask(PLAN_SYSTEM_PROMPT, &prompt).await?;
    let parsed = parse_plan(&reply);

    if parsed.steps.is_empty() {
        let head: String = reply.chars().take(200).collect();
        return Err(EngineError::PlanParseFailure(format!(
            "no step stanza found in model output: {}",
            head.trim()
        )));
    }

    info!(
        "Plan generated: {} step(s), confirmed={}",
        parsed.steps.len(),
        parsed.confirmed
    );
    Ok((prompt, parsed))
}

/// Strip comment decoration, fences and list bullets from one line.
pub(crate) fn clean_line(line: &str) -> &str {
    let mut s = line.trim();
    loop {
        let before = s;
        for prefix in ["<!--", "-->", "//", "/*", "*/", "--", "#", "*", "- "] {
            if let Some(rest) = s.strip_prefix(prefix) {
                s = rest.trim_start();
            }
        }
        for suffix in ["-->", "*/"] {
            if let Some(rest) = s.strip_suffix(suffix) {
                s = rest.trim_end();
            }
        }
        if s == before {
            return s;
        }
    }
}

fn is_fence(line: &str) -> bool {
    line.trim_start().starts_with("```")
}

/// Parse a model reply into plan steps.
pub fn parse_plan(text: &str) -> PlanParseResult {
    let lines: Vec<&str> = text.lines().collect();

    let begin = lines
        .iter()
        .position(|l| clean_line(l).to_ascii_uppercase().contains(PLAN_BEGIN));
    let (start, end) = match begin {
        Some(b) => {
            let end = lines[b + 1..]
                .iter()
                .position(|l| clean_line(l).to_ascii_uppercase().contains(PLAN_END))
                .map(|e| b + 1 + e)
                .unwrap_or(lines.len());
            (b + 1, end)
        }
        None => (0, lines.len()),
    };

    let mut steps: Vec<PlanStep> = Vec::new();
    let mut current: Option<PlanStep> = None;
    let mut last_field: Option<String> = None;

    for raw in &lines[start..end] {
        if is_fence(raw) {
            continue;
        }
        let line = clean_line(raw);
        if line.is_empty() || line.to_ascii_uppercase().starts_with(PLAN_CONFIRMED) {
            continue;
        }

        if let Some(caps) = STEP_HEADER_RE.captures(line) {
            let Ok(index) = caps[1].parse::<usize>() else { continue };
            if let Some(step) = current.take() {
                steps.push(step);
            }
            let last_index = steps.last().map(|s| s.index).unwrap_or(0);
            if index <= last_index {
                warn!("Ignoring out-of-order plan step {} after {}", index, last_index);
                last_field = None;
                continue;
            }
            let mut step = PlanStep::new(index, "");
            let rest = caps[2].trim().trim_matches('*').trim();
            last_field = Some("description".to_string());
            if let Some(field) = FIELD_RE.captures(rest) {
                last_field = Some(assign_field(&mut step, &field));
            } else if !rest.is_empty() {
                step.description = rest.to_string();
            }
            current = Some(step);
            continue;
        }

        let Some(step) = current.as_mut() else { continue };

        if let Some(field) = FIELD_RE.captures(line) {
            last_field = Some(assign_field(step, &field));
        } else if last_field.as_deref() == Some("description") {
            // wrapped description line
            if !step.description.is_empty() {
                step.description.push(' ');
            }
            step.description.push_str(line);
        }
    }
    if let Some(step) = current.take() {
        steps.push(step);
    }

    let confirmed = !steps.is_empty() && has_confirmation(text);
    let plan_text = lines[start..end]
        .iter()
        .filter(|l| !is_fence(l))
        .copied()
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string();

    debug!("Parsed {} plan step(s)", steps.len());
    PlanParseResult {
        steps,
        confirmed,
        plan_text,
    }
}

/// Store a labelled field on the step and return its normalized label.
fn assign_field(step: &mut PlanStep, caps: &regex::Captures<'_>) -> String {
    let label = caps[1].to_ascii_lowercase().replace([' ', '_'], "");
    let value = caps[2].trim().trim_matches('*').trim().to_string();
    let field = match label.as_str() {
        "description" => &mut step.description,
        "targeturl" | "url" => &mut step.target_url,
        "entryaction" | "action" => &mut step.entry_action,
        _ => &mut step.status,
    };
    *field = value;
    label
}

fn has_confirmation(text: &str) -> bool {
    text.lines().any(|l| {
        let line = clean_line(l);
        let upper = line.to_ascii_uppercase();
        let Some(rest) = upper.strip_prefix(PLAN_CONFIRMED) else {
            return false;
        };
        let value = rest.trim_start_matches([':', '=', ' ']).trim();
        !matches!(value, "FALSE" | "NO" | "0")
    })
}

#[cfg(test)]
#[path = "plan_tests.rs"]
mod tests;
