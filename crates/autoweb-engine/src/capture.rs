//! Bounded, redacted text rendering of the current document for prompting.

use std::sync::LazyLock;

use autoweb_protocols::{AriaNode, AutomationError, AutomationPage, CaptureMode, ExecutionTarget};
use regex::{Captures, Regex};
use tracing::debug;

const REDACTED: &str = "[REDACTED]";
const MAX_ATTR_CHARS: usize = 200;
/// Percent of the budget kept from the start of the text.
const HEAD_PERCENT: usize = 70;

static STRIPPED_ELEMENTS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    ["script", "style", "noscript", "template", "svg"]
        .iter()
        .map(|tag| {
            Regex::new(&format!(r"(?is)<{tag}\b[^>]*>.*?</{tag}\s*>"))
                .expect("valid element regex")
        })
        .collect()
});

static COMMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->").expect("valid comment regex"));

static DATA_URI_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)data:[^"'\s)>]+"#).expect("valid data uri regex"));

static SENSITIVE_INPUT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<input\b[^>]*\btype\s*=\s*["']?(?:password|hidden)\b[^>]*>"#)
        .expect("valid input regex")
});

static TOKEN_TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<(?:input|meta)\b[^>]*(?:csrf|xsrf|authenticity|_token|token)[^>]*>"#)
        .expect("valid token regex")
});

static VALUE_ATTR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\b(value|content)\s*=\s*("[^"]*"|'[^']*'|[^\s>]+)"#).expect("valid attr regex")
});

static LONG_ATTR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(\s[\w:.-]+\s*=\s*")([^"]{200,})(")"#).expect("valid long attr regex")
});

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}").expect("valid email regex")
});

static LONG_DIGITS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b\d{12,}\b|\b\d{4}(?:[ -]\d{4}){2,3}\b").expect("valid digits regex")
});

static WHITESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid whitespace regex"));

/// Capture the target document in the requested mode, clipped to `budget`
/// characters.
pub async fn capture(
    page: &dyn AutomationPage,
    target: &ExecutionTarget,
    mode: CaptureMode,
    budget: usize,
) -> Result<String, AutomationError> {
    let text = match mode {
        CaptureMode::RawHtml => sanitize_html(&page.capture_html(target).await?),
        CaptureMode::AriaSnapshot => render_aria(&page.capture_aria(target).await?),
    };
    let clipped = clip(&text, budget);
    debug!(
        "Captured {} ({:?}): {} chars, {} after clipping",
        target.label(),
        mode,
        text.chars().count(),
        clipped.chars().count()
    );
    Ok(clipped)
}

/// Strip non-content markup, redact secrets and personal data, collapse
/// whitespace.
pub fn sanitize_html(html: &str) -> String {
    let mut out = COMMENT_RE.replace_all(html, "").into_owned();
    for re in STRIPPED_ELEMENTS.iter() {
        out = re.replace_all(&out, "").into_owned();
    }
    out = DATA_URI_RE.replace_all(&out, "data:[removed]").into_owned();
    out = SENSITIVE_INPUT_RE
        .replace_all(&out, |caps: &Captures| redact_values(&caps[0]))
        .into_owned();
    out = TOKEN_TAG_RE
        .replace_all(&out, |caps: &Captures| redact_values(&caps[0]))
        .into_owned();
    out = LONG_ATTR_RE
        .replace_all(&out, |caps: &Captures| {
            format!("{}{}…{}", &caps[1], truncate_chars(&caps[2], MAX_ATTR_CHARS), &caps[3])
        })
        .into_owned();
    out = redact_text(&out);
    collapse_whitespace(&out)
}

fn redact_values(tag: &str) -> String {
    VALUE_ATTR_RE
        .replace_all(tag, |caps: &Captures| format!("{}=\"{}\"", &caps[1], REDACTED))
        .into_owned()
}

/// Redact e-mail addresses and card-like digit runs.
pub fn redact_text(text: &str) -> String {
    let out = EMAIL_RE.replace_all(text, "[EMAIL]");
    LONG_DIGITS_RE.replace_all(&out, "[NUMBER]").into_owned()
}

fn collapse_whitespace(text: &str) -> String {
    WHITESPACE_RE
        .replace_all(text, |caps: &Captures| {
            if caps[0].contains('\n') { "\n" } else { " " }
        })
        .trim()
        .to_string()
}

/// Render a flattened accessibility tree as indented `- role "name" [value]`
/// lines. Ignored nodes are skipped.
pub fn render_aria(nodes: &[AriaNode]) -> String {
    let mut out = String::new();
    for node in nodes.iter().filter(|n| !n.ignored && !n.role.is_empty()) {
        out.push_str(&"  ".repeat(node.depth));
        out.push_str("- ");
        out.push_str(&node.role);
        if !node.name.trim().is_empty() {
            out.push_str(&format!(" \"{}\"", node.name.trim()));
        }
        if let Some(value) = node.value.as_deref().filter(|v| !v.is_empty()) {
            out.push_str(&format!(" [{}]", value));
        }
        out.push('\n');
    }
    redact_text(out.trim_end())
}

/// Clip to `budget` characters keeping head and tail, with a marker naming
/// how much was dropped. Cuts only on char boundaries.
pub fn clip(text: &str, budget: usize) -> String {
    let total = text.chars().count();
    if total <= budget {
        return text.to_string();
    }

    let head_chars = budget * HEAD_PERCENT / 100;
    let tail_chars = budget - head_chars;
    let omitted = total - head_chars - tail_chars;

    let head_end = byte_offset(text, head_chars);
    let tail_start = byte_offset(text, total - tail_chars);

    format!(
        "{}\n…[{} chars omitted]…\n{}",
        &text[..head_end],
        omitted,
        &text[tail_start..]
    )
}

fn byte_offset(text: &str, chars: usize) -> usize {
    text.char_indices()
        .nth(chars)
        .map(|(i, _)| i)
        .unwrap_or(text.len())
}

fn truncate_chars(text: &str, max: usize) -> &str {
    &text[..byte_offset(text, max)]
}

#[cfg(test)]
#[path = "capture_tests.rs"]
mod tests;
