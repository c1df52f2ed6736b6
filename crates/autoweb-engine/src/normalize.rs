//! Final result extraction and message chunking.

use serde_json::{Map, Value};

/// Environment keys checked for the final result, highest priority first.
pub const RESULT_KEYS: [&str; 4] = ["autowebResult", "result", "finalResult", "output"];

/// Room kept for the `(i/n) ` label of each chunk.
const LABEL_RESERVE: usize = 16;

/// A result value and its text preview.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedResult {
    pub value: Value,
    pub preview: String,
}

/// Pick the first non-null result key from `env`.
pub fn normalize_result(env: &Map<String, Value>) -> Option<NormalizedResult> {
    RESULT_KEYS
        .iter()
        .filter_map(|key| env.get(*key))
        .find(|v| !v.is_null())
        .map(|value| NormalizedResult {
            preview: preview(value),
            value: value.clone(),
        })
}

/// Text rendering of a result value: strings as-is, rows as CSV, anything
/// else as JSON.
pub fn preview(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Array(items) if !items.is_empty() => match rows(items) {
            Some(rows) => to_csv(&rows).unwrap_or_else(|| value.to_string()),
            None => value.to_string(),
        },
        other => other.to_string(),
    }
}

fn cell(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Rows if every item is an array or an object with a `values` array.
fn rows(items: &[Value]) -> Option<Vec<Vec<String>>> {
    items
        .iter()
        .map(|item| match item {
            Value::Array(cells) => Some(cells.iter().map(cell).collect()),
            Value::Object(obj) => match obj.get("values") {
                Some(Value::Array(cells)) => Some(cells.iter().map(cell).collect()),
                _ => None,
            },
            _ => None,
        })
        .collect()
}

fn to_csv(rows: &[Vec<String>]) -> Option<String> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .flexible(true)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    for row in rows {
        writer.write_record(row).ok()?;
    }
    let bytes = writer.into_inner().ok()?;
    let text = String::from_utf8(bytes).ok()?;
    Some(text.trim_end_matches('\n').to_string())
}

/// Split `text` into parts of at most `max_chars`, labelled `(i/n) ` when
/// more than one part is needed. Splits prefer newline boundaries.
pub fn chunk_message(text: &str, max_chars: usize) -> Vec<String> {
    if text.chars().count() <= max_chars || max_chars == 0 {
        return vec![text.to_string()];
    }

    let size = max_chars.saturating_sub(LABEL_RESERVE).max(1);
    let mut parts: Vec<String> = Vec::new();
    let mut rest: &str = text;

    while !rest.is_empty() {
        if rest.chars().count() <= size {
            parts.push(rest.to_string());
            break;
        }
        let hard_end = rest
            .char_indices()
            .nth(size)
            .map(|(i, _)| i)
            .unwrap_or(rest.len());
        let cut = match rest[..hard_end].rfind('\n') {
            Some(nl) if nl > 0 => nl + 1,
            _ => hard_end,
        };
        parts.push(rest[..cut].trim_end_matches('\n').to_string());
        rest = &rest[cut..];
    }

    let total = parts.len();
    parts
        .into_iter()
        .enumerate()
        .map(|(i, part)| format!("({}/{}) {}", i + 1, total, part))
        .collect()
}
