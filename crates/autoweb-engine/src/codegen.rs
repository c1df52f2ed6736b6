//! Code generation: one script block per plan step, plus narrow repair of a
//! single failing block.
//!
//! Generated code labels each block with a `// STEP <n>` line, optionally
//! followed by `:`, `.`, `)` or `-` and a title. Blocks are
//! found by label only; nothing else about the code is validated here.

use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, info};

use crate::error::EngineError;
use crate::models::ModelHandle;
use crate::session::PlanStep;

pub const CODE_BEGIN: &str = "AUTOWEB_CODE_BEGIN";
pub const CODE_END: &str = "AUTOWEB_CODE_END";

static STEP_LABEL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*//\s*STEP\s+(\d+)\s*(?:[:.)\-].*)?$").expect("valid label regex"));

const CODE_SYSTEM_PROMPT: &str = "You write short JavaScript snippets that automate a web page. \
Each snippet runs inside the page as the body of an async function. Answer only with code.";

const RUNTIME_CONTRACT: &str = "RUNTIME:
- Each block starts with a line `// STEP <n>` and runs as the body of an async function inside the page (or the frame holding the step's content).
- `target` helpers: `target.query(sel)`, `target.queryAll(sel)`, `await target.click(sel)`, `await target.fill(sel, value)`, `target.text(sel)`, `await target.waitFor(selectorOrPredicate, timeoutMs)`, `await target.sleep(ms)`, `target.goto(url)`, `target.doc` (the document).
- Top-level `const`/`let`/`var` variables are shared: later steps can read them by name. They are also available as properties of `env`.
- Put the final answer in `autowebResult`: a string, a number, or an array of rows (each row an array of cells).
- `console.log` output is captured and shown to you if a step fails.
- Throw an Error when the page is not in the expected state.";

/// What the code generator is asked for.
#[derive(Debug, Clone, Copy)]
pub enum CodePayload<'a> {
    /// Code for the whole plan; one capture per step.
    Full {
        plan_text: &'a str,
        steps: &'a [PlanStep],
        captures: &'a [String],
    },
    /// A replacement block for one failing step.
    Repair {
        current_code: &'a str,
        step: &'a PlanStep,
        error: &'a str,
        log_tail: &'a str,
        capture: &'a str,
    },
}

/// Build the codegen prompt.
pub fn build_code_prompt(task: &str, payload: &CodePayload<'_>) -> String {
    match payload {
        CodePayload::Full {
            plan_text,
            steps,
            captures,
        } => {
            let mut out = format!("TASK:\n{task}\n\nPLAN:\n{plan_text}\n\n{RUNTIME_CONTRACT}\n\nPAGE CONTENT PER STEP:\n");
            for (i, step) in steps.iter().enumerate() {
                out.push_str(&format!("\n### Step {}: {}\n", step.index, step.description));
                if let Some(url) = step.target_url() {
                    out.push_str(&format!("URL: {}\n", url));
                }
                let Some(capture) = captures.get(i) else { continue };
                match captures[..i].iter().position(|c| c == capture) {
                    Some(j) => out.push_str(&format!("(same page content as step {})\n", steps[j].index)),
                    None => out.push_str(&format!("```\n{}\n```\n", capture)),
                }
            }
            out.push_str(&format!(
                "\nWrite one block per step, in plan order, between the lines {CODE_BEGIN} and {CODE_END}."
            ));
            out
        }
        CodePayload::Repair {
            current_code,
            step,
            error,
            log_tail,
            capture,
        } => {
            let n = step.index;
            let log_tail = if log_tail.trim().is_empty() { "(no output)" } else { log_tail };
            format!(
                "TASK:\n{task}\n\n{RUNTIME_CONTRACT}\n\n\
STEP {n} FAILED: {description}\n\nERROR:\n{error}\n\nRECENT CONSOLE OUTPUT:\n{log_tail}\n\n\
CURRENT CODE:\n```js\n{current_code}\n```\n\n\
CURRENT PAGE:\n```\n{capture}\n```\n\n\
Return only the corrected block for step {n}, starting with the line `// STEP {n}`, \
between the lines {CODE_BEGIN} and {CODE_END}.",
                description = step.description,
            )
        }
    }
}

/// Ask the model for code and strip it down to the script text.
pub async fn generate_code(
    model: &ModelHandle,
    task: &str,
    payload: &CodePayload<'_>,
) -> Result<String, EngineError> {
    let prompt = build_code_prompt(task, payload);
    let reply = model.ask(CODE_SYSTEM_PROMPT, &prompt).await?;
    let code = extract_code(&reply);
    match payload {
        CodePayload::Full { .. } => info!(
            "Generated code: {} step block(s)",
            split_step_blocks(&code).blocks.len()
        ),
        CodePayload::Repair { step, .. } => debug!("Repair code for step {}: {} chars", step.index, code.len()),
    }
    Ok(code)
}

fn is_fence(line: &str) -> bool {
    line.trim_start().starts_with("```")
}

/// Script text of a model reply: the marker block if present, else the
/// fenced blocks, else the whole reply. Fence lines are dropped.
pub fn extract_code(reply: &str) -> String {
    let lines: Vec<&str> = reply.lines().collect();
    let upper = |l: &str| l.to_ascii_uppercase();

    let selected: Vec<&str> = if let Some(b) = lines.iter().position(|l| upper(l).contains(CODE_BEGIN)) {
        lines[b + 1..]
            .iter()
            .take_while(|l| !upper(l).contains(CODE_END))
            .filter(|l| !is_fence(l))
            .copied()
            .collect()
    } else if lines.iter().any(|l| is_fence(l)) {
        let mut inside = false;
        let mut out = Vec::new();
        for line in &lines {
            if is_fence(line) {
                inside = !inside;
            } else if inside {
                out.push(*line);
            }
        }
        out
    } else {
        lines
    };

    selected.join("\n").trim().to_string()
}

/// One labelled block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepBlock {
    pub index: usize,
    /// The label line as written.
    pub label: String,
    pub body: String,
}

/// Code split at its step labels.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodeBlocks {
    /// Text before the first label; kept when re-rendering, never executed.
    pub preamble: String,
    pub blocks: Vec<StepBlock>,
}

impl CodeBlocks {
    /// Body of the first block labelled `index`.
    pub fn body(&self, index: usize) -> Option<&str> {
        self.blocks
            .iter()
            .find(|b| b.index == index)
            .map(|b| b.body.as_str())
    }

    pub fn render(&self) -> String {
        let mut parts = Vec::new();
        let preamble = self.preamble.trim();
        if !preamble.is_empty() {
            parts.push(preamble.to_string());
        }
        for block in &self.blocks {
            let body = tidy(&block.body);
            if body.is_empty() {
                parts.push(block.label.clone());
            } else {
                parts.push(format!("{}\n{}", block.label, body));
            }
        }
        parts.join("\n\n")
    }
}

fn tidy(body: &str) -> &str {
    body.trim_start_matches(['\n', '\r']).trim_end()
}

/// Split code at `// STEP <n>` label lines.
pub fn split_step_blocks(code: &str) -> CodeBlocks {
    let mut result = CodeBlocks::default();
    for line in code.lines() {
        if let Some(caps) = STEP_LABEL_RE.captures(line) {
            if let Ok(index) = caps[1].parse::<usize>() {
                result.blocks.push(StepBlock {
                    index,
                    label: line.trim().to_string(),
                    body: String::new(),
                });
                continue;
            }
        }
        let target = match result.blocks.last_mut() {
            Some(block) => &mut block.body,
            None => &mut result.preamble,
        };
        target.push_str(line);
        target.push('\n');
    }
    for block in &mut result.blocks {
        block.body = tidy(&block.body).to_string();
    }
    result
}

/// Replace (or insert, in index order) the block for `index` and re-render.
pub fn replace_step_block(code: &str, index: usize, new_body: &str) -> String {
    let mut blocks = split_step_blocks(code);
    let body = tidy(new_body).to_string();
    match blocks.blocks.iter_mut().find(|b| b.index == index) {
        Some(block) => block.body = body,
        None => {
            let pos = blocks
                .blocks
                .iter()
                .position(|b| b.index > index)
                .unwrap_or(blocks.blocks.len());
            blocks.blocks.insert(
                pos,
                StepBlock {
                    index,
                    label: format!("// STEP {}", index),
                    body,
                },
            );
        }
    }
    blocks.render()
}

/// Pick the revised block for `index` out of a repair reply.
///
/// A reply with no labels at all is taken as the block itself; a reply with
/// a single block labelled for another step is accepted as well.
pub fn repair_fragment(reply: &str, index: usize) -> Option<String> {
    let code = extract_code(reply);
    if code.is_empty() {
        return None;
    }
    let blocks = split_step_blocks(&code);
    let body = match (blocks.body(index), blocks.blocks.as_slice()) {
        (Some(body), _) => body.to_string(),
        (None, []) => code,
        (None, [only]) => only.body.clone(),
        (None, _) => return None,
    };
    let body = tidy(&body).to_string();
    (!body.is_empty()).then_some(body)
}

#[cfg(test)]
#[path = "codegen_tests.rs"]
mod tests;
