//! Step scripts: fragments, the runtime seam and the JavaScript runtime.

mod rewrite;
mod runtime;
mod wrapper;

use std::sync::LazyLock;

use async_trait::async_trait;
use autoweb_protocols::{AutomationError, AutomationPage, ExecutionTarget};
use regex::Regex;
use serde_json::{Map, Value};

pub use rewrite::{promote_declarations, RewriteOutput};
pub use runtime::JsScriptRuntime;
pub use wrapper::{binding_names, is_bindable, wrap_fragment};

static COMMENTS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)/\*.*?\*/|//[^\n]*").expect("valid comment regex"));

/// Script text for one step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptFragment {
    pub step_index: usize,
    pub code: String,
}

impl ScriptFragment {
    pub fn new(step_index: usize, code: impl Into<String>) -> Self {
        Self {
            step_index,
            code: code.into(),
        }
    }

    /// Nothing but whitespace and comments.
    pub fn is_empty(&self) -> bool {
        COMMENTS_RE.replace_all(&self.code, "").trim().is_empty()
    }
}

/// What one run of a fragment produced. Logs are kept on failure too.
#[derive(Debug)]
pub struct ScriptOutcome {
    pub result: Result<Value, AutomationError>,
    pub logs: Vec<String>,
}

impl ScriptOutcome {
    pub fn ok(value: Value, logs: Vec<String>) -> Self {
        Self {
            result: Ok(value),
            logs,
        }
    }

    pub fn err(error: AutomationError, logs: Vec<String>) -> Self {
        Self {
            result: Err(error),
            logs,
        }
    }
}

/// Runs fragments against a page, threading the shared environment.
///
/// `env` is updated with whatever the fragment wrote before it finished,
/// whether it succeeded or not.
#[async_trait]
pub trait ScriptRuntime: Send + Sync {
    async fn run(
        &self,
        page: &dyn AutomationPage,
        target: &ExecutionTarget,
        fragment: &ScriptFragment,
        env: &mut Map<String, Value>,
        timeout_ms: u64,
    ) -> ScriptOutcome;
}
