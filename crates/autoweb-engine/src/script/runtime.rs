//! JavaScript runtime: rewrite, wrap, evaluate, unpack.

use async_trait::async_trait;
use autoweb_protocols::{AutomationError, AutomationPage, ExecutionTarget};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use super::rewrite::promote_declarations;
use super::wrapper::{binding_names, is_bindable, wrap_fragment};
use super::{ScriptFragment, ScriptOutcome, ScriptRuntime};

/// Extra time the protocol call waits beyond the in-page timeout.
const DEFAULT_GRACE_MS: u64 = 2_000;

/// Evaluates fragments as async JavaScript in the target document.
#[derive(Debug, Clone)]
pub struct JsScriptRuntime {
    grace_ms: u64,
}

impl Default for JsScriptRuntime {
    fn default() -> Self {
        Self {
            grace_ms: DEFAULT_GRACE_MS,
        }
    }
}

impl JsScriptRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_grace_ms(mut self, grace_ms: u64) -> Self {
        self.grace_ms = grace_ms;
        self
    }

    /// The expression sent to the page for `fragment`.
    pub fn build_expression(&self, fragment: &ScriptFragment, env: &Map<String, Value>, timeout_ms: u64) -> String {
        let rewrite = promote_declarations(&fragment.code, is_bindable);
        if !rewrite.promoted.is_empty() {
            debug!(
                "Step {}: promoted shared variables {:?}",
                fragment.step_index, rewrite.promoted
            );
        }
        let bindings = binding_names(&rewrite.promoted, env);
        wrap_fragment(&rewrite.code, &bindings, env, timeout_ms)
    }
}

/// Error text from the page, sorted into timeout or script failure.
pub(crate) fn classify_script_error(message: &str) -> AutomationError {
    let lower = message.to_ascii_lowercase();
    if message.contains("TimeoutError") || lower.contains("timed out") {
        AutomationError::Timeout(message.to_string())
    } else {
        AutomationError::Script(message.to_string())
    }
}

/// Unpack the wrapper's reply, replacing `env` with the returned one.
fn unpack_reply(reply: Value, env: &mut Map<String, Value>) -> ScriptOutcome {
    let Value::Object(mut reply) = reply else {
        return ScriptOutcome::err(
            AutomationError::Protocol(format!("unexpected script reply: {}", reply)),
            Vec::new(),
        );
    };

    let logs = match reply.remove("logs") {
        Some(Value::Array(lines)) => lines
            .into_iter()
            .map(|l| match l {
                Value::String(s) => s,
                other => other.to_string(),
            })
            .collect(),
        _ => Vec::new(),
    };

    match reply.remove("env") {
        Some(Value::Object(updated)) => *env = updated,
        Some(other) => warn!("Script returned a non-object env: {}", other),
        None => {}
    }

    match reply.remove("error") {
        Some(Value::String(message)) => ScriptOutcome::err(classify_script_error(&message), logs),
        Some(other) if !other.is_null() => {
            ScriptOutcome::err(classify_script_error(&other.to_string()), logs)
        }
        _ => ScriptOutcome::ok(reply.remove("value").unwrap_or(Value::Null), logs),
    }
}

#[async_trait]
impl ScriptRuntime for JsScriptRuntime {
    async fn run(
        &self,
        page: &dyn AutomationPage,
        target: &ExecutionTarget,
        fragment: &ScriptFragment,
        env: &mut Map<String, Value>,
        timeout_ms: u64,
    ) -> ScriptOutcome {
        let expression = self.build_expression(fragment, env, timeout_ms);
        match page
            .evaluate(target, &expression, timeout_ms + self.grace_ms)
            .await
        {
            Ok(reply) => unpack_reply(reply, env),
            Err(e) => ScriptOutcome::err(e, Vec::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakePage;
    use serde_json::json;

    #[test]
    fn test_classify_script_error() {
        assert!(classify_script_error("TimeoutError: step timed out after 20000ms").is_timeout());
        assert!(classify_script_error("Error: request timed out").is_timeout());
        assert!(!classify_script_error("TypeError: x is null").is_timeout());
    }

    #[test]
    fn test_expression_promotes_and_binds() {
        let runtime = JsScriptRuntime::new();
        let env = json!({"orders": 3});
        let fragment = ScriptFragment::new(2, "const unpaid = orders - 1;\nautowebResult = unpaid;");
        let js = runtime.build_expression(&fragment, env.as_object().unwrap(), 20_000);
        assert!(js.contains("\nunpaid = orders - 1;"));
        assert!(js.contains(r#"let unpaid = __awSeed["unpaid"];"#));
        assert!(js.contains(r#"let orders = __awSeed["orders"];"#));
    }

    #[tokio::test]
    async fn test_run_success_updates_env_and_logs() {
        let page = FakePage::new();
        page.push_evaluate(Ok(json!({
            "env": {"orders": 3, "autowebResult": 7},
            "value": null,
            "logs": ["counted", 7]
        })));
        let mut env = Map::new();
        let outcome = JsScriptRuntime::new()
            .run(&page, &ExecutionTarget::Root, &ScriptFragment::new(1, "x()"), &mut env, 1_000)
            .await;
        assert_eq!(outcome.result.unwrap(), Value::Null);
        assert_eq!(outcome.logs, vec!["counted", "7"]);
        assert_eq!(env["autowebResult"], json!(7));

        let calls = page.evaluations();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].timeout_ms, 1_000 + DEFAULT_GRACE_MS);
    }

    #[tokio::test]
    async fn test_run_failure_keeps_partial_env_and_logs() {
        let page = FakePage::new();
        page.push_evaluate(Ok(json!({
            "error": "TimeoutError: step timed out after 1000ms",
            "env": {"partial": true},
            "logs": ["started"]
        })));
        let mut env = Map::new();
        let outcome = JsScriptRuntime::new()
            .run(&page, &ExecutionTarget::Root, &ScriptFragment::new(1, "x()"), &mut env, 1_000)
            .await;
        assert!(outcome.result.unwrap_err().is_timeout());
        assert_eq!(outcome.logs, vec!["started"]);
        assert_eq!(env["partial"], json!(true));
    }

    #[tokio::test]
    async fn test_run_protocol_error_passes_through() {
        let page = FakePage::new();
        page.push_evaluate(Err(AutomationError::ContextDestroyed("navigated".into())));
        let mut env = Map::new();
        env.insert("keep".into(), json!(1));
        let outcome = JsScriptRuntime::new()
            .run(&page, &ExecutionTarget::Root, &ScriptFragment::new(1, "x()"), &mut env, 1_000)
            .await;
        assert!(matches!(outcome.result, Err(AutomationError::ContextDestroyed(_))));
        assert_eq!(env["keep"], json!(1));
    }
}
