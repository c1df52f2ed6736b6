//! Step execution with timeout escalation.
//!
//! ```text
//! attempt ─► ok ──────────────────────────────► success
//!    │    ─► context destroyed ─► wait for load ─► success
//!    │    ─► timeout, retries left ─► pause, escalate ─┐
//!    │    ─► other error ─────────────────────────────► failure
//!    └────────────────────────────────────────────────┘
//! ```

use std::time::{Duration, Instant};

use autoweb_config::EngineConfig;
use autoweb_protocols::{AutomationError, AutomationPage, ExecutionTarget};
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::error::EngineError;
use crate::frames::{choose_execution_target, TargetHint};
use crate::script::{ScriptFragment, ScriptRuntime};

/// Timeouts and retry limits for one step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionPolicy {
    pub timeout_ms: u64,
    pub escalation_factor: u64,
    pub escalation_floor_ms: u64,
    pub max_timeout_retries: u32,
    pub retry_pause_ms: u64,
    pub page_load_timeout_ms: u64,
    pub frame_wait_ms: u64,
}

impl From<&EngineConfig> for ExecutionPolicy {
    fn from(config: &EngineConfig) -> Self {
        Self {
            timeout_ms: config.script_timeout_ms,
            escalation_factor: config.escalation_factor,
            escalation_floor_ms: config.escalation_floor_ms,
            max_timeout_retries: config.max_timeout_retries,
            retry_pause_ms: config.retry_pause_ms,
            page_load_timeout_ms: config.page_load_timeout_ms,
            frame_wait_ms: config.frame_wait_ms,
        }
    }
}

impl ExecutionPolicy {
    /// `max(timeout × factor, floor)`
    pub fn escalate(&self, timeout_ms: u64) -> u64 {
        timeout_ms
            .saturating_mul(self.escalation_factor)
            .max(self.escalation_floor_ms)
    }
}

/// What happened to one step.
#[derive(Debug)]
pub struct ExecutionReport {
    pub ok: bool,
    pub duration_ms: u64,
    pub value: Value,
    /// Console output of every attempt.
    pub logs: Vec<String>,
    pub error: Option<EngineError>,
    pub attempts: u32,
    /// Target of the last attempt.
    pub target: ExecutionTarget,
}

impl ExecutionReport {
    fn success(start: Instant, value: Value, logs: Vec<String>, attempts: u32, target: ExecutionTarget) -> Self {
        Self {
            ok: true,
            duration_ms: elapsed_ms(start),
            value,
            logs,
            error: None,
            attempts,
            target,
        }
    }

    fn failure(start: Instant, error: EngineError, logs: Vec<String>, attempts: u32, target: ExecutionTarget) -> Self {
        Self {
            ok: false,
            duration_ms: elapsed_ms(start),
            value: Value::Null,
            logs,
            error: Some(error),
            attempts,
            target,
        }
    }

    /// Error text for step results, empty on success.
    pub fn error_text(&self) -> String {
        self.error.as_ref().map(|e| e.to_string()).unwrap_or_default()
    }
}

fn elapsed_ms(start: Instant) -> u64 {
    start.elapsed().as_millis() as u64
}

/// Run one fragment. An empty fragment succeeds without touching the page.
pub async fn execute(
    runtime: &dyn ScriptRuntime,
    page: &dyn AutomationPage,
    fragment: &ScriptFragment,
    hint: &TargetHint,
    env: &mut Map<String, Value>,
    policy: &ExecutionPolicy,
) -> ExecutionReport {
    let start = Instant::now();
    if fragment.is_empty() {
        debug!("Step {} has no code; nothing to run", fragment.step_index);
        return ExecutionReport {
            ok: true,
            duration_ms: 0,
            value: Value::Null,
            logs: Vec::new(),
            error: None,
            attempts: 0,
            target: ExecutionTarget::Root,
        };
    }

    let mut timeout_ms = policy.timeout_ms;
    let mut attempts = 0u32;
    let mut logs = Vec::new();

    loop {
        attempts += 1;
        let target = match choose_execution_target(page, hint, policy.frame_wait_ms).await {
            Ok(target) => target,
            Err(e) => {
                warn!("Frame lookup failed, using the top-level document: {}", e);
                ExecutionTarget::Root
            }
        };
        debug!(
            "Step {} attempt {} on {} (timeout {}ms)",
            fragment.step_index,
            attempts,
            target.label(),
            timeout_ms
        );

        let outcome = runtime.run(page, &target, fragment, env, timeout_ms).await;
        logs.extend(outcome.logs);

        match outcome.result {
            Ok(value) => return ExecutionReport::success(start, value, logs, attempts, target),
            Err(AutomationError::ContextDestroyed(msg)) => {
                info!("Step {} navigated the page ({})", fragment.step_index, msg);
                if let Err(e) = page.wait_for_load(policy.page_load_timeout_ms).await {
                    warn!("Page did not settle after step {}: {}", fragment.step_index, e);
                }
                return ExecutionReport::success(start, Value::Null, logs, attempts, target);
            }
            Err(e) if e.is_timeout() && attempts <= policy.max_timeout_retries => {
                let next = policy.escalate(timeout_ms);
                warn!(
                    "Step {} timed out after {}ms, retrying with {}ms",
                    fragment.step_index, timeout_ms, next
                );
                if policy.retry_pause_ms > 0 {
                    tokio::time::sleep(Duration::from_millis(policy.retry_pause_ms)).await;
                }
                timeout_ms = next;
            }
            Err(e) => {
                let error = EngineError::from_step_failure(e, timeout_ms);
                warn!("Step {} failed: {}", fragment.step_index, error);
                return ExecutionReport::failure(start, error, logs, attempts, target);
            }
        }
    }
}
