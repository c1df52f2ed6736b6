//! Model-driven repair of a failing step.

use autoweb_protocols::{AutomationPage, CaptureMode};
use serde_json::{Map, Value};
use tracing::{info, warn};

use crate::capture::capture;
use crate::codegen::{generate_code, repair_fragment, replace_step_block, split_step_blocks, CodePayload};
use crate::error::EngineError;
use crate::executor::{execute, ExecutionPolicy};
use crate::frames::{choose_execution_target, TargetHint};
use crate::models::ModelHandle;
use crate::script::{ScriptFragment, ScriptRuntime};
use crate::session::{PlanStep, RunSession};

/// Everything a repair attempt needs besides the session.
pub struct RepairContext<'a> {
    pub model: &'a ModelHandle,
    pub runtime: &'a dyn ScriptRuntime,
    pub page: &'a dyn AutomationPage,
    pub policy: &'a ExecutionPolicy,
    pub capture_mode: CaptureMode,
    pub capture_budget: usize,
    pub log_tail_lines: usize,
    pub max_attempts: u32,
}

/// How the repair loop ended.
#[derive(Debug)]
pub enum RepairOutcome {
    Repaired {
        attempts: u32,
        duration_ms: u64,
        logs: Vec<String>,
    },
    Exhausted {
        attempts: u32,
        duration_ms: u64,
        error: EngineError,
    },
}

/// Ask the model for a revised block and re-run it, up to `max_attempts`
/// times. Every non-empty revision replaces the stored block, whether or
/// not it then succeeds.
pub async fn repair_step(
    ctx: &RepairContext<'_>,
    session: &mut RunSession,
    step: &PlanStep,
    env: &mut Map<String, Value>,
    first_error: String,
) -> RepairOutcome {
    let mut last_error = first_error;
    let mut duration_ms = 0u64;
    let hint = TargetHint::new(step.target_url(), step.description.clone());

    for attempt in 1..=ctx.max_attempts {
        info!("Repairing step {} (attempt {}/{})", step.index, attempt, ctx.max_attempts);

        let capture_text = match recapture(ctx, &hint).await {
            Ok(text) => text,
            Err(e) => {
                warn!("Re-capture for repair failed: {}", e);
                String::new()
            }
        };

        let current_code = session.code.clone();
        let log_tail = session.logs.tail(ctx.log_tail_lines);
        let payload = CodePayload::Repair {
            current_code: &current_code,
            step,
            error: &last_error,
            log_tail: &log_tail,
            capture: &capture_text,
        };

        let revision = match generate_code(ctx.model, &session.task, &payload).await {
            Ok(reply) => repair_fragment(&reply, step.index),
            Err(e) => {
                warn!("Repair model call failed: {}", e);
                last_error = e.to_string();
                continue;
            }
        };
        let Some(block) = revision else {
            warn!("Repair for step {} returned no usable code", step.index);
            last_error = format!("model returned no code for step {}", step.index);
            continue;
        };

        session.code = replace_step_block(&session.code, step.index, &block);
        let fragment = ScriptFragment::new(step.index, block);
        let report = execute(ctx.runtime, ctx.page, &fragment, &hint, env, ctx.policy).await;
        duration_ms += report.duration_ms;
        session.logs.extend(report.logs.iter().cloned());

        if report.ok {
            info!("Step {} repaired on attempt {}", step.index, attempt);
            return RepairOutcome::Repaired {
                attempts: attempt,
                duration_ms,
                logs: report.logs,
            };
        }
        last_error = report.error_text();
    }

    RepairOutcome::Exhausted {
        attempts: ctx.max_attempts,
        duration_ms,
        error: EngineError::RepairExhausted {
            step: step.index,
            attempts: ctx.max_attempts,
            reason: last_error,
        },
    }
}

async fn recapture(ctx: &RepairContext<'_>, hint: &TargetHint) -> Result<String, EngineError> {
    let target = choose_execution_target(ctx.page, hint, ctx.policy.frame_wait_ms).await?;
    Ok(capture(ctx.page, &target, ctx.capture_mode, ctx.capture_budget).await?)
}

/// Code of one step block, empty when the block is missing.
pub fn step_code(code: &str, index: usize) -> String {
    split_step_blocks(code)
        .body(index)
        .map(str::to_string)
        .unwrap_or_default()
}
