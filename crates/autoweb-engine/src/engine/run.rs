//! `run` and `resume`.

use autoweb_protocols::AutomationPage;
use serde_json::{Map, Value};
use tracing::{error, info, warn};

use super::{fill_from_session, refresh_code, required, resolve_step_url, AutomationEngine};
use crate::error::EngineError;
use crate::executor::{execute, ExecutionPolicy};
use crate::frames::TargetHint;
use crate::narrator::clip_chars;
use crate::normalize::normalize_result;
use crate::repair::{repair_step, step_code, RepairContext, RepairOutcome};
use crate::script::ScriptFragment;
use crate::session::{PlanStep, RunSession};
use crate::types::{Action, AutomationRequest, AutomationResponse, StepResult};

/// Last `n` lines of `logs`.
fn tail(logs: &[String], n: usize) -> String {
    logs[logs.len().saturating_sub(n)..].join("\n")
}

impl AutomationEngine {
    pub(super) async fn run(
        &self,
        request: &AutomationRequest,
        response: &mut AutomationResponse,
    ) -> Result<(), EngineError> {
        let run_id = required(request.run_id.as_deref(), "runId")?;
        let slot = self
            .registry
            .get(run_id)
            .ok_or_else(|| EngineError::UnknownRunId(run_id.to_string()))?;
        let mut session = slot.try_lock()?;
        fill_from_session(response, &session);

        let result = self.run_session(&mut session, request, response).await;
        slot.touch();
        result
    }

    async fn run_session(
        &self,
        session: &mut RunSession,
        request: &AutomationRequest,
        response: &mut AutomationResponse,
    ) -> Result<(), EngineError> {
        let from = match request.from_step.filter(|n| *n > 0) {
            Some(n) => n,
            None if request.action == Action::Resume => session.cursor,
            None => 1,
        };
        let window = session.window(from, request.max_steps);
        info!(
            "Running {} step(s) of {} from step {}",
            window.len(),
            session.run_id,
            from
        );

        let page = self.page().await?;
        let mut env: Map<String, Value> = Map::new();

        let starts_at_beginning = match (window.first(), session.steps.first()) {
            (Some(first), Some(plan_first)) => first.index == plan_first.index,
            _ => false,
        };
        if starts_at_beginning {
            let _doc = self.doc_lock.lock().await;
            page.navigate(&session.entry_url, self.config.page_load_timeout_ms).await?;
            self.remember_url(&session.entry_url);
        }

        for step in &window {
            self.run_step(page.as_ref(), session, step, &mut env, request, response)
                .await?;
        }

        let preview = match normalize_result(&env) {
            Some(result) => {
                let preview = clip_chars(&result.preview, self.narrator.preview_chars());
                response.result = Some(result.value);
                response.result_preview = Some(preview.clone());
                Some(preview)
            }
            None => None,
        };
        self.narrator
            .run_finished(&session.run_id, preview.as_deref())
            .await;
        Ok(())
    }

    /// Execute one step, repairing it when allowed. An error halts the run.
    async fn run_step(
        &self,
        page: &dyn AutomationPage,
        session: &mut RunSession,
        step: &PlanStep,
        env: &mut Map<String, Value>,
        request: &AutomationRequest,
        response: &mut AutomationResponse,
    ) -> Result<(), EngineError> {
        self.narrator.step_started(&session.run_id, step).await;
        let tail_lines = self.config.log_tail_lines;

        if step.navigates_first() {
            if let Some(url) = step.target_url().and_then(|u| resolve_step_url(&session.entry_url, u)) {
                let navigated = {
                    let _doc = self.doc_lock.lock().await;
                    page.navigate(&url, self.config.page_load_timeout_ms).await
                };
                if let Err(e) = navigated {
                    let error = EngineError::from(e);
                    let reason = format!("navigation to {} failed: {}", url, error);
                    response
                        .step_results
                        .push(StepResult::failure(step.index, 0, reason.clone(), String::new()));
                    return Err(self.halt(session, step.index, reason, response, error).await);
                }
            }
        }

        let policy = ExecutionPolicy::from(&self.config);
        let fragment = ScriptFragment::new(step.index, step_code(&session.code, step.index));
        let hint = TargetHint::new(step.target_url(), step.description.clone());
        let report = execute(self.runtime.as_ref(), page, &fragment, &hint, env, &policy).await;
        session.logs.extend(report.logs.iter().cloned());

        if report.ok {
            response.step_results.push(StepResult::success(
                step.index,
                report.duration_ms,
                tail(&report.logs, tail_lines),
                false,
            ));
            session.cursor = step.index + 1;
            self.narrator
                .step_succeeded(&session.run_id, step.index, report.duration_ms)
                .await;
            return Ok(());
        }

        let error_text = report.error_text();
        let error = report
            .error
            .unwrap_or_else(|| EngineError::ScriptExecutionFailure(error_text.clone()));
        let max_attempts = request
            .max_repair_attempts
            .unwrap_or(self.config.max_repair_attempts);

        if !request.auto_repair || max_attempts == 0 {
            response.step_results.push(StepResult::failure(
                step.index,
                report.duration_ms,
                error_text.clone(),
                tail(&report.logs, tail_lines),
            ));
            return Err(self.halt(session, step.index, error_text, response, error).await);
        }

        let model = match self.models.resolve(Some(session.model.as_str())) {
            Ok(model) => model,
            Err(e) => {
                warn!("No model for repair of run {}: {}", session.run_id, e);
                response.step_results.push(StepResult::failure(
                    step.index,
                    report.duration_ms,
                    error_text.clone(),
                    tail(&report.logs, tail_lines),
                ));
                return Err(self.halt(session, step.index, error_text, response, error).await);
            }
        };

        let ctx = RepairContext {
            model: &model,
            runtime: self.runtime.as_ref(),
            page,
            policy: &policy,
            capture_mode: session.capture_mode,
            capture_budget: self.config.step_capture_budget_chars,
            log_tail_lines: tail_lines,
            max_attempts,
        };
        let outcome = repair_step(&ctx, session, step, env, error_text).await;
        refresh_code(response, session);

        match outcome {
            RepairOutcome::Repaired {
                attempts,
                duration_ms,
                logs,
            } => {
                let total_ms = report.duration_ms + duration_ms;
                response.step_results.push(StepResult::success(
                    step.index,
                    total_ms,
                    tail(&logs, tail_lines),
                    true,
                ));
                session.cursor = step.index + 1;
                self.narrator
                    .step_repaired(&session.run_id, step.index, attempts)
                    .await;
                Ok(())
            }
            RepairOutcome::Exhausted {
                duration_ms, error, ..
            } => {
                let reason = error.to_string();
                response.step_results.push(StepResult::failure(
                    step.index,
                    report.duration_ms + duration_ms,
                    reason.clone(),
                    session.logs.tail(tail_lines),
                ));
                Err(self.halt(session, step.index, reason, response, error).await)
            }
        }
    }

    /// Record the failed step on the response and narrate it.
    async fn halt(
        &self,
        session: &RunSession,
        index: usize,
        reason: String,
        response: &mut AutomationResponse,
        error: EngineError,
    ) -> EngineError {
        error!("Run {} halted at step {}: {}", session.run_id, index, reason);
        self.narrator.step_failed(&session.run_id, index, &reason).await;
        response.failed_step = Some(index);
        response.failed_reason = Some(reason);
        error
    }
}
