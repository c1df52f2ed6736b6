//! `open` and `prepare`.

use autoweb_protocols::{AutomationPage, CaptureMode};
use tracing::{info, warn};

use super::{fill_from_session, required, resolve_step_url, AutomationEngine};
use crate::capture::capture;
use crate::codegen::{generate_code, split_step_blocks, CodePayload};
use crate::error::EngineError;
use crate::frames::{choose_execution_target, TargetHint};
use crate::plan::generate_plan;
use crate::session::{PlanStep, RunSession};
use crate::types::{AutomationRequest, AutomationResponse};

impl AutomationEngine {
    pub(super) async fn open(
        &self,
        request: &AutomationRequest,
        response: &mut AutomationResponse,
    ) -> Result<(), EngineError> {
        let url = required(request.entry_url.as_deref(), "entryUrl")?;
        let page = self.page().await?;
        {
            let _doc = self.doc_lock.lock().await;
            page.navigate(url, self.config.page_load_timeout_ms).await?;
        }
        self.remember_url(url);
        response.entry_url = Some(url.to_string());

        let title = page.title().await.unwrap_or_default();
        info!("Opened {} ({})", url, title);
        self.narrator.page_opened(url, &title).await;
        Ok(())
    }

    /// Plan and generate code for a task; stores the session and returns
    /// its run id.
    pub(super) async fn prepare(
        &self,
        request: &AutomationRequest,
        response: &mut AutomationResponse,
    ) -> Result<String, EngineError> {
        let task = required(request.user_task.as_deref(), "userTask")?;
        let model = self.models.resolve(request.model.as_deref())?;
        response.model = Some(model.label());

        let page = self.page().await?;
        let entry_url = self.resolve_entry_url(request, page.as_ref()).await?;
        response.entry_url = Some(entry_url.clone());
        let mode = request.capture_mode;

        let captured = {
            let _doc = self.doc_lock.lock().await;
            page.navigate(&entry_url, self.config.page_load_timeout_ms).await?;
            self.remember_url(&entry_url);
            let hint = TargetHint::new(Some(entry_url.as_str()), task);
            let target = choose_execution_target(page.as_ref(), &hint, self.config.frame_wait_ms).await?;
            capture(page.as_ref(), &target, mode, self.config.capture_budget_chars).await?
        };

        let (prompt, plan) = generate_plan(&model, task, &entry_url, mode, &captured).await?;
        response.plan_text = Some(plan.plan_text.clone());
        response.plan_confirmed = plan.confirmed;

        let captures = self
            .capture_steps(page.as_ref(), &plan.steps, &entry_url, &captured, mode)
            .await;
        let payload = CodePayload::Full {
            plan_text: &plan.plan_text,
            steps: &plan.steps,
            captures: &captures,
        };
        let code = generate_code(&model, task, &payload).await?;
        if split_step_blocks(&code).blocks.is_empty() {
            warn!("Generated code has no step labels; every step will be a no-op");
        }

        let mut session = RunSession::new(entry_url, task, model.label());
        session.prompt = prompt;
        session.capture_mode = mode;
        session.plan_text = plan.plan_text;
        session.plan_confirmed = plan.confirmed;
        session.steps = plan.steps;
        session.code = code;

        self.narrator
            .plan_generated(&session.run_id, &session.steps, session.plan_confirmed)
            .await;
        session.plan_surfaced = true;

        fill_from_session(response, &session);
        let run_id = session.run_id.clone();
        info!("Prepared run {} with {} step(s)", run_id, session.steps.len());
        self.registry.put(session);
        Ok(run_id)
    }

    /// Request URL, else the last opened URL, else whatever the page shows.
    async fn resolve_entry_url(
        &self,
        request: &AutomationRequest,
        page: &dyn AutomationPage,
    ) -> Result<String, EngineError> {
        if let Some(url) = request.entry_url.as_deref().map(str::trim).filter(|u| !u.is_empty()) {
            return Ok(url.to_string());
        }
        if let Some(url) = self.last_url() {
            return Ok(url);
        }
        match page.current_url().await {
            Ok(url) if !url.is_empty() && url != "about:blank" => Ok(url),
            _ => Err(EngineError::InvalidRequest(
                "entryUrl is required when no page has been opened".to_string(),
            )),
        }
    }

    /// One capture per step. Steps naming a new URL are captured there;
    /// the rest reuse the previous capture.
    async fn capture_steps(
        &self,
        page: &dyn AutomationPage,
        steps: &[PlanStep],
        entry_url: &str,
        entry_capture: &str,
        mode: CaptureMode,
    ) -> Vec<String> {
        if !self.config.capture_per_step {
            return vec![entry_capture.to_string(); steps.len()];
        }

        let mut captures = Vec::with_capacity(steps.len());
        let mut current_url = resolve_step_url(entry_url, entry_url).unwrap_or_else(|| entry_url.to_string());
        let mut current = entry_capture.to_string();

        let _doc = self.doc_lock.lock().await;
        for step in steps {
            let url = step.target_url().and_then(|u| resolve_step_url(entry_url, u));
            if let Some(url) = url.filter(|u| *u != current_url) {
                match self.capture_at(page, step, &url, mode).await {
                    Ok(text) => current = text,
                    Err(e) => warn!("Capture for step {} at {} failed: {}", step.index, url, e),
                }
                current_url = url;
            }
            captures.push(current.clone());
        }
        captures
    }

    async fn capture_at(
        &self,
        page: &dyn AutomationPage,
        step: &PlanStep,
        url: &str,
        mode: CaptureMode,
    ) -> Result<String, EngineError> {
        page.navigate(url, self.config.page_load_timeout_ms).await?;
        let hint = TargetHint::new(Some(url), step.description.clone());
        let target = choose_execution_target(page, &hint, self.config.frame_wait_ms).await?;
        Ok(capture(page, &target, mode, self.config.step_capture_budget_chars).await?)
    }
}
