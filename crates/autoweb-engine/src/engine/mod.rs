//! Action dispatch.
//!
//! [`AutomationEngine::handle`] is the single entry point. Every error is
//! caught here and turned into an `ok:false` response that still carries
//! whatever progress was made.

mod prepare;
mod run;

use std::sync::Arc;
use std::time::Duration;

use autoweb_config::{EngineConfig, RegistryConfig};
use autoweb_protocols::{AutomationBrowser, AutomationPage, LogSink};
use parking_lot::RwLock;
use tokio::sync::Mutex;
use tracing::{info, warn};
use url::Url;

use crate::error::EngineError;
use crate::models::ModelRouter;
use crate::narrator::Narrator;
use crate::registry::SessionRegistry;
use crate::repair::step_code;
use crate::script::{JsScriptRuntime, ScriptRuntime};
use crate::session::RunSession;
use crate::types::{Action, AutomationRequest, AutomationResponse, ExecutionStep};

const DEFAULT_CHUNK_CHARS: usize = 3_500;
const DEFAULT_PREVIEW_CHARS: usize = 1_500;

/// The automation engine: browser, models, sessions and narration.
pub struct AutomationEngine {
    config: EngineConfig,
    browser: Arc<dyn AutomationBrowser>,
    models: ModelRouter,
    registry: Arc<SessionRegistry>,
    runtime: Arc<dyn ScriptRuntime>,
    narrator: Narrator,
    /// Most recently opened entry URL.
    last_url: RwLock<Option<String>>,
    /// Held across multi-call navigate + capture sequences.
    doc_lock: Mutex<()>,
}

impl AutomationEngine {
    pub fn new(
        config: EngineConfig,
        registry: &RegistryConfig,
        browser: Arc<dyn AutomationBrowser>,
        models: ModelRouter,
    ) -> Self {
        Self {
            config,
            browser,
            models,
            registry: Arc::new(SessionRegistry::new(
                registry.max_sessions,
                Duration::from_secs(registry.ttl_seconds),
            )),
            runtime: Arc::new(JsScriptRuntime::new()),
            narrator: Narrator::new(Arc::new(LogSink), DEFAULT_CHUNK_CHARS, DEFAULT_PREVIEW_CHARS),
            last_url: RwLock::new(None),
            doc_lock: Mutex::new(()),
        }
    }

    pub fn with_runtime(mut self, runtime: Arc<dyn ScriptRuntime>) -> Self {
        self.runtime = runtime;
        self
    }

    pub fn with_narrator(mut self, narrator: Narrator) -> Self {
        self.narrator = narrator;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn registry(&self) -> &Arc<SessionRegistry> {
        &self.registry
    }

    pub fn browser(&self) -> &Arc<dyn AutomationBrowser> {
        &self.browser
    }

    /// Dispatch one request. Never fails; errors become `ok:false`.
    pub async fn handle(&self, request: AutomationRequest) -> AutomationResponse {
        let mut response = AutomationResponse::new(request.action);
        info!("Handling action '{}'", request.action.as_str());

        let result = match request.action {
            Action::Open => self.open(&request, &mut response).await,
            Action::Prepare => self.prepare(&request, &mut response).await.map(|_| ()),
            Action::Run | Action::Resume => self.run(&request, &mut response).await,
            Action::PrepareAndRun => self.prepare_and_run(&request, &mut response).await,
            Action::Drop => self.drop_run(&request, &mut response),
        };

        match result {
            Ok(()) => response.ok = true,
            Err(e) => {
                warn!("Action '{}' failed: {}", request.action.as_str(), e);
                response.fail(&e);
            }
        }
        response
    }

    async fn prepare_and_run(
        &self,
        request: &AutomationRequest,
        response: &mut AutomationResponse,
    ) -> Result<(), EngineError> {
        let run_id = self.prepare(request, response).await?;
        let mut run_request = request.clone();
        run_request.action = Action::Run;
        run_request.run_id = Some(run_id);
        run_request.from_step = Some(1);
        self.run(&run_request, response).await
    }

    fn drop_run(&self, request: &AutomationRequest, response: &mut AutomationResponse) -> Result<(), EngineError> {
        let run_id = required(request.run_id.as_deref(), "runId")?;
        if !self.registry.remove(run_id) {
            info!("Drop of unknown run {} ignored", run_id);
        }
        response.run_id = Some(run_id.to_string());
        Ok(())
    }

    async fn page(&self) -> Result<Arc<dyn AutomationPage>, EngineError> {
        self.browser
            .page()
            .await
            .map_err(|e| EngineError::ConnectionFailure(e.to_string()))
    }

    fn remember_url(&self, url: &str) {
        *self.last_url.write() = Some(url.to_string());
    }

    fn last_url(&self) -> Option<String> {
        self.last_url.read().clone()
    }
}

/// A required, non-blank request field.
fn required<'a>(value: Option<&'a str>, field: &str) -> Result<&'a str, EngineError> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| EngineError::InvalidRequest(format!("{} is required", field)))
}

/// Absolute http(s) URL for a step's target, relative URLs resolved
/// against `base`.
pub(crate) fn resolve_step_url(base: &str, target: &str) -> Option<String> {
    let url = match Url::parse(target) {
        Ok(url) => url,
        Err(_) => Url::parse(base).ok()?.join(target).ok()?,
    };
    matches!(url.scheme(), "http" | "https").then(|| url.to_string())
}

/// Copy the session's plan and code into the response.
fn fill_from_session(response: &mut AutomationResponse, session: &RunSession) {
    response.run_id = Some(session.run_id.clone());
    response.entry_url = Some(session.entry_url.clone());
    response.model = Some(session.model.clone());
    response.plan_text = Some(session.plan_text.clone());
    response.plan_confirmed = session.plan_confirmed;
    refresh_code(response, session);
}

/// Copy the session's current code into the response.
fn refresh_code(response: &mut AutomationResponse, session: &RunSession) {
    response.code = Some(session.code.clone());
    response.execution_steps = session
        .steps
        .iter()
        .map(|step| ExecutionStep {
            index: step.index,
            description: step.description.clone(),
            code: step_code(&session.code, step.index),
        })
        .collect();
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
