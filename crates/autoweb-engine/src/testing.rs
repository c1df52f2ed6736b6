//! In-memory fakes for the page, browser, model and script runtime.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use async_trait::async_trait;
use autoweb_config::EngineConfig;
use autoweb_protocols::{
    AriaNode, AutomationBrowser, AutomationError, AutomationPage, CompletionRequest, CompletionResponse,
    ExecutionTarget, FrameInfo, LLMProvider, ModelDefinition, ProgressError, ProgressEvent, ProgressSink,
    ProviderError,
};
use parking_lot::Mutex;
use serde_json::{Map, Value};

use crate::script::{ScriptFragment, ScriptOutcome, ScriptRuntime};

/// Engine settings with short timeouts and no pauses.
pub fn test_engine_config() -> EngineConfig {
    EngineConfig {
        default_provider: "fake".into(),
        default_model: "m".into(),
        page_load_timeout_ms: 1_000,
        script_timeout_ms: 20_000,
        escalation_factor: 3,
        escalation_floor_ms: 60_000,
        max_timeout_retries: 1,
        retry_pause_ms: 0,
        max_repair_attempts: 1,
        frame_wait_ms: 0,
        capture_budget_chars: 10_000,
        step_capture_budget_chars: 5_000,
        capture_per_step: true,
        log_tail_lines: 20,
        max_tokens: 1_000,
    }
}

#[derive(Debug, Clone)]
pub struct EvalCall {
    pub target: ExecutionTarget,
    pub expression: String,
    pub timeout_ms: u64,
}

#[derive(Default)]
struct PageState {
    url: String,
    title: String,
    html: String,
    html_by_url: HashMap<String, String>,
    aria: Vec<AriaNode>,
    frames: Vec<FrameInfo>,
    evaluate_queue: VecDeque<Result<Value, AutomationError>>,
    evaluations: Vec<EvalCall>,
    navigations: Vec<String>,
    failing_urls: Vec<String>,
    load_waits: usize,
    frame_lookups: usize,
}

/// Scripted page. Evaluations pop a queue (default `null`); captures
/// return the configured HTML/ARIA without evaluating.
#[derive(Default)]
pub struct FakePage {
    state: Mutex<PageState>,
}

impl FakePage {
    pub fn new() -> Self {
        let page = Self::default();
        page.state.lock().html = "<html><body></body></html>".into();
        page
    }

    pub fn set_html(&self, html: &str) {
        self.state.lock().html = html.to_string();
    }

    /// HTML served after navigating to `url`.
    pub fn set_html_for(&self, url: &str, html: &str) {
        self.state.lock().html_by_url.insert(url.to_string(), html.to_string());
    }

    pub fn set_aria(&self, nodes: Vec<AriaNode>) {
        self.state.lock().aria = nodes;
    }

    pub fn set_title(&self, title: &str) {
        self.state.lock().title = title.to_string();
    }

    pub fn set_url(&self, url: &str) {
        self.state.lock().url = url.to_string();
    }

    pub fn set_frames(&self, frames: Vec<FrameInfo>) {
        self.state.lock().frames = frames;
    }

    pub fn fail_navigation_to(&self, url: &str) {
        self.state.lock().failing_urls.push(url.to_string());
    }

    pub fn push_evaluate(&self, result: Result<Value, AutomationError>) {
        self.state.lock().evaluate_queue.push_back(result);
    }

    pub fn evaluations(&self) -> Vec<EvalCall> {
        self.state.lock().evaluations.clone()
    }

    pub fn navigations(&self) -> Vec<String> {
        self.state.lock().navigations.clone()
    }

    pub fn load_waits(&self) -> usize {
        self.state.lock().load_waits
    }

    pub fn frame_lookups(&self) -> usize {
        self.state.lock().frame_lookups
    }
}

#[async_trait]
impl AutomationPage for FakePage {
    async fn navigate(&self, url: &str, _timeout_ms: u64) -> Result<(), AutomationError> {
        let mut state = self.state.lock();
        state.navigations.push(url.to_string());
        if state.failing_urls.iter().any(|u| u == url) {
            return Err(AutomationError::NavigationFailed(format!("net::ERR_NAME_NOT_RESOLVED at {}", url)));
        }
        state.url = url.to_string();
        if let Some(html) = state.html_by_url.get(url).cloned() {
            state.html = html;
        }
        Ok(())
    }

    async fn current_url(&self) -> Result<String, AutomationError> {
        let url = self.state.lock().url.clone();
        Ok(if url.is_empty() { "about:blank".to_string() } else { url })
    }

    async fn title(&self) -> Result<String, AutomationError> {
        Ok(self.state.lock().title.clone())
    }

    async fn wait_for_load(&self, _timeout_ms: u64) -> Result<(), AutomationError> {
        self.state.lock().load_waits += 1;
        Ok(())
    }

    async fn frames(&self) -> Result<Vec<FrameInfo>, AutomationError> {
        let mut state = self.state.lock();
        state.frame_lookups += 1;
        Ok(state.frames.clone())
    }

    async fn evaluate(
        &self,
        target: &ExecutionTarget,
        expression: &str,
        timeout_ms: u64,
    ) -> Result<Value, AutomationError> {
        let mut state = self.state.lock();
        state.evaluations.push(EvalCall {
            target: target.clone(),
            expression: expression.to_string(),
            timeout_ms,
        });
        state.evaluate_queue.pop_front().unwrap_or(Ok(Value::Null))
    }

    async fn capture_aria(&self, _target: &ExecutionTarget) -> Result<Vec<AriaNode>, AutomationError> {
        Ok(self.state.lock().aria.clone())
    }

    async fn screenshot(&self) -> Result<String, AutomationError> {
        Ok(String::new())
    }

    async fn capture_html(&self, _target: &ExecutionTarget) -> Result<String, AutomationError> {
        Ok(self.state.lock().html.clone())
    }
}

/// Browser that hands out one fake page, or fails to connect.
pub struct FakeBrowser {
    page: Option<Arc<FakePage>>,
}

impl FakeBrowser {
    pub fn new(page: Arc<FakePage>) -> Self {
        Self { page: Some(page) }
    }

    pub fn unreachable() -> Self {
        Self { page: None }
    }
}

#[async_trait]
impl AutomationBrowser for FakeBrowser {
    async fn page(&self) -> Result<Arc<dyn AutomationPage>, AutomationError> {
        match &self.page {
            Some(page) => Ok(page.clone()),
            None => Err(AutomationError::ConnectionFailed("connection refused on port 9222".into())),
        }
    }

    fn is_connected(&self) -> bool {
        self.page.is_some()
    }

    async fn shutdown(&self) -> Result<(), AutomationError> {
        Ok(())
    }
}

/// Provider that answers from a reply queue and records prompts.
pub struct FakeProvider {
    id: String,
    models: Vec<ModelDefinition>,
    replies: Mutex<VecDeque<String>>,
    prompts: Mutex<Vec<String>>,
}

impl FakeProvider {
    pub fn new(replies: Vec<&str>) -> Self {
        Self {
            id: "fake".to_string(),
            models: vec![ModelDefinition::new("m", "Fake model")],
            replies: Mutex::new(replies.into_iter().map(str::to_string).collect()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn with_id(id: &str) -> Self {
        let mut provider = Self::new(Vec::new());
        provider.id = id.to_string();
        provider
    }

    pub fn push_reply(&self, reply: &str) {
        self.replies.lock().push_back(reply.to_string());
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().clone()
    }
}

#[async_trait]
impl LLMProvider for FakeProvider {
    fn id(&self) -> &str {
        &self.id
    }

    fn models(&self) -> &[ModelDefinition] {
        &self.models
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, ProviderError> {
        let prompt = request
            .messages
            .last()
            .map(|m| m.content.clone())
            .unwrap_or_default();
        self.prompts.lock().push(prompt);
        match self.replies.lock().pop_front() {
            Some(reply) => Ok(CompletionResponse::text(request.model, reply)),
            None => Err(ProviderError::Network("no scripted reply left".into())),
        }
    }
}

/// Scripted behaviour for one run of a fragment.
#[derive(Debug, Clone)]
pub enum FakeRun {
    /// Succeed after writing these env entries.
    Set(Vec<(&'static str, Value)>),
    Timeout,
    Throw(&'static str),
    /// The step navigated the page away.
    Navigate,
}

#[derive(Debug, Clone)]
pub struct RuntimeCall {
    pub step_index: usize,
    pub code: String,
    pub timeout_ms: u64,
    pub env_keys: Vec<String>,
}

/// Runtime keyed by fragment code. Unscripted code succeeds with no effect.
#[derive(Default)]
pub struct FakeRuntime {
    scripts: Mutex<HashMap<String, VecDeque<FakeRun>>>,
    calls: Mutex<Vec<RuntimeCall>>,
}

impl FakeRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a behaviour for fragments whose trimmed code equals `code`.
    pub fn on(&self, code: &str, run: FakeRun) {
        self.scripts
            .lock()
            .entry(code.trim().to_string())
            .or_default()
            .push_back(run);
    }

    pub fn calls(&self) -> Vec<RuntimeCall> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl ScriptRuntime for FakeRuntime {
    async fn run(
        &self,
        _page: &dyn AutomationPage,
        _target: &ExecutionTarget,
        fragment: &ScriptFragment,
        env: &mut Map<String, Value>,
        timeout_ms: u64,
    ) -> ScriptOutcome {
        let code = fragment.code.trim().to_string();
        self.calls.lock().push(RuntimeCall {
            step_index: fragment.step_index,
            code: code.clone(),
            timeout_ms,
            env_keys: env.keys().cloned().collect(),
        });
        let logs = vec![format!("ran step {}", fragment.step_index)];
        let run = self
            .scripts
            .lock()
            .get_mut(&code)
            .and_then(VecDeque::pop_front)
            .unwrap_or(FakeRun::Set(Vec::new()));

        match run {
            FakeRun::Set(entries) => {
                for (key, value) in entries {
                    env.insert(key.to_string(), value);
                }
                ScriptOutcome::ok(Value::Null, logs)
            }
            FakeRun::Timeout => ScriptOutcome::err(
                AutomationError::Script(format!("TimeoutError: step timed out after {}ms", timeout_ms)),
                logs,
            ),
            FakeRun::Throw(message) => ScriptOutcome::err(AutomationError::Script(message.to_string()), logs),
            FakeRun::Navigate => ScriptOutcome::err(
                AutomationError::ContextDestroyed("Execution context was destroyed".into()),
                logs,
            ),
        }
    }
}

/// Sink that keeps every event, or refuses them all.
#[derive(Default)]
pub struct RecordingSink {
    events: Mutex<Vec<ProgressEvent>>,
    failing: bool,
}

impl RecordingSink {
    pub fn failing() -> Self {
        Self {
            events: Mutex::new(Vec::new()),
            failing: true,
        }
    }

    pub fn events(&self) -> Vec<ProgressEvent> {
        self.events.lock().clone()
    }
}

#[async_trait]
impl ProgressSink for RecordingSink {
    fn id(&self) -> &str {
        "recording"
    }

    async fn send(&self, event: ProgressEvent) -> Result<(), ProgressError> {
        if self.failing {
            return Err(ProgressError::SendFailed("sink offline".into()));
        }
        self.events.lock().push(event);
        Ok(())
    }
}
