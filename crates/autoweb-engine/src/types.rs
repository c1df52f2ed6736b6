//! Request and response shapes of the single action-dispatched entry point.

use autoweb_protocols::CaptureMode;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::EngineError;

/// What a request asks the engine to do.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// Navigate the shared page.
    Open,
    /// Plan and generate code; returns a run id.
    Prepare,
    /// Execute steps of an existing run.
    Run,
    /// Like `run`, but defaults `fromStep` to the run's cursor.
    Resume,
    #[default]
    PrepareAndRun,
    /// Discard a run. Idempotent.
    Drop,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Open => "open",
            Action::Prepare => "prepare",
            Action::Run => "run",
            Action::Resume => "resume",
            Action::PrepareAndRun => "prepare_and_run",
            Action::Drop => "drop",
        }
    }
}

/// Incoming request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AutomationRequest {
    pub action: Action,
    pub run_id: Option<String>,
    pub entry_url: Option<String>,
    pub user_task: Option<String>,
    /// `provider:model` or a bare model of the default provider.
    pub model: Option<String>,
    pub capture_mode: CaptureMode,
    /// 1-based; `resume` defaults to the run's cursor.
    pub from_step: Option<usize>,
    /// 0 = unbounded.
    pub max_steps: usize,
    pub auto_repair: bool,
    pub max_repair_attempts: Option<u32>,
}

impl Default for AutomationRequest {
    fn default() -> Self {
        Self {
            action: Action::default(),
            run_id: None,
            entry_url: None,
            user_task: None,
            model: None,
            capture_mode: CaptureMode::default(),
            from_step: None,
            max_steps: 0,
            auto_repair: true,
            max_repair_attempts: None,
        }
    }
}

impl AutomationRequest {
    pub fn new(action: Action) -> Self {
        Self {
            action,
            ..Default::default()
        }
    }

    pub fn with_run_id(mut self, run_id: impl Into<String>) -> Self {
        self.run_id = Some(run_id.into());
        self
    }

    pub fn with_entry_url(mut self, url: impl Into<String>) -> Self {
        self.entry_url = Some(url.into());
        self
    }

    pub fn with_task(mut self, task: impl Into<String>) -> Self {
        self.user_task = Some(task.into());
        self
    }
}

/// One plan step as shown to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionStep {
    pub index: usize,
    pub description: String,
    pub code: String,
}

/// Outcome of one attempted step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepResult {
    pub index: usize,
    pub ok: bool,
    pub duration_ms: u64,
    /// Empty on success.
    pub error: String,
    pub log_tail: String,
    pub repaired: bool,
}

impl StepResult {
    pub fn success(index: usize, duration_ms: u64, log_tail: String, repaired: bool) -> Self {
        Self {
            index,
            ok: true,
            duration_ms,
            error: String::new(),
            log_tail,
            repaired,
        }
    }

    pub fn failure(index: usize, duration_ms: u64, error: String, log_tail: String) -> Self {
        Self {
            index,
            ok: false,
            duration_ms,
            error,
            log_tail,
            repaired: false,
        }
    }
}

/// Response body. Partial progress is filled in as the action proceeds, so
/// a failed response still shows the plan, code and attempted steps.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutomationResponse {
    pub ok: bool,
    pub action: Action,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub run_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan_text: Option<String>,
    pub plan_confirmed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    pub execution_steps: Vec<ExecutionStep>,
    pub step_results: Vec<StepResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result_preview: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failed_step: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failed_reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<String>,
}

impl AutomationResponse {
    pub fn new(action: Action) -> Self {
        Self {
            action,
            ..Default::default()
        }
    }

    /// Mark the response failed, keeping whatever progress is already there.
    pub fn fail(&mut self, error: &EngineError) {
        self.ok = false;
        self.error = Some(error.to_string());
        self.error_kind = Some(error.kind().to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_defaults() {
        let req: AutomationRequest = serde_json::from_value(json!({})).unwrap();
        assert_eq!(req.action, Action::PrepareAndRun);
        assert_eq!(req.capture_mode, CaptureMode::RawHtml);
        assert!(req.auto_repair);
        assert_eq!(req.max_steps, 0);
        assert!(req.from_step.is_none());
    }

    #[test]
    fn test_request_camel_case() {
        let req: AutomationRequest = serde_json::from_value(json!({
            "action": "resume",
            "runId": "r-1",
            "captureMode": "ARIA_SNAPSHOT",
            "fromStep": 3,
            "maxSteps": 2,
            "autoRepair": false,
            "maxRepairAttempts": 2
        }))
        .unwrap();
        assert_eq!(req.action, Action::Resume);
        assert_eq!(req.run_id.as_deref(), Some("r-1"));
        assert_eq!(req.capture_mode, CaptureMode::AriaSnapshot);
        assert_eq!(req.from_step, Some(3));
        assert_eq!(req.max_steps, 2);
        assert!(!req.auto_repair);
        assert_eq!(req.max_repair_attempts, Some(2));
    }

    #[test]
    fn test_unknown_action_rejected() {
        let result: Result<AutomationRequest, _> =
            serde_json::from_value(json!({"action": "explode"}));
        assert!(result.is_err());
    }

    #[test]
    fn test_response_serializes_camel_case() {
        let mut resp = AutomationResponse::new(Action::Run);
        resp.failed_step = Some(2);
        resp.fail(&EngineError::UnknownRunId("r-9".into()));
        let value = serde_json::to_value(&resp).unwrap();
        assert_eq!(value["ok"], json!(false));
        assert_eq!(value["action"], json!("run"));
        assert_eq!(value["failedStep"], json!(2));
        assert_eq!(value["errorKind"], json!("UNKNOWN_RUN_ID"));
        assert!(value.get("result").is_none());
    }
}
