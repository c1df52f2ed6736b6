//! Engine error taxonomy.

use autoweb_protocols::{AutomationError, ProviderError};
use thiserror::Error;

/// Everything that can stop an action.
///
/// All of these are caught at the dispatch boundary and turned into an
/// `ok:false` response.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The model reply had no parsable step block.
    #[error("Plan parse failure: {0}")]
    PlanParseFailure(String),

    /// A step exceeded its execution timeout, escalation included.
    #[error("Step timed out after {timeout_ms}ms: {message}")]
    ScriptTimeout { timeout_ms: u64, message: String },

    #[error("Step execution failed: {0}")]
    ScriptExecutionFailure(String),

    #[error("Repair exhausted for step {step} after {attempts} attempt(s): {reason}")]
    RepairExhausted {
        step: usize,
        attempts: u32,
        reason: String,
    },

    /// The shared browser could not be reached.
    #[error("Browser connection failed: {0}")]
    ConnectionFailure(String),

    #[error("Unknown runId: {0}")]
    UnknownRunId(String),

    /// Another run/resume already holds this session.
    #[error("Session {0} is busy with another run")]
    SessionBusy(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Model error: {0}")]
    Provider(#[from] ProviderError),

    #[error("Browser error: {0}")]
    Automation(AutomationError),
}

impl From<AutomationError> for EngineError {
    fn from(e: AutomationError) -> Self {
        match e {
            AutomationError::ConnectionFailed(msg) => EngineError::ConnectionFailure(msg),
            other => EngineError::Automation(other),
        }
    }
}

impl EngineError {
    /// Stable machine-readable kind, reported as `errorKind`.
    pub fn kind(&self) -> &'static str {
        match self {
            EngineError::PlanParseFailure(_) => "PLAN_PARSE_FAILURE",
            EngineError::ScriptTimeout { .. } => "SCRIPT_TIMEOUT",
            EngineError::ScriptExecutionFailure(_) => "SCRIPT_EXECUTION_FAILURE",
            EngineError::RepairExhausted { .. } => "REPAIR_EXHAUSTED",
            EngineError::ConnectionFailure(_) => "CONNECTION_FAILURE",
            EngineError::UnknownRunId(_) => "UNKNOWN_RUN_ID",
            EngineError::SessionBusy(_) => "SESSION_BUSY",
            EngineError::InvalidRequest(_) => "INVALID_REQUEST",
            EngineError::Provider(_) => "PROVIDER_ERROR",
            EngineError::Automation(_) => "AUTOMATION_ERROR",
        }
    }

    /// Classify a failed step execution.
    pub fn from_step_failure(error: AutomationError, timeout_ms: u64) -> Self {
        if error.is_timeout() {
            EngineError::ScriptTimeout {
                timeout_ms,
                message: error.to_string(),
            }
        } else {
            EngineError::ScriptExecutionFailure(error.to_string())
        }
    }
}
