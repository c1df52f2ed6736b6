//! Engine and session registry configuration.

use serde::{Deserialize, Serialize};

use super::default_true;

/// Execution engine tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Provider used when a request's model selector names none.
    #[serde(default = "default_provider")]
    pub default_provider: String,

    #[serde(default = "default_model")]
    pub default_model: String,

    #[serde(default = "default_page_load_timeout_ms")]
    pub page_load_timeout_ms: u64,

    /// Base per-attempt script timeout.
    #[serde(default = "default_script_timeout_ms")]
    pub script_timeout_ms: u64,

    /// Escalated timeout = max(base * factor, floor).
    #[serde(default = "default_escalation_factor")]
    pub escalation_factor: u64,

    #[serde(default = "default_escalation_floor_ms")]
    pub escalation_floor_ms: u64,

    #[serde(default = "default_max_timeout_retries")]
    pub max_timeout_retries: u32,

    #[serde(default = "default_retry_pause_ms")]
    pub retry_pause_ms: u64,

    #[serde(default = "default_max_repair_attempts")]
    pub max_repair_attempts: u32,

    /// How long the frame resolver keeps polling for a matching child frame.
    #[serde(default = "default_frame_wait_ms")]
    pub frame_wait_ms: u64,

    #[serde(default = "default_capture_budget_chars")]
    pub capture_budget_chars: usize,

    #[serde(default = "default_step_capture_budget_chars")]
    pub step_capture_budget_chars: usize,

    /// Capture each step's target page separately during code generation.
    #[serde(default = "default_true")]
    pub capture_per_step: bool,

    #[serde(default = "default_log_tail_lines")]
    pub log_tail_lines: usize,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_provider: default_provider(),
            default_model: default_model(),
            page_load_timeout_ms: default_page_load_timeout_ms(),
            script_timeout_ms: default_script_timeout_ms(),
            escalation_factor: default_escalation_factor(),
            escalation_floor_ms: default_escalation_floor_ms(),
            max_timeout_retries: default_max_timeout_retries(),
            retry_pause_ms: default_retry_pause_ms(),
            max_repair_attempts: default_max_repair_attempts(),
            frame_wait_ms: default_frame_wait_ms(),
            capture_budget_chars: default_capture_budget_chars(),
            step_capture_budget_chars: default_step_capture_budget_chars(),
            capture_per_step: true,
            log_tail_lines: default_log_tail_lines(),
            max_tokens: default_max_tokens(),
        }
    }
}

impl EngineConfig {
    /// Timeout used for the single escalated retry.
    pub fn escalated_timeout_ms(&self, base_ms: u64) -> u64 {
        base_ms
            .saturating_mul(self.escalation_factor)
            .max(self.escalation_floor_ms)
    }
}

fn default_provider() -> String {
    "openai".to_string()
}

fn default_model() -> String {
    "gpt-4o".to_string()
}

fn default_page_load_timeout_ms() -> u64 {
    30_000
}

fn default_script_timeout_ms() -> u64 {
    20_000
}

fn default_escalation_factor() -> u64 {
    3
}

fn default_escalation_floor_ms() -> u64 {
    60_000
}

fn default_max_timeout_retries() -> u32 {
    1
}

fn default_retry_pause_ms() -> u64 {
    800
}

fn default_max_repair_attempts() -> u32 {
    1
}

fn default_frame_wait_ms() -> u64 {
    3_000
}

fn default_capture_budget_chars() -> usize {
    60_000
}

fn default_step_capture_budget_chars() -> usize {
    20_000
}

fn default_log_tail_lines() -> usize {
    40
}

fn default_max_tokens() -> u32 {
    8192
}

/// Run session registry limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryConfig {
    #[serde(default = "default_max_sessions")]
    pub max_sessions: usize,

    /// Idle sessions older than this are purged.
    #[serde(default = "default_ttl_seconds")]
    pub ttl_seconds: u64,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            max_sessions: default_max_sessions(),
            ttl_seconds: default_ttl_seconds(),
        }
    }
}

fn default_max_sessions() -> usize {
    256
}

fn default_ttl_seconds() -> u64 {
    7200
}
