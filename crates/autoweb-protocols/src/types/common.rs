//! Completion bookkeeping shared by providers.

use serde::{Deserialize, Serialize};

/// Why the model stopped generating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    EndTurn,
    StopSequence,
    MaxTokens,
}

impl StopReason {
    /// OpenAI reports `length`, Anthropic reports `max_tokens`.
    pub fn from_finish_reason(reason: &str) -> Self {
        match reason {
            "length" | "max_tokens" => StopReason::MaxTokens,
            "stop_sequence" => StopReason::StopSequence,
            _ => StopReason::EndTurn,
        }
    }

    /// A truncated plan or script is usually unusable.
    pub fn is_truncated(self) -> bool {
        self == StopReason::MaxTokens
    }
}

/// Token counts as reported by the provider.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

#[cfg(test)]
#[path = "common_tests.rs"]
mod tests;
