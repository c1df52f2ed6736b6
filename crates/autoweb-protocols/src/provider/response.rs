//! Completion response types.

use serde::{Deserialize, Serialize};

use crate::types::{StopReason, Usage};

/// Response from a completion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionResponse {
    /// Unique ID for this completion.
    pub id: String,

    /// Model used.
    pub model: String,

    /// Assistant reply text.
    pub text: String,

    /// Reason for stopping.
    pub stop_reason: StopReason,

    /// Token usage.
    pub usage: Usage,
}

impl CompletionResponse {
    /// Build a plain text response with empty usage.
    pub fn text(model: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: String::new(),
            model: model.into(),
            text: text.into(),
            stop_reason: StopReason::EndTurn,
            usage: Usage::default(),
        }
    }
}
