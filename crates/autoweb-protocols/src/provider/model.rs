//! Model definition types.

use serde::{Deserialize, Serialize};

/// Definition of an LLM model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelDefinition {
    /// Model identifier.
    pub id: String,

    /// Human-readable name.
    pub name: String,

    /// Maximum context length in tokens.
    pub context_length: u32,

    /// Maximum output tokens.
    pub max_output_tokens: u32,
}

impl ModelDefinition {
    /// Create a new model definition.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            context_length: 128_000,
            max_output_tokens: 4096,
        }
    }

    pub fn with_context_length(mut self, context_length: u32) -> Self {
        self.context_length = context_length;
        self
    }

    pub fn with_max_output_tokens(mut self, max_output_tokens: u32) -> Self {
        self.max_output_tokens = max_output_tokens;
        self
    }
}
