//! Anthropic model definitions.

use autoweb_protocols::provider::ModelDefinition;

pub fn get_models() -> Vec<ModelDefinition> {
    vec![
        ModelDefinition::new("claude-sonnet-4-20250514", "Claude Sonnet 4")
            .with_context_length(200_000)
            .with_max_output_tokens(64_000),
        ModelDefinition::new("claude-opus-4-20250514", "Claude Opus 4")
            .with_context_length(200_000)
            .with_max_output_tokens(32_000),
        ModelDefinition::new("claude-3-5-haiku-20241022", "Claude 3.5 Haiku")
            .with_context_length(200_000)
            .with_max_output_tokens(8192),
    ]
}
