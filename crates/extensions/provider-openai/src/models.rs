//! OpenAI model definitions.

use autoweb_protocols::provider::ModelDefinition;

/// Models known to produce usable plans and scripts.
pub fn get_models() -> Vec<ModelDefinition> {
    vec![
        ModelDefinition::new("gpt-4o", "GPT-4o").with_max_output_tokens(16_384),
        ModelDefinition::new("gpt-4o-mini", "GPT-4o Mini").with_max_output_tokens(16_384),
        ModelDefinition::new("gpt-4.1", "GPT-4.1")
            .with_context_length(1_047_576)
            .with_max_output_tokens(32_768),
        ModelDefinition::new("o3-mini", "o3 Mini")
            .with_context_length(200_000)
            .with_max_output_tokens(100_000),
    ]
}
