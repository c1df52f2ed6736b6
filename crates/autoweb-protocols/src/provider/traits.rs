//! LLM Provider trait definition.

use async_trait::async_trait;

use super::{CompletionRequest, CompletionResponse, ModelDefinition};
use crate::error::ProviderError;

/// Core trait for LLM providers.
#[async_trait]
pub trait LLMProvider: Send + Sync {
    /// Returns the provider ID.
    fn id(&self) -> &str;

    /// Returns the available models.
    fn models(&self) -> &[ModelDefinition];

    /// Generate a completion.
    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> Result<CompletionResponse, ProviderError>;

    /// Convenience: send one prompt, get the reply text back.
    async fn prompt(
        &self,
        model: &str,
        system: Option<&str>,
        prompt: &str,
    ) -> Result<String, ProviderError> {
        let mut request = CompletionRequest::new(model, vec![crate::types::Message::user(prompt)]);
        if let Some(system) = system {
            request = request.with_system(system);
        }
        let response = self.complete(request).await?;
        if response.text.trim().is_empty() {
            return Err(ProviderError::EmptyResponse);
        }
        Ok(response.text)
    }
}
