//! Model selection: maps `provider:model` selectors to registered providers.

use std::collections::HashMap;
use std::sync::Arc;

use autoweb_protocols::{CompletionRequest, LLMProvider, Message, ProviderError};
use tracing::{debug, warn};

use crate::error::EngineError;

/// A provider bound to one model.
#[derive(Clone)]
pub struct ModelHandle {
    provider: Arc<dyn LLMProvider>,
    model: String,
    max_tokens: u32,
}

impl ModelHandle {
    pub fn new(provider: Arc<dyn LLMProvider>, model: impl Into<String>, max_tokens: u32) -> Self {
        Self {
            provider,
            model: model.into(),
            max_tokens,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// `provider:model`, as reported back to callers.
    pub fn label(&self) -> String {
        format!("{}:{}", self.provider.id(), self.model)
    }

    /// Single-turn completion. A blank reply is an error.
    pub async fn ask(&self, system: &str, prompt: &str) -> Result<String, ProviderError> {
        let request = CompletionRequest::new(&self.model, vec![Message::user(prompt)])
            .with_system(system)
            .with_max_tokens(self.max_tokens)
            .with_temperature(0.0);

        debug!("Asking {} ({} prompt chars)", self.label(), prompt.len());
        let response = self.provider.complete(request).await?;
        if response.text.trim().is_empty() {
            return Err(ProviderError::EmptyResponse);
        }
        if response.stop_reason.is_truncated() {
            warn!(
                "{} hit the token limit after {} completion tokens",
                self.label(),
                response.usage.completion_tokens
            );
        }
        Ok(response.text)
    }
}

/// Registered providers plus the default selection.
#[derive(Clone, Default)]
pub struct ModelRouter {
    providers: HashMap<String, Arc<dyn LLMProvider>>,
    default_provider: String,
    default_model: String,
    max_tokens: u32,
}

impl ModelRouter {
    pub fn new(default_provider: impl Into<String>, default_model: impl Into<String>, max_tokens: u32) -> Self {
        Self {
            providers: HashMap::new(),
            default_provider: default_provider.into(),
            default_model: default_model.into(),
            max_tokens,
        }
    }

    pub fn register(&mut self, provider: Arc<dyn LLMProvider>) {
        self.providers.insert(provider.id().to_string(), provider);
    }

    pub fn with_provider(mut self, provider: Arc<dyn LLMProvider>) -> Self {
        self.register(provider);
        self
    }

    pub fn provider_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.providers.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Resolve a selector.
    ///
    /// `provider:model` picks a registered provider; anything else (including
    /// model names that contain `:` themselves) is a model of the default
    /// provider. `None` selects the defaults.
    pub fn resolve(&self, selector: Option<&str>) -> Result<ModelHandle, EngineError> {
        let selector = selector.map(str::trim).filter(|s| !s.is_empty());

        let (provider_id, model) = match selector {
            None => (self.default_provider.as_str(), self.default_model.as_str()),
            Some(sel) => match sel.split_once(':') {
                Some((p, m)) if self.providers.contains_key(p) => {
                    let m = if m.trim().is_empty() { self.default_model.as_str() } else { m.trim() };
                    (p, m)
                }
                _ => (self.default_provider.as_str(), sel),
            },
        };

        let provider = self.providers.get(provider_id).cloned().ok_or_else(|| {
            EngineError::InvalidRequest(format!("model provider not configured: {}", provider_id))
        })?;

        Ok(ModelHandle::new(provider, model, self.max_tokens))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeProvider;

    fn router() -> ModelRouter {
        ModelRouter::new("openai", "gpt-4o", 4096)
            .with_provider(Arc::new(FakeProvider::with_id("openai")))
            .with_provider(Arc::new(FakeProvider::with_id("anthropic")))
    }

    #[test]
    fn test_resolve_default() {
        let handle = router().resolve(None).unwrap();
        assert_eq!(handle.label(), "openai:gpt-4o");
    }

    #[test]
    fn test_resolve_provider_prefix() {
        let handle = router().resolve(Some("anthropic:claude-sonnet-4")).unwrap();
        assert_eq!(handle.label(), "anthropic:claude-sonnet-4");
    }

    #[test]
    fn test_resolve_bare_model_uses_default_provider() {
        let handle = router().resolve(Some("gpt-4.1")).unwrap();
        assert_eq!(handle.label(), "openai:gpt-4.1");
        // unknown prefix is part of the model name
        let handle = router().resolve(Some("llama3:8b")).unwrap();
        assert_eq!(handle.label(), "openai:llama3:8b");
    }

    #[test]
    fn test_resolve_missing_provider() {
        let router = ModelRouter::new("gemini", "g", 1024);
        assert!(matches!(router.resolve(None), Err(EngineError::InvalidRequest(_))));
    }

    #[tokio::test]
    async fn test_ask_rejects_blank_reply() {
        let provider = Arc::new(FakeProvider::new(vec!["   "]));
        let handle = ModelHandle::new(provider, "m", 100);
        assert!(matches!(handle.ask("s", "p").await, Err(ProviderError::EmptyResponse)));
    }
}
