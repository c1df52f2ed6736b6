//! Provider, progress sink and engine wiring for AutoWeb.

use std::sync::Arc;

use tracing::{info, warn};

use autoweb_browser_cdp::{BrowserManager, BrowserManagerConfig};
use autoweb_channel_webhook::{WebhookConfig, WebhookSink};
use autoweb_config::{Config, ProgressConfig, ProviderConfig};
use autoweb_engine::narrator::Narrator;
use autoweb_engine::{AutomationEngine, ModelRouter};
use autoweb_protocols::{LLMProvider, LogSink, ProgressSink};
use autoweb_provider_anthropic::AnthropicProvider;
use autoweb_provider_openai::OpenAIProvider;

/// API key from config, falling back to `<NAME>_API_KEY`.
fn api_key(name: &str, provider_config: &ProviderConfig) -> Option<String> {
    provider_config
        .api_key
        .clone()
        .filter(|k| !k.trim().is_empty())
        .or_else(|| std::env::var(format!("{}_API_KEY", name.to_uppercase())).ok())
}

fn build_provider(name: &str, provider_config: &ProviderConfig) -> Option<Arc<dyn LLMProvider>> {
    let Some(api_key) = api_key(name, provider_config) else {
        info!("Skipping provider '{}': no API key configured or in environment", name);
        return None;
    };
    let base_url = provider_config.base_url.as_deref();

    let provider: Arc<dyn LLMProvider> = match name {
        "openai" => Arc::new(match base_url {
            Some(url) => OpenAIProvider::with_base_url(api_key, url),
            None => OpenAIProvider::new(api_key),
        }),
        "anthropic" => Arc::new(match base_url {
            Some(url) => AnthropicProvider::with_base_url(api_key, url),
            None => AnthropicProvider::new(api_key),
        }),
        other => {
            warn!("Unknown provider type: {}", other);
            return None;
        }
    };
    Some(provider)
}

/// Register every configured provider that has an API key.
pub(crate) fn build_models(config: &Config) -> ModelRouter {
    let mut router = ModelRouter::new(
        config.engine.default_provider.clone(),
        config.engine.default_model.clone(),
        config.engine.max_tokens,
    );
    for (name, provider_config) in &config.providers {
        if let Some(provider) = build_provider(name, provider_config) {
            info!("Registered {} provider", name);
            router.register(provider);
        }
    }
    if router.provider_ids().is_empty() {
        warn!("No model provider registered; prepare requests will fail");
    }
    router
}

/// Webhook sink when configured, otherwise the tracing log.
pub(crate) fn build_sink(progress: &ProgressConfig) -> Arc<dyn ProgressSink> {
    let Some(url) = progress.webhook_url.as_deref().filter(|u| !u.trim().is_empty()) else {
        return Arc::new(LogSink);
    };
    let webhook = WebhookConfig::new(url).with_secret(progress.webhook_secret.clone());
    match WebhookSink::new(webhook) {
        Ok(sink) => {
            info!("Progress narration delivered to {}", url);
            Arc::new(sink)
        }
        Err(e) => {
            warn!("Webhook sink disabled, logging progress instead: {}", e);
            Arc::new(LogSink)
        }
    }
}

/// Build the engine and the shared browser it drives.
pub(crate) fn build_engine(config: &Config) -> (Arc<AutomationEngine>, Arc<BrowserManager>) {
    let browser = Arc::new(BrowserManager::new(BrowserManagerConfig::from(&config.browser)));
    let narrator = Narrator::new(
        build_sink(&config.progress),
        config.progress.chunk_chars,
        config.progress.preview_chars,
    );
    let engine = AutomationEngine::new(
        config.engine.clone(),
        &config.registry,
        browser.clone(),
        build_models(config),
    )
    .with_narrator(narrator);
    (Arc::new(engine), browser)
}
