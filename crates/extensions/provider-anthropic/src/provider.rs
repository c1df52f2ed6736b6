//! Anthropic provider implementation.

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use autoweb_protocols::error::ProviderError;
use autoweb_protocols::provider::{CompletionRequest, CompletionResponse, LLMProvider, ModelDefinition};

use crate::api::{ApiRequest, ApiResponse};
use crate::converter::{collect_system, convert_messages};
use crate::models::get_models;
use crate::parser::parse_response;

const API_URL: &str = "https://api.anthropic.com/v1/messages";
const API_VERSION: &str = "2023-06-01";
const DEFAULT_MAX_TOKENS: u32 = 4096;
const DEFAULT_TIMEOUT_SECS: u64 = 180;

/// Anthropic LLM provider.
pub struct AnthropicProvider {
    api_key: String,
    api_url: String,
    client: reqwest::Client,
    models: Vec<ModelDefinition>,
}

impl AnthropicProvider {
    pub fn new(api_key: String) -> Self {
        Self::with_url(api_key, API_URL.to_string())
    }

    /// Create provider against a custom messages endpoint (proxies, tests).
    pub fn with_url(api_key: String, api_url: String) -> Self {
        Self {
            api_key,
            api_url,
            client: reqwest::Client::new(),
            models: get_models(),
        }
    }

    /// Create provider from a configured base URL such as `https://host/v1`.
    pub fn with_base_url(api_key: String, base_url: &str) -> Self {
        let base = base_url.trim_end_matches('/');
        let url = if base.ends_with("/messages") {
            base.to_string()
        } else {
            format!("{}/messages", base)
        };
        Self::with_url(api_key, url)
    }

    fn build_request(&self, request: &CompletionRequest) -> ApiRequest {
        ApiRequest {
            model: request.model.clone(),
            messages: convert_messages(&request.messages),
            system: collect_system(request.system.as_deref(), &request.messages),
            max_tokens: request.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
            temperature: request.temperature,
            stop_sequences: request.stop.clone(),
        }
    }

    async fn send_request(
        &self,
        api_request: &ApiRequest,
        timeout_secs: u64,
    ) -> Result<reqwest::Response, ProviderError> {
        let response = self
            .client
            .post(&self.api_url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .header("content-type", "application/json")
            .timeout(Duration::from_secs(timeout_secs))
            .json(api_request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ProviderError::Timeout(timeout_secs)
                } else {
                    ProviderError::Network(e.to_string())
                }
            })?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            // {"type":"error","error":{"type":"...","message":"..."}}
            let message = serde_json::from_str::<serde_json::Value>(&body)
                .ok()
                .and_then(|v| v["error"]["message"].as_str().map(String::from))
                .unwrap_or(body);
            return Err(ProviderError::from_api_response(status, message));
        }

        Ok(response)
    }
}

#[async_trait]
impl LLMProvider for AnthropicProvider {
    fn id(&self) -> &str {
        "anthropic"
    }

    fn models(&self) -> &[ModelDefinition] {
        &self.models
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, ProviderError> {
        let timeout_secs = request.timeout_seconds.unwrap_or(DEFAULT_TIMEOUT_SECS);
        let api_request = self.build_request(&request);
        debug!(model = %api_request.model, messages = api_request.messages.len(), "anthropic completion");

        let response = self.send_request(&api_request, timeout_secs).await?;
        let api_response: ApiResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;
        Ok(parse_response(api_response))
    }
}

#[cfg(test)]
#[path = "provider_tests.rs"]
mod tests;
