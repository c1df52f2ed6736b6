//! OpenAI provider implementation.

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use autoweb_protocols::error::ProviderError;
use autoweb_protocols::provider::{CompletionRequest, CompletionResponse, LLMProvider, ModelDefinition};
use autoweb_protocols::types::{StopReason, Usage};

use crate::api::{ApiErrorBody, ApiRequest, ApiResponse};
use crate::converter::convert_messages;
use crate::models::get_models;

const DEFAULT_API_URL: &str = "https://api.openai.com/v1/chat/completions";
const DEFAULT_TIMEOUT_SECS: u64 = 180;

/// OpenAI LLM provider.
pub struct OpenAIProvider {
    api_key: String,
    api_url: String,
    client: reqwest::Client,
    models: Vec<ModelDefinition>,
}

impl OpenAIProvider {
    pub fn new(api_key: String) -> Self {
        Self::with_url(api_key, DEFAULT_API_URL.to_string())
    }

    /// Create provider with a full chat-completions URL.
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
        let url = if base.ends_with("/chat/completions") {
            base.to_string()
        } else {
            format!("{}/chat/completions", base)
        };
        Self::with_url(api_key, url)
    }

    fn build_request(&self, request: &CompletionRequest) -> ApiRequest {
        ApiRequest {
            model: request.model.clone(),
            messages: convert_messages(request),
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            stop: request.stop.clone(),
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
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
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
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorBody>(&text)
                .map(|body| body.error.message)
                .unwrap_or(text);
            return Err(ProviderError::from_api_response(status, message));
        }

        Ok(response)
    }
}

fn parse_response(api_response: ApiResponse) -> Result<CompletionResponse, ProviderError> {
    let choice = api_response
        .choices
        .into_iter()
        .next()
        .ok_or(ProviderError::EmptyResponse)?;

    let usage = api_response
        .usage
        .map(|u| Usage {
            prompt_tokens: u.prompt_tokens,
            completion_tokens: u.completion_tokens,
            total_tokens: u.total_tokens,
        })
        .unwrap_or_default();

    Ok(CompletionResponse {
        id: api_response.id,
        model: api_response.model,
        text: choice.message.content.unwrap_or_default(),
        stop_reason: choice
            .finish_reason
            .as_deref()
            .map(StopReason::from_finish_reason)
            .unwrap_or(StopReason::EndTurn),
        usage,
    })
}

#[async_trait]
impl LLMProvider for OpenAIProvider {
    fn id(&self) -> &str {
        "openai"
    }

    fn models(&self) -> &[ModelDefinition] {
        &self.models
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, ProviderError> {
        let timeout_secs = request.timeout_seconds.unwrap_or(DEFAULT_TIMEOUT_SECS);
        let api_request = self.build_request(&request);
        debug!(model = %api_request.model, messages = api_request.messages.len(), "openai completion");

        let response = self.send_request(&api_request, timeout_secs).await?;
        let api_response: ApiResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;
        parse_response(api_response)
    }
}

#[cfg(test)]
#[path = "provider_tests.rs"]
mod tests;
