//! # AutoWeb Channel - Webhook
//!
//! Delivers run narration to an HTTP endpoint as JSON
//! `{event_type, timestamp, run_id, content}`.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use hmac::{Hmac, Mac};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use tracing::{debug, error, warn};

use autoweb_protocols::{ProgressError, ProgressEvent, ProgressSink};

/// Header carrying the hex HMAC-SHA256 of the request body.
pub const SIGNATURE_HEADER: &str = "X-Signature-256";

/// Webhook configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookConfig {
    /// Webhook URL.
    pub url: String,
    /// Additional headers.
    #[serde(default)]
    pub headers: HashMap<String, String>,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
    /// Retry count on failure.
    #[serde(default = "default_retries")]
    pub max_retries: u32,
    /// Secret for HMAC signing (optional).
    #[serde(default)]
    pub secret: Option<String>,
}

fn default_timeout() -> u64 {
    10
}

fn default_retries() -> u32 {
    3
}

impl WebhookConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            headers: HashMap::new(),
            timeout_seconds: default_timeout(),
            max_retries: default_retries(),
            secret: None,
        }
    }

    pub fn with_secret(mut self, secret: Option<String>) -> Self {
        self.secret = secret.filter(|s| !s.is_empty());
        self
    }
}

/// Progress sink posting each event to a webhook.
pub struct WebhookSink {
    config: WebhookConfig,
    client: Client,
}

impl WebhookSink {
    pub fn new(config: WebhookConfig) -> Result<Self, ProgressError> {
        if !config.url.starts_with("http://") && !config.url.starts_with("https://") {
            return Err(ProgressError::InvalidConfig(format!(
                "webhook url must be http(s): {}",
                config.url
            )));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| ProgressError::InvalidConfig(e.to_string()))?;

        Ok(Self { config, client })
    }

    async fn post(&self, body: &str) -> Result<(), ProgressError> {
        let mut request = self
            .client
            .post(&self.config.url)
            .header("Content-Type", "application/json");
        for (key, value) in &self.config.headers {
            request = request.header(key, value);
        }

        if let Some(ref secret) = self.config.secret {
            request = request.header(SIGNATURE_HEADER, compute_signature(body, secret));
        }

        let response = request
            .body(body.to_string())
            .send()
            .await
            .map_err(|e| ProgressError::ConnectionFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProgressError::SendFailed(format!("HTTP {}: {}", status, body)));
        }

        debug!("Webhook delivered to {}", self.config.url);
        Ok(())
    }
}

/// `sha256=<hex>` HMAC of the payload.
pub fn compute_signature(payload: &str, secret: &str) -> String {
    // HMAC accepts keys of any length
    let mut mac = match Hmac::<Sha256>::new_from_slice(secret.as_bytes()) {
        Ok(mac) => mac,
        Err(_) => return String::new(),
    };
    mac.update(payload.as_bytes());
    format!("sha256={}", hex::encode(mac.finalize().into_bytes()))
}

#[async_trait]
impl ProgressSink for WebhookSink {
    fn id(&self) -> &str {
        "webhook"
    }

    async fn send(&self, event: ProgressEvent) -> Result<(), ProgressError> {
        let body =
            serde_json::to_string(&event).map_err(|e| ProgressError::SendFailed(e.to_string()))?;

        let mut last_error = None;

        for attempt in 0..=self.config.max_retries {
            match self.post(&body).await {
                Ok(()) => return Ok(()),
                Err(e) => {
                    if attempt < self.config.max_retries {
                        warn!("Webhook attempt {} failed: {}, retrying...", attempt + 1, e);
                        tokio::time::sleep(Duration::from_millis(100 * (attempt as u64 + 1))).await;
                    }
                    last_error = Some(e);
                }
            }
        }

        error!(
            "Webhook delivery failed after {} attempts",
            self.config.max_retries + 1
        );

        Err(last_error.unwrap_or_else(|| ProgressError::SendFailed("Unknown error".to_string())))
    }
}

#[cfg(test)]
#[path = "webhook_tests.rs"]
mod tests;
