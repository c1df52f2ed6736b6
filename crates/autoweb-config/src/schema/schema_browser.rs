//! Browser connection and progress delivery configuration.

use serde::{Deserialize, Serialize};

/// Shared browser connection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserConfig {
    /// Chrome remote debugging port.
    #[serde(default = "default_debug_port")]
    pub debug_port: u16,

    #[serde(default)]
    pub headless: bool,

    /// User data directory for a Chrome we launch ourselves.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_dir: Option<String>,

    /// Explicit Chrome binary; auto-detected when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chrome_path: Option<String>,

    #[serde(default = "default_viewport_width")]
    pub viewport_width: u32,

    #[serde(default = "default_viewport_height")]
    pub viewport_height: u32,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            debug_port: default_debug_port(),
            headless: false,
            profile_dir: None,
            chrome_path: None,
            viewport_width: default_viewport_width(),
            viewport_height: default_viewport_height(),
        }
    }
}

fn default_debug_port() -> u16 {
    9222
}

fn default_viewport_width() -> u32 {
    1280
}

fn default_viewport_height() -> u32 {
    800
}

/// Progress narration delivery.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressConfig {
    /// Webhook receiving narration; log-only when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub webhook_url: Option<String>,

    /// Shared secret for the `X-Signature-256` header.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub webhook_secret: Option<String>,

    #[serde(default = "default_chunk_chars")]
    pub chunk_chars: usize,

    #[serde(default = "default_preview_chars")]
    pub preview_chars: usize,
}

impl Default for ProgressConfig {
    fn default() -> Self {
        Self {
            webhook_url: None,
            webhook_secret: None,
            chunk_chars: default_chunk_chars(),
            preview_chars: default_preview_chars(),
        }
    }
}

fn default_chunk_chars() -> usize {
    3500
}

fn default_preview_chars() -> usize {
    1500
}
