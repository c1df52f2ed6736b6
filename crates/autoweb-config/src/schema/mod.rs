//! TOML schema. Every section and every field is optional; a missing key
//! takes the value shown in `config/default.toml`.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

mod schema_browser;
mod schema_engine;

pub use schema_browser::*;
pub use schema_engine::*;

pub(crate) fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    /// Keyed by provider name (`openai`, `anthropic`).
    pub providers: HashMap<String, ProviderConfig>,
    pub engine: EngineConfig,
    pub registry: RegistryConfig,
    pub browser: BrowserConfig,
    pub progress: ProgressConfig,
}

impl Config {
    /// Settings for `name`, if that provider has a section.
    pub fn provider(&self, name: &str) -> Option<&ProviderConfig> {
        self.providers.get(name)
    }
}

/// Bind address for `autoweb serve`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8090,
        }
    }
}

/// `[providers.<name>]`. A missing `api_key` falls back to the
/// `<NAME>_API_KEY` environment variable at startup.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_model: Option<String>,
}

#[cfg(test)]
#[path = "schema_tests.rs"]
mod tests;
