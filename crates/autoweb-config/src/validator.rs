//! Configuration validation.

use crate::error::ConfigError;
use crate::schema::Config;

/// Validation result.
#[derive(Debug, Default)]
pub struct ValidationResult {
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn add_warning(&mut self, warning: ValidationWarning) {
        self.warnings.push(warning);
    }

    /// Convert the first error into a [`ConfigError`].
    pub fn into_result(self) -> Result<Vec<ValidationWarning>, ConfigError> {
        match self.errors.into_iter().next() {
            Some(err) => Err(ConfigError::InvalidValue {
                field: err.path,
                message: err.message,
            }),
            None => Ok(self.warnings),
        }
    }
}

/// A validation error.
#[derive(Debug)]
pub struct ValidationError {
    pub path: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// A validation warning.
#[derive(Debug)]
pub struct ValidationWarning {
    pub path: String,
    pub message: String,
}

impl ValidationWarning {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Configuration validator.
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate the configuration.
    pub fn validate(config: &Config) -> ValidationResult {
        let mut result = ValidationResult::default();

        Self::validate_server(config, &mut result);
        Self::validate_engine(config, &mut result);
        Self::validate_registry(config, &mut result);
        Self::validate_providers(config, &mut result);
        Self::validate_progress(config, &mut result);

        result
    }

    fn validate_server(config: &Config, result: &mut ValidationResult) {
        if config.server.port == 0 {
            result.add_error(ValidationError::new("server.port", "Port cannot be 0"));
        }

        if config.server.host.is_empty() {
            result.add_error(ValidationError::new("server.host", "Host cannot be empty"));
        }
    }

    fn validate_engine(config: &Config, result: &mut ValidationResult) {
        let engine = &config.engine;

        for (path, value) in [
            ("engine.page_load_timeout_ms", engine.page_load_timeout_ms),
            ("engine.script_timeout_ms", engine.script_timeout_ms),
        ] {
            if value == 0 {
                result.add_error(ValidationError::new(path, "timeout must be greater than 0"));
            }
        }

        if engine.escalation_factor < 1 {
            result.add_error(ValidationError::new(
                "engine.escalation_factor",
                "escalation_factor must be at least 1",
            ));
        }

        if engine.default_provider.is_empty() {
            result.add_error(ValidationError::new(
                "engine.default_provider",
                "Default provider cannot be empty",
            ));
        }

        if engine.default_model.is_empty() {
            result.add_error(ValidationError::new(
                "engine.default_model",
                "Default model cannot be empty",
            ));
        }

        if engine.max_timeout_retries > 3 {
            result.add_warning(ValidationWarning::new(
                "engine.max_timeout_retries",
                "more than 3 escalated retries can keep a step running for many minutes",
            ));
        }

        if engine.capture_budget_chars < 1000 {
            result.add_warning(ValidationWarning::new(
                "engine.capture_budget_chars",
                "capture budget below 1000 chars leaves the model almost blind",
            ));
        }
    }

    fn validate_registry(config: &Config, result: &mut ValidationResult) {
        if config.registry.max_sessions == 0 {
            result.add_error(ValidationError::new(
                "registry.max_sessions",
                "max_sessions must be greater than 0",
            ));
        }
        if config.registry.ttl_seconds == 0 {
            result.add_error(ValidationError::new(
                "registry.ttl_seconds",
                "ttl_seconds must be greater than 0",
            ));
        }
    }

    fn validate_providers(config: &Config, result: &mut ValidationResult) {
        for (name, provider) in &config.providers {
            if provider.api_key.as_deref().is_none_or(str::is_empty) {
                result.add_warning(ValidationWarning::new(
                    format!("providers.{}.api_key", name),
                    "API key is not set, may need to be set via environment variable",
                ));
            }

            if let Some(ref url) = provider.base_url {
                if !url.starts_with("http://") && !url.starts_with("https://") {
                    result.add_error(ValidationError::new(
                        format!("providers.{}.base_url", name),
                        "base_url must start with http:// or https://",
                    ));
                }
            }
        }

        if !config.providers.is_empty() && config.provider(&config.engine.default_provider).is_none() {
            result.add_warning(ValidationWarning::new(
                "engine.default_provider",
                format!(
                    "default provider '{}' has no [providers.{}] section",
                    config.engine.default_provider, config.engine.default_provider
                ),
            ));
        }
    }

    fn validate_progress(config: &Config, result: &mut ValidationResult) {
        if let Some(ref url) = config.progress.webhook_url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                result.add_warning(ValidationWarning::new(
                    "progress.webhook_url",
                    "webhook_url does not use an http(s) scheme, narration will fail to deliver",
                ));
            }
        }

        if config.progress.chunk_chars == 0 {
            result.add_error(ValidationError::new(
                "progress.chunk_chars",
                "chunk_chars must be greater than 0",
            ));
        }
    }
}

#[cfg(test)]
#[path = "validator_tests.rs"]
mod tests;
