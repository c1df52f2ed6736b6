//! Errors raised while loading or validating configuration.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file {0} does not exist")]
    NotFound(String),

    #[error("{field}: {message}")]
    InvalidValue { field: String, message: String },

    /// A `${VAR}` reference with no matching environment variable.
    #[error("${{{0}}} is referenced in the config but not set")]
    EnvVarNotSet(String),

    #[error("reading config: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed TOML: {0}")]
    TomlParse(#[from] toml::de::Error),
}
