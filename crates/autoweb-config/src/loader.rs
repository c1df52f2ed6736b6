//! Configuration loader.

use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::ConfigError;
use crate::schema::Config;

static ENV_VAR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("valid env var pattern"));

/// Configuration loader with environment variable substitution.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Config, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.display().to_string()));
        }
        let content = fs::read_to_string(path)?;
        Self::load_str(&content)
    }

    /// Load configuration from a string.
    pub fn load_str(content: &str) -> Result<Config, ConfigError> {
        let expanded = Self::expand_env_vars(content)?;
        let mut config: Config = toml::from_str(&expanded)?;
        if let Some(dir) = config.browser.profile_dir.take() {
            config.browser.profile_dir = Some(Self::expand_path(&dir));
        }
        Ok(config)
    }

    /// Load the file if it exists, otherwise fall back to defaults.
    pub fn load_or_default(path: &Path) -> Result<Config, ConfigError> {
        match Self::load(path) {
            Err(ConfigError::NotFound(_)) => Ok(Config::default()),
            other => other,
        }
    }

    /// Expand environment variables in the format `${VAR}`.
    ///
    /// Variables inside comment lines are left alone so a commented-out key
    /// never requires its variable to be set.
    fn expand_env_vars(content: &str) -> Result<String, ConfigError> {
        let mut out = String::with_capacity(content.len());
        for line in content.lines() {
            if line.trim_start().starts_with('#') {
                out.push_str(line);
            } else {
                let mut expanded = line.to_string();
                for cap in ENV_VAR_RE.captures_iter(line) {
                    let var_name = &cap[1];
                    let var_value = std::env::var(var_name)
                        .map_err(|_| ConfigError::EnvVarNotSet(var_name.to_string()))?;
                    expanded = expanded.replace(&cap[0], &var_value);
                }
                out.push_str(&expanded);
            }
            out.push('\n');
        }
        Ok(out)
    }

    /// Expand shell-style paths (e.g., `~/.autoweb`).
    pub fn expand_path(path: &str) -> String {
        shellexpand::tilde(path).to_string()
    }
}

#[cfg(test)]
#[path = "loader_tests.rs"]
mod tests;
