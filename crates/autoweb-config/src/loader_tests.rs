use super::*;
use std::io::Write;
use tempfile::NamedTempFile;

#[test]
fn test_load_empty_config() {
    let config = ConfigLoader::load_str("").unwrap();
    assert_eq!(config.server.port, 8090);
    assert_eq!(config.engine.default_provider, "openai");
    assert_eq!(config.engine.script_timeout_ms, 20_000);
}

#[test]
fn test_load_basic_config() {
    let content = r#"
        [server]
        host = "0.0.0.0"
        port = 3000
    "#;
    let config = ConfigLoader::load_str(content).unwrap();
    assert_eq!(config.server.host, "0.0.0.0");
    assert_eq!(config.server.port, 3000);
}

#[test]
fn test_load_engine_section() {
    let content = r#"
        [engine]
        default_provider = "anthropic"
        default_model = "claude-sonnet-4-20250514"
        script_timeout_ms = 5000
        max_repair_attempts = 3
        capture_per_step = false

        [registry]
        max_sessions = 10
        ttl_seconds = 60
    "#;
    let config = ConfigLoader::load_str(content).unwrap();
    assert_eq!(config.engine.default_provider, "anthropic");
    assert_eq!(config.engine.script_timeout_ms, 5000);
    assert_eq!(config.engine.max_repair_attempts, 3);
    assert!(!config.engine.capture_per_step);
    // untouched keys keep their defaults
    assert_eq!(config.engine.escalation_floor_ms, 60_000);
    assert_eq!(config.registry.max_sessions, 10);
    assert_eq!(config.registry.ttl_seconds, 60);
}

#[test]
fn test_load_from_file() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "[browser]").unwrap();
    writeln!(file, "debug_port = 9333").unwrap();
    writeln!(file, "headless = true").unwrap();

    let config = ConfigLoader::load(file.path()).unwrap();
    assert_eq!(config.browser.debug_port, 9333);
    assert!(config.browser.headless);
}

#[test]
fn test_load_nonexistent_file() {
    let result = ConfigLoader::load(Path::new("/nonexistent/path/config.toml"));
    assert!(matches!(result, Err(ConfigError::NotFound(_))));
}

#[test]
fn test_load_or_default_missing_file() {
    let config = ConfigLoader::load_or_default(Path::new("/nonexistent/autoweb.toml")).unwrap();
    assert_eq!(config.server.port, 8090);
}

#[test]
fn test_load_invalid_toml() {
    let result = ConfigLoader::load_str("invalid = [unclosed");
    assert!(matches!(result, Err(ConfigError::TomlParse(_))));
}

#[test]
fn test_expand_env_vars() {
    // SAFETY: unique test-only variable
    unsafe {
        std::env::set_var("AUTOWEB_TEST_CONFIG_VAR", "test_value");
    }
    let expanded = ConfigLoader::expand_env_vars("value = \"${AUTOWEB_TEST_CONFIG_VAR}\"").unwrap();
    assert!(expanded.contains("test_value"));
    unsafe {
        std::env::remove_var("AUTOWEB_TEST_CONFIG_VAR");
    }
}

#[test]
fn test_expand_env_vars_not_set() {
    let result = ConfigLoader::expand_env_vars("value = \"${NONEXISTENT_AUTOWEB_VAR_12345}\"");
    assert!(matches!(result, Err(ConfigError::EnvVarNotSet(ref v)) if v == "NONEXISTENT_AUTOWEB_VAR_12345"));
}

#[test]
fn test_expand_env_vars_skips_comments() {
    let content = "# api_key = \"${NONEXISTENT_AUTOWEB_VAR_67890}\"\nport = 1";
    let expanded = ConfigLoader::expand_env_vars(content).unwrap();
    assert!(expanded.contains("NONEXISTENT_AUTOWEB_VAR_67890"));
}

#[test]
fn test_expand_path_with_tilde() {
    let expanded = ConfigLoader::expand_path("~/test");
    assert!(!expanded.starts_with('~'));
    assert!(expanded.ends_with("/test"));
}

#[test]
fn test_expand_path_no_tilde() {
    assert_eq!(ConfigLoader::expand_path("/usr/local/bin"), "/usr/local/bin");
}

#[test]
fn test_profile_dir_is_expanded() {
    let content = r#"
        [browser]
        profile_dir = "~/.autoweb/chrome"
    "#;
    let config = ConfigLoader::load_str(content).unwrap();
    let dir = config.browser.profile_dir.unwrap();
    assert!(!dir.starts_with('~'));
    assert!(dir.ends_with(".autoweb/chrome"));
}

#[test]
fn test_load_with_providers() {
    let content = r#"
        [providers.openai]
        api_key = "sk-test"
        base_url = "https://api.openai.com/v1"
    "#;
    let config = ConfigLoader::load_str(content).unwrap();
    let openai = &config.providers["openai"];
    assert_eq!(openai.api_key.as_deref(), Some("sk-test"));
    assert_eq!(openai.base_url.as_deref(), Some("https://api.openai.com/v1"));
}
