use super::*;

#[test]
fn test_config_default() {
    let config = Config::default();
    assert_eq!(config.server.host, "127.0.0.1");
    assert_eq!(config.server.port, 8090);
    assert!(config.providers.is_empty());
    assert!(config.progress.webhook_url.is_none());
}

#[test]
fn test_engine_defaults() {
    let engine = EngineConfig::default();
    assert_eq!(engine.default_model, "gpt-4o");
    assert_eq!(engine.page_load_timeout_ms, 30_000);
    assert_eq!(engine.max_timeout_retries, 1);
    assert_eq!(engine.retry_pause_ms, 800);
    assert_eq!(engine.frame_wait_ms, 3_000);
    assert_eq!(engine.capture_budget_chars, 60_000);
    assert_eq!(engine.log_tail_lines, 40);
    assert!(engine.capture_per_step);
}

#[test]
fn test_escalated_timeout_respects_floor() {
    let engine = EngineConfig::default();
    // 3 * 20s = 60s, equal to the floor
    assert_eq!(engine.escalated_timeout_ms(20_000), 60_000);
    // below the floor
    assert_eq!(engine.escalated_timeout_ms(5_000), 60_000);
    // above the floor
    assert_eq!(engine.escalated_timeout_ms(30_000), 90_000);
}

#[test]
fn test_registry_defaults() {
    let registry = RegistryConfig::default();
    assert_eq!(registry.max_sessions, 256);
    assert_eq!(registry.ttl_seconds, 7200);
}

#[test]
fn test_browser_defaults() {
    let browser = BrowserConfig::default();
    assert_eq!(browser.debug_port, 9222);
    assert!(!browser.headless);
    assert_eq!(browser.viewport_width, 1280);
    assert_eq!(browser.viewport_height, 800);
}

#[test]
fn test_progress_defaults() {
    let progress = ProgressConfig::default();
    assert_eq!(progress.chunk_chars, 3500);
    assert_eq!(progress.preview_chars, 1500);
}

#[test]
fn test_config_serialization_roundtrip() {
    let mut config = Config::default();
    config.engine.default_provider = "anthropic".to_string();
    let toml_str = toml::to_string(&config).unwrap();
    let parsed: Config = toml::from_str(&toml_str).unwrap();
    assert_eq!(parsed.engine.default_provider, "anthropic");
    assert_eq!(parsed.server.port, config.server.port);
}

#[test]
fn test_partial_server_section_keeps_defaults() {
    let config: Config = toml::from_str("[server]\nport = 9000\n").unwrap();
    assert_eq!(config.server.host, "127.0.0.1");
    assert_eq!(config.server.port, 9000);
    assert!(config.provider("openai").is_none());
}
