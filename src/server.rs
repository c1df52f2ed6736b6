//! Tracing setup and command runners for AutoWeb.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{error, info};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use autoweb_api::{ApiServer, ApiServerConfig, AppState};
use autoweb_browser_cdp::BrowserManager;
use autoweb_config::Config;
use autoweb_engine::{Action, AutomationRequest, AutomationResponse};

use crate::register::build_engine;

const LOG_FILES_KEPT: usize = 14;

/// Get the ~/.autoweb directory path.
pub(crate) fn autoweb_dir() -> PathBuf {
    dirs::home_dir()
        .map(|h| h.join(".autoweb"))
        .unwrap_or_else(|| PathBuf::from(".autoweb"))
}

/// Initialize tracing with console and file output.
///
/// Log files are written to ~/.autoweb/logs/ with daily rotation.
pub(crate) fn init_tracing() -> Result<(), Box<dyn std::error::Error>> {
    let log_dir = autoweb_dir().join("logs");
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix("autoweb")
        .filename_suffix("log")
        .max_log_files(LOG_FILES_KEPT)
        .build(&log_dir)?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    // Keeps the writer thread flushing for the program's lifetime
    static GUARD: std::sync::OnceLock<tracing_appender::non_blocking::WorkerGuard> =
        std::sync::OnceLock::new();
    let _ = GUARD.set(guard);

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(true).with_ansi(true))
        .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
        .init();

    Ok(())
}

/// Resolves on ctrl-c.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for ctrl-c: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

/// Run the HTTP server in foreground.
pub(crate) async fn run_server(
    config: Config,
    host: Option<String>,
    port: Option<u16>,
) -> Result<(), Box<dyn std::error::Error>> {
    let host = host.unwrap_or_else(|| config.server.host.clone());
    let port = port.unwrap_or(config.server.port);

    info!("Starting AutoWeb v{}", env!("CARGO_PKG_VERSION"));

    let (engine, browser) = build_engine(&config);
    let state = Arc::new(AppState::new(engine));
    let server = ApiServer::new(ApiServerConfig::new(host, port), state);

    let result = server.run(shutdown_signal()).await;

    shutdown_browser(&browser).await;
    result
}

async fn shutdown_browser(browser: &BrowserManager) {
    info!("Closing shared browser...");
    browser.shutdown_chrome().await;
}

/// Dispatch a single request and print the response as JSON.
pub(crate) async fn run_once(
    config: Config,
    request: AutomationRequest,
) -> Result<(), Box<dyn std::error::Error>> {
    let (engine, browser) = build_engine(&config);
    let response = engine.handle(request).await;

    println!("{}", serde_json::to_string_pretty(&response)?);

    // Leave Chrome open so the page can be inspected.
    browser.close().await;
    exit_status(&response)
}

fn exit_status(response: &AutomationResponse) -> Result<(), Box<dyn std::error::Error>> {
    if response.ok {
        Ok(())
    } else {
        let reason = response
            .failed_reason
            .clone()
            .or_else(|| response.error.clone())
            .unwrap_or_else(|| "unknown failure".to_string());
        Err(format!("{} failed: {}", response.action.as_str(), reason).into())
    }
}

/// Request for the `open` command.
pub(crate) fn open_request(url: String) -> AutomationRequest {
    AutomationRequest::new(Action::Open).with_entry_url(url)
}
