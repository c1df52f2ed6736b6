//! BrowserManager core: lazy connection, Chrome launch, shared page.

use std::path::PathBuf;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use autoweb_protocols::{AutomationBrowser, AutomationError, AutomationPage};
use parking_lot::RwLock;
use tokio::process::{Child, Command};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::{BrowserError, BrowserManagerConfig};
use crate::cdp::CdpClient;
use crate::page::CdpPage;

const LAUNCH_POLL: Duration = Duration::from_millis(200);
const LAUNCH_ATTEMPTS: u32 = 30;

/// Owns the process-wide browser connection and its single shared page.
pub struct BrowserManager {
    pub(super) config: BrowserManagerConfig,
    client: RwLock<Option<Arc<CdpClient>>>,
    page: RwLock<Option<Arc<CdpPage>>>,
    /// Serializes connection setup.
    connect_lock: Mutex<()>,
    /// Chrome process handle (if we launched it).
    chrome_process: Mutex<Option<Child>>,
}

impl BrowserManager {
    /// Create a new browser manager. Nothing connects until first use.
    pub fn new(config: BrowserManagerConfig) -> Self {
        Self {
            config,
            client: RwLock::new(None),
            page: RwLock::new(None),
            connect_lock: Mutex::new(()),
            chrome_process: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &BrowserManagerConfig {
        &self.config
    }

    /// Find Chrome executable path.
    pub fn find_chrome() -> Option<PathBuf> {
        #[cfg(target_os = "macos")]
        let paths: &[&str] = &[
            "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
            "/Applications/Chromium.app/Contents/MacOS/Chromium",
            "/Applications/Microsoft Edge.app/Contents/MacOS/Microsoft Edge",
        ];

        #[cfg(target_os = "linux")]
        let paths: &[&str] = &[
            "/usr/bin/google-chrome",
            "/usr/bin/google-chrome-stable",
            "/usr/bin/chromium",
            "/usr/bin/chromium-browser",
            "/snap/bin/chromium",
        ];

        #[cfg(target_os = "windows")]
        let paths: &[&str] = &[
            r"C:\Program Files\Google\Chrome\Application\chrome.exe",
            r"C:\Program Files (x86)\Google\Chrome\Application\chrome.exe",
        ];

        #[cfg(not(any(target_os = "macos", target_os = "linux", target_os = "windows")))]
        let paths: &[&str] = &[];

        paths.iter().map(PathBuf::from).find(|p| p.exists())
    }

    /// Check if Chrome is already running on the debug port.
    async fn is_chrome_running(&self) -> bool {
        reqwest::get(format!("{}/json/version", self.config.endpoint()))
            .await
            .is_ok()
    }

    /// Launch Chrome with remote debugging enabled.
    async fn launch_chrome(&self) -> Result<Child, BrowserError> {
        let chrome_path = self
            .config
            .chrome_path
            .clone()
            .or_else(Self::find_chrome)
            .ok_or(BrowserError::ChromeNotFound)?;
        let profile_dir = self.config.get_profile_dir();

        if let Err(e) = std::fs::create_dir_all(&profile_dir) {
            warn!("Failed to create profile directory: {}", e);
        }

        info!("Launching Chrome with profile at: {}", profile_dir.display());

        let mut cmd = Command::new(&chrome_path);
        cmd.arg(format!("--remote-debugging-port={}", self.config.debug_port))
            .arg(format!("--user-data-dir={}", profile_dir.display()))
            .arg(format!(
                "--window-size={},{}",
                self.config.viewport_width, self.config.viewport_height
            ))
            .arg("--no-first-run")
            .arg("--no-default-browser-check")
            .arg("--disable-background-networking")
            .arg("--disable-sync")
            .arg("--disable-translate")
            .stdout(Stdio::null())
            .stderr(Stdio::null());

        if self.config.headless {
            cmd.arg("--headless=new");
        }

        let child = cmd
            .spawn()
            .map_err(|e| BrowserError::LaunchFailed(e.to_string()))?;

        info!("Chrome launched with PID: {:?}", child.id());
        Ok(child)
    }

    /// Connect to the browser, launching it if necessary.
    async fn connect(&self) -> Result<Arc<CdpClient>, BrowserError> {
        if !self.is_chrome_running().await {
            info!("Chrome not running on port {}, launching...", self.config.debug_port);

            let child = self.launch_chrome().await?;
            *self.chrome_process.lock().await = Some(child);

            let mut ready = false;
            for _ in 0..LAUNCH_ATTEMPTS {
                tokio::time::sleep(LAUNCH_POLL).await;
                if self.is_chrome_running().await {
                    ready = true;
                    break;
                }
            }

            if !ready {
                return Err(BrowserError::LaunchFailed(
                    "Chrome failed to start within timeout".to_string(),
                ));
            }
        } else {
            info!("Chrome already running on port {}", self.config.debug_port);
        }

        let client = Arc::new(CdpClient::connect(&self.config.endpoint()).await?);
        *self.client.write() = Some(client.clone());

        info!("Connected to Chrome at {}", self.config.endpoint());
        Ok(client)
    }

    /// The cached page, if its connection is still alive.
    fn live_page(&self) -> Option<Arc<CdpPage>> {
        if !self.is_connected() {
            return None;
        }
        self.page.read().clone()
    }

    /// Get the shared page, connecting on first use.
    ///
    /// A dropped connection is re-established on the next call.
    pub async fn shared_page(&self) -> Result<Arc<CdpPage>, BrowserError> {
        if let Some(page) = self.live_page() {
            return Ok(page);
        }

        let _guard = self.connect_lock.lock().await;
        if let Some(page) = self.live_page() {
            return Ok(page);
        }

        self.page.write().take();
        self.client.write().take();
        let client = self.connect().await?;

        let session = match client.list_pages().await?.first() {
            Some(existing) => {
                debug!("Attaching to existing page {} ({})", existing.id, existing.url);
                client.attach_page(&existing.id).await?
            }
            None => client.new_page(None).await?,
        };

        if let Err(e) = session
            .set_viewport(self.config.viewport_width, self.config.viewport_height)
            .await
        {
            warn!("Failed to set viewport: {}", e);
        }

        let page = Arc::new(CdpPage::new(session));
        *self.page.write() = Some(page.clone());
        Ok(page)
    }

    /// Close the browser connection, keeping Chrome running.
    pub async fn close(&self) {
        self.page.write().take();
        let client = self.client.write().take();
        if let Some(client) = client {
            client.close().await;
            info!("Browser connection closed");
        }
    }

    /// Close the connection and stop Chrome if we launched it.
    pub async fn shutdown_chrome(&self) {
        self.close().await;
        if let Some(mut child) = self.chrome_process.lock().await.take() {
            info!("Shutting down Chrome...");
            let _ = child.kill().await;
        }
    }
}

#[async_trait]
impl AutomationBrowser for BrowserManager {
    async fn page(&self) -> Result<Arc<dyn AutomationPage>, AutomationError> {
        let page = self.shared_page().await?;
        Ok(page)
    }

    fn is_connected(&self) -> bool {
        self.client.read().as_ref().is_some_and(|c| c.is_alive())
    }

    async fn shutdown(&self) -> Result<(), AutomationError> {
        self.shutdown_chrome().await;
        Ok(())
    }
}
