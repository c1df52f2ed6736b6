//! CDP WebSocket client.

use std::collections::HashMap;
use std::sync::Arc;

use futures::StreamExt;
use futures::stream::SplitStream;
use parking_lot::Mutex;
use serde_json::{Value, json};
use tokio::sync::{RwLock, mpsc};
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, error, trace, warn};

use super::error::CdpError;
use super::protocol::{BrowserVersion, CdpResponse, PageInfo};
use super::session::PageSession;
use super::transport::{DEFAULT_CALL_TIMEOUT, PendingMap, Transport, WsStream};

type WsSource = SplitStream<WsStream>;
type EventHandlers = Arc<RwLock<HashMap<String, mpsc::UnboundedSender<CdpResponse>>>>;

/// CDP client for browser automation.
///
/// Holds the single browser-level WebSocket. Page sessions share it.
pub struct CdpClient {
    /// HTTP endpoint for page discovery.
    http_endpoint: String,
    /// Browser WebSocket URL.
    browser_ws_url: String,
    transport: Arc<Transport>,
    /// Event channels by session ID.
    event_handlers: EventHandlers,
    /// Background receive task.
    recv_task: tokio::task::JoinHandle<()>,
}

impl CdpClient {
    /// Connect to Chrome at the given endpoint (e.g. `http://localhost:9222`).
    pub async fn connect(endpoint: &str) -> Result<Self, CdpError> {
        let http_endpoint = endpoint.trim_end_matches('/').to_string();

        let version_url = format!("{}/json/version", http_endpoint);
        debug!("Fetching browser version from {}", version_url);

        let version: BrowserVersion = reqwest::get(&version_url)
            .await
            .map_err(|e| CdpError::ChromeNotAvailable(format!("{}: {}", endpoint, e)))?
            .json()
            .await
            .map_err(|e| CdpError::ChromeNotAvailable(format!("{}: {}", endpoint, e)))?;

        debug!("Connected to browser: {}", version.browser);

        let browser_ws_url = version.web_socket_debugger_url;

        let (ws_stream, _) = tokio_tungstenite::connect_async(&browser_ws_url)
            .await
            .map_err(|e| CdpError::ConnectionFailed(format!("WebSocket: {}", e)))?;

        let (ws_sink, ws_source) = ws_stream.split();
        let pending: PendingMap = Arc::new(Mutex::new(HashMap::new()));
        let event_handlers: EventHandlers = Arc::new(RwLock::new(HashMap::new()));

        let recv_task = {
            let pending = pending.clone();
            let event_handlers = event_handlers.clone();
            tokio::spawn(async move {
                Self::receive_loop(ws_source, pending.clone(), event_handlers).await;
                Transport::fail_pending(&pending);
            })
        };

        debug!("CDP client connected to {}", browser_ws_url);

        Ok(Self {
            http_endpoint,
            browser_ws_url,
            transport: Arc::new(Transport::new(ws_sink, pending)),
            event_handlers,
            recv_task,
        })
    }

    /// WebSocket receive loop: route replies to waiters, events to sessions.
    async fn receive_loop(mut ws_source: WsSource, pending: PendingMap, event_handlers: EventHandlers) {
        while let Some(msg) = ws_source.next().await {
            match msg {
                Ok(Message::Text(text)) => {
                    trace!("CDP recv: {}", text);
                    match serde_json::from_str::<CdpResponse>(&text) {
                        Ok(resp) => {
                            if let Some(id) = resp.id {
                                let waiter = pending.lock().remove(&id);
                                if let Some(tx) = waiter {
                                    let result = match resp.error {
                                        Some(error) => Err(CdpError::Protocol {
                                            code: error.code,
                                            message: error.message,
                                        }),
                                        None => Ok(resp.result.unwrap_or(Value::Null)),
                                    };
                                    let _ = tx.send(result);
                                }
                            } else if resp.method.is_some() {
                                let session_id = resp.session_id.clone().unwrap_or_default();
                                let handlers = event_handlers.read().await;
                                if let Some(tx) = handlers.get(&session_id) {
                                    let _ = tx.send(resp);
                                }
                            }
                        }
                        Err(e) => warn!("Failed to parse CDP message: {}", e),
                    }
                }
                Ok(Message::Close(_)) => {
                    debug!("WebSocket closed");
                    break;
                }
                Err(e) => {
                    error!("WebSocket error: {}", e);
                    break;
                }
                _ => {}
            }
        }
    }

    /// Send a browser-level CDP command.
    pub async fn call(&self, method: &str, params: Option<Value>) -> Result<Value, CdpError> {
        self.transport
            .call(method, params, None, DEFAULT_CALL_TIMEOUT)
            .await
    }

    /// Get browser WebSocket URL.
    pub fn browser_ws_url(&self) -> &str {
        &self.browser_ws_url
    }

    /// Whether the receive loop is still running.
    pub fn is_alive(&self) -> bool {
        !self.recv_task.is_finished()
    }

    /// List page targets via the HTTP endpoint.
    pub async fn list_pages(&self) -> Result<Vec<PageInfo>, CdpError> {
        let url = format!("{}/json/list", self.http_endpoint);
        let pages: Vec<PageInfo> = reqwest::get(&url).await?.json().await?;
        Ok(pages.into_iter().filter(|p| p.page_type == "page").collect())
    }

    /// Create a new page/tab.
    pub async fn new_page(&self, url: Option<&str>) -> Result<PageSession, CdpError> {
        // Chrome requires PUT for /json/new
        let create_url = match url {
            Some(u) => format!("{}/json/new?{}", self.http_endpoint, u),
            None => format!("{}/json/new", self.http_endpoint),
        };

        let client = reqwest::Client::new();
        let page_info: PageInfo = client.put(&create_url).send().await?.json().await?;
        debug!("Created new page: {} - {}", page_info.id, page_info.url);

        self.attach_page(&page_info.id).await
    }

    /// Attach to an existing page target.
    pub async fn attach_page(&self, target_id: &str) -> Result<PageSession, CdpError> {
        let result = self
            .call(
                "Target.attachToTarget",
                Some(json!({
                    "targetId": target_id,
                    "flatten": true
                })),
            )
            .await?;

        let session_id = result["sessionId"]
            .as_str()
            .ok_or_else(|| CdpError::InvalidResponse("Missing sessionId".to_string()))?
            .to_string();

        let (event_tx, event_rx) = mpsc::unbounded_channel();
        self.event_handlers
            .write()
            .await
            .insert(session_id.clone(), event_tx);

        let session = PageSession::new(
            target_id.to_string(),
            session_id,
            self.transport.clone(),
            event_rx,
        );

        session.enable_domains().await?;

        Ok(session)
    }

    /// Close a page/target.
    pub async fn close_page(&self, target_id: &str) -> Result<(), CdpError> {
        self.call("Target.closeTarget", Some(json!({"targetId": target_id})))
            .await?;
        Ok(())
    }

    /// Close the WebSocket and stop the receive loop.
    pub async fn close(&self) {
        self.transport.close().await;
        self.recv_task.abort();
    }
}

impl Drop for CdpClient {
    fn drop(&mut self) {
        self.recv_task.abort();
    }
}
