//! Request/response plumbing shared by the client and its page sessions.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use futures::SinkExt;
use futures::stream::SplitSink;
use parking_lot::Mutex;
use serde_json::Value;
use tokio::net::TcpStream;
use tokio::sync::oneshot;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tracing::trace;

use super::error::CdpError;
use super::protocol::CdpRequest;

pub(crate) type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
pub(crate) type WsSink = SplitSink<WsStream, Message>;

/// Default wait for a CDP reply.
pub(crate) const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(30);

pub(crate) type PendingMap = Arc<Mutex<HashMap<u64, oneshot::Sender<Result<Value, CdpError>>>>>;

/// Outgoing half of the browser socket plus the table of in-flight requests.
pub(crate) struct Transport {
    ws_tx: tokio::sync::Mutex<WsSink>,
    request_id: AtomicU64,
    pending: PendingMap,
}

impl Transport {
    pub(crate) fn new(ws_tx: WsSink, pending: PendingMap) -> Self {
        Self {
            ws_tx: tokio::sync::Mutex::new(ws_tx),
            request_id: AtomicU64::new(1),
            pending,
        }
    }

    /// Send a command and wait up to `timeout` for its reply.
    pub(crate) async fn call(
        &self,
        method: &str,
        params: Option<Value>,
        session_id: Option<&str>,
        timeout: Duration,
    ) -> Result<Value, CdpError> {
        let id = self.request_id.fetch_add(1, Ordering::SeqCst);

        let request = CdpRequest {
            id,
            method: method.to_string(),
            params,
            session_id: session_id.map(str::to_string),
        };

        let json = serde_json::to_string(&request)?;
        trace!("CDP send: {}", json);

        let (tx, rx) = oneshot::channel();
        self.pending.lock().insert(id, tx);

        let sent = {
            let mut ws = self.ws_tx.lock().await;
            ws.send(Message::Text(json.into())).await
        };
        if let Err(e) = sent {
            self.pending.lock().remove(&id);
            return Err(e.into());
        }

        match tokio::time::timeout(timeout, rx).await {
            Ok(Ok(result)) => result,
            Ok(Err(_)) => Err(CdpError::SessionClosed),
            Err(_) => {
                self.pending.lock().remove(&id);
                Err(CdpError::Timeout(format!(
                    "{} timed out after {}ms",
                    method,
                    timeout.as_millis()
                )))
            }
        }
    }

    /// Fail every in-flight request, used when the socket goes away.
    pub(crate) fn fail_pending(pending: &PendingMap) {
        for (_, tx) in pending.lock().drain() {
            let _ = tx.send(Err(CdpError::SessionClosed));
        }
    }

    /// Close the socket.
    pub(crate) async fn close(&self) {
        let mut ws = self.ws_tx.lock().await;
        let _ = ws.close().await;
    }
}
