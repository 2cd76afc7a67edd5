//! tokio-tungstenite connector
//!
//! Each connection runs as one task on the runtime captured at construction.
//! The task owns the socket; the [`Connection`] handle only talks to it over
//! a channel.

use bytes::Bytes;
use futures_util::{SinkExt, StreamExt};
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio_tungstenite::{
    connect_async,
    tungstenite::{
        client::IntoClientRequest, http::HeaderValue, protocol::Message as WsMessage,
        Error as WsError,
    },
};
use tracing::{debug, error, info, warn};

use oscroute_core::Error;

use crate::connector::{ConnectRequest, Connection, Connector, SignalSender};
use crate::error::{Result, TransportError};

const SUBPROTOCOL_HEADER: &str = "Sec-WebSocket-Protocol";

enum Outbound {
    Frame(Bytes),
    Close,
}

/// Connector backed by tokio-tungstenite
#[derive(Debug, Clone)]
pub struct TungsteniteConnector {
    runtime: Handle,
}

impl TungsteniteConnector {
    /// Capture the current tokio runtime.
    ///
    /// Fails with `TransportUnavailable` when called outside a runtime.
    pub fn new() -> Result<Self> {
        let runtime = Handle::try_current()
            .map_err(|e| Error::TransportUnavailable(format!("no tokio runtime: {}", e)))?;
        Ok(Self { runtime })
    }

    pub fn with_runtime(runtime: Handle) -> Self {
        Self { runtime }
    }
}

impl Connector for TungsteniteConnector {
    fn connect(
        &self,
        request: ConnectRequest,
        signals: SignalSender,
    ) -> Result<Box<dyn Connection>> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.runtime.spawn(run_connection(request, signals, rx));
        Ok(Box::new(TungsteniteConnection { tx }))
    }
}

struct TungsteniteConnection {
    tx: mpsc::UnboundedSender<Outbound>,
}

impl Connection for TungsteniteConnection {
    fn send(&self, data: Bytes) -> Result<()> {
        self.tx
            .send(Outbound::Frame(data))
            .map_err(|_| TransportError::SendFailed("connection task stopped".to_string()))
    }

    fn close(&self) {
        let _ = self.tx.send(Outbound::Close);
    }
}

async fn run_connection(
    request: ConnectRequest,
    signals: SignalSender,
    mut rx: mpsc::UnboundedReceiver<Outbound>,
) {
    let mut client_request = match request.url.as_str().into_client_request() {
        Ok(req) => req,
        Err(e) => {
            fail(&signals, e.to_string());
            return;
        }
    };

    if !request.protocols.is_empty() {
        match HeaderValue::from_str(&request.protocols.join(", ")) {
            Ok(value) => {
                client_request.headers_mut().insert(SUBPROTOCOL_HEADER, value);
            }
            Err(e) => {
                fail(&signals, format!("invalid sub-protocol: {}", e));
                return;
            }
        }
    }

    let handshake = connect_async(client_request);
    tokio::pin!(handshake);

    // A close requested while connecting abandons the handshake
    let ws_stream = tokio::select! {
        result = &mut handshake => match result {
            Ok((stream, response)) => {
                debug!("WebSocket handshake done, status {:?}", response.status());
                if let Some(protocol) = response.headers().get(SUBPROTOCOL_HEADER) {
                    debug!("Server sub-protocol: {:?}", protocol);
                }
                stream
            }
            Err(e) => {
                error!("WebSocket connect to {} failed: {}", request.url, e);
                fail(&signals, e.to_string());
                return;
            }
        },
        outbound = wait_for_close(&mut rx) => {
            debug!("Handshake with {} abandoned: {}", request.url, outbound);
            signals.disconnected(None);
            return;
        }
    };

    signals.connected();

    let (mut write, mut read) = ws_stream.split();
    let mut closing = false;
    let mut reason = None;

    loop {
        tokio::select! {
            outbound = rx.recv(), if !closing => match outbound {
                Some(Outbound::Frame(data)) => {
                    if let Err(e) = write.send(WsMessage::Binary(data.to_vec())).await {
                        error!("WebSocket write error: {}", e);
                        signals.error(e.to_string());
                    }
                }
                Some(Outbound::Close) | None => {
                    debug!("Sending close frame");
                    closing = true;
                    if let Err(e) = write.send(WsMessage::Close(None)).await {
                        debug!("Close frame not sent: {}", e);
                        break;
                    }
                }
            },
            inbound = read.next() => match inbound {
                Some(Ok(WsMessage::Binary(data))) => signals.data(Bytes::from(data)),
                Some(Ok(WsMessage::Text(text))) => {
                    warn!("Received text message, forwarding as bytes");
                    signals.data(Bytes::from(text));
                }
                Some(Ok(WsMessage::Close(frame))) => {
                    reason = frame.map(|f| f.reason.to_string());
                    info!("WebSocket close frame: {:?}", reason);
                }
                Some(Ok(_)) => {}
                Some(Err(WsError::ConnectionClosed | WsError::AlreadyClosed)) | None => break,
                Some(Err(e)) => {
                    error!("WebSocket read error: {}", e);
                    signals.error(e.to_string());
                    reason = Some(e.to_string());
                    break;
                }
            },
        }
    }

    signals.disconnected(reason);
}

/// Resolves once the handle asks for teardown or is dropped. Frames queued
/// before the socket is up are discarded.
async fn wait_for_close(rx: &mut mpsc::UnboundedReceiver<Outbound>) -> &'static str {
    loop {
        match rx.recv().await {
            Some(Outbound::Frame(_)) => debug!("Dropping frame queued before handshake"),
            Some(Outbound::Close) => return "close requested",
            None => return "handle dropped",
        }
    }
}

fn fail(signals: &SignalSender, message: String) {
    signals.error(message.clone());
    signals.disconnected(Some(message));
}
