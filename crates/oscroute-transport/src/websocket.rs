//! WebSocket transport
//!
//! Owns the connection state machine and translates connection signals into
//! [`TransportEvent`]s for the registered notify sink. The actual socket is
//! provided by a [`Connector`].

use bytes::Bytes;
use parking_lot::{Mutex, RwLock};
use std::sync::{Arc, Weak};
use tracing::{debug, info, warn};

use oscroute_core::{RoutingInfo, TransportState};

use crate::config::{ConnectOptions, WebSocketConfig};
use crate::connector::{ConnectRequest, Connection, ConnectionSignal, Connector, SignalSender};
use crate::error::{Result, TransportError};
use crate::state::StateMachine;
use crate::traits::{noop_sink, NotifySink, Transport, TransportEvent};

/// Per-connection bookkeeping
struct Link {
    machine: StateMachine,
    generation: u64,
    connection: Option<Box<dyn Connection>>,
    info: Option<RoutingInfo>,
}

struct Shared {
    config: WebSocketConfig,
    connector: Arc<dyn Connector>,
    link: Mutex<Link>,
    notify: RwLock<NotifySink>,
}

impl Shared {
    fn emit(&self, event: TransportEvent) {
        let sink = self.notify.read().clone();
        sink(event);
    }

    fn handle_signal(&self, generation: u64, signal: ConnectionSignal) {
        let event = {
            let mut link = self.link.lock();
            if link.generation != generation {
                debug!("Ignoring {:?} from superseded connection {}", signal, generation);
                return;
            }

            match signal {
                ConnectionSignal::Connected => {
                    if !link.machine.connected() {
                        debug!("Connected signal ignored in state {}", link.machine.state());
                        return;
                    }
                    info!("WebSocket connection {} open", generation);
                    TransportEvent::Opened
                }
                ConnectionSignal::Disconnected { reason } => {
                    if !link.machine.disconnected() {
                        debug!("Disconnected signal ignored in state {}", link.machine.state());
                        return;
                    }
                    link.connection = None;
                    info!("WebSocket connection {} closed: {:?}", generation, reason);
                    TransportEvent::Closed
                }
                ConnectionSignal::Error(message) => {
                    warn!("WebSocket connection {} error: {}", generation, message);
                    TransportEvent::Errored(message)
                }
                ConnectionSignal::Data(data) => {
                    let Some(info) = link.info.clone() else {
                        return;
                    };
                    TransportEvent::Data(data, info)
                }
            }
        };

        self.emit(event);
    }
}

/// WebSocket transport
#[derive(Clone)]
pub struct WebSocketTransport {
    shared: Arc<Shared>,
}

impl WebSocketTransport {
    /// Create a transport backed by tokio-tungstenite.
    ///
    /// Fails with `TransportUnavailable` outside a tokio runtime.
    #[cfg(feature = "websocket")]
    pub fn new(config: WebSocketConfig) -> Result<Self> {
        let connector = crate::tungstenite::TungsteniteConnector::new()?;
        Ok(Self::with_connector(config, connector))
    }

    /// Create a transport over any connection primitive
    pub fn with_connector(config: WebSocketConfig, connector: impl Connector + 'static) -> Self {
        Self::with_shared_connector(config, Arc::new(connector))
    }

    pub fn with_shared_connector(config: WebSocketConfig, connector: Arc<dyn Connector>) -> Self {
        Self {
            shared: Arc::new(Shared {
                config,
                connector,
                link: Mutex::new(Link {
                    machine: StateMachine::new(),
                    generation: 0,
                    connection: None,
                    info: None,
                }),
                notify: RwLock::new(noop_sink()),
            }),
        }
    }

    /// The base configuration `open` overrides are merged onto
    pub fn config(&self) -> &WebSocketConfig {
        &self.shared.config
    }

    fn signal_sender(&self, generation: u64) -> SignalSender {
        let weak: Weak<Shared> = Arc::downgrade(&self.shared);
        SignalSender::new(generation, move |generation, signal| {
            if let Some(shared) = weak.upgrade() {
                shared.handle_signal(generation, signal);
            }
        })
    }
}

impl Transport for WebSocketTransport {
    fn open(&self, options: ConnectOptions) -> Result<()> {
        let config = self.shared.config.merge(&options);
        let request = ConnectRequest {
            url: config.url()?,
            protocols: config.protocol.clone(),
        };

        let mut link = self.shared.link.lock();
        if let Some(previous) = link.connection.take() {
            info!("Closing connection {} before reopening", link.generation);
            previous.close();
        }

        link.generation += 1;
        link.machine.open_requested();
        link.info = Some(config.routing_info());
        let generation = link.generation;

        info!("Connecting to {}", request.url);

        // Held across `connect` so the connection is stored before any of its
        // signals can be handled.
        match self
            .shared
            .connector
            .connect(request, self.signal_sender(generation))
        {
            Ok(connection) => {
                link.connection = Some(connection);
                Ok(())
            }
            Err(e) => {
                link.machine.disconnected();
                Err(e)
            }
        }
    }

    fn close(&self) -> Result<()> {
        let mut link = self.shared.link.lock();
        let Some(connection) = link.connection.as_ref() else {
            return Err(TransportError::NotConnected);
        };

        connection.close();
        link.machine.close_requested();
        debug!("Close requested for connection {}", link.generation);
        Ok(())
    }

    fn send(&self, data: Bytes) -> Result<()> {
        let link = self.shared.link.lock();
        if !link.machine.state().is_open() {
            return Err(TransportError::NotConnected);
        }

        match link.connection.as_ref() {
            Some(connection) => connection.send(data),
            None => Err(TransportError::NotConnected),
        }
    }

    fn status(&self) -> TransportState {
        self.shared.link.lock().machine.state()
    }

    fn register_notify(&self, sink: NotifySink) {
        *self.shared.notify.write() = sink;
    }
}

impl std::fmt::Debug for WebSocketTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebSocketTransport")
            .field("config", &self.shared.config)
            .field("status", &self.status())
            .finish_non_exhaustive()
    }
}
