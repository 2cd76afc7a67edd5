//! Main client implementation
//!
//! [`Osc`] owns one router and one transport for its whole lifetime. The
//! transport's notify sink is wired to the router at construction, so
//! connection events and inbound packets reach subscribers without further
//! glue.

use bytes::Bytes;
use rosc::OscPacket;
use std::sync::Arc;
use tracing::{debug, trace};

use oscroute_core::{Address, Error, TransportState, CHANNEL_CLOSE, CHANNEL_ERROR, CHANNEL_OPEN};
use oscroute_router::{AddressRouter, Pattern, Token};
use oscroute_transport::{ConnectOptions, NotifySink, Transport, TransportEvent, WebSocketTransport};

use crate::builder::OscBuilder;
use crate::decode::{PacketDecoder, RoscDecoder};
use crate::error::{ClientError, Result};
use crate::event::Event;

/// An OSC client
pub struct Osc<T: Transport = WebSocketTransport> {
    router: Arc<AddressRouter<Event>>,
    transport: T,
}

impl Osc<WebSocketTransport> {
    /// Client with the default WebSocket configuration (`ws://localhost:8080`)
    #[cfg(feature = "websocket")]
    pub fn new() -> Result<Self> {
        OscBuilder::new().build()
    }

    /// Create a builder
    pub fn builder() -> OscBuilder {
        OscBuilder::new()
    }
}

impl<T: Transport> Osc<T> {
    /// Wrap an existing transport, decoding inbound data with `rosc`
    pub fn with_transport(transport: T) -> Self {
        Self::with_decoder(transport, Arc::new(RoscDecoder))
    }

    pub fn with_decoder(transport: T, decoder: Arc<dyn PacketDecoder>) -> Self {
        let router = Arc::new(AddressRouter::new());
        transport.register_notify(router_sink(Arc::clone(&router), decoder));

        Self { router, transport }
    }

    /// Subscribe to a lifecycle channel or an OSC address
    pub fn on<F>(&self, pattern: impl Into<Pattern>, callback: F) -> Result<Token>
    where
        F: Fn(&Event) + Send + Sync + 'static,
    {
        Ok(self.router.subscribe(pattern, callback)?)
    }

    /// Remove a subscription. Returns whether anything was removed.
    pub fn off(&self, pattern: impl Into<Pattern>, token: &Token) -> Result<bool> {
        Ok(self.router.unsubscribe(pattern, token)?)
    }

    /// Dispatch `event` to the subscribers of `pattern` directly
    pub fn notify(&self, pattern: impl Into<Pattern>, event: &Event) -> Result<bool> {
        Ok(self.router.dispatch(pattern, event)?)
    }

    /// Register an additional lifecycle channel name
    pub fn register_channel(&self, name: &str) -> Result<()> {
        Ok(self.router.register_channel(name)?)
    }

    /// Connect, closing any existing connection first
    pub fn open(&self, options: ConnectOptions) -> Result<()> {
        Ok(self.transport.open(options)?)
    }

    /// Connect to `host:port`; both are required
    pub fn server(&self, host: &str, port: u16) -> Result<()> {
        if host.is_empty() || port == 0 {
            return Err(Error::invalid_argument("missing WebSocket address or port").into());
        }
        self.open(ConnectOptions::new().host(host).port(port))
    }

    /// Close the live connection. Requires one to exist.
    pub fn close(&self) -> Result<()> {
        Ok(self.transport.close()?)
    }

    /// Send an already encoded packet. Requires status `Open`.
    pub fn send(&self, data: impl Into<Bytes>) -> Result<()> {
        Ok(self.transport.send(data.into())?)
    }

    /// Encode `packet` and send it
    pub fn send_packet(&self, packet: &OscPacket) -> Result<()> {
        let bytes =
            rosc::encoder::encode(packet).map_err(|e| ClientError::Encode(format!("{:?}", e)))?;
        self.send(bytes)
    }

    pub fn status(&self) -> TransportState {
        self.transport.status()
    }

    pub fn router(&self) -> &AddressRouter<Event> {
        &self.router
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }
}

impl<T: Transport> std::fmt::Debug for Osc<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Osc")
            .field("router", &self.router)
            .field("status", &self.status())
            .finish_non_exhaustive()
    }
}

fn router_sink(router: Arc<AddressRouter<Event>>, decoder: Arc<dyn PacketDecoder>) -> NotifySink {
    Arc::new(move |event: TransportEvent| route_event(&router, decoder.as_ref(), event))
}

fn route_event(router: &AddressRouter<Event>, decoder: &dyn PacketDecoder, event: TransportEvent) {
    match event {
        TransportEvent::Opened => dispatch_channel(router, CHANNEL_OPEN, &Event::Open),
        TransportEvent::Closed => dispatch_channel(router, CHANNEL_CLOSE, &Event::Close),
        TransportEvent::Errored(message) => dispatch_error(router, message),
        TransportEvent::Data(data, info) => match decoder.decode(&data) {
            Ok(messages) => {
                let info = info.with_size(data.len());
                for message in messages {
                    // Inbound addresses never resolve to channels
                    let address = Address::normalize(&message.addr);
                    let event = Event::Message {
                        message,
                        info: info.clone(),
                    };
                    match router.dispatch(&address, &event) {
                        Ok(true) => trace!("Routed message to {}", address),
                        Ok(false) => trace!("No subscribers for {}", address),
                        Err(e) => debug!("Dispatch to {} failed: {}", address, e),
                    }
                }
            }
            Err(e) => dispatch_error(router, e.to_string()),
        },
    }
}

fn dispatch_channel(router: &AddressRouter<Event>, channel: &str, event: &Event) {
    if let Err(e) = router.dispatch(channel, event) {
        debug!("Dispatch to channel {} failed: {}", channel, e);
    }
}

fn dispatch_error(router: &AddressRouter<Event>, message: String) {
    let event = Event::Error(message);
    match router.dispatch(CHANNEL_ERROR, &event) {
        Ok(true) => {}
        // Errors without an `error` subscriber are dropped
        Ok(false) => debug!("Dropped unobserved error: {:?}", event),
        Err(e) => debug!("Dispatch to error channel failed: {}", e),
    }
}
