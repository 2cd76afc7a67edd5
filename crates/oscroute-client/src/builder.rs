//! Client builder pattern

use std::sync::Arc;

use oscroute_transport::{Connector, WebSocketConfig, WebSocketTransport};

use crate::decode::{PacketDecoder, RoscDecoder};
use crate::{Osc, Result};

/// Builder for a WebSocket-backed [`Osc`] client
pub struct OscBuilder {
    config: WebSocketConfig,
    decoder: Arc<dyn PacketDecoder>,
    channels: Vec<String>,
}

impl OscBuilder {
    /// Create a new builder with `ws://localhost:8080` defaults
    pub fn new() -> Self {
        Self {
            config: WebSocketConfig::default(),
            decoder: Arc::new(RoscDecoder),
            channels: Vec::new(),
        }
    }

    /// Replace the whole connection config
    pub fn config(mut self, config: WebSocketConfig) -> Self {
        self.config = config;
        self
    }

    pub fn host(mut self, host: &str) -> Self {
        self.config.host = host.to_string();
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.config.port = Some(port);
        self
    }

    /// Build URLs without an explicit port
    pub fn no_port(mut self) -> Self {
        self.config.port = None;
        self
    }

    /// Use `wss://`
    pub fn secure(mut self, secure: bool) -> Self {
        self.config.secure = secure;
        self
    }

    /// Add a sub-protocol offered during the handshake
    pub fn protocol(mut self, protocol: &str) -> Self {
        self.config.protocol.push(protocol.to_string());
        self
    }

    /// Use a custom packet decoder
    pub fn decoder(mut self, decoder: impl PacketDecoder + 'static) -> Self {
        self.decoder = Arc::new(decoder);
        self
    }

    /// Register an extra lifecycle channel
    pub fn channel(mut self, name: &str) -> Self {
        self.channels.push(name.to_string());
        self
    }

    /// Build on the tokio-tungstenite connector.
    ///
    /// Fails with `TransportUnavailable` outside a tokio runtime.
    #[cfg(feature = "websocket")]
    pub fn build(self) -> Result<Osc<WebSocketTransport>> {
        let transport = WebSocketTransport::new(self.config.clone())?;
        self.finish(transport)
    }

    /// Build on a custom connection primitive
    pub fn build_with_connector(
        self,
        connector: impl Connector + 'static,
    ) -> Result<Osc<WebSocketTransport>> {
        let transport = WebSocketTransport::with_connector(self.config.clone(), connector);
        self.finish(transport)
    }

    fn finish(self, transport: WebSocketTransport) -> Result<Osc<WebSocketTransport>> {
        let osc = Osc::with_decoder(transport, self.decoder);
        for name in &self.channels {
            osc.register_channel(name)?;
        }
        Ok(osc)
    }
}

impl Default for OscBuilder {
    fn default() -> Self {
        Self::new()
    }
}
