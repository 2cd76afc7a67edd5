//! Seam between a transport and its underlying connection primitive
//!
//! A [`Connector`] creates a [`Connection`] and reports what happens to it
//! through a [`SignalSender`]. Signals carry the generation of the
//! connection they belong to, so a transport can ignore signals from a
//! connection it has already replaced.

use bytes::Bytes;
use std::fmt;
use std::sync::Arc;
use url::Url;

use crate::error::Result;

/// Raw signals from an underlying connection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionSignal {
    Connected,
    Disconnected { reason: Option<String> },
    Error(String),
    Data(Bytes),
}

/// What to connect to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectRequest {
    pub url: Url,
    pub protocols: Vec<String>,
}

/// A live underlying connection
pub trait Connection: Send + Sync {
    /// Queue a payload for sending
    fn send(&self, data: Bytes) -> Result<()>;

    /// Request teardown; completion is reported later as `Disconnected`.
    /// Must not report signals from inside this call.
    fn close(&self);
}

/// Factory for underlying connections.
///
/// `connect` must not block: the connection comes up in the background and
/// reports progress through `signals`. It must not report signals from
/// inside the call; the transport holds its state lock while connecting.
pub trait Connector: Send + Sync {
    fn connect(
        &self,
        request: ConnectRequest,
        signals: SignalSender,
    ) -> Result<Box<dyn Connection>>;
}

type SignalHandler = Arc<dyn Fn(u64, ConnectionSignal) + Send + Sync>;

/// Handle a connection uses to report signals back to its transport
#[derive(Clone)]
pub struct SignalSender {
    generation: u64,
    handler: SignalHandler,
}

impl SignalSender {
    pub fn new<F>(generation: u64, handler: F) -> Self
    where
        F: Fn(u64, ConnectionSignal) + Send + Sync + 'static,
    {
        Self {
            generation,
            handler: Arc::new(handler),
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn send(&self, signal: ConnectionSignal) {
        (self.handler)(self.generation, signal);
    }

    pub fn connected(&self) {
        self.send(ConnectionSignal::Connected);
    }

    pub fn disconnected(&self, reason: Option<String>) {
        self.send(ConnectionSignal::Disconnected { reason });
    }

    pub fn error(&self, message: impl Into<String>) {
        self.send(ConnectionSignal::Error(message.into()));
    }

    pub fn data(&self, data: Bytes) {
        self.send(ConnectionSignal::Data(data));
    }
}

impl fmt::Debug for SignalSender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignalSender")
            .field("generation", &self.generation)
            .finish_non_exhaustive()
    }
}
