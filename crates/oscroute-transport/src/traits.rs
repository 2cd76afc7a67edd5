//! Transport trait definitions

use bytes::Bytes;
use std::sync::Arc;

use oscroute_core::{RoutingInfo, TransportState};

use crate::config::ConnectOptions;
use crate::error::Result;

/// Events a transport reports upward
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// Connection established
    Opened,
    /// Connection gone
    Closed,
    /// Underlying connection error; does not change the transport state
    Errored(String),
    /// Inbound payload with its provenance
    Data(Bytes, RoutingInfo),
}

/// The single callback a transport reports events to
pub type NotifySink = Arc<dyn Fn(TransportEvent) + Send + Sync>;

/// A sink that drops every event
pub fn noop_sink() -> NotifySink {
    Arc::new(|_| {})
}

/// Main transport trait
///
/// None of the methods block. Connection progress is reported later through
/// the sink installed with [`Transport::register_notify`].
pub trait Transport: Send + Sync {
    /// Start connecting, force-closing any existing connection first.
    ///
    /// The replaced connection is dropped silently: its teardown raises no
    /// `Closed` event, only the new connection's events are reported.
    fn open(&self, options: ConnectOptions) -> Result<()>;

    /// Request teardown of the live connection.
    ///
    /// Requires a connection to exist; returns `NotConnected` otherwise.
    fn close(&self) -> Result<()>;

    /// Forward an opaque payload. Requires state `Open`; nothing is queued.
    fn send(&self, data: Bytes) -> Result<()>;

    /// Current connection status
    fn status(&self) -> TransportState;

    /// Install the notify sink, replacing any previous one
    fn register_notify(&self, sink: NotifySink);
}
