//! Connection status and inbound data provenance

use serde::{Deserialize, Serialize};

/// Status of a transport's underlying connection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportState {
    /// No connection has ever been opened
    #[default]
    NotInitialized,
    /// `open()` was called, waiting for the connection to come up
    Connecting,
    /// Connected, `send` is allowed
    Open,
    /// `close()` was called, waiting for teardown
    Closing,
    /// The connection is gone
    Closed,
}

impl TransportState {
    /// Numeric status code, compatible with the WebSocket `readyState`
    /// values plus `-1` for "not initialized"
    pub fn code(self) -> i8 {
        match self {
            TransportState::NotInitialized => -1,
            TransportState::Connecting => 0,
            TransportState::Open => 1,
            TransportState::Closing => 2,
            TransportState::Closed => 3,
        }
    }

    pub fn from_code(code: i8) -> Option<Self> {
        match code {
            -1 => Some(TransportState::NotInitialized),
            0 => Some(TransportState::Connecting),
            1 => Some(TransportState::Open),
            2 => Some(TransportState::Closing),
            3 => Some(TransportState::Closed),
            _ => None,
        }
    }

    pub fn is_open(self) -> bool {
        self == TransportState::Open
    }
}

impl std::fmt::Display for TransportState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            TransportState::NotInitialized => "not initialized",
            TransportState::Connecting => "connecting",
            TransportState::Open => "open",
            TransportState::Closing => "closing",
            TransportState::Closed => "closed",
        };
        f.write_str(s)
    }
}

/// Where a piece of inbound data came from.
///
/// Host, scheme and port are fixed per connection. `size` is left at zero by
/// the transport and filled in by the decoding layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutingInfo {
    /// Remote host
    pub address: String,
    /// URL scheme (`ws` or `wss`)
    pub family: String,
    /// Remote port, if one was configured
    pub port: Option<u16>,
    /// Packet size in bytes
    pub size: usize,
}

impl RoutingInfo {
    pub fn new(address: impl Into<String>, family: impl Into<String>, port: Option<u16>) -> Self {
        Self {
            address: address.into(),
            family: family.into(),
            port,
            size: 0,
        }
    }

    pub fn with_size(mut self, size: usize) -> Self {
        self.size = size;
        self
    }
}
