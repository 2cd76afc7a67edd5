//! oscroute Core
//!
//! Shared primitives for the oscroute client stack:
//! - Address normalization ([`Address`])
//! - Connection status ([`TransportState`])
//! - Provenance of inbound data ([`RoutingInfo`])
//! - Error types ([`Error`])

pub mod address;
pub mod error;
pub mod state;

pub use address::Address;
pub use error::{Error, Result};
pub use state::{RoutingInfo, TransportState};

/// Default host used when no host is configured
pub const DEFAULT_HOST: &str = "localhost";

/// Default WebSocket port
pub const DEFAULT_PORT: u16 = 8080;

/// Plaintext WebSocket scheme
pub const WS_SCHEME: &str = "ws";

/// Encrypted WebSocket scheme
pub const WSS_SCHEME: &str = "wss";

/// Lifecycle channel fired when the connection opens
pub const CHANNEL_OPEN: &str = "open";

/// Lifecycle channel fired on transport errors
pub const CHANNEL_ERROR: &str = "error";

/// Lifecycle channel fired when the connection closes
pub const CHANNEL_CLOSE: &str = "close";

/// Channels every router knows about from construction
pub const LIFECYCLE_CHANNELS: [&str; 3] = [CHANNEL_OPEN, CHANNEL_ERROR, CHANNEL_CLOSE];
