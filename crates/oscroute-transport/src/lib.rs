//! oscroute Transport Layer
//!
//! A transport moves opaque bytes to and from the network and reports the
//! connection lifecycle upward through a single notify sink:
//! - [`Transport`]: the capability set (`open`, `close`, `send`, `status`,
//!   `register_notify`)
//! - [`WebSocketTransport`]: the WebSocket implementation, driving a
//!   [`TransportState`](oscroute_core::TransportState) machine
//! - [`Connector`]: the seam to the underlying connection primitive
//!   (tokio-tungstenite by default)

pub mod config;
pub mod connector;
pub mod error;
pub mod state;
pub mod traits;
pub mod websocket;

#[cfg(feature = "websocket")]
pub mod tungstenite;

pub use config::{ConnectOptions, WebSocketConfig};
pub use connector::{ConnectRequest, Connection, ConnectionSignal, Connector, SignalSender};
pub use error::{Result, TransportError};
pub use state::StateMachine;
pub use traits::{NotifySink, Transport, TransportEvent};
pub use websocket::WebSocketTransport;

#[cfg(feature = "websocket")]
pub use tungstenite::TungsteniteConnector;
