//! oscroute Client Library
//!
//! Subscribe to OSC addresses and connection lifecycle events; inbound
//! packets from the transport are decoded and routed to matching
//! subscribers.
//!
//! # Example
//!
//! ```no_run
//! use oscroute_client::{Event, Osc};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let osc = Osc::builder().host("localhost").port(9912).build()?;
//!
//!     osc.on("open", |_: &Event| println!("connected"))?;
//!     osc.on("/synth/1/freq", |event: &Event| {
//!         if let Event::Message { message, .. } = event {
//!             println!("{} {:?}", message.addr, message.args);
//!         }
//!     })?;
//!
//!     osc.open(Default::default())?;
//!     Ok(())
//! }
//! ```

pub mod builder;
pub mod client;
pub mod decode;
pub mod error;
pub mod event;

pub use builder::OscBuilder;
pub use client::Osc;
pub use decode::{PacketDecoder, RoscDecoder};
pub use error::{ClientError, Result};
pub use event::Event;

pub use oscroute_core::{Address, RoutingInfo, TransportState};
pub use oscroute_router::{Pattern, Token};
pub use oscroute_transport::{ConnectOptions, Transport, WebSocketConfig};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::builder::OscBuilder;
    pub use crate::client::Osc;
    pub use crate::error::{ClientError, Result};
    pub use crate::event::Event;
    pub use oscroute_core::TransportState;
    pub use oscroute_transport::ConnectOptions;
    pub use rosc::{OscMessage, OscPacket, OscType};
}
