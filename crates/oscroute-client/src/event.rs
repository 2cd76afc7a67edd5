//! Payloads delivered to subscribers

use rosc::OscMessage;

use oscroute_core::RoutingInfo;

/// What a subscriber callback receives
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// The connection opened (`open` channel)
    Open,
    /// The connection closed (`close` channel)
    Close,
    /// A transport or decode error (`error` channel)
    Error(String),
    /// An inbound OSC message, delivered on its address
    Message {
        message: OscMessage,
        info: RoutingInfo,
    },
}

impl Event {
    /// The OSC message, if this is an inbound message
    pub fn message(&self) -> Option<&OscMessage> {
        match self {
            Event::Message { message, .. } => Some(message),
            _ => None,
        }
    }
}
