//! Decoding boundary for inbound packets
//!
//! The transport hands over opaque bytes; a [`PacketDecoder`] turns them
//! into the OSC messages to route. Bundles are flattened depth-first in
//! content order.

use rosc::{OscMessage, OscPacket};

use crate::error::{ClientError, Result};

pub trait PacketDecoder: Send + Sync {
    fn decode(&self, data: &[u8]) -> Result<Vec<OscMessage>>;
}

/// Decoder backed by `rosc`
#[derive(Debug, Clone, Copy, Default)]
pub struct RoscDecoder;

impl PacketDecoder for RoscDecoder {
    fn decode(&self, data: &[u8]) -> Result<Vec<OscMessage>> {
        if data.is_empty() {
            return Err(ClientError::Decode("empty packet".to_string()));
        }

        let (_, packet) = rosc::decoder::decode_udp(data)?;
        let mut messages = Vec::new();
        flatten(packet, &mut messages);
        Ok(messages)
    }
}

fn flatten(packet: OscPacket, out: &mut Vec<OscMessage>) {
    match packet {
        OscPacket::Message(msg) => out.push(msg),
        OscPacket::Bundle(bundle) => {
            for inner in bundle.content {
                flatten(inner, out);
            }
        }
    }
}
