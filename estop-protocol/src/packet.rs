//! Property packets carried by every radio channel.
//!
//! Packet format:
//! - Data: `[id][value bytes...]`, value may be empty (decodes as stop)
//! - Ack: `[ACK_MARKER][id]`, liveness only, never carries a value

use crate::property::PropertyId;

/// First byte of an acknowledgement packet
pub const ACK_MARKER: u8 = 0xFF;

/// Maximum value length stored per property
pub const MAX_VALUE_LEN: usize = 4;

/// Receive buffer size for one packet
///
/// Larger than `1 + MAX_VALUE_LEN` so oversized values can be seen and
/// rejected instead of truncated.
pub const MAX_PACKET_LEN: usize = 32;

/// Errors that can occur while decoding or encoding a packet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PacketError {
    /// Packet is empty, or an ack without its id
    TooShort,
    /// Property id is not part of the vocabulary
    UnknownProperty(u8),
    /// Value exceeds `MAX_VALUE_LEN`
    ValueTooLong(PropertyId),
    /// Buffer too small for encoding
    BufferTooSmall,
}

/// A decoded property packet borrowing from the receive buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Packet<'a> {
    /// Property value update
    Value { id: PropertyId, value: &'a [u8] },
    /// Acknowledgement of a received value
    Ack { id: u8 },
}

impl<'a> Packet<'a> {
    /// Decode a packet
    pub fn decode(bytes: &'a [u8]) -> Result<Self, PacketError> {
        let (&first, rest) = bytes.split_first().ok_or(PacketError::TooShort)?;

        if first == ACK_MARKER {
            let &id = rest.first().ok_or(PacketError::TooShort)?;
            return Ok(Packet::Ack { id });
        }

        let id = PropertyId::from_byte(first).ok_or(PacketError::UnknownProperty(first))?;
        if rest.len() > MAX_VALUE_LEN {
            return Err(PacketError::ValueTooLong(id));
        }
        Ok(Packet::Value { id, value: rest })
    }

    /// Encode this packet into a byte buffer
    ///
    /// Returns the number of bytes written
    pub fn encode(&self, buffer: &mut [u8]) -> Result<usize, PacketError> {
        match self {
            Packet::Value { id, value } => {
                if value.len() > MAX_VALUE_LEN {
                    return Err(PacketError::ValueTooLong(*id));
                }
                let len = 1 + value.len();
                if buffer.len() < len {
                    return Err(PacketError::BufferTooSmall);
                }
                buffer[0] = id.to_byte();
                buffer[1..len].copy_from_slice(value);
                Ok(len)
            }
            Packet::Ack { id } => {
                if buffer.len() < 2 {
                    return Err(PacketError::BufferTooSmall);
                }
                buffer[0] = ACK_MARKER;
                buffer[1] = *id;
                Ok(2)
            }
        }
    }
}
