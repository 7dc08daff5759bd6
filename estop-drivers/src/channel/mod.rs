//! Channel variants
//!
//! Each variant wraps one [`Transport`](crate::Transport) and implements
//! [`estop_core::Channel`] with its own connectivity policy:
//!
//! | Variant | Connected while |
//! |---------|-----------------|
//! | [`RadioLink`] broadcaster | always, unless faulted |
//! | [`RadioLink`] listener | last valid packet younger than the threshold |
//! | [`ShortRangeLink`] | paired and last activity younger than the threshold |
//! | [`BroadcastLink`] | last data or ack younger than the threshold |

pub mod broadcast;
pub mod radio;
pub mod short_range;

pub use broadcast::BroadcastLink;
pub use radio::{RadioLink, RadioRole};
pub use short_range::ShortRangeLink;

use estop_protocol::{Packet, PacketError, PropertyId, MAX_PACKET_LEN};
use heapless::Vec;

/// Raw bytes of one outgoing packet
pub type PacketBytes = Vec<u8, MAX_PACKET_LEN>;

/// Per-channel traffic counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LinkStats {
    /// Packets accepted into the property store
    pub rx_packets: u32,
    /// Acknowledgements received
    pub rx_acks: u32,
    /// Packets dropped or truncated as malformed
    pub malformed: u32,
    /// Sends accepted by the transport
    pub tx_ok: u32,
    /// Sends rejected by the transport
    pub tx_failed: u32,
}

impl LinkStats {
    pub(crate) fn record_send<E>(&mut self, result: &Result<(), E>) {
        match result {
            Ok(()) => self.tx_ok = self.tx_ok.wrapping_add(1),
            Err(_) => self.tx_failed = self.tx_failed.wrapping_add(1),
        }
    }
}

/// Decode a received packet, counting anything malformed
///
/// An oversized value for a known property comes back as an empty value so
/// the receiver stores "stop" rather than keeping the previous reading.
pub(crate) fn decode_packet<'a>(bytes: &'a [u8], stats: &mut LinkStats) -> Option<Packet<'a>> {
    match Packet::decode(bytes) {
        Ok(packet) => Some(packet),
        Err(PacketError::ValueTooLong(id)) => {
            stats.malformed = stats.malformed.wrapping_add(1);
            Some(Packet::Value { id, value: &[] })
        }
        Err(_) => {
            stats.malformed = stats.malformed.wrapping_add(1);
            None
        }
    }
}

/// Encode a value packet into an owned buffer
pub(crate) fn encode_value(id: PropertyId, value: &[u8]) -> Option<PacketBytes> {
    let mut buf = [0u8; MAX_PACKET_LEN];
    let len = Packet::Value { id, value }.encode(&mut buf).ok()?;
    Vec::from_slice(&buf[..len]).ok()
}
