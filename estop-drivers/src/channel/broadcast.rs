//! Peer-addressed broadcast link
//!
//! Every data packet received is answered with `[ACK_MARKER, id]` so the
//! sending side sees traffic even when it has nothing to read. Acks refresh
//! liveness but never touch the property store.

use estop_core::config::LinkTimings;
use estop_core::{Channel, PropertyStore, PropertyValue};
use estop_protocol::{ChannelKind, ChannelState, Packet, PropertyId, MAX_PACKET_LEN};

use super::{decode_packet, encode_value, LinkStats};
use crate::transport::{Transport, TransportError};

pub struct BroadcastLink<T> {
    transport: T,
    store: PropertyStore,
    since_receipt_ms: u32,
    faulted: bool,
    rssi: i16,
    stats: LinkStats,
    connected_threshold_ms: u32,
}

impl<T: Transport> BroadcastLink<T> {
    pub fn new(transport: T, timings: &LinkTimings) -> Self {
        Self {
            transport,
            store: PropertyStore::new(),
            since_receipt_ms: u32::MAX,
            faulted: false,
            rssi: 0,
            stats: LinkStats::default(),
            connected_threshold_ms: timings.connected_threshold_ms,
        }
    }

    /// Bring the radio up; a failure leaves the link in `Error`
    pub fn start(&mut self) {
        self.faulted = self.transport.init().is_err();
    }

    pub fn stats(&self) -> LinkStats {
        self.stats
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    fn send(&mut self, packet: &[u8]) {
        let result = self.transport.send(packet);
        self.stats.record_send(&result);
        if let Err(e) = result {
            self.faulted |= e.is_fatal();
        }
    }

    fn acknowledge(&mut self, id: PropertyId) {
        let mut ack = [0u8; 2];
        if let Ok(len) = (Packet::Ack { id: id.to_byte() }).encode(&mut ack) {
            self.send(&ack[..len]);
        }
    }
}

impl<T: Transport> Channel for BroadcastLink<T> {
    fn kind(&self) -> ChannelKind {
        ChannelKind::Broadcast
    }

    fn advance(&mut self, dt_ms: u32) {
        self.store.tick(dt_ms);
        self.since_receipt_ms = self.since_receipt_ms.saturating_add(dt_ms);
    }

    fn poll(&mut self) {
        if self.transport.has_fault() {
            self.faulted = true;
        }

        let mut buf = [0u8; MAX_PACKET_LEN];
        while !self.faulted {
            let received = match self.transport.receive(&mut buf) {
                Ok(Some(received)) => received,
                Ok(None) => break,
                Err(TransportError::Hardware) => {
                    self.faulted = true;
                    break;
                }
                Err(_) => break,
            };
            let Some(packet) = decode_packet(&buf[..received.len], &mut self.stats) else {
                continue;
            };

            self.since_receipt_ms = 0;
            self.rssi = received.rssi.unwrap_or_else(|| self.transport.rssi());
            match packet {
                Packet::Value { id, value } => {
                    self.store.refresh(id, value);
                    self.stats.rx_packets = self.stats.rx_packets.wrapping_add(1);
                    self.acknowledge(id);
                }
                Packet::Ack { .. } => {
                    self.stats.rx_acks = self.stats.rx_acks.wrapping_add(1);
                }
            }
        }
    }

    fn connection_state(&self) -> ChannelState {
        if self.faulted {
            ChannelState::Error
        } else if self.since_receipt_ms < self.connected_threshold_ms {
            ChannelState::Connected
        } else {
            ChannelState::Disconnected
        }
    }

    fn signal_strength(&self) -> i16 {
        self.rssi
    }

    fn read_property(&self, id: PropertyId) -> PropertyValue {
        self.store.get(id).clone()
    }

    fn write_property(&mut self, id: PropertyId, bytes: &[u8]) {
        if self.faulted {
            return;
        }
        if let Some(packet) = encode_value(id, bytes) {
            self.send(&packet);
        }
    }

    fn reinitialize(&mut self) {
        self.store.clear();
        self.since_receipt_ms = u32::MAX;
        self.start();
    }
}
