//! Short-range paired link

use estop_core::config::LinkTimings;
use estop_core::{Channel, PropertyStore, PropertyValue};
use estop_protocol::{ChannelKind, ChannelState, Packet, PropertyId, MAX_PACKET_LEN};

use super::{decode_packet, encode_value, LinkStats};
use crate::transport::Transport;

/// Point-to-point link that only exists while the radio stack is paired
///
/// Activity is either a received packet or a write the transport confirmed.
/// The link is connected while paired and active within the threshold.
pub struct ShortRangeLink<T> {
    transport: T,
    store: PropertyStore,
    since_activity_ms: u32,
    faulted: bool,
    rssi: i16,
    stats: LinkStats,
    connected_threshold_ms: u32,
}

impl<T: Transport> ShortRangeLink<T> {
    pub fn new(transport: T, timings: &LinkTimings) -> Self {
        Self {
            transport,
            store: PropertyStore::new(),
            since_activity_ms: u32::MAX,
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
}

impl<T: Transport> Channel for ShortRangeLink<T> {
    fn kind(&self) -> ChannelKind {
        ChannelKind::ShortRange
    }

    fn advance(&mut self, dt_ms: u32) {
        self.store.tick(dt_ms);
        self.since_activity_ms = self.since_activity_ms.saturating_add(dt_ms);
    }

    fn poll(&mut self) {
        if self.transport.has_fault() {
            self.faulted = true;
        }
        if self.faulted {
            return;
        }

        let mut buf = [0u8; MAX_PACKET_LEN];
        loop {
            let received = match self.transport.receive(&mut buf) {
                Ok(Some(received)) => received,
                Ok(None) => break,
                Err(e) => {
                    self.faulted = e.is_fatal();
                    break;
                }
            };
            let Some(packet) = decode_packet(&buf[..received.len], &mut self.stats) else {
                continue;
            };

            match packet {
                Packet::Value { id, value } => {
                    self.store.refresh(id, value);
                    self.stats.rx_packets = self.stats.rx_packets.wrapping_add(1);
                }
                Packet::Ack { .. } => {
                    self.stats.rx_acks = self.stats.rx_acks.wrapping_add(1);
                }
            }
            self.since_activity_ms = 0;
            self.rssi = received.rssi.unwrap_or_else(|| self.transport.rssi());
        }
    }

    fn connection_state(&self) -> ChannelState {
        if self.faulted {
            ChannelState::Error
        } else if self.transport.is_paired()
            && self.since_activity_ms < self.connected_threshold_ms
        {
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
        if self.faulted || !self.transport.is_paired() {
            return;
        }
        let Some(packet) = encode_value(id, bytes) else {
            return;
        };

        let result = self.transport.send(&packet);
        self.stats.record_send(&result);
        match result {
            Ok(()) => self.since_activity_ms = 0,
            Err(e) if e.is_fatal() => self.faulted = true,
            Err(_) => {}
        }
    }

    fn reinitialize(&mut self) {
        self.store.clear();
        self.since_activity_ms = u32::MAX;
        self.start();
    }
}
