//! Duty-cycled long-range radio link
//!
//! The long-range radio is half-duplex and slow, so each end has a fixed
//! role. The broadcaster keeps re-sending its latest E-Stop packet and
//! never hears back; the listener judges liveness purely from arrivals.
//! Soft E-Stop rides along only when it changes, so the E-Stop refresh
//! period stays one packet airtime.
//! Radio completion arrives from interrupt context through a
//! [`CompletionFlag`]: TX-done for the broadcaster, RX-ready for the
//! listener.

use estop_core::config::LinkTimings;
use estop_core::{Channel, CompletionFlag, PropertyStore, PropertyValue};
use estop_protocol::{ChannelKind, ChannelState, Packet, PropertyId, MAX_PACKET_LEN};

use super::{decode_packet, encode_value, LinkStats, PacketBytes};
use crate::transport::Transport;

/// Properties carried over the long-range radio
const CARRIED: [PropertyId; 2] = [PropertyId::Estop, PropertyId::SoftEstop];

/// Slot of the packet the broadcaster keeps re-sending
const ESTOP_SLOT: usize = 0;

/// Slot sent once per change
const SOFT_ESTOP_SLOT: usize = 1;

fn carried_slot(id: PropertyId) -> Option<usize> {
    CARRIED.iter().position(|&carried| carried == id)
}

/// Which end of the long-range link this is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RadioRole {
    /// Transmit-only end, reports connected unless faulted
    Broadcaster,
    /// Receive-only end, connected while packets keep arriving
    Listener,
}

pub struct RadioLink<'a, T> {
    transport: T,
    role: RadioRole,
    done: &'a CompletionFlag,
    store: PropertyStore,
    /// Latest encoded packet per carried property
    outgoing: [Option<PacketBytes>; 2],
    /// Slots written with new content and not yet sent
    pending: [bool; 2],
    in_flight: bool,
    since_send_ms: u32,
    since_receipt_ms: u32,
    faulted: bool,
    rssi: i16,
    stats: LinkStats,
    connected_threshold_ms: u32,
    retransmit_ms: u32,
    latency_bias_ms: u32,
}

impl<'a, T: Transport> RadioLink<'a, T> {
    pub fn new(
        transport: T,
        role: RadioRole,
        done: &'a CompletionFlag,
        timings: &LinkTimings,
    ) -> Self {
        Self {
            transport,
            role,
            done,
            store: PropertyStore::new(),
            outgoing: [None, None],
            pending: [false; 2],
            in_flight: false,
            since_send_ms: 0,
            since_receipt_ms: u32::MAX,
            faulted: false,
            rssi: 0,
            stats: LinkStats::default(),
            connected_threshold_ms: timings.connected_threshold_ms,
            retransmit_ms: timings.radio_retransmit_ms,
            latency_bias_ms: timings.radio_latency_bias_ms,
        }
    }

    /// Bring the radio up; a failure leaves the link in `Error`
    pub fn start(&mut self) {
        self.faulted = self.transport.init().is_err();
    }

    pub fn role(&self) -> RadioRole {
        self.role
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

    fn poll_broadcaster(&mut self) {
        if self.done.take() {
            self.in_flight = false;
        }
        if self.in_flight && self.since_send_ms < self.retransmit_ms {
            return;
        }

        let Some(slot) = self.next_slot() else {
            return;
        };
        let Some(packet) = self.outgoing[slot].as_ref() else {
            return;
        };
        let result = self.transport.send(packet);
        self.stats.record_send(&result);
        match result {
            Ok(()) => {
                self.in_flight = true;
                self.since_send_ms = 0;
                self.pending[slot] = false;
            }
            Err(e) if e.is_fatal() => self.faulted = true,
            Err(_) => {}
        }
    }

    /// Changed E-Stop first, then a changed soft E-Stop, else the E-Stop resend
    fn next_slot(&self) -> Option<usize> {
        if self.pending[ESTOP_SLOT] {
            Some(ESTOP_SLOT)
        } else if self.pending[SOFT_ESTOP_SLOT] {
            Some(SOFT_ESTOP_SLOT)
        } else if self.outgoing[ESTOP_SLOT].is_some() {
            Some(ESTOP_SLOT)
        } else {
            None
        }
    }

    fn poll_listener(&mut self) {
        if !self.done.take() {
            return;
        }

        let mut buf = [0u8; MAX_PACKET_LEN];
        loop {
            let received = match self.transport.receive(&mut buf) {
                Ok(Some(received)) => received,
                Ok(None) => break,
                Err(e) => {
                    if e.is_fatal() {
                        self.faulted = true;
                    }
                    break;
                }
            };

            let Some(packet) = decode_packet(&buf[..received.len], &mut self.stats) else {
                continue;
            };
            // Acks and properties this link does not carry say nothing
            // about the sender
            if let Packet::Value { id, value } = packet {
                if carried_slot(id).is_some() {
                    self.store.refresh(id, value);
                    self.since_receipt_ms = 0;
                    self.rssi = received.rssi.unwrap_or_else(|| self.transport.rssi());
                    self.stats.rx_packets = self.stats.rx_packets.wrapping_add(1);
                }
            }
        }
    }
}

impl<T: Transport> Channel for RadioLink<'_, T> {
    fn kind(&self) -> ChannelKind {
        ChannelKind::Radio
    }

    fn advance(&mut self, dt_ms: u32) {
        self.store.tick(dt_ms);
        self.since_send_ms = self.since_send_ms.saturating_add(dt_ms);
        self.since_receipt_ms = self.since_receipt_ms.saturating_add(dt_ms);
    }

    fn poll(&mut self) {
        if self.transport.has_fault() {
            self.faulted = true;
        }
        if self.faulted {
            return;
        }
        match self.role {
            RadioRole::Broadcaster => self.poll_broadcaster(),
            RadioRole::Listener => self.poll_listener(),
        }
    }

    fn connection_state(&self) -> ChannelState {
        if self.faulted {
            return ChannelState::Error;
        }
        match self.role {
            RadioRole::Broadcaster => ChannelState::Connected,
            RadioRole::Listener if self.since_receipt_ms < self.connected_threshold_ms => {
                ChannelState::Connected
            }
            RadioRole::Listener => ChannelState::Disconnected,
        }
    }

    fn signal_strength(&self) -> i16 {
        match self.role {
            RadioRole::Broadcaster => self.transport.rssi(),
            RadioRole::Listener => self.rssi,
        }
    }

    fn read_property(&self, id: PropertyId) -> PropertyValue {
        self.store.get(id).clone()
    }

    fn write_property(&mut self, id: PropertyId, bytes: &[u8]) {
        if self.role != RadioRole::Broadcaster {
            return;
        }
        let Some(slot) = carried_slot(id) else {
            return;
        };
        let packet = encode_value(id, bytes);
        if self.outgoing[slot] != packet {
            self.outgoing[slot] = packet;
            // New content goes out on the next poll, not after the window
            self.in_flight = false;
            self.pending[slot] = self.outgoing[slot].is_some();
        }
    }

    fn latency_bias_ms(&self, id: PropertyId) -> u32 {
        if carried_slot(id).is_some() {
            self.latency_bias_ms
        } else {
            0
        }
    }

    fn reinitialize(&mut self) {
        self.store.clear();
        self.in_flight = false;
        self.pending = [
            self.outgoing[ESTOP_SLOT].is_some(),
            self.outgoing[SOFT_ESTOP_SLOT].is_some(),
        ];
        self.since_receipt_ms = u32::MAX;
        self.done.take();
        self.start();
    }
}
