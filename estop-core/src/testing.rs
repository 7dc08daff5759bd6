//! Test doubles for channel-level logic

use estop_protocol::{ChannelKind, ChannelState, PropertyId};
use heapless::Vec;

use crate::channel::Channel;
use crate::property::{PropertyStore, PropertyValue};

/// Scriptable channel: tests set state and inject receipts directly
pub struct FakeChannel {
    pub kind: ChannelKind,
    pub state: ChannelState,
    pub rssi: i16,
    pub bias_ms: u32,
    pub store: PropertyStore,
    pub written: Vec<(PropertyId, Vec<u8, 4>), 32>,
    pub polls: u32,
    pub reinitialized: bool,
}

impl FakeChannel {
    pub fn new(kind: ChannelKind) -> Self {
        Self {
            kind,
            state: ChannelState::Connected,
            rssi: -60,
            bias_ms: 0,
            store: PropertyStore::new(),
            written: Vec::new(),
            polls: 0,
            reinitialized: false,
        }
    }

    pub fn with_state(mut self, state: ChannelState) -> Self {
        self.state = state;
        self
    }

    pub fn with_bias(mut self, bias_ms: u32) -> Self {
        self.bias_ms = bias_ms;
        self
    }

    /// Simulate a receipt `age_ms` ago
    pub fn receive(&mut self, id: PropertyId, bytes: &[u8], age_ms: u32) {
        self.store.refresh(id, bytes);
        self.store.tick(age_ms);
    }

    pub fn last_written(&self, id: PropertyId) -> Option<&[u8]> {
        self.written
            .iter()
            .rev()
            .find(|(written_id, _)| *written_id == id)
            .map(|(_, bytes)| bytes.as_slice())
    }
}

impl Channel for FakeChannel {
    fn kind(&self) -> ChannelKind {
        self.kind
    }

    fn advance(&mut self, dt_ms: u32) {
        self.store.tick(dt_ms);
    }

    fn poll(&mut self) {
        self.polls += 1;
    }

    fn connection_state(&self) -> ChannelState {
        self.state
    }

    fn signal_strength(&self) -> i16 {
        self.rssi
    }

    fn read_property(&self, id: PropertyId) -> PropertyValue {
        self.store.get(id).clone()
    }

    fn write_property(&mut self, id: PropertyId, bytes: &[u8]) {
        let mut value = Vec::new();
        let _ = value.extend_from_slice(bytes);
        let _ = self.written.push((id, value));
    }

    fn latency_bias_ms(&self, _id: PropertyId) -> u32 {
        self.bias_ms
    }

    fn reinitialize(&mut self) {
        self.reinitialized = true;
        self.state = ChannelState::Disconnected;
    }
}
