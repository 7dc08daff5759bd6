//! Change-triggered and periodic transmission
//!
//! Local safety state is pushed to every channel whenever it changes and at
//! least once per interval otherwise, so the peer's age counters only grow
//! when the link is actually broken.

use estop_protocol::PropertyId;

use crate::channel::Channel;

/// Default resend interval
pub const TRANSMIT_INTERVAL_MS: u32 = 100;

/// Local state that can be written out as properties
pub trait SafetyReport {
    /// Call `emit` once per property this state carries
    fn for_each_property<F: FnMut(PropertyId, &[u8])>(&self, emit: F);
}

/// Decides when a piece of state is due for (re)transmission
#[derive(Debug, Clone)]
pub struct TransmitScheduler<S> {
    interval_ms: u32,
    since_send_ms: u32,
    last_sent: Option<S>,
}

impl<S: Clone + PartialEq> TransmitScheduler<S> {
    pub const fn new(interval_ms: u32) -> Self {
        Self {
            interval_ms,
            since_send_ms: 0,
            last_sent: None,
        }
    }

    /// Advance time and check whether `state` is due
    ///
    /// Returns `true` on the first call, when `state` differs from the last
    /// sent state, or once `interval_ms` has elapsed since the last send.
    /// A `true` result counts as a send.
    pub fn update(&mut self, state: &S, dt_ms: u32) -> bool {
        self.since_send_ms = self.since_send_ms.saturating_add(dt_ms);

        let changed = self.last_sent.as_ref() != Some(state);
        if changed || self.since_send_ms >= self.interval_ms {
            self.last_sent = Some(state.clone());
            self.since_send_ms = 0;
            true
        } else {
            false
        }
    }

    /// Force the next update to send
    pub fn invalidate(&mut self) {
        self.last_sent = None;
    }

    pub fn last_sent(&self) -> Option<&S> {
        self.last_sent.as_ref()
    }
}

impl<S: Clone + PartialEq + SafetyReport> TransmitScheduler<S> {
    /// Write `state` to every channel if it is due
    ///
    /// Fire-and-forget: channel send failures surface through their own
    /// connection state, not here.
    pub fn publish(&mut self, channels: &mut [&mut dyn Channel], state: &S, dt_ms: u32) -> bool {
        if !self.update(state, dt_ms) {
            return false;
        }
        for channel in channels.iter_mut() {
            state.for_each_property(|id, bytes| channel.write_property(id, bytes));
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::property::encode_flag;
    use crate::testing::FakeChannel;
    use estop_protocol::ChannelKind;

    #[derive(Debug, Clone, Copy, PartialEq)]
    struct Stops {
        estop: bool,
        soft: bool,
    }

    impl SafetyReport for Stops {
        fn for_each_property<F: FnMut(PropertyId, &[u8])>(&self, mut emit: F) {
            emit(PropertyId::Estop, &encode_flag(self.estop));
            emit(PropertyId::SoftEstop, &encode_flag(self.soft));
        }
    }

    #[test]
    fn test_first_update_sends() {
        let mut scheduler = TransmitScheduler::new(100);
        assert!(scheduler.update(&1u8, 0));
        assert_eq!(scheduler.last_sent(), Some(&1));
    }

    #[test]
    fn test_periodic_resend() {
        let mut scheduler = TransmitScheduler::new(100);
        assert!(scheduler.update(&true, 0));

        let mut sends = 0;
        for _ in 0..250 {
            if scheduler.update(&true, 1) {
                sends += 1;
            }
        }
        assert_eq!(sends, 2);
    }

    #[test]
    fn test_immediate_resend_on_change() {
        let mut scheduler = TransmitScheduler::new(100);
        assert!(scheduler.update(&false, 0));
        assert!(!scheduler.update(&false, 10));
        assert!(scheduler.update(&true, 1));
        assert!(!scheduler.update(&true, 1));
    }

    #[test]
    fn test_invalidate() {
        let mut scheduler = TransmitScheduler::new(100);
        assert!(scheduler.update(&5u8, 0));
        scheduler.invalidate();
        assert!(scheduler.update(&5u8, 0));
    }

    #[test]
    fn test_publish_writes_every_channel() {
        let mut scheduler = TransmitScheduler::new(100);
        let mut radio = FakeChannel::new(ChannelKind::Radio);
        let mut bcast = FakeChannel::new(ChannelKind::Broadcast);
        let state = Stops {
            estop: true,
            soft: false,
        };

        {
            let mut channels: [&mut dyn Channel; 2] = [&mut radio, &mut bcast];
            assert!(scheduler.publish(&mut channels, &state, 1));
            assert!(!scheduler.publish(&mut channels, &state, 1));
        }

        for fake in [&radio, &bcast] {
            assert_eq!(fake.written.len(), 2);
            assert_eq!(fake.last_written(PropertyId::Estop), Some(&[0xFF][..]));
            assert_eq!(fake.last_written(PropertyId::SoftEstop), Some(&[0x00][..]));
        }
    }
}
