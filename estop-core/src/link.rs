//! Per-tick orchestration of one set of channels to one peer

use estop_protocol::{CommStatus, PropertyId};

use crate::arbitration::{Arbitrator, PropertyRule};
use crate::channel::Channel;
use crate::config::LinkTimings;
use crate::status::StatusBuilder;

/// Arbitrated view of one peer over all channels that reach it
///
/// Each `update` runs one polling pass: age every channel, poll every
/// channel, arbitrate every tracked property, refresh the status snapshot.
#[derive(Debug, Clone)]
pub struct SafetyLink<const N: usize> {
    arbitrator: Arbitrator,
    rules: [PropertyRule; N],
    values: [bool; N],
    best_age_ms: Option<u32>,
    status: StatusBuilder,
}

impl<const N: usize> SafetyLink<N> {
    pub fn new(arbitrator: Arbitrator, rules: [PropertyRule; N], status_interval_ms: u32) -> Self {
        Self {
            arbitrator,
            values: rules.map(|rule| rule.initial),
            rules,
            best_age_ms: None,
            status: StatusBuilder::new(status_interval_ms),
        }
    }

    /// Run one polling pass
    ///
    /// Returns `true` when the status snapshot was refreshed.
    pub fn update(&mut self, channels: &mut [&mut dyn Channel], dt_ms: u32) -> bool {
        // Every channel ages by the same dt before anything is read
        for channel in channels.iter_mut() {
            channel.advance(dt_ms);
        }
        for channel in channels.iter_mut() {
            channel.poll();
        }

        let mut pass_best: Option<u32> = None;
        for (rule, value) in self.rules.iter().zip(self.values.iter_mut()) {
            let resolution = self.arbitrator.resolve_rule(channels, rule, *value);
            *value = resolution.value;
            if let Some(age) = resolution.best_age_ms {
                pass_best = Some(pass_best.map_or(age, |best| best.min(age)));
            }
        }
        self.best_age_ms = pass_best;

        self.status.update(channels, pass_best, dt_ms)
    }

    /// Current arbitrated value, `None` if `id` is not tracked by this link
    pub fn value(&self, id: PropertyId) -> Option<bool> {
        self.rules
            .iter()
            .position(|rule| rule.id == id)
            .map(|i| self.values[i])
    }

    /// Freshest compensated age seen in the last pass
    pub fn best_age_ms(&self) -> Option<u32> {
        self.best_age_ms
    }

    pub fn status(&self) -> &CommStatus {
        self.status.status()
    }
}

impl SafetyLink<2> {
    /// Receiver view of the operator unit
    pub fn remote_estop(timings: &LinkTimings) -> Self {
        Self::new(
            Arbitrator::new(timings.stale_threshold_ms),
            [
                PropertyRule::floor(PropertyId::Estop, true),
                PropertyRule::passthrough(PropertyId::SoftEstop, true),
            ],
            timings.status_interval_ms,
        )
    }

    /// Receiver view of the deadman unit
    pub fn deadman(timings: &LinkTimings) -> Self {
        Self::new(
            Arbitrator::new(timings.stale_threshold_ms),
            [
                PropertyRule::passthrough(PropertyId::DeadmanActive, false),
                PropertyRule::floor(PropertyId::DeadmanTriggered, true),
            ],
            timings.status_interval_ms,
        )
    }
}

impl SafetyLink<0> {
    /// Transmit-side view: connectivity only, nothing arbitrated
    pub fn uplink_only(timings: &LinkTimings) -> Self {
        Self::new(
            Arbitrator::new(timings.stale_threshold_ms),
            [],
            timings.status_interval_ms,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeChannel;
    use estop_protocol::{ChannelKind, ChannelState};

    #[test]
    fn test_initial_values() {
        let link = SafetyLink::remote_estop(&LinkTimings::default());
        assert_eq!(link.value(PropertyId::Estop), Some(true));
        assert_eq!(link.value(PropertyId::SoftEstop), Some(true));
        assert_eq!(link.value(PropertyId::DeadmanActive), None);

        let link = SafetyLink::deadman(&LinkTimings::default());
        assert_eq!(link.value(PropertyId::DeadmanActive), Some(false));
        assert_eq!(link.value(PropertyId::DeadmanTriggered), Some(true));
    }

    #[test]
    fn test_update_advances_then_polls() {
        let mut link = SafetyLink::remote_estop(&LinkTimings::default());
        let mut bcast = FakeChannel::new(ChannelKind::Broadcast);
        bcast.receive(PropertyId::Estop, &[0x00], 0);
        bcast.receive(PropertyId::SoftEstop, &[0x00], 0);

        let mut channels: [&mut dyn Channel; 1] = [&mut bcast];
        assert!(link.update(&mut channels, 10));
        assert_eq!(link.value(PropertyId::Estop), Some(false));
        assert_eq!(link.value(PropertyId::SoftEstop), Some(false));
        assert_eq!(link.best_age_ms(), Some(10));
        assert_eq!(link.status().last_received_message_age_ms, 10);
        assert_eq!(link.status().broadcast.state, ChannelState::Connected);

        drop(channels);
        assert_eq!(bcast.polls, 1);
    }

    #[test]
    fn test_silence_forces_stop() {
        let mut link = SafetyLink::remote_estop(&LinkTimings::default());
        let mut bcast = FakeChannel::new(ChannelKind::Broadcast);
        bcast.receive(PropertyId::Estop, &[0x00], 0);

        for _ in 0..300 {
            let mut channels: [&mut dyn Channel; 1] = [&mut bcast];
            link.update(&mut channels, 1);
        }
        assert_eq!(link.value(PropertyId::Estop), Some(false));

        let mut channels: [&mut dyn Channel; 1] = [&mut bcast];
        link.update(&mut channels, 1);
        assert_eq!(link.value(PropertyId::Estop), Some(true));
    }

    #[test]
    fn test_uplink_only_tracks_status() {
        let mut link = SafetyLink::uplink_only(&LinkTimings::default());
        let mut radio = FakeChannel::new(ChannelKind::Radio);
        let mut paired = FakeChannel::new(ChannelKind::ShortRange).with_state(ChannelState::Error);

        let mut channels: [&mut dyn Channel; 2] = [&mut radio, &mut paired];
        assert!(link.update(&mut channels, 1));
        assert_eq!(link.best_age_ms(), None);
        assert_eq!(link.status().radio.state, ChannelState::Connected);
        assert_eq!(link.status().short_range.state, ChannelState::Error);
    }
}
