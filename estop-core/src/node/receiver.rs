//! Receiver combinator, enable gate and host reporting cadence

use estop_protocol::{EStopState, PropertyId, ReceiverStatus};

use crate::channel::Channel;
use crate::config::LinkTimings;
use crate::link::SafetyLink;
use crate::transmit::TransmitScheduler;

/// Combined stop decision from both peers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StopDecision {
    pub hard: bool,
    pub soft: bool,
}

impl StopDecision {
    /// Hard stop if the operator asks for it, or if an active deadman
    /// unit reports lost presence
    pub fn combine(
        remote_estop: bool,
        remote_soft_estop: bool,
        deadman_active: bool,
        deadman_triggered: bool,
    ) -> Self {
        Self {
            hard: remote_estop || (deadman_active && deadman_triggered),
            soft: remote_soft_estop,
        }
    }
}

/// Outcome of one receiver tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ReceiverTick {
    pub state: EStopState,
    /// Drive the stop output to its stop level
    pub stop_asserted: bool,
    /// `state` is due to be sent to the host
    pub report_state: bool,
    /// Connectivity snapshots were refreshed and are due to be sent
    pub report_status: bool,
}

/// Machine-side node
///
/// Tracks the operator unit and the deadman unit over separate channel
/// sets. While disabled by the host the stop output stays permissive but
/// arbitration and reporting continue.
#[derive(Debug, Clone)]
pub struct ReceiverNode {
    remote: SafetyLink<2>,
    deadman: SafetyLink<2>,
    enabled: bool,
    state_report: TransmitScheduler<StopDecision>,
}

impl ReceiverNode {
    pub fn new(timings: &LinkTimings) -> Self {
        Self {
            remote: SafetyLink::remote_estop(timings),
            deadman: SafetyLink::deadman(timings),
            enabled: true,
            state_report: TransmitScheduler::new(timings.transmit_interval_ms),
        }
    }

    /// Apply a host enable command
    ///
    /// The next tick reports the new state regardless of cadence.
    pub fn set_enabled(&mut self, enabled: bool) {
        if self.enabled != enabled {
            self.enabled = enabled;
            self.state_report.invalidate();
        }
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn update(
        &mut self,
        remote_channels: &mut [&mut dyn Channel],
        deadman_channels: &mut [&mut dyn Channel],
        dt_ms: u32,
    ) -> ReceiverTick {
        let remote_refreshed = self.remote.update(remote_channels, dt_ms);
        let deadman_refreshed = self.deadman.update(deadman_channels, dt_ms);

        let state = self.state();
        let decision = StopDecision::combine(
            state.hard_estop_active,
            state.soft_estop_active,
            state.deadman_active,
            state.deadman_triggered,
        );
        let report_state = self.state_report.update(&decision, dt_ms);

        ReceiverTick {
            state,
            stop_asserted: self.enabled && decision.hard,
            report_state,
            report_status: remote_refreshed || deadman_refreshed,
        }
    }

    /// Current arbitrated state
    ///
    /// `hard_estop_active` is the operator's E-Stop alone; the deadman
    /// contribution is visible through the deadman fields.
    pub fn state(&self) -> EStopState {
        EStopState {
            enabled: self.enabled,
            hard_estop_active: self.remote.value(PropertyId::Estop).unwrap_or(true),
            soft_estop_active: self.remote.value(PropertyId::SoftEstop).unwrap_or(true),
            deadman_active: self
                .deadman
                .value(PropertyId::DeadmanActive)
                .unwrap_or(false),
            deadman_triggered: self
                .deadman
                .value(PropertyId::DeadmanTriggered)
                .unwrap_or(true),
        }
    }

    pub fn receiver_status(&self) -> ReceiverStatus {
        ReceiverStatus {
            remote: *self.remote.status(),
            deadman: *self.deadman.status(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::property::encode_flag;
    use crate::testing::FakeChannel;
    use estop_protocol::ChannelKind;

    #[test]
    fn test_combine_truth_table() {
        for remote in [false, true] {
            for active in [false, true] {
                for triggered in [false, true] {
                    let decision = StopDecision::combine(remote, false, active, triggered);
                    assert_eq!(decision.hard, remote || (active && triggered));
                    if remote {
                        assert!(decision.hard);
                    }
                    if !active {
                        assert_eq!(decision.hard, remote);
                    }
                }
            }
        }
    }

    fn permissive_remote(channel: &mut FakeChannel) {
        channel.receive(PropertyId::Estop, &encode_flag(false), 0);
        channel.receive(PropertyId::SoftEstop, &encode_flag(false), 0);
    }

    #[test]
    fn test_boot_is_stopped() {
        let mut node = ReceiverNode::new(&LinkTimings::default());
        let tick = node.update(&mut [], &mut [], 1);
        assert!(tick.stop_asserted);
        assert!(tick.report_state);
        assert!(tick.report_status);
        assert!(tick.state.enabled);
    }

    #[test]
    fn test_permissive_remote_releases() {
        let mut node = ReceiverNode::new(&LinkTimings::default());
        let mut bcast = FakeChannel::new(ChannelKind::Broadcast);
        permissive_remote(&mut bcast);

        let mut remote: [&mut dyn Channel; 1] = [&mut bcast];
        let tick = node.update(&mut remote, &mut [], 1);
        assert!(!tick.stop_asserted);
        assert!(!tick.state.hard_estop_active);
        assert!(!tick.state.deadman_active);
    }

    #[test]
    fn test_active_deadman_triggers_hard_stop() {
        let mut node = ReceiverNode::new(&LinkTimings::default());
        let mut remote_bcast = FakeChannel::new(ChannelKind::Broadcast);
        let mut deadman_bcast = FakeChannel::new(ChannelKind::Broadcast);
        permissive_remote(&mut remote_bcast);
        deadman_bcast.receive(PropertyId::DeadmanActive, &encode_flag(true), 0);
        deadman_bcast.receive(PropertyId::DeadmanTriggered, &encode_flag(true), 0);

        let mut remote: [&mut dyn Channel; 1] = [&mut remote_bcast];
        let mut deadman: [&mut dyn Channel; 1] = [&mut deadman_bcast];
        let tick = node.update(&mut remote, &mut deadman, 1);
        assert!(tick.stop_asserted);
        assert!(!tick.state.hard_estop_active);
        assert!(tick.state.deadman_triggered);
    }

    #[test]
    fn test_disabled_bypasses_output() {
        let mut node = ReceiverNode::new(&LinkTimings::default());
        node.update(&mut [], &mut [], 1);

        node.set_enabled(false);
        let tick = node.update(&mut [], &mut [], 1);
        assert!(!tick.stop_asserted);
        assert!(tick.state.hard_estop_active);
        assert!(!tick.state.enabled);
        assert!(tick.report_state);
    }

    #[test]
    fn test_state_report_cadence() {
        let mut node = ReceiverNode::new(&LinkTimings::default());
        assert!(node.update(&mut [], &mut [], 1).report_state);

        let mut reports = 0;
        for _ in 0..200 {
            if node.update(&mut [], &mut [], 1).report_state {
                reports += 1;
            }
        }
        assert_eq!(reports, 2);
    }

    #[test]
    fn test_receiver_status_has_both_peers() {
        let mut node = ReceiverNode::new(&LinkTimings::default());
        let mut radio = FakeChannel::new(ChannelKind::Radio);
        let mut paired = FakeChannel::new(ChannelKind::ShortRange);

        let mut remote: [&mut dyn Channel; 1] = [&mut radio];
        let mut deadman: [&mut dyn Channel; 1] = [&mut paired];
        node.update(&mut remote, &mut deadman, 1);

        let status = node.receiver_status();
        assert!(status.remote.radio.state.is_connected());
        assert!(!status.remote.short_range.state.is_connected());
        assert!(status.deadman.short_range.state.is_connected());
    }
}
