//! Status and state objects reported to the host
//!
//! These are postcard-serialized into frame payloads by [`crate::messages`].

use serde::{Deserialize, Serialize};

use crate::property::{ChannelKind, ChannelState};

/// Sentinel for "no message has ever been received"
pub const AGE_UNKNOWN_MS: u32 = u32::MAX;

/// Connectivity summary for one channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChannelStatus {
    pub state: ChannelState,
    /// Signal strength in dBm, 0 when there is no active link
    pub rssi: i16,
}

/// Connectivity summary for one endpoint's set of channels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CommStatus {
    /// Freshest arbitrated evidence that the peer is alive
    pub last_received_message_age_ms: u32,
    pub radio: ChannelStatus,
    pub short_range: ChannelStatus,
    pub broadcast: ChannelStatus,
}

impl Default for CommStatus {
    fn default() -> Self {
        Self {
            last_received_message_age_ms: AGE_UNKNOWN_MS,
            radio: ChannelStatus::default(),
            short_range: ChannelStatus::default(),
            broadcast: ChannelStatus::default(),
        }
    }
}

impl CommStatus {
    pub fn channel(&self, kind: ChannelKind) -> &ChannelStatus {
        match kind {
            ChannelKind::Radio => &self.radio,
            ChannelKind::ShortRange => &self.short_range,
            ChannelKind::Broadcast => &self.broadcast,
        }
    }

    pub fn channel_mut(&mut self, kind: ChannelKind) -> &mut ChannelStatus {
        match kind {
            ChannelKind::Radio => &mut self.radio,
            ChannelKind::ShortRange => &mut self.short_range,
            ChannelKind::Broadcast => &mut self.broadcast,
        }
    }

    /// True if any channel is currently connected
    pub fn any_connected(&self) -> bool {
        ChannelKind::ALL
            .iter()
            .any(|&kind| self.channel(kind).state.is_connected())
    }
}

/// Combined safety state published by the receiver
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EStopState {
    pub enabled: bool,
    pub hard_estop_active: bool,
    pub soft_estop_active: bool,
    pub deadman_active: bool,
    pub deadman_triggered: bool,
}

/// Connectivity of both peers as seen by the receiver
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ReceiverStatus {
    pub remote: CommStatus,
    pub deadman: CommStatus,
}

/// Host command gating the stop output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SetEnabled {
    pub enabled: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_status_has_unknown_age() {
        let status = CommStatus::default();
        assert_eq!(status.last_received_message_age_ms, AGE_UNKNOWN_MS);
        assert!(!status.any_connected());
    }

    #[test]
    fn test_channel_accessors() {
        let mut status = CommStatus::default();
        status.channel_mut(ChannelKind::Broadcast).state = ChannelState::Connected;
        status.channel_mut(ChannelKind::Broadcast).rssi = -61;

        assert_eq!(status.broadcast.rssi, -61);
        assert!(status.any_connected());
        assert_eq!(
            status.channel(ChannelKind::Radio).state,
            ChannelState::Disconnected
        );
    }
}
