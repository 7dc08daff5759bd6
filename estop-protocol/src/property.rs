//! Property and channel vocabulary
//!
//! The numeric values here are wire ids. They are stable and double as
//! table indices in the per-channel property stores.

use serde::{Deserialize, Serialize};

/// Safety and telemetry values exchanged over the radio channels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum PropertyId {
    /// Hard E-Stop asserted by the operator unit
    Estop = 0x00,
    /// Soft E-Stop asserted by the operator unit
    SoftEstop = 0x01,
    /// Operator unit battery level in percent
    Battery = 0x02,
    /// Deadman unit is enabled and participating
    DeadmanActive = 0x03,
    /// Deadman presence condition has failed
    DeadmanTriggered = 0x04,
}

impl PropertyId {
    /// Number of properties (size of every property table)
    pub const COUNT: usize = 5;

    /// All properties in wire id order
    pub const ALL: [PropertyId; Self::COUNT] = [
        PropertyId::Estop,
        PropertyId::SoftEstop,
        PropertyId::Battery,
        PropertyId::DeadmanActive,
        PropertyId::DeadmanTriggered,
    ];

    /// Parse a property from its wire id
    pub fn from_byte(byte: u8) -> Option<Self> {
        Self::ALL.get(byte as usize).copied()
    }

    /// Wire id of this property
    pub const fn to_byte(self) -> u8 {
        self as u8
    }

    /// Index into a property table
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// The three independent transports between two safety-link endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum ChannelKind {
    /// Point-to-point long-range radio (duty-cycled)
    Radio = 0,
    /// Short-range paired link
    ShortRange = 1,
    /// Peer-addressed broadcast link
    Broadcast = 2,
}

impl ChannelKind {
    pub const COUNT: usize = 3;

    pub const ALL: [ChannelKind; Self::COUNT] =
        [ChannelKind::Radio, ChannelKind::ShortRange, ChannelKind::Broadcast];

    pub fn from_byte(byte: u8) -> Option<Self> {
        Self::ALL.get(byte as usize).copied()
    }

    pub const fn to_byte(self) -> u8 {
        self as u8
    }

    /// Short label for logs and status displays
    pub const fn label(self) -> &'static str {
        match self {
            ChannelKind::Radio => "Radio",
            ChannelKind::ShortRange => "Paired",
            ChannelKind::Broadcast => "Bcast",
        }
    }
}

/// Connectivity of one channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ChannelState {
    /// No recent receipt
    #[default]
    Disconnected,
    /// Received within the connected threshold (or broadcasting role)
    Connected,
    /// Hardware or stack failed; sticky until the channel reinitializes
    Error,
}

impl ChannelState {
    pub fn is_connected(&self) -> bool {
        matches!(self, ChannelState::Connected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_property_ids_are_stable() {
        assert_eq!(PropertyId::Estop.to_byte(), 0x00);
        assert_eq!(PropertyId::SoftEstop.to_byte(), 0x01);
        assert_eq!(PropertyId::Battery.to_byte(), 0x02);
        assert_eq!(PropertyId::DeadmanActive.to_byte(), 0x03);
        assert_eq!(PropertyId::DeadmanTriggered.to_byte(), 0x04);
    }

    #[test]
    fn test_property_from_byte() {
        for id in PropertyId::ALL {
            assert_eq!(PropertyId::from_byte(id.to_byte()), Some(id));
        }
        assert_eq!(PropertyId::from_byte(0x05), None);
        assert_eq!(PropertyId::from_byte(0xFF), None);
    }

    #[test]
    fn test_channel_kind_from_byte() {
        assert_eq!(ChannelKind::from_byte(2), Some(ChannelKind::Broadcast));
        assert_eq!(ChannelKind::from_byte(3), None);
    }

    #[test]
    fn test_default_state_is_disconnected() {
        assert_eq!(ChannelState::default(), ChannelState::Disconnected);
        assert!(!ChannelState::Error.is_connected());
    }
}
