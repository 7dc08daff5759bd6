//! Configuration type definitions

use estop_protocol::ChannelKind;

use crate::arbitration::STALE_THRESHOLD_MS;
use crate::status::STATUS_INTERVAL_MS;
use crate::transmit::TRANSMIT_INTERVAL_MS;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Default connectivity window for every channel variant
pub const CONNECTED_THRESHOLD_MS: u32 = 500;

/// Default extra age charged to long-range radio values
pub const RADIO_LATENCY_BIAS_MS: u32 = 120;

/// Default time a long-range broadcaster waits for TX-done before resending
pub const RADIO_RETRANSMIT_MS: u32 = 200;

/// Default time on air of one long-range packet, about 9 packets/s
pub const RADIO_AIRTIME_MS: u32 = 111;

/// Which endpoint this firmware image runs as
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum NodeRole {
    /// Hand-held transmitter with E-Stop, soft E-Stop and release buttons
    Operator,
    /// Machine-side unit driving the stop output
    #[default]
    Receiver,
    /// Operator-presence unit
    Deadman,
}

/// Timing tunables shared by every component
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LinkTimings {
    /// A channel is connected while its last receipt is younger than this
    pub connected_threshold_ms: u32,
    /// Floor-policy properties older than this resolve to stop
    pub stale_threshold_ms: u32,
    /// Maximum gap between transmissions of unchanged state
    pub transmit_interval_ms: u32,
    /// Connectivity snapshot refresh interval
    pub status_interval_ms: u32,
    /// Delivery latency charged to long-range radio values
    pub radio_latency_bias_ms: u32,
    /// Long-range broadcaster resend window
    pub radio_retransmit_ms: u32,
    /// Time on air of one long-range packet, which is also the E-Stop
    /// refresh period over that radio
    pub radio_airtime_ms: u32,
}

impl Default for LinkTimings {
    fn default() -> Self {
        Self {
            connected_threshold_ms: CONNECTED_THRESHOLD_MS,
            stale_threshold_ms: STALE_THRESHOLD_MS,
            transmit_interval_ms: TRANSMIT_INTERVAL_MS,
            status_interval_ms: STATUS_INTERVAL_MS,
            radio_latency_bias_ms: RADIO_LATENCY_BIAS_MS,
            radio_retransmit_ms: RADIO_RETRANSMIT_MS,
            radio_airtime_ms: RADIO_AIRTIME_MS,
        }
    }
}

/// Which channel variants are fitted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ChannelSet {
    pub radio: bool,
    pub short_range: bool,
    pub broadcast: bool,
}

impl Default for ChannelSet {
    fn default() -> Self {
        Self {
            radio: true,
            short_range: true,
            broadcast: true,
        }
    }
}

impl ChannelSet {
    pub fn none() -> Self {
        Self {
            radio: false,
            short_range: false,
            broadcast: false,
        }
    }

    pub fn contains(&self, kind: ChannelKind) -> bool {
        match kind {
            ChannelKind::Radio => self.radio,
            ChannelKind::ShortRange => self.short_range,
            ChannelKind::Broadcast => self.broadcast,
        }
    }
}

/// Complete link configuration for one node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LinkConfig {
    pub role: NodeRole,
    pub timings: LinkTimings,
    /// Channel variants fitted on this board
    pub channels: ChannelSet,
    /// Stop output drives low to stop (receiver only)
    pub stop_output_active_low: bool,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            role: NodeRole::default(),
            timings: LinkTimings::default(),
            channels: ChannelSet::default(),
            stop_output_active_low: true,
        }
    }
}

impl LinkConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check invariants between timings
    ///
    /// A stale threshold at or above the connected threshold would make the
    /// floor unreachable while a channel is still considered connected. A
    /// long-range E-Stop refresh that, with its latency bias, reaches the
    /// stale threshold would trip the floor on a healthy radio-only link.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let t = &self.timings;
        if t.connected_threshold_ms == 0
            || t.transmit_interval_ms == 0
            || t.status_interval_ms == 0
            || t.radio_retransmit_ms == 0
            || t.radio_airtime_ms == 0
        {
            return Err(ConfigError::ZeroInterval);
        }
        if self.channels == ChannelSet::none() {
            return Err(ConfigError::NoChannels);
        }
        if t.stale_threshold_ms >= t.connected_threshold_ms {
            return Err(ConfigError::StaleNotBelowConnected);
        }
        if t.transmit_interval_ms >= t.stale_threshold_ms {
            return Err(ConfigError::TransmitNotBelowStale);
        }
        if self.channels.radio
            && t.radio_airtime_ms.saturating_add(t.radio_latency_bias_ms) >= t.stale_threshold_ms
        {
            return Err(ConfigError::RadioRefreshNotBelowStale);
        }
        Ok(())
    }
}

/// Inconsistent configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    ZeroInterval,
    NoChannels,
    StaleNotBelowConnected,
    TransmitNotBelowStale,
    RadioRefreshNotBelowStale,
}
