//! Freshest-value arbitration across channels
//!
//! For each property the value is taken from whichever connected channel
//! received it most recently, after adding that channel's latency bias. When
//! nothing connected is fresh enough, floor-policy properties resolve to
//! `true` (stop).

use estop_protocol::PropertyId;

use crate::channel::Channel;

/// Default freshness limit for floor-policy properties
pub const STALE_THRESHOLD_MS: u32 = 300;

/// What happens when no connected channel has fresh data
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StalePolicy {
    /// Force `true` once the best age exceeds the stale threshold
    EnforceStaleFloor,
    /// Keep whatever the freshest source said, or the previous value
    Passthrough,
}

/// How one property is arbitrated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PropertyRule {
    pub id: PropertyId,
    pub policy: StalePolicy,
    /// Value before the first arbitration pass
    pub initial: bool,
}

impl PropertyRule {
    pub const fn floor(id: PropertyId, initial: bool) -> Self {
        Self {
            id,
            policy: StalePolicy::EnforceStaleFloor,
            initial,
        }
    }

    pub const fn passthrough(id: PropertyId, initial: bool) -> Self {
        Self {
            id,
            policy: StalePolicy::Passthrough,
            initial,
        }
    }
}

/// Result of arbitrating one property
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Resolution {
    pub value: bool,
    /// Compensated age of the winning source, `None` if no channel was connected
    pub best_age_ms: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Arbitrator {
    stale_threshold_ms: u32,
}

impl Default for Arbitrator {
    fn default() -> Self {
        Self::new(STALE_THRESHOLD_MS)
    }
}

impl Arbitrator {
    pub const fn new(stale_threshold_ms: u32) -> Self {
        Self { stale_threshold_ms }
    }

    /// Resolve one property across `channels`
    ///
    /// Only `Connected` channels are consulted. Ties on compensated age keep
    /// the earlier channel in slice order.
    pub fn resolve(
        &self,
        channels: &[&mut dyn Channel],
        id: PropertyId,
        policy: StalePolicy,
        previous: bool,
    ) -> Resolution {
        let mut best_age_ms: Option<u32> = None;
        let mut value = previous;

        for channel in channels.iter() {
            if !channel.connection_state().is_connected() {
                continue;
            }
            let reading = channel.read_property(id);
            let compensated = reading.age_ms.saturating_add(channel.latency_bias_ms(id));
            if best_age_ms.map_or(true, |best| compensated < best) {
                best_age_ms = Some(compensated);
                value = reading.flag();
            }
        }

        if policy == StalePolicy::EnforceStaleFloor
            && best_age_ms.map_or(true, |age| age > self.stale_threshold_ms)
        {
            value = true;
        }

        Resolution { value, best_age_ms }
    }

    /// Resolve using a rule's policy
    pub fn resolve_rule(
        &self,
        channels: &[&mut dyn Channel],
        rule: &PropertyRule,
        previous: bool,
    ) -> Resolution {
        self.resolve(channels, rule.id, rule.policy, previous)
    }
}
