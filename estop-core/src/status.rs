//! Connectivity snapshot refreshed on a slow cadence

use estop_protocol::status::AGE_UNKNOWN_MS;
use estop_protocol::{ChannelStatus, CommStatus};

use crate::channel::Channel;
use crate::property::AGE_NEVER_MS;

/// Default snapshot refresh interval
pub const STATUS_INTERVAL_MS: u32 = 500;

/// Builds a [`CommStatus`] for one set of channels
///
/// The snapshot is rebuilt wholesale on the first update and then every
/// `interval_ms`; between rebuilds readers see the previous snapshot.
#[derive(Debug, Clone)]
pub struct StatusBuilder {
    interval_ms: u32,
    since_refresh_ms: Option<u32>,
    status: CommStatus,
}

impl StatusBuilder {
    pub fn new(interval_ms: u32) -> Self {
        Self {
            interval_ms,
            since_refresh_ms: None,
            status: CommStatus::default(),
        }
    }

    /// Advance time and rebuild the snapshot if due
    ///
    /// `best_age_ms` is the freshest compensated age seen by arbitration in
    /// this pass. Returns `true` when the snapshot was rebuilt.
    pub fn update(
        &mut self,
        channels: &[&mut dyn Channel],
        best_age_ms: Option<u32>,
        dt_ms: u32,
    ) -> bool {
        let due = match self.since_refresh_ms {
            None => true,
            Some(elapsed) => elapsed.saturating_add(dt_ms) >= self.interval_ms,
        };
        if !due {
            self.since_refresh_ms = self.since_refresh_ms.map(|e| e.saturating_add(dt_ms));
            return false;
        }

        let mut status = CommStatus::default();
        for channel in channels.iter() {
            let state = channel.connection_state();
            *status.channel_mut(channel.kind()) = ChannelStatus {
                state,
                rssi: if state.is_connected() {
                    channel.signal_strength()
                } else {
                    0
                },
            };
        }
        status.last_received_message_age_ms = match best_age_ms {
            Some(age) if age < AGE_NEVER_MS => age,
            _ => AGE_UNKNOWN_MS,
        };

        self.status = status;
        self.since_refresh_ms = Some(0);
        true
    }

    pub fn status(&self) -> &CommStatus {
        &self.status
    }
}
