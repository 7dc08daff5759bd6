//! Channel sets per peer
//!
//! Builds the channel variants fitted on this board for one peer and hands
//! them to the core as a slice of `dyn Channel`.

use defmt::*;
use heapless::Vec;

use estop_core::config::LinkConfig;
use estop_core::Channel;
use estop_drivers::{BroadcastLink, RadioLink, RadioRole, ShortRangeLink};
use estop_protocol::{ChannelKind, ChannelState, Peer, Route};

use crate::bridge::BridgeTransport;
use crate::channels::radio_done;

/// Time a channel may sit in `Error` before it is restarted
pub const REINIT_BACKOFF_MS: u32 = 5_000;

/// Every channel to one peer
pub struct PeerLinks {
    peer: Peer,
    radio: Option<RadioLink<'static, BridgeTransport>>,
    short_range: Option<ShortRangeLink<BridgeTransport>>,
    broadcast: Option<BroadcastLink<BridgeTransport>>,
    in_error_ms: u32,
}

impl PeerLinks {
    /// Build and start the channels enabled in `config`
    ///
    /// `radio_role` is `None` for peers not reachable over the long-range
    /// radio.
    pub fn new(peer: Peer, radio_role: Option<RadioRole>, config: &LinkConfig) -> Self {
        let timings = &config.timings;
        let set = &config.channels;
        let route = |kind| BridgeTransport::new(Route::new(peer, kind));

        let radio = match radio_role {
            Some(role) if set.contains(ChannelKind::Radio) => {
                let mut link =
                    RadioLink::new(route(ChannelKind::Radio), role, radio_done(peer), timings);
                link.start();
                Some(link)
            }
            _ => None,
        };
        let short_range = set.contains(ChannelKind::ShortRange).then(|| {
            let mut link = ShortRangeLink::new(route(ChannelKind::ShortRange), timings);
            link.start();
            link
        });
        let broadcast = set.contains(ChannelKind::Broadcast).then(|| {
            let mut link = BroadcastLink::new(route(ChannelKind::Broadcast), timings);
            link.start();
            link
        });

        info!(
            "{} links: radio={} short_range={} broadcast={}",
            peer,
            radio.is_some(),
            short_range.is_some(),
            broadcast.is_some()
        );

        Self {
            peer,
            radio,
            short_range,
            broadcast,
            in_error_ms: 0,
        }
    }

    /// Fitted channels in arbitration order
    pub fn channels(&mut self) -> Vec<&mut dyn Channel, 3> {
        let mut channels: Vec<&mut dyn Channel, 3> = Vec::new();
        if let Some(link) = self.radio.as_mut() {
            let _ = channels.push(link);
        }
        if let Some(link) = self.short_range.as_mut() {
            let _ = channels.push(link);
        }
        if let Some(link) = self.broadcast.as_mut() {
            let _ = channels.push(link);
        }
        channels
    }

    /// Restart channels that have been in `Error` for the back-off period
    pub fn recover(&mut self, dt_ms: u32) {
        let any_error = self
            .channels()
            .iter()
            .any(|channel| channel.connection_state() == ChannelState::Error);
        if !any_error {
            self.in_error_ms = 0;
            return;
        }

        self.in_error_ms = self.in_error_ms.saturating_add(dt_ms);
        if self.in_error_ms < REINIT_BACKOFF_MS {
            return;
        }
        self.in_error_ms = 0;

        let peer = self.peer;
        for channel in self.channels().iter_mut() {
            if channel.connection_state() == ChannelState::Error {
                warn!("{} {} channel in error, reinitializing", peer, channel.kind().label());
                channel.reinitialize();
            }
        }
    }

    /// Log link counters
    pub fn log_stats(&self) {
        if let Some(link) = &self.radio {
            debug!("{} radio: {}", self.peer, link.stats());
        }
        if let Some(link) = &self.short_range {
            debug!("{} short_range: {}", self.peer, link.stats());
        }
        if let Some(link) = &self.broadcast {
            debug!("{} broadcast: {}", self.peer, link.stats());
        }
    }
}
