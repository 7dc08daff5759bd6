//! Channel contract
//!
//! Every transport between two safety-link endpoints implements [`Channel`].
//! A channel owns a [`PropertyStore`](crate::PropertyStore) and reports its
//! own connectivity; it never interprets property values.

pub mod flag;

pub use flag::CompletionFlag;

use estop_protocol::{ChannelKind, ChannelState, PropertyId};

use crate::property::PropertyValue;

/// One unreliable transport to the peer endpoint
///
/// All methods are non-blocking. Ages only advance through [`advance`], so a
/// polling pass can age every channel by the same `dt` before reading any of
/// them.
///
/// [`advance`]: Channel::advance
pub trait Channel {
    /// Which transport this is
    fn kind(&self) -> ChannelKind;

    /// Age all properties and liveness timers by `dt_ms`
    fn advance(&mut self, dt_ms: u32);

    /// Drain pending receive events and run the variant's send policy
    fn poll(&mut self);

    /// Current connectivity
    ///
    /// `Error` is sticky until [`reinitialize`](Channel::reinitialize).
    fn connection_state(&self) -> ChannelState;

    /// Last sampled signal strength in dBm
    fn signal_strength(&self) -> i16;

    /// Last received value of `id`, regardless of connection state
    fn read_property(&self, id: PropertyId) -> PropertyValue;

    /// Queue a value for transmission
    ///
    /// Best-effort and idempotent. Variants may drop properties they do not
    /// carry.
    fn write_property(&mut self, id: PropertyId, bytes: &[u8]);

    /// Extra age charged to values read from this channel
    ///
    /// Compensates transports whose delivery latency is known to be long.
    fn latency_bias_ms(&self, _id: PropertyId) -> u32 {
        0
    }

    /// Tear down and restart the transport
    ///
    /// The only way out of `Error`.
    fn reinitialize(&mut self);
}
