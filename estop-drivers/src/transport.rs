//! Packet transport abstraction
//!
//! A transport moves whole property packets to and from one peer over one
//! radio. It never blocks: `send` either queues or fails, `receive` returns
//! `None` when nothing is pending.

/// Errors reported by a transport
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransportError {
    /// Radio stack failed to start or stopped responding
    Hardware,
    /// No link to the peer (not paired, not associated)
    NotConnected,
    /// Transmit queue full or radio busy
    Busy,
    /// Packet larger than the transport can carry
    TooLarge,
}

impl TransportError {
    /// Errors that put the channel into `Error` until reinitialized
    pub fn is_fatal(&self) -> bool {
        matches!(self, TransportError::Hardware)
    }
}

/// Metadata of one received packet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Received {
    /// Bytes written into the receive buffer
    pub len: usize,
    /// Signal strength of this packet in dBm, if the radio sampled it
    pub rssi: Option<i16>,
}

/// Non-blocking packet transport to one peer
pub trait Transport {
    /// Start the radio stack
    fn init(&mut self) -> Result<(), TransportError>;

    /// Queue one packet for transmission
    ///
    /// `Ok` means the radio accepted the packet (or, for acknowledged links,
    /// the peer confirmed it).
    fn send(&mut self, packet: &[u8]) -> Result<(), TransportError>;

    /// Take the next received packet, if any
    fn receive(&mut self, buf: &mut [u8]) -> Result<Option<Received>, TransportError>;

    /// Last sampled signal strength in dBm
    fn rssi(&self) -> i16;

    /// Link-layer pairing, for transports that have one
    fn is_paired(&self) -> bool {
        true
    }

    /// Radio stack reports a fault outside of any call
    fn has_fault(&self) -> bool {
        false
    }
}
