//! Radio co-processor bridge messages
//!
//! The radio stacks run on a co-processor that forwards raw property packets
//! for each channel over the same frame layout as the host bridge.
//!
//! - Co-processor → MCU: received packets, link reports, TX-done
//! - MCU → Co-processor: packet sends, channel resets
//!
//! Every message names its [`Route`]: the peer endpoint and the channel kind,
//! packed into one byte as `peer << 4 | kind`. A receiver talks to two peers
//! (operator unit and deadman unit) through one co-processor.

use crate::frame::{Frame, FrameError, MAX_PAYLOAD_SIZE};
use crate::property::ChannelKind;
use heapless::Vec;

// Message type IDs: Co-processor → MCU
pub const MSG_RADIO_PACKET: u8 = 0x40;
pub const MSG_LINK_REPORT: u8 = 0x41;
pub const MSG_TX_DONE: u8 = 0x42;

// Message type IDs: MCU → Co-processor
pub const MSG_RADIO_SEND: u8 = 0x50;
pub const MSG_RADIO_RESET: u8 = 0x51;

const FLAG_PAIRED: u8 = 0x01;
const FLAG_FAULT: u8 = 0x02;

/// Remote endpoint a channel leads to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Peer {
    /// The opposite end of the E-Stop link (operator unit or receiver)
    Primary = 0,
    /// The deadman unit, only seen by the receiver
    Deadman = 1,
}

/// One channel to one peer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Route {
    pub peer: Peer,
    pub kind: ChannelKind,
}

impl Route {
    pub const fn new(peer: Peer, kind: ChannelKind) -> Self {
        Self { peer, kind }
    }

    pub fn from_byte(byte: u8) -> Option<Self> {
        let peer = match byte >> 4 {
            0 => Peer::Primary,
            1 => Peer::Deadman,
            _ => return None,
        };
        let kind = ChannelKind::from_byte(byte & 0x0F)?;
        Some(Self { peer, kind })
    }

    pub const fn to_byte(self) -> u8 {
        (self.peer as u8) << 4 | self.kind.to_byte()
    }
}

/// Events reported by the radio co-processor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RadioEvent<'a> {
    /// A packet arrived on one channel
    Packet {
        route: Route,
        rssi: i16,
        bytes: &'a [u8],
    },
    /// Link health of one channel
    LinkReport {
        route: Route,
        paired: bool,
        fault: bool,
        rssi: i16,
    },
    /// A transmission on one channel completed
    TxDone { route: Route },
}

fn parse_route(byte: u8) -> Result<Route, FrameError> {
    Route::from_byte(byte).ok_or(FrameError::InvalidFrame)
}

fn parse_rssi(bytes: &[u8]) -> Result<i16, FrameError> {
    match bytes {
        [lo, hi, ..] => Ok(i16::from_le_bytes([*lo, *hi])),
        _ => Err(FrameError::InvalidFrame),
    }
}

impl<'a> RadioEvent<'a> {
    /// Parse an event from a frame
    pub fn from_frame(frame: &'a Frame) -> Result<Self, FrameError> {
        let payload = &frame.payload[..];
        let (&route, rest) = payload.split_first().ok_or(FrameError::InvalidFrame)?;
        let route = parse_route(route)?;

        match frame.object_id {
            MSG_RADIO_PACKET => {
                // Payload: [route][rssi lo][rssi hi][packet...]
                let rssi = parse_rssi(rest)?;
                Ok(RadioEvent::Packet {
                    route,
                    rssi,
                    bytes: &rest[2..],
                })
            }
            MSG_LINK_REPORT => {
                // Payload: [route][flags][rssi lo][rssi hi]
                let (&flags, rest) = rest.split_first().ok_or(FrameError::InvalidFrame)?;
                let rssi = parse_rssi(rest)?;
                Ok(RadioEvent::LinkReport {
                    route,
                    paired: flags & FLAG_PAIRED != 0,
                    fault: flags & FLAG_FAULT != 0,
                    rssi,
                })
            }
            MSG_TX_DONE => Ok(RadioEvent::TxDone { route }),
            _ => Err(FrameError::InvalidFrame),
        }
    }

    /// Encode this event into a frame (co-processor side, or for testing)
    pub fn to_frame(&self) -> Result<Frame, FrameError> {
        let mut payload = Vec::<u8, MAX_PAYLOAD_SIZE>::new();
        let msg_type = match self {
            RadioEvent::Packet { route, rssi, bytes } => {
                payload
                    .push(route.to_byte())
                    .map_err(|_| FrameError::PayloadTooLarge)?;
                payload
                    .extend_from_slice(&rssi.to_le_bytes())
                    .map_err(|_| FrameError::PayloadTooLarge)?;
                payload
                    .extend_from_slice(bytes)
                    .map_err(|_| FrameError::PayloadTooLarge)?;
                MSG_RADIO_PACKET
            }
            RadioEvent::LinkReport {
                route,
                paired,
                fault,
                rssi,
            } => {
                let mut flags = 0;
                if *paired {
                    flags |= FLAG_PAIRED;
                }
                if *fault {
                    flags |= FLAG_FAULT;
                }
                let [lo, hi] = rssi.to_le_bytes();
                payload
                    .extend_from_slice(&[route.to_byte(), flags, lo, hi])
                    .map_err(|_| FrameError::PayloadTooLarge)?;
                MSG_LINK_REPORT
            }
            RadioEvent::TxDone { route } => {
                payload
                    .push(route.to_byte())
                    .map_err(|_| FrameError::PayloadTooLarge)?;
                MSG_TX_DONE
            }
        };
        Frame::new(msg_type, &payload)
    }
}

/// Requests sent to the radio co-processor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RadioRequest<'a> {
    /// Transmit a packet on one channel
    Send { route: Route, bytes: &'a [u8] },
    /// Tear down and restart one channel's radio stack
    Reset { route: Route },
}

impl<'a> RadioRequest<'a> {
    /// Encode this request into a frame
    pub fn to_frame(&self) -> Result<Frame, FrameError> {
        match self {
            RadioRequest::Send { route, bytes } => {
                // Payload: [route][packet...]
                let mut payload = Vec::<u8, MAX_PAYLOAD_SIZE>::new();
                payload
                    .push(route.to_byte())
                    .map_err(|_| FrameError::PayloadTooLarge)?;
                payload
                    .extend_from_slice(bytes)
                    .map_err(|_| FrameError::PayloadTooLarge)?;
                Frame::new(MSG_RADIO_SEND, &payload)
            }
            RadioRequest::Reset { route } => Frame::new(MSG_RADIO_RESET, &[route.to_byte()]),
        }
    }

    /// Parse a request from a frame (co-processor side, or for testing)
    pub fn from_frame(frame: &'a Frame) -> Result<Self, FrameError> {
        let (&route, rest) = frame
            .payload
            .split_first()
            .ok_or(FrameError::InvalidFrame)?;
        let route = parse_route(route)?;
        match frame.object_id {
            MSG_RADIO_SEND => Ok(RadioRequest::Send { route, bytes: rest }),
            MSG_RADIO_RESET => Ok(RadioRequest::Reset { route }),
            _ => Err(FrameError::InvalidFrame),
        }
    }
}
