//! Wireless E-Stop wire protocol
//!
//! This crate defines everything that crosses a wire or an air gap:
//!
//! - The safety property vocabulary shared by every radio channel
//!   ([`PropertyId`], [`ChannelKind`], [`ChannelState`])
//! - The property packet carried by each radio channel
//! - The framed object stream between the receiver and a host computer,
//!   also reused for the radio co-processor bridge
//!
//! # Frame Overview
//!
//! ```text
//! ┌───────┬────────┬──────┬─────────┬─────────────┬──────────┐
//! │ START │ LENGTH │ TYPE │ VERSION │ PAYLOAD     │ CHECKSUM │
//! │ 1B    │ 1B     │ 1B   │ 1B      │ 0–64B       │ 1B       │
//! └───────┴────────┴──────┴─────────┴─────────────┴──────────┘
//! ```
//!
//! # Property Packet Overview
//!
//! ```text
//! data:  [property id][value bytes...]
//! ack:   [0xFF][property id]
//! ```

#![cfg_attr(not(any(test, feature = "std")), no_std)]
#![deny(unsafe_code)]

pub mod frame;
pub mod messages;
pub mod packet;
pub mod property;
pub mod radio_bridge;
pub mod status;

pub use frame::{Frame, FrameError, FrameParser, FRAME_START, MAX_PAYLOAD_SIZE, PROTOCOL_VERSION};
pub use messages::{HostCommand, HostMessage, MessageError};
pub use packet::{Packet, PacketError, ACK_MARKER, MAX_PACKET_LEN, MAX_VALUE_LEN};
pub use property::{ChannelKind, ChannelState, PropertyId};
pub use radio_bridge::{Peer, RadioEvent, RadioRequest, Route};
pub use status::{ChannelStatus, CommStatus, EStopState, ReceiverStatus, SetEnabled};
