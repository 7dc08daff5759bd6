//! Host bridge objects
//!
//! Object types are divided into two directions:
//! - Receiver → Host: safety state and connectivity reports
//! - Host → Receiver: enable gate command
//!
//! Payloads are postcard-encoded status structs.

use crate::frame::{Frame, FrameError, MAX_PAYLOAD_SIZE, PROTOCOL_VERSION};
use crate::status::{EStopState, ReceiverStatus, SetEnabled};

// Object IDs: Receiver → Host
//
// 0x01 stays reserved for `CommStatus`, which only travels nested inside
// `ReceiverStatus`.
pub const OBJ_ESTOP_STATE: u8 = 0x02;
pub const OBJ_RECEIVER_STATUS: u8 = 0x03;

// Object IDs: Host → Receiver
pub const OBJ_SET_ENABLED: u8 = 0x10;

/// Errors from mapping frames to host objects
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MessageError {
    /// Framing layer failed
    Frame(FrameError),
    /// Object did not fit the payload buffer
    Encode,
    /// Payload did not decode as the object its id names
    Decode,
    /// Frame carries a payload layout this build does not understand
    VersionMismatch(u8),
    /// Object id not known in this direction
    UnknownObject(u8),
}

impl From<FrameError> for MessageError {
    fn from(err: FrameError) -> Self {
        MessageError::Frame(err)
    }
}

impl From<postcard::Error> for MessageError {
    fn from(err: postcard::Error) -> Self {
        match err {
            postcard::Error::SerializeBufferFull => MessageError::Encode,
            _ => MessageError::Decode,
        }
    }
}

fn encode_object<T: serde::Serialize>(object_id: u8, value: &T) -> Result<Frame, MessageError> {
    let mut buf = [0u8; MAX_PAYLOAD_SIZE];
    let used = postcard::to_slice(value, &mut buf)?;
    Ok(Frame::new(object_id, used)?)
}

fn check_version(frame: &Frame) -> Result<(), MessageError> {
    if frame.version != PROTOCOL_VERSION {
        return Err(MessageError::VersionMismatch(frame.version));
    }
    Ok(())
}

/// Objects sent from the receiver to the host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HostMessage {
    /// Combined safety state (on change or every transmit interval)
    EStopState(EStopState),
    /// Connectivity of both peers (status interval)
    ReceiverStatus(ReceiverStatus),
}

impl HostMessage {
    pub fn object_id(&self) -> u8 {
        match self {
            HostMessage::EStopState(_) => OBJ_ESTOP_STATE,
            HostMessage::ReceiverStatus(_) => OBJ_RECEIVER_STATUS,
        }
    }

    /// Encode this message into a frame
    pub fn to_frame(&self) -> Result<Frame, MessageError> {
        let id = self.object_id();
        match self {
            HostMessage::EStopState(state) => encode_object(id, state),
            HostMessage::ReceiverStatus(status) => encode_object(id, status),
        }
    }

    /// Parse a message from a frame (host side, or for testing)
    pub fn from_frame(frame: &Frame) -> Result<Self, MessageError> {
        check_version(frame)?;
        match frame.object_id {
            OBJ_ESTOP_STATE => Ok(HostMessage::EStopState(postcard::from_bytes(
                &frame.payload,
            )?)),
            OBJ_RECEIVER_STATUS => Ok(HostMessage::ReceiverStatus(postcard::from_bytes(
                &frame.payload,
            )?)),
            other => Err(MessageError::UnknownObject(other)),
        }
    }
}

/// Commands parsed from host-originated frames
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HostCommand {
    /// Open or close the stop output gate
    SetEnabled(SetEnabled),
}

impl HostCommand {
    /// Parse a command from a frame
    pub fn from_frame(frame: &Frame) -> Result<Self, MessageError> {
        check_version(frame)?;
        match frame.object_id {
            OBJ_SET_ENABLED => Ok(HostCommand::SetEnabled(postcard::from_bytes(
                &frame.payload,
            )?)),
            other => Err(MessageError::UnknownObject(other)),
        }
    }

    /// Encode this command into a frame (host side, or for testing)
    pub fn to_frame(&self) -> Result<Frame, MessageError> {
        match self {
            HostCommand::SetEnabled(cmd) => encode_object(OBJ_SET_ENABLED, cmd),
        }
    }
}
