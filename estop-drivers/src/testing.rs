//! Test doubles for transports and output pins

use std::collections::VecDeque;
use std::vec::Vec;

use embedded_hal::digital::{ErrorType, OutputPin};

use crate::transport::{Received, Transport, TransportError};

/// In-memory transport: tests push inbound packets and inspect what was sent
pub struct MemoryTransport {
    pub inbound: VecDeque<(Vec<u8>, Option<i16>)>,
    pub sent: Vec<Vec<u8>>,
    pub paired: bool,
    pub fault: bool,
    pub fail_init: bool,
    pub send_error: Option<TransportError>,
    pub rssi: i16,
    pub inits: u32,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self {
            inbound: VecDeque::new(),
            sent: Vec::new(),
            paired: true,
            fault: false,
            fail_init: false,
            send_error: None,
            rssi: -60,
            inits: 0,
        }
    }

    pub fn push_inbound(&mut self, bytes: &[u8], rssi: Option<i16>) {
        self.inbound.push_back((bytes.to_vec(), rssi));
    }

    /// Move everything sent so far into `peer`'s inbound queue
    pub fn deliver_to(&mut self, peer: &mut MemoryTransport) {
        for packet in self.sent.drain(..) {
            peer.inbound.push_back((packet, Some(self.rssi)));
        }
    }
}

impl Transport for MemoryTransport {
    fn init(&mut self) -> Result<(), TransportError> {
        self.inits += 1;
        if self.fail_init {
            Err(TransportError::Hardware)
        } else {
            Ok(())
        }
    }

    fn send(&mut self, packet: &[u8]) -> Result<(), TransportError> {
        if let Some(e) = self.send_error {
            return Err(e);
        }
        self.sent.push(packet.to_vec());
        Ok(())
    }

    fn receive(&mut self, buf: &mut [u8]) -> Result<Option<Received>, TransportError> {
        let Some((bytes, rssi)) = self.inbound.pop_front() else {
            return Ok(None);
        };
        if bytes.len() > buf.len() {
            return Err(TransportError::TooLarge);
        }
        buf[..bytes.len()].copy_from_slice(&bytes);
        Ok(Some(Received {
            len: bytes.len(),
            rssi,
        }))
    }

    fn rssi(&self) -> i16 {
        self.rssi
    }

    fn is_paired(&self) -> bool {
        self.paired
    }

    fn has_fault(&self) -> bool {
        self.fault
    }
}

/// Output pin that records every level it is driven to
#[derive(Default)]
pub struct RecordingPin {
    pub high: bool,
    pub history: Vec<bool>,
}

impl ErrorType for RecordingPin {
    type Error = core::convert::Infallible;
}

impl OutputPin for RecordingPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.high = false;
        self.history.push(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.high = true;
        self.history.push(true);
        Ok(())
    }
}
