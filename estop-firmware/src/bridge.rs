//! Radio co-processor transport
//!
//! The radios live on a co-processor behind UART0. The UART tasks move
//! frames; this module gives each route a non-blocking [`Transport`] over
//! the shared queues so the channel variants never await.

use heapless::Vec;
use portable_atomic::{AtomicBool, AtomicI16, Ordering};

use estop_drivers::{Received, Transport, TransportError};
use estop_protocol::Route;

use crate::channels::{route_index, OutboundRequest, INBOUND, RADIO_TX, ROUTE_HEALTH};

/// Last link report for one route
pub struct RouteHealth {
    paired: AtomicBool,
    fault: AtomicBool,
    rssi: AtomicI16,
}

impl RouteHealth {
    pub const fn new() -> Self {
        Self {
            paired: AtomicBool::new(false),
            fault: AtomicBool::new(false),
            rssi: AtomicI16::new(0),
        }
    }

    pub fn report(&self, paired: bool, fault: bool, rssi: i16) {
        self.paired.store(paired, Ordering::Relaxed);
        self.rssi.store(rssi, Ordering::Relaxed);
        self.fault.store(fault, Ordering::Release);
    }

    pub fn set_rssi(&self, rssi: i16) {
        self.rssi.store(rssi, Ordering::Relaxed);
    }
}

/// Transport for one route through the co-processor
pub struct BridgeTransport {
    route: Route,
}

impl BridgeTransport {
    pub fn new(route: Route) -> Self {
        Self { route }
    }

    fn health(&self) -> &'static RouteHealth {
        &ROUTE_HEALTH[route_index(self.route)]
    }
}

impl Transport for BridgeTransport {
    fn init(&mut self) -> Result<(), TransportError> {
        // Packets queued before the reset belong to the old session
        let queue = &INBOUND[route_index(self.route)];
        while queue.try_receive().is_ok() {}

        self.health().fault.store(false, Ordering::Release);
        RADIO_TX
            .try_send(OutboundRequest::Reset { route: self.route })
            .map_err(|_| TransportError::Hardware)
    }

    fn send(&mut self, packet: &[u8]) -> Result<(), TransportError> {
        let bytes = Vec::from_slice(packet).map_err(|_| TransportError::TooLarge)?;
        RADIO_TX
            .try_send(OutboundRequest::Send {
                route: self.route,
                bytes,
            })
            .map_err(|_| TransportError::Busy)
    }

    fn receive(&mut self, buf: &mut [u8]) -> Result<Option<Received>, TransportError> {
        let Ok(packet) = INBOUND[route_index(self.route)].try_receive() else {
            return Ok(None);
        };
        let len = packet.bytes.len();
        if len > buf.len() {
            return Err(TransportError::TooLarge);
        }
        buf[..len].copy_from_slice(&packet.bytes);
        Ok(Some(Received {
            len,
            rssi: Some(packet.rssi),
        }))
    }

    fn rssi(&self) -> i16 {
        self.health().rssi.load(Ordering::Relaxed)
    }

    fn is_paired(&self) -> bool {
        self.health().paired.load(Ordering::Relaxed)
    }

    fn has_fault(&self) -> bool {
        self.health().fault.load(Ordering::Acquire)
    }
}
