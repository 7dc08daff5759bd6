//! Inter-task communication channels
//!
//! Static queues and signals shared between the radio bridge tasks, the
//! host bridge tasks and the node's polling loop.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_sync::signal::Signal;
use heapless::Vec;

use estop_core::{CompletionFlag, PanelStatus};
use estop_protocol::{ChannelKind, HostMessage, Peer, Route, MAX_PACKET_LEN};

use crate::bridge::RouteHealth;

/// Routes the co-processor can carry: every channel kind to every peer
pub const ROUTE_COUNT: usize = 2 * ChannelKind::COUNT;

/// Packets buffered per route between the UART reader and the polling loop
const INBOUND_QUEUE_SIZE: usize = 8;

/// Requests buffered for the co-processor UART writer
const RADIO_TX_QUEUE_SIZE: usize = 16;

/// Objects buffered for the host UART writer
const HOST_TX_QUEUE_SIZE: usize = 4;

/// One packet received by the co-processor
pub struct InboundPacket {
    pub bytes: Vec<u8, MAX_PACKET_LEN>,
    pub rssi: i16,
}

/// Owned form of a request for the co-processor
pub enum OutboundRequest {
    Send {
        route: Route,
        bytes: Vec<u8, MAX_PACKET_LEN>,
    },
    Reset {
        route: Route,
    },
}

pub type PacketQueue = Channel<CriticalSectionRawMutex, InboundPacket, INBOUND_QUEUE_SIZE>;

/// Received packets, indexed by [`route_index`]
pub static INBOUND: [PacketQueue; ROUTE_COUNT] = [const { Channel::new() }; ROUTE_COUNT];

/// Link health reported by the co-processor, indexed by [`route_index`]
pub static ROUTE_HEALTH: [RouteHealth; ROUTE_COUNT] = [const { RouteHealth::new() }; ROUTE_COUNT];

/// Long-range radio completion per peer
///
/// A node plays one radio role per peer, so the same flag carries TX-done
/// for a broadcaster and RX-ready for a listener.
pub static RADIO_DONE: [CompletionFlag; 2] = [CompletionFlag::new(), CompletionFlag::new()];

/// Requests for the radio co-processor
pub static RADIO_TX: Channel<CriticalSectionRawMutex, OutboundRequest, RADIO_TX_QUEUE_SIZE> =
    Channel::new();

/// Objects for the host computer (receiver only)
pub static HOST_TX: Channel<CriticalSectionRawMutex, HostMessage, HOST_TX_QUEUE_SIZE> =
    Channel::new();

/// Enable gate requested by the host
pub static SET_ENABLED: Signal<CriticalSectionRawMutex, bool> = Signal::new();

/// Latest status for the LED task
pub static PANEL_STATUS: Signal<CriticalSectionRawMutex, PanelStatus> = Signal::new();

/// Latest battery level in percent (hand-held units)
pub static BATTERY_PERCENT: Signal<CriticalSectionRawMutex, u8> = Signal::new();

pub fn route_index(route: Route) -> usize {
    route.peer as usize * ChannelKind::COUNT + route.kind.to_byte() as usize
}

pub fn radio_done(peer: Peer) -> &'static CompletionFlag {
    &RADIO_DONE[peer as usize]
}
