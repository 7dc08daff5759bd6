//! Radio co-processor receive task
//!
//! Parses frames from the co-processor and fans them out to the per-route
//! queues, link health table and completion flags.

use defmt::*;
use embassy_rp::uart::BufferedUartRx;
use embedded_io_async::Read;
use heapless::Vec;

use estop_protocol::{ChannelKind, FrameParser, RadioEvent};

use crate::channels::{radio_done, route_index, InboundPacket, INBOUND, ROUTE_HEALTH};

/// Buffer size for UART receive
const RX_BUF_SIZE: usize = 64;

#[embassy_executor::task]
pub async fn radio_rx_task(mut rx: BufferedUartRx) {
    info!("Radio RX task started");

    let mut parser = FrameParser::new();
    let mut buf = [0u8; RX_BUF_SIZE];

    loop {
        match rx.read(&mut buf).await {
            Ok(n) if n > 0 => {
                trace!("Radio RX: {} bytes", n);

                for &byte in &buf[..n] {
                    match parser.feed(byte) {
                        Ok(Some(frame)) => match RadioEvent::from_frame(&frame) {
                            Ok(event) => handle_radio_event(event),
                            Err(e) => warn!("Bad co-processor frame: {:?}", e),
                        },
                        Ok(None) => {}
                        Err(e) => {
                            warn!("Radio frame parse error: {:?}", e);
                        }
                    }
                }
            }
            Ok(_) => {}
            Err(e) => {
                warn!("Radio UART read error: {:?}", e);
            }
        }
    }
}

fn handle_radio_event(event: RadioEvent<'_>) {
    match event {
        RadioEvent::Packet { route, rssi, bytes } => {
            let Ok(bytes) = Vec::from_slice(bytes) else {
                warn!("Oversized packet on {}, dropping", route);
                return;
            };
            if INBOUND[route_index(route)]
                .try_send(InboundPacket { bytes, rssi })
                .is_err()
            {
                trace!("Inbound queue full on {}", route);
            }
            ROUTE_HEALTH[route_index(route)].set_rssi(rssi);
            if route.kind == ChannelKind::Radio {
                radio_done(route.peer).signal();
            }
        }
        RadioEvent::LinkReport {
            route,
            paired,
            fault,
            rssi,
        } => {
            if fault {
                warn!("Co-processor reports fault on {}", route);
            }
            ROUTE_HEALTH[route_index(route)].report(paired, fault, rssi);
        }
        RadioEvent::TxDone { route } => {
            trace!("TX done on {}", route);
            if route.kind == ChannelKind::Radio {
                radio_done(route.peer).signal();
            }
        }
    }
}
