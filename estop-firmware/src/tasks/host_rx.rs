//! Host bridge receive task
//!
//! Receives commands from the host computer (receiver only).

use defmt::*;
use embassy_rp::uart::BufferedUartRx;
use embedded_io_async::Read;

use estop_protocol::{FrameParser, HostCommand};

use crate::channels::SET_ENABLED;

const RX_BUF_SIZE: usize = 64;

#[embassy_executor::task]
pub async fn host_rx_task(mut rx: BufferedUartRx) {
    info!("Host RX task started");

    let mut parser = FrameParser::new();
    let mut buf = [0u8; RX_BUF_SIZE];

    loop {
        match rx.read(&mut buf).await {
            Ok(n) if n > 0 => {
                for &byte in &buf[..n] {
                    match parser.feed(byte) {
                        Ok(Some(frame)) => match HostCommand::from_frame(&frame) {
                            Ok(HostCommand::SetEnabled(cmd)) => {
                                info!("Host set enabled: {}", cmd.enabled);
                                SET_ENABLED.signal(cmd.enabled);
                            }
                            Err(e) => warn!("Failed to parse host command: {:?}", e),
                        },
                        Ok(None) => {}
                        Err(e) => warn!("Host frame parse error: {:?}", e),
                    }
                }
            }
            Ok(_) => {}
            Err(e) => {
                warn!("Host UART read error: {:?}", e);
            }
        }
    }
}
