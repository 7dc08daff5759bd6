//! Radio co-processor transmit task

use defmt::*;
use embassy_rp::uart::BufferedUartTx;
use embedded_io_async::Write;

use estop_protocol::RadioRequest;

use crate::channels::{OutboundRequest, RADIO_TX};

#[embassy_executor::task]
pub async fn radio_tx_task(mut tx: BufferedUartTx) {
    info!("Radio TX task started");

    loop {
        let outbound = RADIO_TX.receive().await;
        let request = match &outbound {
            OutboundRequest::Send { route, bytes } => RadioRequest::Send {
                route: *route,
                bytes,
            },
            OutboundRequest::Reset { route } => {
                info!("Resetting radio on {}", route);
                RadioRequest::Reset { route: *route }
            }
        };

        let encoded = match request.to_frame().and_then(|frame| frame.encode_to_vec()) {
            Ok(encoded) => encoded,
            Err(e) => {
                warn!("Failed to encode radio request: {:?}", e);
                continue;
            }
        };
        if let Err(e) = tx.write_all(&encoded).await {
            warn!("Radio UART write error: {:?}", e);
        }
    }
}
