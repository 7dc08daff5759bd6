//! Host bridge transmit task

use defmt::*;
use embassy_rp::uart::BufferedUartTx;
use embedded_io_async::Write;

use crate::channels::HOST_TX;

#[embassy_executor::task]
pub async fn host_tx_task(mut tx: BufferedUartTx) {
    info!("Host TX task started");

    loop {
        let message = HOST_TX.receive().await;
        let frame = match message.to_frame() {
            Ok(frame) => frame,
            Err(e) => {
                warn!("Failed to encode host message: {:?}", e);
                continue;
            }
        };

        let mut buf = [0u8; 72];
        match frame.encode(&mut buf) {
            Ok(len) => {
                if let Err(e) = tx.write_all(&buf[..len]).await {
                    warn!("Host UART write error: {:?}", e);
                } else {
                    trace!("Sent object 0x{:02x} to host", message.object_id());
                }
            }
            Err(e) => warn!("Host frame encode error: {:?}", e),
        }
    }
}
