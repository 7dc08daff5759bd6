//! Receiver polling loop
//!
//! Arbitrates the operator unit and the deadman unit, drives the stop
//! output and reports to the host.

use defmt::*;
use embassy_rp::gpio::Output;

use estop_core::config::LinkConfig;
use estop_core::node::ReceiverNode;
use estop_core::PanelStatus;
use estop_drivers::{RadioRole, StopOutput};
use estop_protocol::{HostMessage, Peer};

use crate::channels::{HOST_TX, PANEL_STATUS, SET_ENABLED};
use crate::links::PeerLinks;
use crate::tasks::tick::LoopClock;

#[embassy_executor::task]
pub async fn receiver_task(stop_pin: Output<'static>, config: LinkConfig) {
    info!("Receiver task started");

    let mut output = match StopOutput::new(stop_pin, config.stop_output_active_low) {
        Ok(output) => output,
        Err(never) => match never {},
    };
    let mut remote = PeerLinks::new(Peer::Primary, Some(RadioRole::Listener), &config);
    let mut deadman = PeerLinks::new(Peer::Deadman, None, &config);
    let mut node = ReceiverNode::new(&config.timings);
    let mut clock = LoopClock::new();

    loop {
        let dt_ms = clock.next().await;

        if let Some(enabled) = SET_ENABLED.try_take() {
            node.set_enabled(enabled);
            if !enabled {
                warn!("Stop output bypassed by host");
            }
        }

        let tick = node.update(&mut remote.channels(), &mut deadman.channels(), dt_ms);

        if tick.stop_asserted != output.is_stop_asserted() {
            if tick.stop_asserted {
                warn!("Stop asserted: {}", tick.state);
            } else {
                info!("Stop released");
            }
        }
        if let Err(never) = output.set_stop(tick.stop_asserted) {
            match never {}
        }

        if tick.report_state && HOST_TX.try_send(HostMessage::EStopState(tick.state)).is_err() {
            trace!("Host queue full, dropping state");
        }
        if tick.report_status {
            let status = node.receiver_status();
            if HOST_TX.try_send(HostMessage::ReceiverStatus(status)).is_err() {
                trace!("Host queue full, dropping status");
            }
            PANEL_STATUS.signal(PanelStatus {
                comm: status.remote,
                stop_active: tick.stop_asserted,
            });
        }

        remote.recover(dt_ms);
        deadman.recover(dt_ms);
        if clock.stats_due() {
            remote.log_stats();
            deadman.log_stats();
        }
    }
}
