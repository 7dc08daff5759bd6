//! Operator unit polling loop
//!
//! Samples the stop buttons, latches them and pushes the result over every
//! channel to the receiver.

use defmt::*;
use embassy_rp::gpio::Input;

use estop_core::config::LinkConfig;
use estop_core::node::{BatteryReport, OperatorInputs, OperatorPanel, OperatorState};
use estop_core::{PanelStatus, SafetyLink, SafetyReport, TransmitScheduler};
use estop_drivers::RadioRole;
use estop_protocol::Peer;

use crate::channels::{BATTERY_PERCENT, PANEL_STATUS};
use crate::links::PeerLinks;
use crate::tasks::tick::LoopClock;

/// Panel buttons, wired to ground with pull-ups
pub struct OperatorPins {
    pub estop: Input<'static>,
    pub soft_estop: Input<'static>,
    pub release: Input<'static>,
}

impl OperatorPins {
    fn sample(&self) -> OperatorInputs {
        OperatorInputs {
            estop_pressed: self.estop.is_low(),
            soft_estop_pressed: self.soft_estop.is_low(),
            release_pressed: self.release.is_low(),
        }
    }
}

#[embassy_executor::task]
pub async fn operator_task(pins: OperatorPins, config: LinkConfig) {
    info!("Operator task started");

    let mut links = PeerLinks::new(Peer::Primary, Some(RadioRole::Broadcaster), &config);
    let mut uplink = SafetyLink::uplink_only(&config.timings);
    let mut scheduler =
        TransmitScheduler::<OperatorState>::new(config.timings.transmit_interval_ms);
    let mut panel = OperatorPanel::new();
    let mut battery: Option<u8> = None;
    let mut clock = LoopClock::new();

    loop {
        let dt_ms = clock.next().await;

        let previous = panel.state();
        let state = panel.update(pins.sample());
        if state != previous {
            info!(
                "E-Stop {}, soft E-Stop {}",
                state.estop_active, state.soft_estop_active
            );
        }
        if let Some(level) = BATTERY_PERCENT.try_take() {
            battery = Some(level);
        }

        let mut channels = links.channels();
        let refreshed = uplink.update(&mut channels, dt_ms);
        scheduler.publish(&mut channels, &state, dt_ms);

        if refreshed {
            if let Some(level) = battery {
                let report = BatteryReport(level);
                for channel in channels.iter_mut() {
                    report.for_each_property(|id, bytes| channel.write_property(id, bytes));
                }
            }
            PANEL_STATUS.signal(PanelStatus {
                comm: *uplink.status(),
                stop_active: state.estop_active || state.soft_estop_active,
            });
        }
        drop(channels);

        links.recover(dt_ms);
        if clock.stats_due() {
            links.log_stats();
        }
    }
}
