//! Deadman unit polling loop

use defmt::*;
use embassy_rp::gpio::Input;

use estop_core::config::LinkConfig;
use estop_core::node::{BatteryReport, DeadmanInputs, DeadmanState, DeadmanUnit};
use estop_core::{PanelStatus, SafetyLink, SafetyReport, TransmitScheduler};
use estop_protocol::Peer;

use crate::channels::{BATTERY_PERCENT, PANEL_STATUS};
use crate::links::PeerLinks;
use crate::tasks::tick::LoopClock;

/// Deadman switches, wired to ground with pull-ups
pub struct DeadmanPins {
    pub enable: Input<'static>,
    pub grip: Input<'static>,
    pub panic: Input<'static>,
}

impl DeadmanPins {
    fn sample(&self) -> DeadmanInputs {
        DeadmanInputs {
            enable_switch: self.enable.is_low(),
            deadman_held: self.grip.is_low(),
            panic_pressed: self.panic.is_low(),
        }
    }
}

#[embassy_executor::task]
pub async fn deadman_task(pins: DeadmanPins, config: LinkConfig) {
    info!("Deadman task started");

    // The deadman unit has no long-range radio
    let mut links = PeerLinks::new(Peer::Primary, None, &config);
    let mut uplink = SafetyLink::uplink_only(&config.timings);
    let mut scheduler =
        TransmitScheduler::<DeadmanState>::new(config.timings.transmit_interval_ms);
    let mut unit = DeadmanUnit::new();
    let mut battery: Option<u8> = None;
    let mut clock = LoopClock::new();

    loop {
        let dt_ms = clock.next().await;

        let previous = unit.state();
        let state = unit.update(pins.sample());
        if state != previous {
            info!(
                "Deadman active {}, triggered {}, panic latched {}",
                state.active,
                state.triggered,
                unit.panic_latched()
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
                stop_active: state.active && state.triggered,
            });
        }
        drop(channels);

        links.recover(dt_ms);
        if clock.stats_due() {
            links.log_stats();
        }
    }
}
