//! Status LED presentation task
//!
//! Patterns are defined in [`estop_core::indicator`].

use embassy_futures::select::{select, Either};
use embassy_rp::gpio::{Level, Output};
use embassy_time::{Duration, Ticker};

use defmt::*;

use estop_core::indicator::led_on;
use estop_core::PanelStatus;

use crate::channels::PANEL_STATUS;

/// LED pattern step
const STEP_MS: u64 = 250;

#[embassy_executor::task]
pub async fn status_led_task(mut led: Output<'static>) {
    info!("Status LED task started");

    let mut ticker = Ticker::every(Duration::from_millis(STEP_MS));
    let mut status: Option<PanelStatus> = None;
    let mut step: u8 = 0;

    loop {
        match select(PANEL_STATUS.wait(), ticker.next()).await {
            Either::First(update) => {
                if status.map(|s| s.link_up()) != Some(update.link_up()) {
                    info!("Link {}", if update.link_up() { "up" } else { "down" });
                }
                status = Some(update);
            }
            Either::Second(()) => step = step.wrapping_add(1),
        }

        let level = if led_on(status.as_ref(), step) {
            Level::High
        } else {
            Level::Low
        };
        led.set_level(level);
    }
}
