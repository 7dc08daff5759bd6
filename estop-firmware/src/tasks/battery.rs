//! Battery sampling task (hand-held units)

use defmt::*;
use embassy_rp::adc::{Adc, Async, Channel};
use embassy_time::{Duration, Ticker};

use estop_core::battery::{battery_percent, cell_millivolts, MeanFilter};

use crate::channels::BATTERY_PERCENT;

/// Sampling period
const SAMPLE_INTERVAL_MS: u64 = 1_000;

/// RP2040 ADC: 12 bit against 3.3 V
const ADC_REF_MV: u32 = 3300;
const ADC_MAX: u16 = 4095;

/// VSYS is divided by 3 before the ADC pin on Pico-style boards
const DIVIDER_NUM: u32 = 3;
const DIVIDER_DEN: u32 = 1;

#[embassy_executor::task]
pub async fn battery_task(mut adc: Adc<'static, Async>, mut channel: Channel<'static>) {
    info!("Battery task started");

    let mut filter = MeanFilter::<8>::new();
    let mut ticker = Ticker::every(Duration::from_millis(SAMPLE_INTERVAL_MS));
    let mut last_percent = None;

    loop {
        ticker.next().await;

        match adc.read(&mut channel).await {
            Ok(raw) => {
                let mv = cell_millivolts(raw, ADC_REF_MV, ADC_MAX, DIVIDER_NUM, DIVIDER_DEN);
                filter.push(mv);
            }
            Err(e) => {
                warn!("Battery ADC read failed: {:?}", e);
                continue;
            }
        }

        if let Some(mv) = filter.mean() {
            let percent = battery_percent(mv);
            if last_percent != Some(percent) {
                debug!("Battery {} mV ({}%)", mv, percent);
                last_percent = Some(percent);
            }
            BATTERY_PERCENT.signal(percent);
        }
    }
}
