//! Wireless E-Stop link firmware
//!
//! One image for all three units of an E-Stop set. The role (operator,
//! receiver or deadman) comes from the embedded `link.toml`; the radios
//! sit on a co-processor reached over UART0.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::adc::{Adc, Channel as AdcChannel, InterruptHandler as AdcInterruptHandler};
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::{Input, Level, Output, Pull};
use embassy_rp::peripherals::{UART0, UART1};
use embassy_rp::uart::{BufferedInterruptHandler, Config as UartConfig, Uart};
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use estop_core::config::NodeRole;

/// Embedded configuration (compiled into firmware)
/// Edit link.toml and rebuild to customize
const EMBEDDED_CONFIG: &str = include_str!("../link.toml");

/// Radio co-processor link speed
const RADIO_BAUDRATE: u32 = 460_800;

mod bridge;
mod channels;
mod config;
mod links;
mod tasks;

bind_interrupts!(struct Irqs {
    UART0_IRQ => BufferedInterruptHandler<UART0>;
    UART1_IRQ => BufferedInterruptHandler<UART1>;
    ADC_IRQ_FIFO => AdcInterruptHandler;
});

// Static cells for UART buffers (must live forever)
static RADIO_TX_BUF: StaticCell<[u8; 256]> = StaticCell::new();
static RADIO_RX_BUF: StaticCell<[u8; 256]> = StaticCell::new();
static HOST_TX_BUF: StaticCell<[u8; 256]> = StaticCell::new();
static HOST_RX_BUF: StaticCell<[u8; 64]> = StaticCell::new();

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("E-Stop link firmware starting...");

    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    let config = config::load_config(EMBEDDED_CONFIG);

    // Radio co-processor on UART0 (GPIO0 TX, GPIO1 RX)
    let radio_uart_config = {
        let mut cfg = UartConfig::default();
        cfg.baudrate = RADIO_BAUDRATE;
        cfg
    };
    let radio_uart = Uart::new_blocking(p.UART0, p.PIN_0, p.PIN_1, radio_uart_config);
    let radio_uart = radio_uart.into_buffered(
        Irqs,
        RADIO_TX_BUF.init([0u8; 256]),
        RADIO_RX_BUF.init([0u8; 256]),
    );
    let (radio_tx, radio_rx) = radio_uart.split();
    info!("UART initialized for radio co-processor");

    spawner.spawn(tasks::radio_rx_task(radio_rx)).unwrap();
    spawner.spawn(tasks::radio_tx_task(radio_tx)).unwrap();

    // On-board LED (GPIO25)
    let led = Output::new(p.PIN_25, Level::Low);
    spawner.spawn(tasks::status_led_task(led)).unwrap();

    match config.role {
        NodeRole::Receiver => {
            // Host bridge on UART1 (GPIO4 TX, GPIO5 RX), 115200 baud default
            let host_uart = Uart::new_blocking(p.UART1, p.PIN_4, p.PIN_5, UartConfig::default());
            let host_uart = host_uart.into_buffered(
                Irqs,
                HOST_TX_BUF.init([0u8; 256]),
                HOST_RX_BUF.init([0u8; 64]),
            );
            let (host_tx, host_rx) = host_uart.split();
            info!("UART initialized for host bridge");

            // Stop output (GPIO15), driven to stop before the first tick
            let stop_level = if config.stop_output_active_low {
                Level::Low
            } else {
                Level::High
            };
            let stop_pin = Output::new(p.PIN_15, stop_level);

            spawner.spawn(tasks::host_rx_task(host_rx)).unwrap();
            spawner.spawn(tasks::host_tx_task(host_tx)).unwrap();
            spawner.spawn(tasks::receiver_task(stop_pin, config)).unwrap();
        }
        NodeRole::Operator => {
            // Buttons on GPIO2/3/6, battery on GPIO29 (VSYS/3)
            let pins = tasks::OperatorPins {
                estop: Input::new(p.PIN_2, Pull::Up),
                soft_estop: Input::new(p.PIN_3, Pull::Up),
                release: Input::new(p.PIN_6, Pull::Up),
            };
            let adc = Adc::new(p.ADC, Irqs, embassy_rp::adc::Config::default());
            let battery = AdcChannel::new_pin(p.PIN_29, Pull::None);

            spawner.spawn(tasks::battery_task(adc, battery)).unwrap();
            spawner.spawn(tasks::operator_task(pins, config)).unwrap();
        }
        NodeRole::Deadman => {
            // Switches on GPIO2/3/6, battery on GPIO29 (VSYS/3)
            let pins = tasks::DeadmanPins {
                enable: Input::new(p.PIN_2, Pull::Up),
                grip: Input::new(p.PIN_3, Pull::Up),
                panic: Input::new(p.PIN_6, Pull::Up),
            };
            let adc = Adc::new(p.ADC, Irqs, embassy_rp::adc::Config::default());
            let battery = AdcChannel::new_pin(p.PIN_29, Pull::None);

            spawner.spawn(tasks::battery_task(adc, battery)).unwrap();
            spawner.spawn(tasks::deadman_task(pins, config)).unwrap();
        }
    }

    info!("All tasks spawned, running as {}", config.role);

    loop {
        embassy_time::Timer::after_secs(60).await;
        trace!("Main loop heartbeat");
    }
}
