//! Embassy async tasks
//!
//! One polling task runs the node's role; the rest move bytes between
//! UARTs and queues or present status.

pub mod battery;
pub mod deadman;
pub mod host_rx;
pub mod host_tx;
pub mod operator;
pub mod radio_rx;
pub mod radio_tx;
pub mod receiver;
pub mod status_led;
pub mod tick;

pub use battery::battery_task;
pub use deadman::{deadman_task, DeadmanPins};
pub use host_rx::host_rx_task;
pub use host_tx::host_tx_task;
pub use operator::{operator_task, OperatorPins};
pub use radio_rx::radio_rx_task;
pub use radio_tx::radio_tx_task;
pub use receiver::receiver_task;
pub use status_led::status_led_task;
