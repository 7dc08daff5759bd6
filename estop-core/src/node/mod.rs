//! Node logic for the three endpoint roles
//!
//! Each node turns local inputs and arbitrated peer values into the state it
//! publishes. None of them touch hardware.

pub mod deadman;
pub mod operator;
pub mod receiver;

pub use deadman::{DeadmanInputs, DeadmanState, DeadmanUnit};
pub use operator::{BatteryReport, OperatorInputs, OperatorPanel, OperatorState};
pub use receiver::{ReceiverNode, ReceiverTick, StopDecision};
