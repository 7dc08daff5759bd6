//! Deadman unit presence logic

use estop_protocol::PropertyId;

use crate::property::encode_flag;
use crate::transmit::SafetyReport;

/// Switch levels sampled once per tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DeadmanInputs {
    pub enable_switch: bool,
    pub deadman_held: bool,
    pub panic_pressed: bool,
}

/// Presence state published by the deadman unit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DeadmanState {
    /// Unit is enabled and its trigger counts toward the hard stop
    pub active: bool,
    /// Presence has failed
    pub triggered: bool,
}

impl Default for DeadmanState {
    fn default() -> Self {
        Self {
            active: false,
            triggered: true,
        }
    }
}

impl SafetyReport for DeadmanState {
    fn for_each_property<F: FnMut(PropertyId, &[u8])>(&self, mut emit: F) {
        emit(PropertyId::DeadmanActive, &encode_flag(self.active));
        emit(PropertyId::DeadmanTriggered, &encode_flag(self.triggered));
    }
}

/// Deadman grip with a latching panic button
///
/// The panic latch follows the panic button only while the latch differs
/// from the grip: it can be set while the grip is held and can only be
/// cleared after the grip is let go.
#[derive(Debug, Clone, Default)]
pub struct DeadmanUnit {
    panic_latched: bool,
    state: DeadmanState,
}

impl DeadmanUnit {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, inputs: DeadmanInputs) -> DeadmanState {
        if inputs.enable_switch
            && inputs.panic_pressed != self.panic_latched
            && self.panic_latched != inputs.deadman_held
        {
            self.panic_latched = inputs.panic_pressed;
        }

        self.state = DeadmanState {
            active: inputs.enable_switch,
            triggered: !inputs.deadman_held || inputs.panic_pressed || self.panic_latched,
        };
        self.state
    }

    pub fn state(&self) -> DeadmanState {
        self.state
    }

    pub fn panic_latched(&self) -> bool {
        self.panic_latched
    }
}
