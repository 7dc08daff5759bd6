//! Stop output line
//!
//! Drives the machine's stop input (relay, contactor coil or safety PLC
//! input) from a GPIO pin.

use embedded_hal::digital::OutputPin;

/// GPIO stop output
///
/// The pin can be active-low (reference hardware: pin LOW = stop) or
/// active-high. The output is driven to stop on construction.
pub struct StopOutput<P> {
    pin: P,
    /// If true, stop = pin LOW
    active_low: bool,
    /// Current logical state (true = stop asserted)
    asserted: bool,
}

impl<P: OutputPin> StopOutput<P> {
    /// Create a stop output and assert stop
    pub fn new(pin: P, active_low: bool) -> Result<Self, P::Error> {
        let mut output = Self {
            pin,
            active_low,
            asserted: true,
        };
        output.drive()?;
        Ok(output)
    }

    /// Assert or release stop
    ///
    /// The pin is only written when the logical state changes.
    pub fn set_stop(&mut self, stop: bool) -> Result<(), P::Error> {
        if stop == self.asserted {
            return Ok(());
        }
        self.asserted = stop;
        self.drive()
    }

    pub fn is_stop_asserted(&self) -> bool {
        self.asserted
    }

    fn drive(&mut self) -> Result<(), P::Error> {
        // Active-high: stop → high. Active-low: stop → low.
        if self.asserted != self.active_low {
            self.pin.set_high()
        } else {
            self.pin.set_low()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingPin;

    #[test]
    fn test_active_low_starts_stopped() {
        let output = StopOutput::new(RecordingPin::default(), true).unwrap();
        assert!(output.is_stop_asserted());
        assert_eq!(output.pin.history, [false]);
    }

    #[test]
    fn test_active_low_release() {
        let mut output = StopOutput::new(RecordingPin::default(), true).unwrap();
        output.set_stop(false).unwrap();
        assert!(output.pin.high);
        output.set_stop(true).unwrap();
        assert!(!output.pin.high);
    }

    #[test]
    fn test_active_high() {
        let mut output = StopOutput::new(RecordingPin::default(), false).unwrap();
        assert!(output.pin.high);
        output.set_stop(false).unwrap();
        assert!(!output.pin.high);
    }

    #[test]
    fn test_unchanged_state_not_rewritten() {
        let mut output = StopOutput::new(RecordingPin::default(), true).unwrap();
        for _ in 0..10 {
            output.set_stop(true).unwrap();
        }
        assert_eq!(output.pin.history.len(), 1);
    }
}
