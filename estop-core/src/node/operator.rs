//! Operator panel latch logic

use estop_protocol::PropertyId;

use crate::property::encode_flag;
use crate::transmit::SafetyReport;

/// Button levels sampled once per tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct OperatorInputs {
    pub estop_pressed: bool,
    pub soft_estop_pressed: bool,
    pub release_pressed: bool,
}

/// Stop requests published by the operator unit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct OperatorState {
    pub estop_active: bool,
    pub soft_estop_active: bool,
}

impl Default for OperatorState {
    fn default() -> Self {
        Self {
            estop_active: true,
            soft_estop_active: false,
        }
    }
}

impl SafetyReport for OperatorState {
    fn for_each_property<F: FnMut(PropertyId, &[u8])>(&self, mut emit: F) {
        emit(PropertyId::Estop, &encode_flag(self.estop_active));
        emit(PropertyId::SoftEstop, &encode_flag(self.soft_estop_active));
    }
}

/// Battery level in percent, sent on the status cadence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BatteryReport(pub u8);

impl SafetyReport for BatteryReport {
    fn for_each_property<F: FnMut(PropertyId, &[u8])>(&self, mut emit: F) {
        emit(PropertyId::Battery, &[self.0]);
    }
}

/// Latching stop buttons with a separate release
///
/// Pressing either stop latches it. Only a rising edge of release while
/// neither stop button is held clears both latches.
#[derive(Debug, Clone)]
pub struct OperatorPanel {
    state: OperatorState,
    release_was_pressed: bool,
}

impl Default for OperatorPanel {
    fn default() -> Self {
        Self::new()
    }
}

impl OperatorPanel {
    /// Starts with E-Stop latched
    ///
    /// Release counts as held at boot so a stuck release button cannot
    /// clear the latch without first being let go.
    pub fn new() -> Self {
        Self {
            state: OperatorState::default(),
            release_was_pressed: true,
        }
    }

    pub fn update(&mut self, inputs: OperatorInputs) -> OperatorState {
        let release_edge = inputs.release_pressed && !self.release_was_pressed;
        self.release_was_pressed = inputs.release_pressed;

        if release_edge && !inputs.estop_pressed && !inputs.soft_estop_pressed {
            self.state.estop_active = false;
            self.state.soft_estop_active = false;
        } else {
            self.state.estop_active |= inputs.estop_pressed;
            self.state.soft_estop_active |= inputs.soft_estop_pressed;
        }
        self.state
    }

    pub fn state(&self) -> OperatorState {
        self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(estop: bool, soft: bool, release: bool) -> OperatorInputs {
        OperatorInputs {
            estop_pressed: estop,
            soft_estop_pressed: soft,
            release_pressed: release,
        }
    }

    #[test]
    fn test_boots_with_estop_latched() {
        let mut panel = OperatorPanel::new();
        let state = panel.update(press(false, false, false));
        assert!(state.estop_active);
        assert!(!state.soft_estop_active);
    }

    #[test]
    fn test_release_edge_clears() {
        let mut panel = OperatorPanel::new();
        panel.update(press(false, false, false));
        let state = panel.update(press(false, false, true));
        assert_eq!(
            state,
            OperatorState {
                estop_active: false,
                soft_estop_active: false
            }
        );
    }

    #[test]
    fn test_release_held_at_boot_ignored() {
        let mut panel = OperatorPanel::new();
        assert!(panel.update(press(false, false, true)).estop_active);
        assert!(panel.update(press(false, false, true)).estop_active);
    }

    #[test]
    fn test_stops_latch() {
        let mut panel = OperatorPanel::new();
        panel.update(press(false, false, false));
        panel.update(press(false, false, true));

        assert!(panel.update(press(false, true, true)).soft_estop_active);
        let state = panel.update(press(false, false, false));
        assert!(state.soft_estop_active);
        assert!(!state.estop_active);

        assert!(panel.update(press(true, false, false)).estop_active);
        assert!(panel.update(press(false, false, false)).estop_active);
    }

    #[test]
    fn test_release_blocked_while_stop_held() {
        let mut panel = OperatorPanel::new();
        panel.update(press(true, false, false));
        let state = panel.update(press(true, false, true));
        assert!(state.estop_active);

        // Edge already consumed, holding release does nothing
        let state = panel.update(press(false, false, true));
        assert!(state.estop_active);
    }

    #[test]
    fn test_report_properties() {
        let mut seen = heapless::Vec::<(PropertyId, u8), 4>::new();
        OperatorState {
            estop_active: false,
            soft_estop_active: true,
        }
        .for_each_property(|id, bytes| seen.push((id, bytes[0])).unwrap());
        assert_eq!(
            &seen[..],
            &[(PropertyId::Estop, 0x00), (PropertyId::SoftEstop, 0xFF)]
        );

        let mut seen = heapless::Vec::<(PropertyId, u8), 4>::new();
        BatteryReport(73).for_each_property(|id, bytes| seen.push((id, bytes[0])).unwrap());
        assert_eq!(&seen[..], &[(PropertyId::Battery, 73)]);
    }
}
