//! Status LED patterns
//!
//! | Pattern | Meaning |
//! |---------|---------|
//! | fast blink | no status yet, or no channel connected |
//! | solid on | stop active |
//! | short flash every heartbeat period | connected, running |

use estop_protocol::CommStatus;

/// Steps per heartbeat period
pub const HEARTBEAT_STEPS: u8 = 8;

/// What the status LED shows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PanelStatus {
    pub comm: CommStatus,
    pub stop_active: bool,
}

impl PanelStatus {
    pub fn link_up(&self) -> bool {
        self.comm.any_connected()
    }
}

/// LED level at pattern `step`
pub fn led_on(status: Option<&PanelStatus>, step: u8) -> bool {
    match status {
        Some(status) if status.link_up() => status.stop_active || step % HEARTBEAT_STEPS == 0,
        _ => step % 2 == 0,
    }
}
