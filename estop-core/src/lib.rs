//! Board-agnostic core logic for the wireless E-Stop link
//!
//! This crate contains all safety logic that does not depend on specific
//! radio hardware:
//!
//! - Per-channel property tables with age tracking
//! - The channel contract implemented by every transport variant
//! - Freshest-value arbitration with a fail-safe stale floor
//! - Periodic and change-triggered transmit scheduling
//! - Connectivity status snapshots
//! - Node logic for the operator panel, deadman unit and receiver
//! - Status LED patterns
//! - Configuration types and the embedded `link.toml` parser

#![cfg_attr(not(any(test, feature = "std")), no_std)]
#![deny(unsafe_code)]

pub mod arbitration;
pub mod battery;
pub mod channel;
pub mod config;
pub mod indicator;
pub mod link;
pub mod node;
pub mod property;
pub mod status;
pub mod transmit;

#[cfg(test)]
pub(crate) mod testing;

pub use arbitration::{Arbitrator, PropertyRule, Resolution, StalePolicy};
pub use channel::{Channel, CompletionFlag};
pub use indicator::PanelStatus;
pub use link::SafetyLink;
pub use property::{decode_flag, encode_flag, PropertyStore, PropertyValue, AGE_NEVER_MS};
pub use status::StatusBuilder;
pub use transmit::{SafetyReport, TransmitScheduler};
