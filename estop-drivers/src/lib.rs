//! Hardware driver implementations
//!
//! This crate provides concrete implementations of the traits defined
//! in estop-core:
//!
//! - Channel variants over an abstract packet [`Transport`]: long-range
//!   duty-cycled radio, short-range paired link, peer-addressed broadcast
//! - The stop output line

#![cfg_attr(not(any(test, feature = "std")), no_std)]
#![deny(unsafe_code)]

pub mod channel;
pub mod output;
pub mod transport;

#[cfg(test)]
mod link_tests;
#[cfg(test)]
pub(crate) mod testing;

pub use channel::{BroadcastLink, LinkStats, RadioLink, RadioRole, ShortRangeLink};
pub use output::StopOutput;
pub use transport::{Received, Transport, TransportError};
