//! Configuration types and parsing
//!
//! Board-agnostic link configuration, postcard-compatible behind the `serde`
//! feature, plus the no_std parser for the firmware's embedded `link.toml`.

pub mod toml;
pub mod types;

pub use toml::{parse_config, ParseError};
pub use types::*;
