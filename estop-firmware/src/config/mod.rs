//! Configuration loading
//!
//! The link configuration is compiled in from `link.toml` and parsed at
//! boot by the core's no_std parser.

use defmt::*;
use estop_core::config::{parse_config, LinkConfig};

/// Parse and check the embedded configuration
///
/// Falls back to defaults (receiver role, reference timings) if the file
/// does not parse or its timings are inconsistent.
pub fn load_config(input: &str) -> LinkConfig {
    let config = match parse_config(input) {
        Ok(config) => config,
        Err(e) => {
            error!("link.toml parse failed: {:?}, using defaults", e);
            return LinkConfig::default();
        }
    };

    if let Err(e) = config.validate() {
        error!("link.toml rejected: {:?}, using defaults", e);
        return LinkConfig::default();
    }

    info!(
        "Link config: role={}, connected={}ms, stale={}ms, transmit={}ms, radio airtime={}ms",
        config.role,
        config.timings.connected_threshold_ms,
        config.timings.stale_threshold_ms,
        config.timings.transmit_interval_ms,
        config.timings.radio_airtime_ms
    );
    config
}
