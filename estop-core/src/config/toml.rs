//! Simple TOML parser for link configuration
//!
//! Handles only the subset used by the firmware's `link.toml`; it does NOT
//! support the full TOML grammar. Full validation happens in the firmware
//! build script with the `toml` crate, so this parser can stay small and
//! allocation-free.
//!
//! Supported features:
//! - Key = value pairs (string, integer, boolean)
//! - `[node]`, `[channels]` and `[timing]` headers
//! - Comments (# ...)

use super::types::{LinkConfig, NodeRole};

/// Parse error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseError {
    /// Unknown or malformed section header
    InvalidSection,
    /// Value has the wrong type or is out of range
    InvalidValue,
    /// Role is not operator, receiver or deadman
    InvalidRole,
}

/// Current parsing context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Root,
    Node,
    Channels,
    Timing,
}

/// Parse TOML configuration into LinkConfig
///
/// Keys not present keep their defaults. Unknown keys are ignored.
pub fn parse_config(input: &str) -> Result<LinkConfig, ParseError> {
    let mut config = LinkConfig::new();
    let mut section = Section::Root;

    for line in input.lines() {
        let line = line.trim();

        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if line.starts_with('[') && line.ends_with(']') {
            section = parse_section_header(&line[1..line.len() - 1])?;
            continue;
        }

        if let Some((key, value)) = parse_key_value(line) {
            apply_value(section, key, value, &mut config)?;
        }
    }

    Ok(config)
}

fn parse_section_header(header: &str) -> Result<Section, ParseError> {
    match header.trim() {
        "node" => Ok(Section::Node),
        "channels" => Ok(Section::Channels),
        "timing" => Ok(Section::Timing),
        _ => Err(ParseError::InvalidSection),
    }
}

/// Parse "key = value" line
fn parse_key_value(line: &str) -> Option<(&str, &str)> {
    let eq_pos = line.find('=')?;
    let key = line[..eq_pos].trim();
    let value = line[eq_pos + 1..].trim();

    // Remove inline comments
    let value = if let Some(hash_pos) = value.find('#') {
        // Make sure # is not inside a string
        let quote_count = value[..hash_pos].matches('"').count();
        if quote_count % 2 == 0 {
            value[..hash_pos].trim()
        } else {
            value
        }
    } else {
        value
    };

    if key.is_empty() || value.is_empty() {
        return None;
    }

    Some((key, value))
}

/// Parse a string value (removes quotes)
fn parse_string(value: &str) -> &str {
    if value.starts_with('"') && value.ends_with('"') && value.len() >= 2 {
        &value[1..value.len() - 1]
    } else {
        value
    }
}

fn parse_ms(value: &str) -> Result<u32, ParseError> {
    match value.parse::<u32>() {
        Ok(ms) if ms > 0 => Ok(ms),
        _ => Err(ParseError::InvalidValue),
    }
}

fn parse_bool(value: &str) -> Result<bool, ParseError> {
    match value {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(ParseError::InvalidValue),
    }
}

fn parse_role(value: &str) -> Result<NodeRole, ParseError> {
    match parse_string(value) {
        "operator" => Ok(NodeRole::Operator),
        "receiver" => Ok(NodeRole::Receiver),
        "deadman" => Ok(NodeRole::Deadman),
        _ => Err(ParseError::InvalidRole),
    }
}

fn apply_value(
    section: Section,
    key: &str,
    value: &str,
    config: &mut LinkConfig,
) -> Result<(), ParseError> {
    match section {
        Section::Node => match key {
            "role" => config.role = parse_role(value)?,
            "stop_output_active_low" => config.stop_output_active_low = parse_bool(value)?,
            _ => {}
        },
        Section::Channels => match key {
            "radio" => config.channels.radio = parse_bool(value)?,
            "short_range" => config.channels.short_range = parse_bool(value)?,
            "broadcast" => config.channels.broadcast = parse_bool(value)?,
            _ => {}
        },
        Section::Timing => {
            let t = &mut config.timings;
            match key {
                "connected_threshold_ms" => t.connected_threshold_ms = parse_ms(value)?,
                "stale_threshold_ms" => t.stale_threshold_ms = parse_ms(value)?,
                "transmit_interval_ms" => t.transmit_interval_ms = parse_ms(value)?,
                "status_interval_ms" => t.status_interval_ms = parse_ms(value)?,
                "radio_latency_bias_ms" => t.radio_latency_bias_ms = parse_ms(value)?,
                "radio_retransmit_ms" => t.radio_retransmit_ms = parse_ms(value)?,
                "radio_airtime_ms" => t.radio_airtime_ms = parse_ms(value)?,
                _ => {}
            }
        }
        Section::Root => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LinkTimings;

    const REFERENCE: &str = r#"
        # Wireless E-Stop link configuration

        [node]
        # operator | receiver | deadman
        role = "receiver"
        stop_output_active_low = true

        [channels]
        radio = true
        short_range = true
        broadcast = true

        [timing]
        connected_threshold_ms = 500
        stale_threshold_ms = 300
        transmit_interval_ms = 100
        status_interval_ms = 500
        radio_latency_bias_ms = 120
        radio_retransmit_ms = 200
        radio_airtime_ms = 111
    "#;

    #[test]
    fn test_parse_reference_config() {
        let config = parse_config(REFERENCE).unwrap();
        assert_eq!(config.role, NodeRole::Receiver);
        assert_eq!(config.timings, LinkTimings::default());
        assert!(config.stop_output_active_low);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parsed_airtime_is_validated() {
        let config = parse_config("[timing]\nradio_airtime_ms = 250").unwrap();
        assert_eq!(config.timings.radio_airtime_ms, 250);
        assert_eq!(
            config.validate(),
            Err(crate::config::ConfigError::RadioRefreshNotBelowStale)
        );
    }

    #[test]
    fn test_parse_overrides() {
        let input = r#"
            [node]
            role = "operator"   # hand-held
            stop_output_active_low = false

            [channels]
            short_range = false

            [timing]
            radio_latency_bias_ms = 150
        "#;
        let config = parse_config(input).unwrap();
        assert_eq!(config.role, NodeRole::Operator);
        assert!(!config.stop_output_active_low);
        assert!(config.channels.radio);
        assert!(!config.channels.short_range);
        assert_eq!(config.timings.radio_latency_bias_ms, 150);
        assert_eq!(config.timings.stale_threshold_ms, 300);
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(parse_config("[radio]"), Err(ParseError::InvalidSection));
        assert_eq!(
            parse_config("[node]\nrole = \"bystander\""),
            Err(ParseError::InvalidRole)
        );
        assert_eq!(
            parse_config("[timing]\nstale_threshold_ms = 0"),
            Err(ParseError::InvalidValue)
        );
        assert_eq!(
            parse_config("[channels]\nradio = yes"),
            Err(ParseError::InvalidValue)
        );
    }

    #[test]
    fn test_parse_key_value() {
        assert_eq!(parse_key_value("a = 1 # note"), Some(("a", "1")));
        assert_eq!(parse_key_value("a = \"x#y\""), Some(("a", "\"x#y\"")));
        assert_eq!(parse_key_value("a ="), None);
        assert_eq!(parse_key_value("just text"), None);
    }
}
