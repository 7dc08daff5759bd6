//! Build script for estop-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates link.toml at compile time

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

const ROLES: [&str; 3] = ["operator", "receiver", "deadman"];

const TIMING_KEYS: [&str; 7] = [
    "connected_threshold_ms",
    "stale_threshold_ms",
    "transmit_interval_ms",
    "status_interval_ms",
    "radio_latency_bias_ms",
    "radio_retransmit_ms",
    "radio_airtime_ms",
];

fn main() {
    setup_linker();
    validate_config();
}

/// Set up linker search paths for memory.x
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    // Copy memory.x to the output directory
    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    // Tell rustc where to find memory.x
    println!("cargo:rustc-link-search={}", out_dir.display());

    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Validate link.toml configuration at compile time
fn validate_config() {
    println!("cargo:rerun-if-changed=link.toml");

    let config_path = Path::new("link.toml");

    if !config_path.exists() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: link.toml not found!                                     ║\n\
            ║                                                                  ║\n\
            ║  The firmware requires a link.toml configuration file.           ║\n\
            ║  Please create one in the estop-firmware directory.              ║\n\
            ╚══════════════════════════════════════════════════════════════════╝\n"
        );
    }

    let config_content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Failed to read link.toml                                 ║\n\
                ║                                                                  ║\n\
                ║  Error: {:<56} ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                e
            );
        }
    };

    let config: toml::Value = match toml::from_str(&config_content) {
        Ok(value) => value,
        Err(e) => {
            let error_msg = e.to_string();
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Invalid TOML syntax in link.toml                         ║\n\
                ╠══════════════════════════════════════════════════════════════════╣\n\
                ║                                                                  ║\n\
                {}\n\
                ║                                                                  ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                format_error_lines(&error_msg)
            );
        }
    };

    let mut errors = Vec::new();
    validate_node(&config, &mut errors);
    validate_channels(&config, &mut errors);
    validate_timing(&config, &mut errors);

    if !errors.is_empty() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: Invalid link configuration                               ║\n\
            ╠══════════════════════════════════════════════════════════════════╣\n\
            {}\n\
            ╚══════════════════════════════════════════════════════════════════╝\n",
            errors
                .iter()
                .map(|e| format!("║  • {:<62} ║", e))
                .collect::<Vec<_>>()
                .join("\n")
        );
    }

    println!("cargo:warning=link.toml validated successfully");
}

/// Format error message lines with box drawing
fn format_error_lines(msg: &str) -> String {
    msg.lines()
        .map(|line| {
            let truncated = if line.len() > 64 {
                format!("{}...", &line[..61])
            } else {
                line.to_string()
            };
            format!("║  {:<64} ║", truncated)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn validate_node(config: &toml::Value, errors: &mut Vec<String>) {
    let node = match config.get("node") {
        Some(toml::Value::Table(t)) => t,
        Some(_) => {
            errors.push("[node] must be a table".to_string());
            return;
        }
        None => {
            errors.push("Missing [node] section".to_string());
            return;
        }
    };

    match node.get("role") {
        Some(toml::Value::String(role)) if ROLES.contains(&role.as_str()) => {}
        Some(_) => {
            errors.push("[node] role must be 'operator', 'receiver' or 'deadman'".to_string())
        }
        None => errors.push("[node] missing 'role'".to_string()),
    }

    if let Some(value) = node.get("stop_output_active_low") {
        if !value.is_bool() {
            errors.push("[node] stop_output_active_low must be true or false".to_string());
        }
    }
}

fn validate_channels(config: &toml::Value, errors: &mut Vec<String>) {
    let channels = match config.get("channels") {
        Some(toml::Value::Table(t)) => t,
        Some(_) => {
            errors.push("[channels] must be a table".to_string());
            return;
        }
        None => return,
    };

    for (name, value) in channels {
        if !["radio", "short_range", "broadcast"].contains(&name.as_str()) {
            errors.push(format!("[channels] unknown channel '{}'", name));
        } else if !value.is_bool() {
            errors.push(format!("[channels] {} must be true or false", name));
        }
    }

    let any_enabled = channels.values().any(|v| v.as_bool() == Some(true));
    if !any_enabled {
        errors.push("[channels] at least one channel must be enabled".to_string());
    }
}

fn validate_timing(config: &toml::Value, errors: &mut Vec<String>) {
    let timing = match config.get("timing") {
        Some(toml::Value::Table(t)) => t,
        Some(_) => {
            errors.push("[timing] must be a table".to_string());
            return;
        }
        None => return,
    };

    for (name, value) in timing {
        if !TIMING_KEYS.contains(&name.as_str()) {
            errors.push(format!("[timing] unknown key '{}'", name));
            continue;
        }
        match value.as_integer() {
            Some(ms) if ms > 0 && ms <= u32::MAX as i64 => {}
            _ => errors.push(format!("[timing] {} must be a positive integer", name)),
        }
    }

    let get = |key: &str, default: i64| {
        timing
            .get(key)
            .and_then(|v| v.as_integer())
            .unwrap_or(default)
    };
    let connected = get("connected_threshold_ms", 500);
    let stale = get("stale_threshold_ms", 300);
    let transmit = get("transmit_interval_ms", 100);
    let bias = get("radio_latency_bias_ms", 120);
    let airtime = get("radio_airtime_ms", 111);

    if stale >= connected {
        errors.push("[timing] stale_threshold_ms must be below connected_threshold_ms".to_string());
    }
    if transmit >= stale {
        errors.push("[timing] transmit_interval_ms must be below stale_threshold_ms".to_string());
    }
    if radio_enabled(config) && airtime + bias >= stale {
        errors.push(format!(
            "[timing] radio airtime + bias ({} ms) must be below {} ms",
            airtime + bias,
            stale
        ));
    }
}

/// The long-range radio is fitted unless `[channels] radio = false`
fn radio_enabled(config: &toml::Value) -> bool {
    config
        .get("channels")
        .and_then(|channels| channels.get("radio"))
        .and_then(|radio| radio.as_bool())
        .unwrap_or(true)
}
