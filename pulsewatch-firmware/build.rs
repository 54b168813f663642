//! Build script for pulsewatch-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates monitor.toml at compile time
//! - Stamps the build time used as the wall-clock origin

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

fn main() {
    setup_linker();
    validate_config();
    stamp_build_time();
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

    println!("cargo:rustc-link-arg-bins=--nmagic");
    println!("cargo:rustc-link-arg-bins=-Tlink.x");
    println!("cargo:rustc-link-arg-bins=-Tlink-rp.x");
    println!("cargo:rustc-link-arg-bins=-Tdefmt.x");

    // Re-run if memory.x changes
    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Emit the build time as the Unix-time origin for the board clock
fn stamp_build_time() {
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    println!("cargo:rustc-env=PULSEWATCH_BUILD_EPOCH={}", secs);
}

/// Allowed keys per section and whether each must be an integer
const SCHEMA: &[(&str, &[(&str, ValueKind)])] = &[
    (
        "thresholds",
        &[
            ("temp_min", ValueKind::Number),
            ("temp_max", ValueKind::Number),
            ("hr_min", ValueKind::Integer),
            ("hr_max", ValueKind::Integer),
            ("spo2_min", ValueKind::Integer),
            ("spo2_max", ValueKind::Integer),
        ],
    ),
    (
        "detector",
        &[
            ("window_capacity", ValueKind::Integer),
            ("detection_window", ValueKind::Integer),
            ("sensitivity", ValueKind::Integer),
            ("refractory_ms", ValueKind::Integer),
            ("min_interval_ms", ValueKind::Integer),
            ("max_interval_ms", ValueKind::Integer),
            ("beat_timeout_ms", ValueKind::Integer),
            ("fallback_bpm", ValueKind::Integer),
        ],
    ),
    (
        "timing",
        &[
            ("tick_delay_ms", ValueKind::Integer),
            ("recovery_backoff_ms", ValueKind::Integer),
            ("notification_interval_s", ValueKind::Integer),
            ("telemetry_interval_s", ValueKind::Integer),
            ("alarm_duration_ms", ValueKind::Integer),
        ],
    ),
];

#[derive(Clone, Copy)]
enum ValueKind {
    /// Integer or float
    Number,
    /// Non-negative integer
    Integer,
}

/// Validate monitor.toml configuration at compile time
fn validate_config() {
    // Re-run if monitor.toml changes
    println!("cargo:rerun-if-changed=monitor.toml");

    let config_path = Path::new("monitor.toml");

    if !config_path.exists() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: monitor.toml not found!                                  ║\n\
            ║                                                                  ║\n\
            ║  The firmware embeds a monitor.toml configuration file.          ║\n\
            ║  Please create one in the pulsewatch-firmware directory.         ║\n\
            ╚══════════════════════════════════════════════════════════════════╝\n"
        );
    }

    let config_content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Failed to read monitor.toml                              ║\n\
                ║                                                                  ║\n\
                ║  Error: {:<56} ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                e
            );
        }
    };

    // Parse and validate TOML syntax
    let config: toml::Value = match toml::from_str(&config_content) {
        Ok(value) => value,
        Err(e) => {
            let error_msg = e.to_string();
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Invalid TOML syntax in monitor.toml                      ║\n\
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
    validate_schema(&config, &mut errors);
    validate_ranges(&config, &mut errors);

    if !errors.is_empty() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: Invalid monitor configuration                            ║\n\
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

    println!("cargo:warning=monitor.toml validated successfully");
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

/// Reject unknown sections and keys, and values of the wrong type
///
/// The firmware's own parser only understands this subset, so anything else
/// would silently fall back to defaults on the device.
fn validate_schema(config: &toml::Value, errors: &mut Vec<String>) {
    let root = match config.as_table() {
        Some(t) => t,
        None => return,
    };

    for (section, body) in root {
        let keys = match SCHEMA.iter().find(|(name, _)| name == section) {
            Some((_, keys)) => keys,
            None => {
                errors.push(format!("unknown section [{}]", section));
                continue;
            }
        };

        let table = match body.as_table() {
            Some(t) => t,
            None => {
                errors.push(format!("[{}] must be a table", section));
                continue;
            }
        };

        for (key, value) in table {
            let kind = match keys.iter().find(|(name, _)| name == key) {
                Some((_, kind)) => *kind,
                None => {
                    errors.push(format!("[{}] unknown key '{}'", section, key));
                    continue;
                }
            };

            let valid = match (kind, value) {
                (ValueKind::Number, toml::Value::Float(_)) => true,
                (ValueKind::Number, toml::Value::Integer(_)) => true,
                (ValueKind::Integer, toml::Value::Integer(n)) => *n >= 0,
                _ => false,
            };
            if !valid {
                errors.push(format!("[{}] {} has the wrong type", section, key));
            }
        }
    }
}

fn number(config: &toml::Value, section: &str, key: &str) -> Option<f64> {
    match config.get(section)?.get(key)? {
        toml::Value::Float(f) => Some(*f),
        toml::Value::Integer(i) => Some(*i as f64),
        _ => None,
    }
}

/// Check min/max pairs and limits, using the built-in default for missing keys
fn validate_ranges(config: &toml::Value, errors: &mut Vec<String>) {
    let get = |section: &str, key: &str, default: f64| {
        number(config, section, key).unwrap_or(default)
    };

    let pairs = [
        ("thresholds", "temp_min", 30.0, "temp_max", 37.8),
        ("thresholds", "hr_min", 60.0, "hr_max", 100.0),
        ("thresholds", "spo2_min", 95.0, "spo2_max", 100.0),
        ("detector", "min_interval_ms", 300.0, "max_interval_ms", 1500.0),
    ];
    for (section, min_key, min_default, max_key, max_default) in pairs {
        if get(section, min_key, min_default) >= get(section, max_key, max_default) {
            errors.push(format!("[{}] {} must be below {}", section, min_key, max_key));
        }
    }

    if get("thresholds", "spo2_max", 100.0) > 100.0 {
        errors.push("[thresholds] spo2_max must be at most 100".to_string());
    }

    let capacity = get("detector", "window_capacity", 300.0);
    let detection = get("detector", "detection_window", 20.0);
    if detection < 2.0 {
        errors.push("[detector] detection_window must be at least 2".to_string());
    }
    if capacity < detection || capacity > 300.0 {
        errors.push("[detector] window_capacity must be detection_window..=300".to_string());
    }

    for (section, key) in [
        ("detector", "min_interval_ms"),
        ("detector", "beat_timeout_ms"),
        ("timing", "tick_delay_ms"),
        ("timing", "notification_interval_s"),
        ("timing", "telemetry_interval_s"),
    ] {
        if number(config, section, key) == Some(0.0) {
            errors.push(format!("[{}] {} must be non-zero", section, key));
        }
    }
}
