//! Monitor configuration loading
//!
//! The configuration is compiled in from monitor.toml. build.rs has already
//! rejected anything malformed, so the fallback only matters if the on-device
//! parser and the build-time check ever disagree.

use defmt::*;

use pulsewatch_core::config::{parse_config, MonitorConfig};

/// Embedded configuration (compiled into firmware)
/// Edit monitor.toml and rebuild to customize
const EMBEDDED_CONFIG: &str = include_str!("../monitor.toml");

/// Parse the embedded configuration, falling back to built-in defaults
pub fn load() -> MonitorConfig {
    match parse_config(EMBEDDED_CONFIG) {
        Ok(config) => {
            info!(
                "Config: tick {} ms, telemetry every {} ms, notify every {} ms",
                config.timing.tick_delay_ms,
                config.timing.telemetry_interval_ms,
                config.timing.notification_interval_ms
            );
            config
        }
        Err(e) => {
            error!("Failed to parse embedded config: {:?}", e);
            error!("Using built-in defaults");
            MonitorConfig::default()
        }
    }
}
