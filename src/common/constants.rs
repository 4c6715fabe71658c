//! Application constants and default values for geodark.
//!
//! Configuration defaults, validation limits and the fixed parameters of the
//! solar approximation live here so every module agrees on them.

use crate::config::SetterKind;

// ═══ Configuration Defaults ═══
// Used when the option is absent from geodark.toml

pub const DEFAULT_SETTER: SetterKind = SetterKind::Auto;
pub const DEFAULT_ALWAYS_REAPPLY: bool = false; // Only call the setter when the mode changes
pub const DEFAULT_TICK_INTERVAL: u64 = 60; // seconds between evaluations

// ═══ Validation Limits ═══

pub const MINIMUM_TICK_INTERVAL: u64 = 10; // seconds
pub const MAXIMUM_TICK_INTERVAL: u64 = 3600; // seconds (an hour late is already noticeable)

pub const MINIMUM_LATITUDE: f64 = -90.0;
pub const MAXIMUM_LATITUDE: f64 = 90.0;
pub const MINIMUM_LONGITUDE: f64 = -180.0;
pub const MAXIMUM_LONGITUDE: f64 = 180.0;

// ═══ Solar Approximation ═══
// Coarse on purpose: noon-centred 12h day stretched by latitude

pub const BASE_SUNRISE_HOUR: u32 = 6;
pub const BASE_SUNSET_HOUR: u32 = 18;
pub const MAX_LATITUDE_ADJUSTMENT_HOURS: f64 = 3.0;

// ═══ Operational Timing ═══

pub const GEOCODE_REPLY_TIMEOUT_SECS: u64 = 30; // How long the IPC server waits for the core
pub const IPC_POLL_INTERVAL_MS: u64 = 50;
pub const STOP_TIMEOUT_MS: u64 = 3000;

// ═══ File Names ═══

pub const CONFIG_FILE_NAME: &str = "geodark.toml";
pub const LOCATION_FILE_NAME: &str = "location.toml";
pub const LOCK_FILE_NAME: &str = "geodark.lock";
pub const SOCKET_FILE_NAME: &str = "geodark.sock";

// ═══ Exit Codes ═══

pub const EXIT_FAILURE: i32 = 1;
