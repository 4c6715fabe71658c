//! # geodark
//!
//! Switches the desktop between light and dark appearance at approximate
//! sunrise and sunset for a user-chosen location.
//!
//! The library holds everything the binary does so it can be tested:
//!
//! - **Entry point**: [`Geodark`] acquires resources and runs the core loop
//! - **Core**: `core` holds the main loop, the Idle/Active scheduler and
//!   location request tickets
//! - **Geography**: `geo` for coordinates, the solar window and geocoding
//! - **Appearance**: `appearance` for the day/night decision, the setters and
//!   the applier that debounces them
//! - **State**: `state` for the persisted location and the IPC socket
//! - **Configuration**: `config` for `geodark.toml` with hot reload
//! - **Infrastructure**: signals, lock file, D-Bus monitors, time source and
//!   logging

// Import macros from logger module for use in all submodules
#[macro_use]
pub mod logger;

pub mod appearance;
pub mod args;
pub mod commands;
pub mod common;
pub mod config;
pub mod core;
pub mod geo;
pub mod io;
pub mod state;
pub mod time;

mod geodark;

pub use geodark::Geodark;
