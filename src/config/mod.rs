//! Configuration system for geodark.
//!
//! The configuration lives in `geodark.toml`, by default under
//! `$XDG_CONFIG_HOME/geodark/` (or the directory given with `--config`). A
//! commented default file is written the first time the daemon starts.
//!
//! ```toml
//! #[Appearance]
//! setter = "auto"          # How to switch modes: "auto", "macos", "gnome" or "command"
//! # day_command = "..."    # Shell command run for light mode (setter = "command")
//! # night_command = "..."  # Shell command run for dark mode (setter = "command")
//!
//! #[Scheduling]
//! always_reapply = false   # Call the setter on every tick, not only on changes
//! tick_interval = 60       # Seconds between evaluations (10-3600)
//! ```
//!
//! The location is deliberately not part of the configuration: it is chosen
//! with `geodark locate` and kept in the state directory.

pub mod builder;
pub mod loading;
pub mod validation;
pub mod watcher;

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::common::constants::*;

pub use builder::create_default_config;
pub use loading::{get_config_path, get_custom_config_dir, load, load_from_path, set_config_dir};
pub use watcher::start_config_watcher;

/// Which mechanism toggles the system appearance.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SetterKind {
    /// Pick a setter for the current platform/desktop.
    Auto,
    /// System Events via `osascript`.
    Macos,
    /// `gsettings` color-scheme key.
    Gnome,
    /// User supplied `day_command` / `night_command`.
    Command,
}

impl SetterKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SetterKind::Auto => "auto",
            SetterKind::Macos => "macos",
            SetterKind::Gnome => "gnome",
            SetterKind::Command => "command",
        }
    }
}

/// Settings loaded from `geodark.toml`.
///
/// Every field is optional in the file; [`loading::load_from_path`] fills in
/// defaults after validation, so the accessors below never have to guess.
#[derive(Debug, Deserialize, Clone, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub setter: Option<SetterKind>,
    pub day_command: Option<String>,
    pub night_command: Option<String>,
    /// Invoke the setter on every tick instead of only when the mode changes.
    pub always_reapply: Option<bool>,
    pub tick_interval: Option<u64>, // seconds
}

impl Config {
    pub fn setter(&self) -> SetterKind {
        self.setter.unwrap_or(DEFAULT_SETTER)
    }

    pub fn always_reapply(&self) -> bool {
        self.always_reapply.unwrap_or(DEFAULT_ALWAYS_REAPPLY)
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs(self.tick_interval.unwrap_or(DEFAULT_TICK_INTERVAL))
    }

    /// Both custom commands, if configured.
    pub fn commands(&self) -> Option<(&str, &str)> {
        match (self.day_command.as_deref(), self.night_command.as_deref()) {
            (Some(day), Some(night)) => Some((day, night)),
            _ => None,
        }
    }

    pub fn log_config(&self, resolved_setter: Option<&str>) {
        log_block_start!("Loaded configuration");

        match (self.setter(), resolved_setter) {
            (SetterKind::Auto, Some(resolved)) => log_indented!("Setter: auto ({})", resolved),
            (kind, _) => log_indented!("Setter: {}", kind.as_str()),
        }
        if let Some((day, night)) = self.commands() {
            log_indented!("Day command: {}", day);
            log_indented!("Night command: {}", night);
        }
        log_indented!("Tick interval: {}s", self.tick_interval().as_secs());
        log_indented!(
            "Reapply: {}",
            if self.always_reapply() {
                "every tick"
            } else {
                "on change only"
            }
        );
    }
}
