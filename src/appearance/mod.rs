//! Appearance decisions and the mechanisms that apply them.
//!
//! [`decide`] turns an instant and a [`SolarWindow`] into an [`AppearanceMode`].
//! Applying that mode to the desktop is the job of an [`AppearanceSetter`];
//! the scheduler never talks to a setter directly but goes through a
//! [`ModeApplier`], which owns the "only on change" bookkeeping and turns
//! setter failures into log lines instead of errors.
//!
//! ## Setters
//!
//! - [`macos::MacOsSetter`]: System Events through `osascript`
//! - [`gnome::GnomeSetter`]: the `org.gnome.desktop.interface color-scheme` key
//! - [`command::CommandSetter`]: user supplied shell commands
//! - [`DryRunSetter`]: logs instead of switching (used by `geodark simulate`)

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::process::Command;

use crate::config::{Config, SetterKind};
use crate::geo::SolarWindow;

pub mod command;
pub mod gnome;
pub mod macos;
#[cfg(any(test, feature = "testing-support"))]
pub mod testing;

pub use command::CommandSetter;
pub use gnome::GnomeSetter;
pub use macos::MacOsSetter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppearanceMode {
    Day,
    Night,
}

impl AppearanceMode {
    pub fn is_dark(&self) -> bool {
        matches!(self, AppearanceMode::Night)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AppearanceMode::Day => "day",
            AppearanceMode::Night => "night",
        }
    }
}

impl fmt::Display for AppearanceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppearanceMode::Day => write!(f, "Light mode"),
            AppearanceMode::Night => write!(f, "Dark mode"),
        }
    }
}

/// Day strictly between sunrise and sunset; the boundary instants are night.
pub fn decide(now: DateTime<Local>, window: &SolarWindow) -> AppearanceMode {
    if now > window.sunrise && now < window.sunset {
        AppearanceMode::Day
    } else {
        AppearanceMode::Night
    }
}

/// A mechanism that switches the system between light and dark appearance.
#[cfg_attr(test, mockall::automock)]
pub trait AppearanceSetter {
    /// Switch to `mode`. Implementations should be idempotent.
    fn apply(&mut self, mode: AppearanceMode) -> Result<()>;

    /// Short name for log output.
    fn name(&self) -> &'static str;
}

/// What a single [`ModeApplier::apply`] call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// The setter was invoked and succeeded.
    Applied,
    /// The mode was already in effect; the setter was not invoked.
    Unchanged,
    /// The setter was invoked and failed.
    Failed,
}

/// Wraps a setter with change tracking.
///
/// With `always_reapply` every call reaches the setter. Otherwise the setter is
/// only invoked when the requested mode differs from the last one it applied
/// successfully. A failed call never counts as applied, so the next tick tries
/// again.
pub struct ModeApplier {
    setter: Box<dyn AppearanceSetter>,
    always_reapply: bool,
    last_applied: Option<AppearanceMode>,
}

impl ModeApplier {
    pub fn new(setter: Box<dyn AppearanceSetter>, always_reapply: bool) -> Self {
        Self {
            setter,
            always_reapply,
            last_applied: None,
        }
    }

    pub fn apply(&mut self, mode: AppearanceMode) -> ApplyOutcome {
        if !self.always_reapply && self.last_applied == Some(mode) {
            return ApplyOutcome::Unchanged;
        }

        match self.setter.apply(mode) {
            Ok(()) => {
                if self.last_applied != Some(mode) {
                    log_block_start!("Switched to {}", mode);
                    log_indented!("Setter: {}", self.setter.name());
                } else {
                    log_debug!("Reapplied {}", mode);
                }
                self.last_applied = Some(mode);
                ApplyOutcome::Applied
            }
            Err(e) => {
                log_pipe!();
                log_warning!("Failed to switch to {}: {}", mode, e);
                log_indented!("Will retry on the next tick");
                ApplyOutcome::Failed
            }
        }
    }

    /// Forget the last applied mode so the next call reaches the setter.
    pub fn invalidate(&mut self) {
        self.last_applied = None;
    }

    pub fn last_applied(&self) -> Option<AppearanceMode> {
        self.last_applied
    }

    pub fn set_always_reapply(&mut self, always_reapply: bool) {
        self.always_reapply = always_reapply;
    }

    pub fn always_reapply(&self) -> bool {
        self.always_reapply
    }

    /// Swap in a new setter (after a config reload). Forgets the last mode.
    pub fn replace_setter(&mut self, setter: Box<dyn AppearanceSetter>) {
        self.setter = setter;
        self.last_applied = None;
    }

    pub fn setter_name(&self) -> &'static str {
        self.setter.name()
    }
}

/// Logs the mode it would apply. Used for simulations.
#[derive(Debug, Default)]
pub struct DryRunSetter;

impl AppearanceSetter for DryRunSetter {
    fn apply(&mut self, mode: AppearanceMode) -> Result<()> {
        log_decorated!("Would switch to {}", mode);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "dry-run"
    }
}

/// Resolve `setter = "auto"` into a concrete setter kind.
pub fn detect_setter(config: &Config) -> Result<SetterKind> {
    let desktop = std::env::var("XDG_CURRENT_DESKTOP").ok();
    detect_setter_with(
        config,
        cfg!(target_os = "macos"),
        desktop.as_deref(),
        crate::common::utils::command_exists("gsettings"),
    )
}

fn detect_setter_with(
    config: &Config,
    is_macos: bool,
    desktop: Option<&str>,
    has_gsettings: bool,
) -> Result<SetterKind> {
    match config.setter() {
        SetterKind::Auto => {}
        explicit => return Ok(explicit),
    }

    if is_macos {
        return Ok(SetterKind::Macos);
    }

    let gnome_like = desktop.is_some_and(|d| {
        d.split(':').any(|part| {
            matches!(
                part.to_ascii_lowercase().as_str(),
                "gnome" | "gnome-classic" | "unity" | "budgie" | "pantheon"
            )
        })
    });
    if gnome_like && has_gsettings {
        return Ok(SetterKind::Gnome);
    }

    if config.commands().is_some() {
        return Ok(SetterKind::Command);
    }

    anyhow::bail!(
        "Could not detect how to switch the appearance on this desktop. \
         Set setter = \"command\" with day_command and night_command in the configuration"
    )
}

/// Build the setter the configuration asks for.
pub fn create_setter(config: &Config) -> Result<Box<dyn AppearanceSetter>> {
    let setter: Box<dyn AppearanceSetter> = match detect_setter(config)? {
        SetterKind::Macos => Box::new(MacOsSetter),
        SetterKind::Gnome => Box::new(GnomeSetter),
        SetterKind::Command => {
            let (day, night) = config
                .commands()
                .context("setter = \"command\" requires day_command and night_command")?;
            Box::new(CommandSetter::new(day, night))
        }
        SetterKind::Auto => anyhow::bail!("Setter detection did not resolve a setter"),
    };
    Ok(setter)
}

/// Run an external command, turning a non-zero exit into an error that
/// carries its stderr.
pub(crate) fn run_command(command: &mut Command) -> Result<()> {
    let program = command.get_program().to_string_lossy().into_owned();
    let output = command
        .output()
        .with_context(|| format!("Failed to run {program}"))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let stderr = stderr.trim();
        if stderr.is_empty() {
            anyhow::bail!("{program} exited with {}", output.status);
        }
        anyhow::bail!("{program} exited with {}: {stderr}", output.status);
    }
    Ok(())
}
