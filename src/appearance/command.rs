//! User supplied commands.
//!
//! Each command runs through `sh -c` with `GEODARK_MODE` set to `day` or
//! `night`, so a single script can serve both settings.

use anyhow::Result;
use std::process::Command;

use super::{AppearanceMode, AppearanceSetter, run_command};

pub struct CommandSetter {
    day_command: String,
    night_command: String,
}

impl CommandSetter {
    pub fn new(day_command: &str, night_command: &str) -> Self {
        Self {
            day_command: day_command.to_string(),
            night_command: night_command.to_string(),
        }
    }

    fn command_for(&self, mode: AppearanceMode) -> &str {
        match mode {
            AppearanceMode::Day => &self.day_command,
            AppearanceMode::Night => &self.night_command,
        }
    }
}

impl AppearanceSetter for CommandSetter {
    fn apply(&mut self, mode: AppearanceMode) -> Result<()> {
        run_command(
            Command::new("sh")
                .arg("-c")
                .arg(self.command_for(mode))
                .env("GEODARK_MODE", mode.as_str()),
        )
    }

    fn name(&self) -> &'static str {
        "command"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_runs_the_matching_command() {
        let temp = tempdir().unwrap();
        let marker = temp.path().join("mode");
        let write = format!("printf %s \"$GEODARK_MODE\" > '{}'", marker.display());

        let mut setter = CommandSetter::new(&write, &write);
        setter.apply(AppearanceMode::Night).unwrap();
        assert_eq!(std::fs::read_to_string(&marker).unwrap(), "night");

        setter.apply(AppearanceMode::Day).unwrap();
        assert_eq!(std::fs::read_to_string(&marker).unwrap(), "day");
    }

    #[test]
    fn test_failing_command_is_an_error() {
        let mut setter = CommandSetter::new("true", "exit 1");
        assert!(setter.apply(AppearanceMode::Day).is_ok());
        assert!(setter.apply(AppearanceMode::Night).is_err());
    }
}
