//! Configuration validation functionality.
//!
//! Rejects values the scheduler cannot work with before any defaults are
//! applied, so error messages refer to what the user actually wrote.

use anyhow::Result;

use super::{Config, SetterKind};
use crate::common::constants::*;

pub fn validate_config(config: &Config) -> Result<()> {
    if let Some(interval) = config.tick_interval
        && !(MINIMUM_TICK_INTERVAL..=MAXIMUM_TICK_INTERVAL).contains(&interval)
    {
        anyhow::bail!(
            "tick_interval ({} s) must be between {} and {} seconds",
            interval,
            MINIMUM_TICK_INTERVAL,
            MAXIMUM_TICK_INTERVAL
        );
    }

    for (key, value) in [
        ("day_command", &config.day_command),
        ("night_command", &config.night_command),
    ] {
        if let Some(command) = value
            && command.trim().is_empty()
        {
            anyhow::bail!("{} must not be empty", key);
        }
    }

    if config.setter == Some(SetterKind::Command) {
        if config.day_command.is_none() {
            anyhow::bail!("setter = \"command\" requires day_command to be specified");
        }
        if config.night_command.is_none() {
            anyhow::bail!("setter = \"command\" requires night_command to be specified");
        }
    }

    if config.day_command.is_some() != config.night_command.is_some() {
        anyhow::bail!("day_command and night_command must be specified together");
    }

    Ok(())
}
