//! Implementation of the reload command.
//!
//! Validates the configuration first so a typo is reported here instead of
//! in the daemon's log, then signals the daemon with SIGUSR2.

use anyhow::{Context, Result};

use crate::io::instance;

pub fn handle_reload_command() -> Result<()> {
    log_version!();

    // Restores the daemon's config directory before the config is read
    let info = super::require_running_instance()?;

    let config_path = crate::config::get_config_path()?;
    crate::config::load_from_path(&config_path)
        .context("Configuration is invalid, not reloading")?;

    instance::send_reload_signal(info.pid).context("Failed to signal geodark")?;

    log_block_start!("Sent reload signal to geodark (PID: {})", info.pid);
    log_indented!("Configuration and stored location will be re-read");
    log_end!();
    Ok(())
}

pub fn display_help() {
    log_version!();
    log_block_start!("reload - Reload configuration");
    log_block_start!("Usage: geodark reload");
    log_block_start!("Description:");
    log_indented!("Checks geodark.toml and sends SIGUSR2 to the running geodark.");
    log_indented!("The daemon re-reads the setter, always_reapply and tick_interval");
    log_indented!("settings and the stored location. Saving the configuration file");
    log_indented!("has the same effect while geodark is running.");
    log_end!();
}
