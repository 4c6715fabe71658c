//! Implementation of the reapply command.
//!
//! Some desktops reset their colour scheme on their own (a theme switcher, a
//! session restart). `geodark reapply` asks the daemon to push the current
//! mode again even though it has not changed.

use anyhow::{Context, Result};

use crate::io::instance;

pub fn handle_reapply_command() -> Result<()> {
    log_version!();

    let info = super::require_running_instance()?;
    instance::send_reapply_signal(info.pid).context("Failed to signal geodark")?;

    log_block_start!("Sent reapply signal to geodark (PID: {})", info.pid);
    log_indented!("The current appearance will be applied again");
    log_end!();
    Ok(())
}

pub fn display_help() {
    log_version!();
    log_block_start!("reapply - Apply the current appearance again");
    log_block_start!("Usage: geodark reapply");
    log_block_start!("Description:");
    log_indented!("Sends SIGUSR1 to the running geodark. It re-evaluates day or night");
    log_indented!("for the current moment and calls the setter even if the mode is");
    log_indented!("unchanged since the last switch.");
    log_end!();
}
