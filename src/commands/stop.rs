//! Implementation of the stop command.
//!
//! Sends SIGTERM to the running geodark and waits for it to exit.

use anyhow::{Context, Result};
use std::time::Duration;

use crate::common::constants::STOP_TIMEOUT_MS;
use crate::io::instance;

pub fn handle_stop_command() -> Result<()> {
    log_version!();

    let info = super::require_running_instance()?;
    log_block_start!("Stopping geodark (PID: {})...", info.pid);

    instance::terminate_instance(info.pid).context("Failed to terminate instance")?;
    log_debug!("SIGTERM sent to process {}", info.pid);

    if instance::wait_for_exit(info.pid, Duration::from_millis(STOP_TIMEOUT_MS)) {
        log_pipe!();
        log_info!("Process terminated successfully");
    } else {
        log_pipe!();
        log_warning!("Process did not terminate within the expected time");
        log_indented!(
            "The termination signal was sent, but the process may still be shutting down"
        );
    }
    log_end!();
    Ok(())
}

pub fn display_help() {
    log_version!();
    log_block_start!("stop - Cleanly terminate running geodark");
    log_block_start!("Usage: geodark stop");
    log_block_start!("Description:");
    log_indented!("Sends a termination signal to the running geodark instance and");
    log_indented!("waits up to {} seconds for it to exit.", STOP_TIMEOUT_MS / 1000);
    log_indented!("The desktop keeps whatever appearance was applied last.");
    log_block_start!("Examples:");
    log_indented!("geodark stop");
    log_indented!("geodark --debug stop");
    log_end!();
}
