//! Help command dispatcher.

use anyhow::Result;

/// `None` shows the command overview.
pub fn run_help_command(command: Option<&str>) -> Result<()> {
    match command {
        None => display_general_help(),
        Some("help" | "h") => display_help_help(),
        Some("locate" | "l") => super::locate::display_help(),
        Some("reapply" | "r") => super::reapply::display_help(),
        Some("reload") => super::reload::display_help(),
        Some("simulate" | "S") => super::simulate::display_help(),
        Some("status") => super::status::display_help(),
        Some("stop") => super::stop::display_help(),
        Some(unknown) => {
            log_version!();
            log_pipe!();
            log_warning!("Unknown command: {}", unknown);
            log_end!();
            display_general_help();
        }
    }
    Ok(())
}

fn display_general_help() {
    log_version!();
    log_block_start!("Available Commands:");
    log_indented!("locate, l <address>     Set the location");
    log_indented!("status [--json]         Show the location, solar window and mode");
    log_indented!("stop                    Stop the running geodark");
    log_indented!("reapply, r              Apply the current appearance again");
    log_indented!("reload                  Reload the configuration");
    log_indented!("simulate, S <start> <end> [multiplier] [--log]");
    log_indented!("                        Run against simulated time");
    log_indented!("help, h [COMMAND]       Show detailed help for a command");
    log_pipe!();
    log_info!("Use 'geodark help <command>' to see detailed help for a specific command.");
    log_indented!("Use 'geodark --help' to see all options and general usage.");
    log_end!();
}

fn display_help_help() {
    log_version!();
    log_block_start!("help - Display help information");
    log_block_start!("Usage: geodark help [COMMAND]");
    log_block_start!("Examples:");
    log_indented!("geodark help");
    log_indented!("geodark help locate");
    log_end!();
}
