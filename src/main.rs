//! geodark binary: parse arguments and dispatch.

use anyhow::Result;

use geodark::args::{self, CliAction, ParsedArgs};
use geodark::commands;
use geodark::common::constants::EXIT_FAILURE;
use geodark::logger::Log;
use geodark::{Geodark, config, log_error_exit};

fn main() {
    let parsed = ParsedArgs::from_env();
    if let Err(e) = run(parsed.action) {
        // Errors are shown even when `status --json` silenced the logger
        Log::set_enabled(true);
        log_error_exit!("{:#}", e);
        std::process::exit(EXIT_FAILURE);
    }
}

fn setup(debug_enabled: bool, config_dir: Option<String>) -> Result<()> {
    Log::set_debug(debug_enabled);
    // Left unset otherwise, so commands can adopt the running daemon's directory
    match config_dir {
        Some(dir) => config::set_config_dir(Some(dir)),
        None => Ok(()),
    }
}

fn run(action: CliAction) -> Result<()> {
    match action {
        CliAction::ShowVersion => {
            args::display_version_info();
            Ok(())
        }
        CliAction::ShowHelp => {
            args::display_help();
            Ok(())
        }
        CliAction::ShowHelpDueToError => {
            args::display_help();
            std::process::exit(EXIT_FAILURE);
        }
        CliAction::HelpCommand { command } => commands::help::run_help_command(command.as_deref()),
        CliAction::Run {
            debug_enabled,
            config_dir,
        } => {
            setup(debug_enabled, config_dir)?;
            Geodark::new(debug_enabled).run()
        }
        CliAction::Locate {
            debug_enabled,
            config_dir,
            address,
        } => {
            setup(debug_enabled, config_dir)?;
            commands::locate::handle_locate_command(&address)
        }
        CliAction::Status {
            debug_enabled,
            config_dir,
            json,
        } => {
            setup(debug_enabled, config_dir)?;
            // Keep JSON output parseable
            if json {
                Log::set_enabled(false);
            }
            commands::status::handle_status_command(json)
        }
        CliAction::Stop {
            debug_enabled,
            config_dir,
        } => {
            setup(debug_enabled, config_dir)?;
            commands::stop::handle_stop_command()
        }
        CliAction::Reapply {
            debug_enabled,
            config_dir,
        } => {
            setup(debug_enabled, config_dir)?;
            commands::reapply::handle_reapply_command()
        }
        CliAction::Reload {
            debug_enabled,
            config_dir,
        } => {
            setup(debug_enabled, config_dir)?;
            commands::reload::handle_reload_command()
        }
        CliAction::Simulate {
            debug_enabled,
            config_dir,
            start_time,
            end_time,
            multiplier,
            log_to_file,
        } => {
            setup(debug_enabled, config_dir)?;
            commands::simulate::handle_simulate_command(
                &start_time,
                &end_time,
                multiplier,
                log_to_file,
                debug_enabled,
            )
        }
    }
}
