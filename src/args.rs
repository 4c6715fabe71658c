//! Command-line argument parsing.
//!
//! geodark takes a handful of global flags and at most one subcommand:
//!
//! ```text
//! geodark [OPTIONS]                       run the daemon
//! geodark [OPTIONS] locate <address...>   set the location
//! geodark [OPTIONS] status [--json]       show the current decision
//! geodark [OPTIONS] stop                  stop the daemon
//! geodark [OPTIONS] reapply               push the current mode again
//! geodark [OPTIONS] reload                re-read configuration and location
//! geodark [OPTIONS] simulate <start> <end> [multiplier] [--log]
//! geodark help [COMMAND]
//! ```

/// Default simulation speed: one simulated hour per real second.
pub const DEFAULT_SIMULATION_MULTIPLIER: f64 = 3600.0;

/// What the command line asks geodark to do.
#[derive(Debug, PartialEq)]
pub enum CliAction {
    /// Run the daemon in the foreground.
    Run {
        debug_enabled: bool,
        config_dir: Option<String>,
    },
    Locate {
        debug_enabled: bool,
        config_dir: Option<String>,
        address: String,
    },
    Status {
        debug_enabled: bool,
        config_dir: Option<String>,
        json: bool,
    },
    Stop {
        debug_enabled: bool,
        config_dir: Option<String>,
    },
    Reapply {
        debug_enabled: bool,
        config_dir: Option<String>,
    },
    Reload {
        debug_enabled: bool,
        config_dir: Option<String>,
    },
    /// Run the scheduler against a simulated clock.
    Simulate {
        debug_enabled: bool,
        config_dir: Option<String>,
        start_time: String,
        end_time: String,
        /// `0.0` fast-forwards without sleeping.
        multiplier: f64,
        log_to_file: bool,
    },
    /// `geodark help [COMMAND]` or `geodark COMMAND --help`.
    HelpCommand { command: Option<String> },
    ShowHelp,
    ShowVersion,
    ShowHelpDueToError,
}

/// Result of parsing command-line arguments.
pub struct ParsedArgs {
    pub action: CliAction,
}

/// Negative coordinates such as `-33.87,` are arguments, not flags.
fn is_negative_number(arg: &str) -> bool {
    arg.trim_end_matches(',').parse::<f64>().is_ok()
}

impl ParsedArgs {
    /// Parse `args` (including the program name).
    pub fn parse<I, S>(args: I) -> ParsedArgs
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut debug_enabled = false;
        let mut display_help = false;
        let mut display_version = false;
        let mut unknown_arg_found = false;
        let mut json = false;
        let mut log_to_file = false;
        let mut config_dir: Option<String> = None;
        let mut positionals: Vec<String> = Vec::new();

        let mut args = args.into_iter().skip(1).map(|s| s.as_ref().to_string());
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--debug" | "-d" => debug_enabled = true,
                "--help" | "-h" => display_help = true,
                "--version" | "-V" | "-v" => display_version = true,
                "--config" | "-c" => match args.next() {
                    Some(dir) => config_dir = Some(dir),
                    None => unknown_arg_found = true,
                },
                "--json" => json = true,
                "--log" => log_to_file = true,
                flag if flag.starts_with('-') && flag.len() > 1 && !is_negative_number(flag) => {
                    unknown_arg_found = true
                }
                _ => positionals.push(arg),
            }
        }

        let action = if display_version {
            CliAction::ShowVersion
        } else if display_help {
            match positionals.first() {
                Some(command) => CliAction::HelpCommand {
                    command: Some(command.clone()),
                },
                None => CliAction::ShowHelp,
            }
        } else if unknown_arg_found {
            CliAction::ShowHelpDueToError
        } else {
            Self::command_action(positionals, debug_enabled, config_dir, json, log_to_file)
        };

        ParsedArgs { action }
    }

    fn command_action(
        positionals: Vec<String>,
        debug_enabled: bool,
        config_dir: Option<String>,
        json: bool,
        log_to_file: bool,
    ) -> CliAction {
        let mut words = positionals.into_iter();
        let command = words.next();
        let rest: Vec<String> = words.collect();

        // Command-specific flags are rejected everywhere else
        let json_allowed = matches!(command.as_deref(), Some("status"));
        let log_allowed = matches!(command.as_deref(), Some("simulate" | "S"));
        if (json && !json_allowed) || (log_to_file && !log_allowed) {
            return CliAction::ShowHelpDueToError;
        }

        match command.as_deref() {
            None => CliAction::Run {
                debug_enabled,
                config_dir,
            },
            Some("locate" | "l") => {
                let address = rest.join(" ");
                if address.trim().is_empty() {
                    return CliAction::ShowHelpDueToError;
                }
                CliAction::Locate {
                    debug_enabled,
                    config_dir,
                    address,
                }
            }
            Some("status") if rest.is_empty() => CliAction::Status {
                debug_enabled,
                config_dir,
                json,
            },
            Some("stop") if rest.is_empty() => CliAction::Stop {
                debug_enabled,
                config_dir,
            },
            Some("reapply" | "r") if rest.is_empty() => CliAction::Reapply {
                debug_enabled,
                config_dir,
            },
            Some("reload") if rest.is_empty() => CliAction::Reload {
                debug_enabled,
                config_dir,
            },
            Some("simulate" | "S") => {
                let (start_time, end_time, multiplier) = match rest.as_slice() {
                    [start, end] => (start, end, DEFAULT_SIMULATION_MULTIPLIER),
                    [start, end, multiplier] => match multiplier.parse::<f64>() {
                        Ok(m) if m.is_finite() && m >= 0.0 => (start, end, m),
                        _ => return CliAction::ShowHelpDueToError,
                    },
                    _ => return CliAction::ShowHelpDueToError,
                };
                CliAction::Simulate {
                    debug_enabled,
                    config_dir,
                    start_time: start_time.clone(),
                    end_time: end_time.clone(),
                    multiplier,
                    log_to_file,
                }
            }
            Some("help" | "h") if rest.len() <= 1 => CliAction::HelpCommand {
                command: rest.into_iter().next(),
            },
            _ => CliAction::ShowHelpDueToError,
        }
    }

    pub fn from_env() -> ParsedArgs {
        Self::parse(std::env::args())
    }
}

pub fn display_version_info() {
    log_version!();
    log_pipe!();
    println!("┗ {}", env!("CARGO_PKG_DESCRIPTION"));
}

pub fn display_help() {
    log_version!();
    log_block_start!(env!("CARGO_PKG_DESCRIPTION"));
    log_block_start!("Usage:");
    log_indented!("geodark [OPTIONS] [COMMAND]");
    log_block_start!("Options:");
    log_indented!("-c, --config <dir>     Use custom configuration directory");
    log_indented!("-d, --debug            Enable detailed debug output");
    log_indented!("-h, --help             Print help information");
    log_indented!("-V, --version          Print version information");
    log_block_start!("Commands:");
    log_indented!("locate, l <address>    Set the location (city name or \"lat, lon\")");
    log_indented!("status [--json]        Show the location, solar window and mode");
    log_indented!("stop                   Stop the running geodark instance");
    log_indented!("reapply, r             Push the current appearance to the desktop again");
    log_indented!("reload                 Reload the configuration");
    log_indented!("simulate, S <start> <end> [multiplier] [--log]");
    log_indented!("                       Run the scheduler against simulated time");
    log_indented!("help, h [COMMAND]      Show detailed help for a command");
    log_pipe!();
    log_info!("Without a command, geodark runs in the foreground.");
    log_end!();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> CliAction {
        ParsedArgs::parse(args.iter().copied()).action
    }

    #[test]
    fn test_parse_no_args() {
        assert_eq!(
            parse(&["geodark"]),
            CliAction::Run {
                debug_enabled: false,
                config_dir: None,
            }
        );
    }

    #[test]
    fn test_parse_debug_and_config() {
        assert_eq!(
            parse(&["geodark", "-d", "--config", "/tmp/conf"]),
            CliAction::Run {
                debug_enabled: true,
                config_dir: Some("/tmp/conf".into()),
            }
        );
    }

    #[test]
    fn test_config_flag_requires_value() {
        assert_eq!(parse(&["geodark", "--config"]), CliAction::ShowHelpDueToError);
    }

    #[test]
    fn test_version_takes_precedence() {
        assert_eq!(parse(&["geodark", "--help", "-V"]), CliAction::ShowVersion);
        assert_eq!(parse(&["geodark", "--bogus", "-v"]), CliAction::ShowVersion);
    }

    #[test]
    fn test_parse_help_flags() {
        assert_eq!(parse(&["geodark", "-h"]), CliAction::ShowHelp);
        assert_eq!(
            parse(&["geodark", "stop", "--help"]),
            CliAction::HelpCommand {
                command: Some("stop".into())
            }
        );
        assert_eq!(
            parse(&["geodark", "help"]),
            CliAction::HelpCommand { command: None }
        );
        assert_eq!(
            parse(&["geodark", "help", "locate"]),
            CliAction::HelpCommand {
                command: Some("locate".into())
            }
        );
    }

    #[test]
    fn test_parse_unknown_flag() {
        assert_eq!(parse(&["geodark", "--nope"]), CliAction::ShowHelpDueToError);
        assert_eq!(parse(&["geodark", "frobnicate"]), CliAction::ShowHelpDueToError);
    }

    #[test]
    fn test_parse_locate_joins_words() {
        assert_eq!(
            parse(&["geodark", "locate", "Buenos", "Aires,", "Argentina"]),
            CliAction::Locate {
                debug_enabled: false,
                config_dir: None,
                address: "Buenos Aires, Argentina".into(),
            }
        );
    }

    #[test]
    fn test_parse_locate_negative_coordinates() {
        assert_eq!(
            parse(&["geodark", "l", "-33.87,", "151.21"]),
            CliAction::Locate {
                debug_enabled: false,
                config_dir: None,
                address: "-33.87, 151.21".into(),
            }
        );
    }

    #[test]
    fn test_parse_locate_requires_address() {
        assert_eq!(parse(&["geodark", "locate"]), CliAction::ShowHelpDueToError);
    }

    #[test]
    fn test_parse_status_json() {
        assert_eq!(
            parse(&["geodark", "status", "--json"]),
            CliAction::Status {
                debug_enabled: false,
                config_dir: None,
                json: true,
            }
        );
        assert_eq!(parse(&["geodark", "stop", "--json"]), CliAction::ShowHelpDueToError);
    }

    #[test]
    fn test_parse_stop_and_reapply() {
        assert_eq!(
            parse(&["geodark", "stop"]),
            CliAction::Stop {
                debug_enabled: false,
                config_dir: None,
            }
        );
        assert_eq!(
            parse(&["geodark", "-d", "r"]),
            CliAction::Reapply {
                debug_enabled: true,
                config_dir: None,
            }
        );
        assert_eq!(
            parse(&["geodark", "reload"]),
            CliAction::Reload {
                debug_enabled: false,
                config_dir: None,
            }
        );
        assert_eq!(parse(&["geodark", "stop", "now"]), CliAction::ShowHelpDueToError);
    }

    #[test]
    fn test_parse_simulate() {
        assert_eq!(
            parse(&[
                "geodark",
                "simulate",
                "2026-06-21 00:00:00",
                "2026-06-22 00:00:00",
                "0",
                "--log",
            ]),
            CliAction::Simulate {
                debug_enabled: false,
                config_dir: None,
                start_time: "2026-06-21 00:00:00".into(),
                end_time: "2026-06-22 00:00:00".into(),
                multiplier: 0.0,
                log_to_file: true,
            }
        );
    }

    #[test]
    fn test_parse_simulate_default_multiplier() {
        match parse(&["geodark", "S", "2026-06-21 00:00:00", "2026-06-22 00:00:00"]) {
            CliAction::Simulate {
                multiplier,
                log_to_file,
                ..
            } => {
                assert_eq!(multiplier, DEFAULT_SIMULATION_MULTIPLIER);
                assert!(!log_to_file);
            }
            other => panic!("unexpected action {other:?}"),
        }
    }

    #[test]
    fn test_parse_simulate_errors() {
        assert_eq!(
            parse(&["geodark", "simulate", "2026-06-21 00:00:00"]),
            CliAction::ShowHelpDueToError
        );
        assert_eq!(
            parse(&["geodark", "simulate", "a", "b", "fast"]),
            CliAction::ShowHelpDueToError
        );
        assert_eq!(
            parse(&["geodark", "simulate", "a", "b", "-5"]),
            CliAction::ShowHelpDueToError
        );
        assert_eq!(parse(&["geodark", "--log"]), CliAction::ShowHelpDueToError);
    }
}
