//! Implementation of the simulate command.
//!
//! Installs a simulated clock for the whole process and runs the normal
//! scheduler against it with the dry-run setter, so a day of switches can be
//! checked in seconds.

use anyhow::Result;
use chrono::{DateTime, Local};
use std::sync::Arc;

use crate::geodark::Geodark;
use crate::logger::Log;
use crate::time::source::{self, SimulatedTimeSource};

/// Parse and check the simulation bounds.
pub(crate) fn parse_range(
    start_time: &str,
    end_time: &str,
) -> Result<(DateTime<Local>, DateTime<Local>)> {
    let start = source::parse_datetime(start_time)
        .map_err(|e| anyhow::anyhow!("Invalid start time: {}", e))?;
    let end = source::parse_datetime(end_time)
        .map_err(|e| anyhow::anyhow!("Invalid end time: {}", e))?;
    if end <= start {
        anyhow::bail!("End time must be after start time");
    }
    Ok((start, end))
}

pub fn handle_simulate_command(
    start_time: &str,
    end_time: &str,
    multiplier: f64,
    log_to_file: bool,
    debug_enabled: bool,
) -> Result<()> {
    let (start, end) = parse_range(start_time, end_time)?;

    // Before any logging, so every line carries simulated timestamps
    source::init_time_source(Arc::new(SimulatedTimeSource::new(start, end, multiplier)));

    let log_filename = format!(
        "geodark-simulation-{}.log",
        Local::now().format("%Y%m%d-%H%M%S")
    );
    let _log_guard = if log_to_file {
        let guard = Log::start_file_logging(log_filename.clone())?;
        println!("Writing simulation output to {log_filename}");
        Some(guard)
    } else {
        None
    };

    log_version!();
    log_block_start!("Simulation Mode");
    log_decorated!(
        "Simulating from {} to {}",
        start.format("%Y-%m-%d %H:%M:%S"),
        end.format("%Y-%m-%d %H:%M:%S")
    );

    let duration = end - start;
    log_indented!(
        "Total simulated time: {} hours {} minutes",
        duration.num_hours(),
        duration.num_minutes() % 60
    );
    if multiplier == 0.0 {
        log_indented!("Time acceleration: fast-forward (instant execution)");
    } else {
        log_indented!(
            "Time acceleration: {}x (will complete in ~{:.1} seconds)",
            multiplier,
            duration.num_seconds() as f64 / multiplier
        );
    }

    Geodark::new(debug_enabled).simulation().run()
}

pub fn display_help() {
    log_version!();
    log_block_start!("simulate - Run the scheduler against simulated time");
    log_block_start!("Usage: geodark simulate <start> <end> [multiplier] [--log]");
    log_block_start!("Arguments:");
    log_indented!("<start>, <end>  Local times as \"YYYY-MM-DD HH:MM:SS\"");
    log_indented!("[multiplier]    Simulated seconds per real second (default 3600,");
    log_indented!("                0 = fast-forward)");
    log_block_start!("Options:");
    log_indented!("--log           Write the output to geodark-simulation-<time>.log");
    log_block_start!("Description:");
    log_indented!("Uses the stored location and logs the switches geodark would make");
    log_indented!("without touching the desktop.");
    log_block_start!("Examples:");
    log_indented!("geodark simulate \"2026-06-21 00:00:00\" \"2026-06-23 00:00:00\" 0");
    log_end!();
}
