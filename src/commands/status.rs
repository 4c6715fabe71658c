//! Status command - show the location, today's solar window and the mode.
//!
//! Asks the running daemon over IPC so the output reflects what it has
//! actually applied. With no daemon, the same snapshot is computed from the
//! stored location.

use anyhow::{Context, Result};
use chrono::{DateTime, Local};

use crate::core::scheduler::StatusSnapshot;
use crate::io::instance;
use crate::state::LocationStore;
use crate::state::ipc::{IpcClient, IpcRequest, IpcResponse};

pub fn handle_status_command(json: bool) -> Result<()> {
    let (snapshot, running) = match instance::get_running_instance()? {
        Some(_) => (query_daemon()?, true),
        None => {
            let coordinate = LocationStore::default_location()?.load();
            (
                StatusSnapshot::compute(coordinate.as_ref(), crate::time::source::now()),
                false,
            )
        }
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    } else {
        print!("{}", format_status(&snapshot, running));
    }
    Ok(())
}

fn query_daemon() -> Result<StatusSnapshot> {
    let response = IpcClient::connect()?
        .request(&IpcRequest::Status)
        .context("Failed to receive status from geodark")?;
    match response {
        IpcResponse::Status(snapshot) => Ok(snapshot),
        IpcResponse::Error { message } => anyhow::bail!(message),
        _ => anyhow::bail!("Unexpected response from geodark"),
    }
}

fn format_time(time: Option<DateTime<Local>>) -> String {
    time.map(|t| t.format("%H:%M").to_string())
        .unwrap_or_else(|| "-".to_string())
}

/// Human-readable rendering of `snapshot`.
pub(crate) fn format_status(snapshot: &StatusSnapshot, running: bool) -> String {
    let mut out = String::new();
    let daemon = if running { "running" } else { "not running" };
    out.push_str(&format!("       geodark: {daemon}\n"));

    match (snapshot.latitude, snapshot.longitude) {
        (Some(lat), Some(lon)) => {
            out.push_str(&format!(
                "      Location: {}\n",
                crate::common::utils::format_coordinates(lat, lon)
            ));
            out.push_str(&format!("       Sunrise: {}\n", format_time(snapshot.sunrise)));
            out.push_str(&format!("        Sunset: {}\n", format_time(snapshot.sunset)));
        }
        _ => out.push_str("      Location: not set (run 'geodark locate <place>')\n"),
    }

    if let Some(mode) = snapshot.mode {
        out.push_str(&format!("    Appearance: {mode}\n"));
    }
    if running {
        let applied = snapshot
            .last_applied
            .map(|m| m.to_string())
            .unwrap_or_else(|| "nothing yet".to_string());
        out.push_str(&format!("  Last applied: {applied}\n"));
        if let Some(setter) = &snapshot.setter {
            out.push_str(&format!("        Setter: {setter}\n"));
        }
        out.push_str(&format!("Always reapply: {}\n", snapshot.always_reapply));
    }
    out
}

pub fn display_help() {
    log_version!();
    log_block_start!("status - Show the current location and appearance");
    log_block_start!("Usage: geodark status [--json]");
    log_block_start!("Options:");
    log_indented!("--json  Print the status as JSON");
    log_block_start!("Description:");
    log_indented!("Shows the location, today's approximate sunrise and sunset, and");
    log_indented!("whether it is currently day or night. When geodark is running the");
    log_indented!("last applied mode and the active setter are shown as well.");
    log_end!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::Coordinate;
    use chrono::TimeZone;

    #[test]
    fn test_format_status_without_location() {
        let now = Local.with_ymd_and_hms(2026, 6, 21, 12, 0, 0).unwrap();
        let text = format_status(&StatusSnapshot::compute(None, now), false);
        assert!(text.contains("not running"));
        assert!(text.contains("not set"));
        assert!(!text.contains("Appearance"));
    }

    #[test]
    fn test_format_status_with_location() {
        let now = Local.with_ymd_and_hms(2026, 6, 21, 21, 0, 0).unwrap();
        let london = Coordinate::new(51.5, -0.12).unwrap();
        let text = format_status(&StatusSnapshot::compute(Some(&london), now), true);
        assert!(text.contains("Sunrise: 05:00"));
        assert!(text.contains("Sunset: 19:00"));
        assert!(text.contains("Appearance: Dark mode"));
        assert!(text.contains("Last applied: nothing yet"));
    }
}
