//! Implementation of the locate command.
//!
//! With a daemon running, the address is sent over IPC and the daemon
//! geocodes, persists and applies it. Without one, the address is geocoded
//! here and only saved, so the next start picks it up.

use anyhow::Result;

use crate::common::utils::format_coordinates;
use crate::geo::{CityGeocoder, Geocoder, Place};
use crate::io::instance;
use crate::state::LocationStore;
use crate::state::ipc::{IpcClient, IpcRequest, IpcResponse};

pub fn handle_locate_command(address: &str) -> Result<()> {
    log_version!();

    match instance::get_running_instance()? {
        Some(info) => {
            log_block_start!("Sending location to geodark (PID: {})...", info.pid);
            let response = IpcClient::connect()?.request(&IpcRequest::SetLocation {
                address: address.to_string(),
            })?;
            report_response(response)?;
        }
        None => {
            let store = LocationStore::default_location()?;
            let place = locate_offline(&CityGeocoder::world(), &store, address)?;
            log_block_start!("Location saved: {}", place.display_name);
            log_indented!("Coordinates: {}", place.coordinate);
            log_indented!("geodark will use it the next time it starts");
        }
    }

    log_end!();
    Ok(())
}

/// Geocode `address` and persist the result in `store`.
pub(crate) fn locate_offline(
    geocoder: &dyn Geocoder,
    store: &LocationStore,
    address: &str,
) -> Result<Place> {
    let place = geocoder.geocode(address)?;
    store.save(&place.coordinate)?;
    Ok(place)
}

fn report_response(response: IpcResponse) -> Result<()> {
    match response {
        IpcResponse::LocationSet {
            display_name,
            latitude,
            longitude,
            mode,
        } => {
            log_block_start!("Location set to {}", display_name);
            log_indented!("Coordinates: {}", format_coordinates(latitude, longitude));
            if let Some(mode) = mode {
                log_indented!("Current appearance: {}", mode);
            }
            Ok(())
        }
        IpcResponse::LocationFailed { message } | IpcResponse::Error { message } => {
            anyhow::bail!(message)
        }
        IpcResponse::Superseded => {
            log_pipe!();
            log_warning!("A newer location request replaced this one");
            Ok(())
        }
        IpcResponse::Status(_) => anyhow::bail!("Unexpected response from geodark"),
    }
}

pub fn display_help() {
    log_version!();
    log_block_start!("locate - Set the location used for sunrise and sunset");
    log_block_start!("Usage: geodark locate <address>");
    log_block_start!("Arguments:");
    log_indented!("<address>  A city name, optionally followed by \", country\",");
    log_indented!("           or literal coordinates as \"latitude, longitude\"");
    log_block_start!("Description:");
    log_indented!("If geodark is running it looks the address up, saves it and");
    log_indented!("switches the appearance right away. Otherwise the location is");
    log_indented!("saved for the next start.");
    log_block_start!("Examples:");
    log_indented!("geodark locate Lisbon");
    log_indented!("geodark locate \"Portland, US\"");
    log_indented!("geodark locate -33.87, 151.21");
    log_end!();
}
