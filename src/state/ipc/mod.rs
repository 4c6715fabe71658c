//! Unix socket IPC between the CLI and the running daemon.
//!
//! The protocol is one JSON object per line. A client connects, writes one
//! [`IpcRequest`], reads one [`IpcResponse`] and disconnects:
//!
//! ```text
//! → {"request":"set_location","address":"Lisbon, Portugal"}
//! ← {"response":"location_set","display_name":"Lisbon, Portugal","latitude":38.72,"longitude":-9.13,"mode":"day"}
//!
//! → {"request":"status"}
//! ← {"response":"status","now":"…","active":true,…}
//! ```
//!
//! The server never touches scheduler state itself: it forwards requests to
//! the core loop as [`SignalMessage`](crate::io::signals::SignalMessage)s and
//! waits for the reply.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::appearance::AppearanceMode;
use crate::common::constants::SOCKET_FILE_NAME;
use crate::core::requests::LocationOutcome;
use crate::core::scheduler::StatusSnapshot;

pub mod client;
mod server;

pub use client::IpcClient;
pub use server::IpcServer;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "request", rename_all = "snake_case")]
pub enum IpcRequest {
    SetLocation { address: String },
    Status,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "response", rename_all = "snake_case")]
pub enum IpcResponse {
    LocationSet {
        display_name: String,
        latitude: f64,
        longitude: f64,
        mode: Option<AppearanceMode>,
    },
    LocationFailed {
        message: String,
    },
    /// A newer location request was made before this one finished.
    Superseded,
    Status(StatusSnapshot),
    Error {
        message: String,
    },
}

impl From<LocationOutcome> for IpcResponse {
    fn from(outcome: LocationOutcome) -> Self {
        match outcome {
            LocationOutcome::Set {
                display_name,
                latitude,
                longitude,
                mode,
            } => IpcResponse::LocationSet {
                display_name,
                latitude,
                longitude,
                mode,
            },
            LocationOutcome::Failed { message } => IpcResponse::LocationFailed { message },
            LocationOutcome::Superseded => IpcResponse::Superseded,
        }
    }
}

/// Path of the daemon's socket.
pub fn socket_path() -> Result<PathBuf> {
    Ok(crate::common::utils::runtime_dir().join(SOCKET_FILE_NAME))
}
