//! IPC client used by the `locate` and `status` commands.

use anyhow::{Context, Result};
use std::io::{BufRead, BufReader, Write};
use std::os::unix::net::UnixStream;
use std::path::Path;
use std::time::Duration;

use super::{IpcRequest, IpcResponse, socket_path};
use crate::common::constants::GEOCODE_REPLY_TIMEOUT_SECS;
use crate::common::utils::private_path;

pub struct IpcClient {
    stream: UnixStream,
}

impl IpcClient {
    /// Connect to the running daemon's socket.
    pub fn connect() -> Result<Self> {
        let path = socket_path().context("Failed to get IPC socket path")?;
        Self::connect_to(&path)
    }

    pub fn connect_to(path: &Path) -> Result<Self> {
        let stream = UnixStream::connect(path).with_context(|| {
            format!(
                "Failed to connect to geodark at {}. Is geodark running?",
                private_path(path)
            )
        })?;

        // The daemon itself waits this long for a geocode; give it a little more
        stream
            .set_read_timeout(Some(Duration::from_secs(GEOCODE_REPLY_TIMEOUT_SECS + 5)))
            .context("Failed to set read timeout on IPC socket")?;

        Ok(Self { stream })
    }

    /// Send one request and wait for the response.
    pub fn request(&mut self, request: &IpcRequest) -> Result<IpcResponse> {
        let mut json = serde_json::to_string(request).context("Failed to serialize request")?;
        json.push('\n');
        self.stream
            .write_all(json.as_bytes())
            .context("Failed to send request to geodark")?;
        self.stream.flush()?;

        let mut line = String::new();
        BufReader::new(&self.stream)
            .read_line(&mut line)
            .context("Failed to read response from geodark")?;

        if line.trim().is_empty() {
            anyhow::bail!("Received empty response from geodark");
        }

        serde_json::from_str(line.trim())
            .with_context(|| format!("Failed to parse response: {}", line.trim()))
    }
}
