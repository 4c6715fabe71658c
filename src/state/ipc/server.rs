//! Unix socket server for the IPC protocol.

use anyhow::{Context, Result};
use std::io::{BufRead, BufReader, Write};
use std::os::unix::net::{UnixListener, UnixStream};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Sender};
use std::thread;
use std::time::Duration;

use super::{IpcRequest, IpcResponse};
use crate::common::constants::{GEOCODE_REPLY_TIMEOUT_SECS, IPC_POLL_INTERVAL_MS};
use crate::common::utils::private_path;
use crate::core::requests::LocationRequest;
use crate::io::signals::SignalMessage;

const CLIENT_READ_TIMEOUT: Duration = Duration::from_secs(5);

/// Accepts clients on a background thread until `running` is cleared.
///
/// The socket file is removed when the server is dropped.
pub struct IpcServer {
    socket_path: PathBuf,
    thread_handle: Option<thread::JoinHandle<()>>,
    running: Arc<AtomicBool>,
}

impl IpcServer {
    /// Bind `socket_path` and start serving.
    ///
    /// Only call this while holding the daemon lock: an existing socket file
    /// is assumed to be stale and replaced.
    pub fn start(
        socket_path: &Path,
        signal_sender: Sender<SignalMessage>,
        running: Arc<AtomicBool>,
    ) -> Result<Self> {
        if socket_path.exists() {
            std::fs::remove_file(socket_path).with_context(|| {
                format!("Failed to remove stale socket {}", private_path(socket_path))
            })?;
        }
        if let Some(parent) = socket_path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create socket directory {}", private_path(parent))
            })?;
        }

        let listener = UnixListener::bind(socket_path)
            .with_context(|| format!("Failed to bind {}", private_path(socket_path)))?;
        listener
            .set_nonblocking(true)
            .context("Failed to set socket to non-blocking mode")?;

        log_debug!("IPC server listening on {}", private_path(socket_path));

        let thread_running = running.clone();
        let thread_handle = thread::spawn(move || {
            accept_loop(listener, signal_sender, thread_running);
        });

        Ok(Self {
            socket_path: socket_path.to_path_buf(),
            thread_handle: Some(thread_handle),
            running,
        })
    }

    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }
}

impl Drop for IpcServer {
    fn drop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.thread_handle.take() {
            let _ = handle.join();
        }
        let _ = std::fs::remove_file(&self.socket_path);
    }
}

fn accept_loop(listener: UnixListener, signal_sender: Sender<SignalMessage>, running: Arc<AtomicBool>) {
    while running.load(Ordering::SeqCst) {
        match listener.accept() {
            Ok((stream, _)) => {
                let sender = signal_sender.clone();
                // Location lookups can take a while; don't hold up other clients
                thread::spawn(move || {
                    if let Err(e) = serve_client(stream, &sender) {
                        log_debug!("IPC client error: {:#}", e);
                    }
                });
            }
            Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                thread::sleep(Duration::from_millis(IPC_POLL_INTERVAL_MS));
            }
            Err(e) => {
                log_debug!("IPC accept failed: {}", e);
                thread::sleep(Duration::from_millis(IPC_POLL_INTERVAL_MS));
            }
        }
    }
}

fn serve_client(stream: UnixStream, signal_sender: &Sender<SignalMessage>) -> Result<()> {
    stream
        .set_nonblocking(false)
        .context("Failed to set client stream to blocking mode")?;
    stream
        .set_read_timeout(Some(CLIENT_READ_TIMEOUT))
        .context("Failed to set client read timeout")?;

    let mut line = String::new();
    BufReader::new(stream.try_clone().context("Failed to clone client stream")?)
        .read_line(&mut line)
        .context("Failed to read request")?;

    let response = match serde_json::from_str::<IpcRequest>(line.trim()) {
        Ok(request) => respond(request, signal_sender),
        Err(e) => IpcResponse::Error {
            message: format!("Invalid request: {e}"),
        },
    };

    let mut json = serde_json::to_string(&response).context("Failed to serialize response")?;
    json.push('\n');
    let mut writer = stream;
    writer
        .write_all(json.as_bytes())
        .context("Failed to write response")?;
    writer.flush()?;
    Ok(())
}

/// Forward `request` to the core loop and wait for its answer.
pub(super) fn respond(request: IpcRequest, signal_sender: &Sender<SignalMessage>) -> IpcResponse {
    let timeout = Duration::from_secs(GEOCODE_REPLY_TIMEOUT_SECS);
    let unavailable = || IpcResponse::Error {
        message: "geodark is shutting down".to_string(),
    };
    let timed_out = || IpcResponse::Error {
        message: "Timed out waiting for geodark to respond".to_string(),
    };

    match request {
        IpcRequest::SetLocation { address } => {
            let (reply, outcome) = mpsc::channel();
            let message = SignalMessage::SetLocation(LocationRequest::new(address, Some(reply)));
            if signal_sender.send(message).is_err() {
                return unavailable();
            }
            match outcome.recv_timeout(timeout) {
                Ok(outcome) => outcome.into(),
                Err(mpsc::RecvTimeoutError::Timeout) => timed_out(),
                Err(mpsc::RecvTimeoutError::Disconnected) => unavailable(),
            }
        }
        IpcRequest::Status => {
            let (reply, status) = mpsc::channel();
            if signal_sender.send(SignalMessage::Status(reply)).is_err() {
                return unavailable();
            }
            match status.recv_timeout(timeout) {
                Ok(snapshot) => IpcResponse::Status(snapshot),
                Err(mpsc::RecvTimeoutError::Timeout) => timed_out(),
                Err(mpsc::RecvTimeoutError::Disconnected) => unavailable(),
            }
        }
    }
}
