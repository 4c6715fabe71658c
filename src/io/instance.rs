//! Running-instance management on top of the lock file.
//!
//! The daemon writes its PID (and custom config directory, if any) into the
//! lock file. CLI commands read it back to find the daemon and talk to it with
//! signals.

use anyhow::{Context, Result};
use nix::sys::signal::{Signal, kill};
use nix::unistd::Pid;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use crate::common::constants::IPC_POLL_INTERVAL_MS;
use crate::io::lock::{self, LockFile};

/// Information about a running geodark daemon.
#[derive(Debug, Clone, PartialEq)]
pub struct InstanceInfo {
    pub pid: u32,
    pub config_dir: Option<PathBuf>,
}

impl InstanceInfo {
    pub fn current() -> Self {
        Self {
            pid: std::process::id(),
            config_dir: crate::config::get_custom_config_dir(),
        }
    }

    /// Parse lock file contents.
    ///
    /// - Line 1: PID
    /// - Line 2: config directory (optional, empty if default)
    pub fn from_lock_contents(contents: &str) -> Result<Self> {
        let mut lines = contents.lines();

        let pid = lines
            .next()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .context("Lock file is empty")?
            .parse::<u32>()
            .context("Invalid PID format in lock file")?;

        let config_dir = lines
            .next()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(PathBuf::from);

        if lines.any(|l| !l.trim().is_empty()) {
            anyhow::bail!("Invalid lock file format (expected 1-2 lines)");
        }

        Ok(Self { pid, config_dir })
    }

    pub fn to_lock_contents(&self) -> String {
        match &self.config_dir {
            Some(dir) => format!("{}\n{}\n", self.pid, dir.display()),
            None => format!("{}\n\n", self.pid),
        }
    }
}

/// Whether a process with `pid` exists.
pub fn is_instance_running(pid: u32) -> bool {
    let Ok(raw) = i32::try_from(pid) else {
        return false;
    };
    match kill(Pid::from_raw(raw), None) {
        Ok(()) => true,
        // Exists but belongs to someone else
        Err(nix::errno::Errno::EPERM) => true,
        Err(_) => false,
    }
}

/// The running daemon, if any.
///
/// Restores the daemon's config directory for this process so commands
/// operate on the same files.
pub fn get_running_instance() -> Result<Option<InstanceInfo>> {
    let lock_path = lock::get_main_lock_path();
    let Ok(contents) = std::fs::read_to_string(&lock_path) else {
        return Ok(None);
    };
    let Ok(info) = InstanceInfo::from_lock_contents(&contents) else {
        return Ok(None);
    };

    if !is_instance_running(info.pid) || info.pid == std::process::id() {
        return Ok(None);
    }

    if let Some(dir) = &info.config_dir {
        let _ = crate::config::set_config_dir(Some(dir.display().to_string()));
    }
    Ok(Some(info))
}

fn send_signal(pid: u32, signal: Signal) -> Result<()> {
    let raw = i32::try_from(pid).context("PID out of range")?;
    kill(Pid::from_raw(raw), signal)
        .map_err(|e| anyhow::anyhow!("Failed to send {} to process {}: {}", signal, pid, e))
}

/// Ask a daemon to exit (SIGTERM).
pub fn terminate_instance(pid: u32) -> Result<()> {
    send_signal(pid, Signal::SIGTERM)
}

/// Ask a daemon to reload its configuration (SIGUSR2).
pub fn send_reload_signal(pid: u32) -> Result<()> {
    send_signal(pid, Signal::SIGUSR2)
}

/// Ask a daemon to push the current mode to its setter again (SIGUSR1).
pub fn send_reapply_signal(pid: u32) -> Result<()> {
    send_signal(pid, Signal::SIGUSR1)
}

/// Poll until `pid` has exited. Returns false on timeout.
pub fn wait_for_exit(pid: u32, timeout: Duration) -> bool {
    let started = Instant::now();
    while started.elapsed() < timeout {
        if !is_instance_running(pid) {
            return true;
        }
        std::thread::sleep(Duration::from_millis(IPC_POLL_INTERVAL_MS));
    }
    !is_instance_running(pid)
}

/// Take the daemon lock, clearing a stale one left by a dead process.
pub fn ensure_single_instance() -> Result<LockFile> {
    let lock_path = lock::get_main_lock_path();

    for _ in 0..2 {
        if let Some(mut lock) = LockFile::try_acquire(&lock_path)? {
            lock.write(&InstanceInfo::current().to_lock_contents())?;
            return Ok(lock);
        }

        let holder = std::fs::read_to_string(&lock_path)
            .ok()
            .and_then(|c| InstanceInfo::from_lock_contents(&c).ok());

        match holder {
            Some(info) if is_instance_running(info.pid) => {
                anyhow::bail!("geodark is already running (PID: {})", info.pid);
            }
            _ => {
                log_warning!("Removing stale lock file");
                let _ = std::fs::remove_file(&lock_path);
            }
        }
    }

    anyhow::bail!("Failed to acquire lock after removing stale lock")
}
