//! Signal handling and the core loop's message type.
//!
//! Everything that wants the core loop's attention (Unix signals, finished
//! geocodes, IPC requests, the config watcher, system sleep and clock change
//! monitors) sends a [`SignalMessage`] over one channel. The core is the only
//! receiver, which keeps every state change on a single timeline.

use anyhow::{Context, Result};
use signal_hook::{
    consts::signal::{SIGHUP, SIGINT, SIGTERM, SIGUSR1, SIGUSR2},
    iterator::Signals,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread;

use crate::core::requests::{LocationRequest, ResolvedLocation};
use crate::core::scheduler::StatusSnapshot;

#[derive(Debug, Clone)]
pub enum SignalMessage {
    /// SIGINT, SIGTERM or SIGHUP.
    Shutdown,
    /// SIGUSR2 or a config file change.
    Reload,
    /// SIGUSR1: push the current mode to the setter again.
    Reapply,
    /// The wall clock jumped.
    TimeChange,
    /// The system is going to sleep or resuming.
    Sleep { resuming: bool },
    /// Look up an address and make it the active location.
    SetLocation(LocationRequest),
    /// A geocode worker finished.
    LocationResolved(ResolvedLocation),
    /// Report the scheduler state on the given channel.
    Status(Sender<StatusSnapshot>),
}

/// Signal handling state shared between threads.
pub struct SignalState {
    /// Cleared when the process should exit.
    pub running: Arc<AtomicBool>,
    pub signal_receiver: Receiver<SignalMessage>,
    /// Cloned by every producer thread.
    pub signal_sender: Sender<SignalMessage>,
}

impl SignalState {
    /// A channel with no OS signal handlers attached.
    pub fn detached() -> Self {
        let (signal_sender, signal_receiver) = mpsc::channel();
        Self {
            running: Arc::new(AtomicBool::new(true)),
            signal_receiver,
            signal_sender,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }
}

/// Map a raw signal number to the message the core should see.
pub(crate) fn message_for(signal: i32) -> Option<SignalMessage> {
    match signal {
        SIGINT | SIGTERM | SIGHUP => Some(SignalMessage::Shutdown),
        SIGUSR1 => Some(SignalMessage::Reapply),
        SIGUSR2 => Some(SignalMessage::Reload),
        _ => None,
    }
}

/// Install signal handlers and spawn the thread that forwards them.
pub fn setup_signal_handler() -> Result<SignalState> {
    let state = SignalState::detached();

    let mut signals = Signals::new([SIGINT, SIGTERM, SIGHUP, SIGUSR1, SIGUSR2])
        .context("failed to register signal handlers")?;

    let running = state.running.clone();
    let sender = state.signal_sender.clone();

    thread::spawn(move || {
        for sig in signals.forever() {
            let Some(message) = message_for(sig) else {
                continue;
            };

            match &message {
                SignalMessage::Shutdown => {
                    log_pipe!();
                    log_info!("Received shutdown signal");
                    running.store(false, Ordering::SeqCst);
                }
                SignalMessage::Reapply => {
                    log_pipe!();
                    log_info!("Received reapply signal");
                }
                SignalMessage::Reload => {
                    log_pipe!();
                    log_info!("Received configuration reload signal");
                }
                _ => {}
            }

            if sender.send(message).is_err() {
                break;
            }
        }
    });

    Ok(state)
}
