//! One-shot CLI commands.
//!
//! Each command lives in its own submodule. Commands that talk to a running
//! daemon find it through the lock file (see [`crate::io::instance`]) and
//! then use either a Unix signal or the IPC socket.

pub mod help;
pub mod locate;
pub mod reapply;
pub mod reload;
pub mod simulate;
pub mod status;
pub mod stop;

use anyhow::Result;

use crate::io::instance::{self, InstanceInfo};

/// The running daemon, or an error telling the user to start one.
pub(crate) fn require_running_instance() -> Result<InstanceInfo> {
    instance::get_running_instance()?
        .ok_or_else(|| anyhow::anyhow!("geodark isn't running"))
}
