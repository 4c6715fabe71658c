//! Structured logging with box-drawing output.
//!
//! Every line geodark prints goes through the macros in this module so the
//! output keeps one visual shape, whether it ends up on a terminal, in a
//! journal, or in a file written during `geodark simulate --log`.
//!
//! ## Conventions
//!
//! - `log_block_start!` opens a new conceptual block (`┃` spacer, then `┣ message`).
//! - `log_decorated!` continues a block (`┣ message`).
//! - `log_indented!` prints details that belong to the previous line (`┃   message`).
//! - `log_pipe!` inserts a bare `┃` before a levelled message that starts a block.
//! - `log_info!`, `log_warning!`, `log_error!`, `log_debug!`, `log_critical!`
//!   carry a coloured `[LEVEL]` tag.
//! - `log_version!` prints the `┏ geodark vX.Y.Z ━━╸` header, `log_end!` the closing `╹`.
//!
//! Logging can be silenced at runtime with [`Log::set_enabled`], which the
//! tests and the offline commands use to keep their output clean.

use std::io::Write;
use std::sync::OnceLock;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Sender, channel};

static LOGGING_ENABLED: AtomicBool = AtomicBool::new(true);
static DEBUG_ENABLED: AtomicBool = AtomicBool::new(false);

// Set once when `--log` routes output to a file.
static LOG_CHANNEL: OnceLock<Sender<LogMessage>> = OnceLock::new();

enum LogMessage {
    Formatted(String),
    Shutdown,
}

/// Entry point for runtime logger control.
pub struct Log;

impl Log {
    /// Enable or disable all log output.
    pub fn set_enabled(enabled: bool) {
        LOGGING_ENABLED.store(enabled, Ordering::SeqCst);
    }

    /// Check if logging is currently enabled.
    pub fn is_enabled() -> bool {
        LOGGING_ENABLED.load(Ordering::SeqCst)
    }

    /// Show `log_debug!` output (the `--debug` flag).
    pub fn set_debug(enabled: bool) {
        DEBUG_ENABLED.store(enabled, Ordering::SeqCst);
    }

    pub fn is_debug() -> bool {
        DEBUG_ENABLED.load(Ordering::SeqCst)
    }

    /// Route all subsequent output to `file_path`.
    ///
    /// Output is written by a dedicated thread; the returned guard flushes and
    /// joins it when dropped.
    pub fn start_file_logging(file_path: String) -> anyhow::Result<LoggerGuard> {
        let (tx, rx) = channel();

        LOG_CHANNEL
            .set(tx.clone())
            .map_err(|_| anyhow::anyhow!("Logger channel already initialized"))?;

        let handle = std::thread::spawn(move || {
            let mut file = std::fs::File::create(&file_path)?;

            loop {
                match rx.recv() {
                    Ok(LogMessage::Formatted(text)) => file.write_all(text.as_bytes())?,
                    Ok(LogMessage::Shutdown) | Err(_) => {
                        file.flush()?;
                        break;
                    }
                }
            }

            Ok::<(), anyhow::Error>(())
        });

        Ok(LoggerGuard {
            tx,
            handle: Some(handle),
        })
    }

    /// Timestamp prefix shown while running against a simulated clock.
    ///
    /// Empty under the real clock: the journal already timestamps lines.
    pub fn timestamp_prefix() -> String {
        if crate::time::source::is_initialized() && crate::time::source::is_simulated() {
            format!("[{}] ", crate::time::source::now().format("%Y-%m-%d %H:%M:%S"))
        } else {
            String::new()
        }
    }
}

/// Keeps the file logging thread alive; flushes on drop.
pub struct LoggerGuard {
    tx: Sender<LogMessage>,
    handle: Option<std::thread::JoinHandle<anyhow::Result<()>>>,
}

impl Drop for LoggerGuard {
    fn drop(&mut self) {
        let _ = self.tx.send(LogMessage::Shutdown);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

/// Remove `ESC [ ... m` colour sequences.
pub(crate) fn strip_ansi_codes(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '\x1b' && chars.peek() == Some(&'[') {
            chars.next();
            for ch in chars.by_ref() {
                if ch == 'm' {
                    break;
                }
            }
        } else {
            result.push(ch);
        }
    }

    result
}

/// Write already formatted text to the active sink.
pub fn write_output(text: &str) {
    if let Some(tx) = LOG_CHANNEL.get() {
        let _ = tx.send(LogMessage::Formatted(strip_ansi_codes(text)));
    } else {
        print!("{text}");
        let _ = std::io::stdout().flush();
    }
}

/// Format one logical line: every physical line gets the timestamp prefix,
/// `lead` is inserted before the message body.
pub fn emit(lead: &str, message: &str) {
    if !Log::is_enabled() {
        return;
    }
    let prefix = Log::timestamp_prefix();
    write_output(&format!("{prefix}{lead}{message}\n"));
}

/// Emit a spacer line followed by a block opener.
pub fn emit_block(message: &str) {
    if !Log::is_enabled() {
        return;
    }
    let prefix = Log::timestamp_prefix();
    write_output(&format!("{prefix}┃\n{prefix}┣ {message}\n"));
}

// # Logging Macros

/// Continue the current block.
#[macro_export]
macro_rules! log_decorated {
    ($($arg:tt)*) => {
        $crate::logger::emit("┣ ", &format!($($arg)*))
    };
}

/// Detail line belonging to the previous message.
#[macro_export]
macro_rules! log_indented {
    ($($arg:tt)*) => {
        $crate::logger::emit("┃   ", &format!($($arg)*))
    };
}

/// Bare spacer line.
#[macro_export]
macro_rules! log_pipe {
    () => {
        $crate::logger::emit("┃", "")
    };
}

/// Open a new block.
#[macro_export]
macro_rules! log_block_start {
    ($($arg:tt)*) => {
        $crate::logger::emit_block(&format!($($arg)*))
    };
}

/// Application header.
#[macro_export]
macro_rules! log_version {
    () => {
        $crate::logger::emit(
            "",
            &format!("┏ geodark v{} ━━╸", env!("CARGO_PKG_VERSION")),
        )
    };
}

/// Closing marker.
#[macro_export]
macro_rules! log_end {
    () => {
        $crate::logger::emit("╹", "")
    };
}

#[macro_export]
macro_rules! log_warning {
    ($($arg:tt)*) => {
        $crate::logger::emit("┣[\x1b[33mWARNING\x1b[0m] ", &format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => {
        $crate::logger::emit("┣[\x1b[31mERROR\x1b[0m] ", &format!($($arg)*))
    };
}

/// Error that terminates the current flow: spacer plus a closing corner.
#[macro_export]
macro_rules! log_error_exit {
    ($($arg:tt)*) => {{
        $crate::logger::emit("┃", "");
        $crate::logger::emit("┗[\x1b[31mERROR\x1b[0m] ", &format!($($arg)*))
    }};
}

#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {
        $crate::logger::emit("┣[\x1b[32mINFO\x1b[0m] ", &format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => {
        if $crate::logger::Log::is_debug() {
            $crate::logger::emit("┣[\x1b[32mDEBUG\x1b[0m] ", &format!($($arg)*))
        }
    };
}

#[macro_export]
macro_rules! log_critical {
    ($($arg:tt)*) => {
        $crate::logger::emit("┣[\x1b[31mCRITICAL\x1b[0m] ", &format!($($arg)*))
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_ansi_codes_removes_colour() {
        let coloured = "┣[\x1b[33mWARNING\x1b[0m] setter failed";
        assert_eq!(strip_ansi_codes(coloured), "┣[WARNING] setter failed");
    }

    #[test]
    fn test_strip_ansi_codes_keeps_plain_text() {
        assert_eq!(strip_ansi_codes("plain ┃ text"), "plain ┃ text");
    }

    #[test]
    fn test_strip_ansi_codes_lone_escape() {
        assert_eq!(strip_ansi_codes("a\x1bb"), "a\x1bb");
    }
}
