//! File watching for hot config reloading.
//!
//! Watches the directory holding `geodark.toml` (editors often replace the
//! file rather than write it in place) and sends [`SignalMessage::Reload`] to
//! the core loop when it changes.

use anyhow::{Context, Result};
use notify::{
    Config as NotifyConfig, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher,
};
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use std::thread;
use std::time::{Duration, Instant};

use crate::common::utils::private_path;
use crate::io::signals::SignalMessage;

/// Editors write files in several steps; collapse them into one reload.
const DEBOUNCE_MS: u64 = 500;

pub struct ConfigWatcher {
    signal_sender: Sender<SignalMessage>,
    config_path: PathBuf,
}

impl ConfigWatcher {
    pub fn new(signal_sender: Sender<SignalMessage>, config_path: PathBuf) -> Self {
        Self {
            signal_sender,
            config_path,
        }
    }

    /// Spawn the watcher thread. Returns once watching has started.
    pub fn start(self) -> Result<()> {
        let Some(config_dir) = self.config_path.parent().map(Path::to_path_buf) else {
            return Ok(());
        };
        if !config_dir.is_dir() {
            log_debug!(
                "Config directory {} missing, hot reload disabled",
                private_path(&config_dir)
            );
            return Ok(());
        }

        let (tx, rx) = std::sync::mpsc::channel();

        let mut watcher = RecommendedWatcher::new(
            move |res: Result<Event, notify::Error>| {
                if let Ok(event) = res
                    && matches!(
                        event.kind,
                        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
                    )
                {
                    let _ = tx.send(event);
                }
            },
            NotifyConfig::default(),
        )
        .context("Failed to create file watcher")?;

        watcher
            .watch(&config_dir, RecursiveMode::NonRecursive)
            .with_context(|| format!("Failed to watch directory: {}", private_path(&config_dir)))?;

        log_debug!("Watching {} for changes", private_path(&self.config_path));

        let signal_sender = self.signal_sender;
        let config_path = self.config_path;

        thread::spawn(move || {
            // The watcher stops when dropped
            let _watcher = watcher;
            let mut last_reload: Option<Instant> = None;

            for event in rx {
                if !affects_config(&event, &config_path) {
                    continue;
                }

                if last_reload.is_some_and(|t| t.elapsed() < Duration::from_millis(DEBOUNCE_MS)) {
                    continue;
                }

                log_debug!("Configuration file change detected");
                if signal_sender.send(SignalMessage::Reload).is_err() {
                    break;
                }
                last_reload = Some(Instant::now());
            }
        });

        Ok(())
    }
}

/// Whether `event` touches the config file or an editor temp file next to it.
fn affects_config(event: &Event, config_path: &Path) -> bool {
    let Some(watched_name) = config_path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    event.paths.iter().any(|path| {
        path.parent() == config_path.parent()
            && path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|name| name.starts_with(watched_name))
    })
}

/// Start the configuration file watcher.
pub fn start_config_watcher(
    signal_sender: Sender<SignalMessage>,
    config_path: PathBuf,
) -> Result<()> {
    ConfigWatcher::new(signal_sender, config_path).start()
}
