//! The daemon's main loop.
//!
//! [`Core`] owns the [`ScheduleLoop`] and is the only receiver of
//! [`SignalMessage`]s, so ticks, location changes, reloads and status
//! requests are handled one at a time on a single thread. Between messages it
//! waits for the next tick with `recv_timeout`, which lets signals and IPC
//! requests interrupt the wait immediately.

pub mod requests;
pub mod scheduler;

use anyhow::Result;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::mpsc::{RecvTimeoutError, TryRecvError};
use std::time::Duration;

use crate::{
    appearance,
    common::utils,
    config::{self, Config},
    core::{
        requests::{Completion, LocationOutcome, LocationRequest, LocationRequests, ResolvedLocation},
        scheduler::ScheduleLoop,
    },
    geo::Geocoder,
    io::lock::LockFile,
    io::signals::{SignalMessage, SignalState},
};

/// How often the simulation wait checks for messages.
const SIMULATION_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Everything needed to build a [`Core`].
pub struct CoreParams {
    pub scheduler: ScheduleLoop,
    pub config: Config,
    /// Where to re-read the configuration from on reload. `None` disables
    /// reloading.
    pub config_path: Option<PathBuf>,
    pub signal_state: SignalState,
    pub geocoder: Arc<dyn Geocoder>,
    /// Held until the loop exits.
    pub lock: Option<LockFile>,
}

pub struct Core {
    scheduler: ScheduleLoop,
    config: Config,
    config_path: Option<PathBuf>,
    signal_state: SignalState,
    geocoder: Arc<dyn Geocoder>,
    requests: LocationRequests,
    _lock: Option<LockFile>,
}

impl Core {
    pub fn new(params: CoreParams) -> Self {
        Self {
            scheduler: params.scheduler,
            config: params.config,
            config_path: params.config_path,
            signal_state: params.signal_state,
            geocoder: params.geocoder,
            requests: LocationRequests::new(),
            _lock: params.lock,
        }
    }

    /// Run until shutdown (or until a simulation reaches its end), then
    /// return the scheduler so callers can inspect its final state.
    pub fn execute(mut self) -> Result<ScheduleLoop> {
        if let Some(custom_dir) = config::get_custom_config_dir() {
            log_block_start!("Base directory: {}", utils::private_path(&custom_dir));
        }

        if !self.scheduler.is_active() {
            log_block_start!("No location set yet");
            log_indented!("Run 'geodark locate <place>' to choose one");
        }

        self.main_loop();

        log_block_start!("Shutting down geodark...");
        Ok(self.scheduler)
    }

    fn main_loop(&mut self) {
        let clock = self.scheduler.clock().clone();
        let mut next_tick = clock.now() + self.tick_step();

        while self.signal_state.is_running() && !clock.is_ended() {
            // Never wait longer than one interval, even if the clock was set back
            let step = self.tick_step();
            let wait = (next_tick - clock.now())
                .min(step)
                .to_std()
                .unwrap_or(Duration::ZERO);

            match self.wait_for_message(wait) {
                Ok(message) => {
                    let was_active = self.scheduler.is_active();
                    self.handle_message(message);
                    // The tick phase is set once, when a location first becomes active
                    if !was_active && self.scheduler.is_active() {
                        next_tick = clock.now() + self.tick_step();
                    }
                }
                Err(RecvTimeoutError::Timeout) => {
                    self.scheduler.tick();
                    next_tick = clock.now() + self.tick_step();
                }
                Err(RecvTimeoutError::Disconnected) => {
                    log_pipe!();
                    log_critical!("Message channel disconnected unexpectedly");
                    break;
                }
            }
        }
    }

    fn tick_step(&self) -> chrono::Duration {
        chrono::Duration::from_std(self.config.tick_interval())
            .unwrap_or_else(|_| chrono::Duration::seconds(60))
    }

    /// Block until a message arrives or `wait` has elapsed on the scheduler's clock.
    fn wait_for_message(&self, wait: Duration) -> Result<SignalMessage, RecvTimeoutError> {
        let receiver = &self.signal_state.signal_receiver;
        let clock = self.scheduler.clock();

        if !clock.is_simulated() {
            return receiver.recv_timeout(wait);
        }

        // Pending messages are handled before simulated time moves on
        match receiver.try_recv() {
            Ok(message) => return Ok(message),
            Err(TryRecvError::Disconnected) => return Err(RecvTimeoutError::Disconnected),
            Err(TryRecvError::Empty) => {}
        }

        // Simulated time advances on its own thread so messages still get through
        let sleep_handle = std::thread::spawn({
            let clock = clock.clone();
            move || clock.sleep(wait)
        });

        loop {
            if sleep_handle.is_finished() {
                return match receiver.try_recv() {
                    Ok(message) => Ok(message),
                    Err(TryRecvError::Empty) => Err(RecvTimeoutError::Timeout),
                    Err(TryRecvError::Disconnected) => Err(RecvTimeoutError::Disconnected),
                };
            }
            match receiver.recv_timeout(SIMULATION_POLL_INTERVAL) {
                Ok(message) => return Ok(message),
                Err(RecvTimeoutError::Timeout) => continue,
                Err(e) => return Err(e),
            }
        }
    }

    fn handle_message(&mut self, message: SignalMessage) {
        match message {
            SignalMessage::Shutdown => self.signal_state.stop(),
            SignalMessage::Reload => self.handle_reload(),
            SignalMessage::Reapply => {
                log_block_start!("Reapplying current appearance");
                self.reevaluate();
            }
            SignalMessage::TimeChange => {
                log_debug!("Re-evaluating after clock change");
                self.reevaluate();
            }
            SignalMessage::Sleep { resuming: false } => {}
            SignalMessage::Sleep { resuming: true } => self.reevaluate(),
            SignalMessage::SetLocation(request) => self.start_lookup(request),
            SignalMessage::LocationResolved(resolved) => self.finish_lookup(resolved),
            SignalMessage::Status(reply) => {
                let _ = reply.send(self.scheduler.status());
            }
        }
    }

    /// Push the mode for "now" to the setter even if it has not changed.
    fn reevaluate(&mut self) {
        self.scheduler.applier_mut().invalidate();
        self.scheduler.tick();
    }

    fn start_lookup(&mut self, request: LocationRequest) {
        let ticket = self.requests.issue();
        log_block_start!("Looking up location: {}", request.address);
        log_debug!("Location request #{}", ticket.sequence());
        requests::spawn_geocode(
            self.geocoder.clone(),
            ticket,
            request,
            self.signal_state.signal_sender.clone(),
        );
    }

    fn finish_lookup(&mut self, resolved: ResolvedLocation) {
        let ResolvedLocation {
            ticket,
            request,
            result,
        } = resolved;

        match self.requests.complete(ticket, result) {
            Completion::Accept(place) => {
                log_block_start!("Location set to {}", place.display_name);
                log_indented!("Coordinates: {}", place.coordinate);
                let mode = self.scheduler.set_location(place.coordinate);
                request.respond(LocationOutcome::Set {
                    display_name: place.display_name,
                    latitude: place.coordinate.latitude(),
                    longitude: place.coordinate.longitude(),
                    mode: Some(mode),
                });
            }
            Completion::Reject(e) => {
                log_pipe!();
                log_warning!("{}", e);
                request.respond(LocationOutcome::Failed {
                    message: e.to_string(),
                });
            }
            Completion::Stale => {
                log_debug!(
                    "Discarding result of superseded location request #{}",
                    ticket.sequence()
                );
                request.respond(LocationOutcome::Superseded);
            }
        }
    }

    /// Re-read the configuration and the stored location.
    ///
    /// A configuration that fails to load or validate is reported and the
    /// previous one stays in effect.
    fn handle_reload(&mut self) {
        if let Some(path) = self.config_path.clone() {
            match config::load_from_path(&path) {
                Ok(new_config) => self.apply_config(new_config),
                Err(e) => {
                    log_pipe!();
                    log_warning!("Failed to reload configuration: {:#}", e);
                    log_indented!("Keeping the previous configuration");
                }
            }
        }

        if !self.scheduler.reload_location() {
            self.scheduler.tick();
        }
    }

    fn apply_config(&mut self, new_config: Config) {
        let setter_changed = new_config.setter() != self.config.setter()
            || new_config.commands() != self.config.commands();

        if setter_changed {
            match appearance::create_setter(&new_config) {
                Ok(setter) => self.scheduler.applier_mut().replace_setter(setter),
                Err(e) => {
                    log_pipe!();
                    log_warning!("Failed to switch setter: {:#}", e);
                    log_indented!("Keeping the {} setter", self.scheduler.applier().setter_name());
                }
            }
        }

        self.scheduler
            .applier_mut()
            .set_always_reapply(new_config.always_reapply());
        self.config = new_config;

        log_block_start!("Configuration reloaded");
        self.config
            .log_config(Some(self.scheduler.applier().setter_name()));
    }
}

#[cfg(test)]
mod tests;
