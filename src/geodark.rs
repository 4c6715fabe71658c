//! Application coordinator: acquires resources and hands them to the core loop.
//!
//! `Geodark::new(debug).run()` is the daemon. `.simulation()` runs the same
//! loop against the process clock installed by `geodark simulate`, with the
//! dry-run setter and without the lock, IPC socket or system monitors.

use anyhow::{Context, Result};
use std::sync::Arc;

use crate::{
    appearance::{self, AppearanceSetter, DryRunSetter, ModeApplier},
    config,
    core::{Core, CoreParams, scheduler::ScheduleLoop},
    geo::CityGeocoder,
    io::{instance, signals::setup_signal_handler},
    state::{LocationStore, ipc},
};

/// Builder for running geodark.
pub struct Geodark {
    debug_enabled: bool,
    simulation: bool,
}

impl Geodark {
    pub fn new(debug_enabled: bool) -> Self {
        Self {
            debug_enabled,
            simulation: false,
        }
    }

    /// Run against simulated time with the dry-run setter.
    pub fn simulation(mut self) -> Self {
        self.simulation = true;
        self
    }

    pub fn run(self) -> Result<()> {
        if !self.simulation {
            log_version!();
        }
        if self.debug_enabled {
            log_pipe!();
            log_debug!("Debug output enabled");
        }

        let config_path = config::get_config_path()?;
        let config = config::load()?;

        let setter: Box<dyn AppearanceSetter> = if self.simulation {
            Box::new(DryRunSetter)
        } else {
            appearance::create_setter(&config)?
        };
        config.log_config(Some(setter.name()));

        let lock = if self.simulation {
            None
        } else {
            Some(instance::ensure_single_instance()?)
        };

        let signal_state = setup_signal_handler()?;

        let _ipc_server = if self.simulation {
            None
        } else {
            self.start_services(&signal_state, config_path.clone())
        };

        let store = LocationStore::default_location()?;
        let applier = ModeApplier::new(setter, config.always_reapply());
        let mut scheduler = ScheduleLoop::new(store, applier, crate::time::source::current());

        if !scheduler.restore() && self.simulation {
            anyhow::bail!("No location set. Run 'geodark locate <place>' first");
        }

        let core = Core::new(CoreParams {
            scheduler,
            config,
            config_path: (!self.simulation).then_some(config_path),
            signal_state,
            geocoder: Arc::new(CityGeocoder::world()),
            lock,
        });
        core.execute().context("geodark main loop failed")?;

        log_end!();
        Ok(())
    }

    /// Start the background producers. None of them is required: each one
    /// that fails is reported and geodark runs without it.
    fn start_services(
        &self,
        signal_state: &crate::io::signals::SignalState,
        config_path: std::path::PathBuf,
    ) -> Option<ipc::IpcServer> {
        if let Err(e) =
            config::start_config_watcher(signal_state.signal_sender.clone(), config_path)
        {
            log_pipe!();
            log_warning!("Config file watching unavailable: {:#}", e);
            log_indented!("Use 'kill -USR2' to reload after editing the configuration");
        }

        #[cfg(target_os = "linux")]
        crate::io::dbus::start_system_event_monitors(signal_state.signal_sender.clone());

        let server = ipc::socket_path().and_then(|path| {
            ipc::IpcServer::start(
                &path,
                signal_state.signal_sender.clone(),
                signal_state.running.clone(),
            )
        });
        match server {
            Ok(server) => Some(server),
            Err(e) => {
                log_pipe!();
                log_warning!("IPC server unavailable: {:#}", e);
                log_indented!("'geodark locate' and 'geodark status' cannot reach this instance");
                None
            }
        }
    }
}
