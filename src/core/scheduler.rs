//! The Idle/Active state machine that drives appearance changes.
//!
//! A [`ScheduleLoop`] owns everything derived from the location: the current
//! coordinate, its [`SolarWindow`] and the [`ModeApplier`]. It has no timer of
//! its own; the core loop calls [`ScheduleLoop::tick`] on every interval and
//! routes location changes through [`ScheduleLoop::set_location`].

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::appearance::{self, AppearanceMode, ApplyOutcome, ModeApplier};
use crate::geo::{Coordinate, SolarWindow, solar};
use crate::state::LocationStore;
use crate::time::source::TimeSource;

/// Coordinates closer than this are the same place.
const SAME_LOCATION_TOLERANCE: f64 = 1e-9;

#[derive(Debug, Clone, PartialEq)]
pub enum SchedulerState {
    /// No location known yet; ticks do nothing.
    Idle,
    Active {
        coordinate: Coordinate,
        window: SolarWindow,
    },
}

/// Point-in-time view of the scheduler, as reported by `geodark status`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusSnapshot {
    pub now: DateTime<Local>,
    pub active: bool,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub sunrise: Option<DateTime<Local>>,
    pub sunset: Option<DateTime<Local>>,
    pub mode: Option<AppearanceMode>,
    pub last_applied: Option<AppearanceMode>,
    pub setter: Option<String>,
    pub always_reapply: bool,
}

impl StatusSnapshot {
    /// Status for `coordinate` at `now`, without a running scheduler.
    pub fn compute(coordinate: Option<&Coordinate>, now: DateTime<Local>) -> Self {
        let window = coordinate.map(|c| solar::compute(c, now.date_naive()));
        Self {
            now,
            active: coordinate.is_some(),
            latitude: coordinate.map(Coordinate::latitude),
            longitude: coordinate.map(Coordinate::longitude),
            sunrise: window.map(|w| w.sunrise),
            sunset: window.map(|w| w.sunset),
            mode: window.map(|w| appearance::decide(now, &w)),
            last_applied: None,
            setter: None,
            always_reapply: false,
        }
    }
}

pub struct ScheduleLoop {
    state: SchedulerState,
    store: LocationStore,
    applier: ModeApplier,
    clock: Arc<dyn TimeSource>,
}

impl ScheduleLoop {
    pub fn new(store: LocationStore, applier: ModeApplier, clock: Arc<dyn TimeSource>) -> Self {
        Self {
            state: SchedulerState::Idle,
            store,
            applier,
            clock,
        }
    }

    /// Activate the persisted location, if there is one.
    ///
    /// Returns whether the scheduler is now active. The record is not
    /// written back.
    pub fn restore(&mut self) -> bool {
        match self.store.load() {
            Some(coordinate) => {
                log_block_start!("Restored location {}", coordinate);
                self.activate(coordinate);
                true
            }
            None => {
                log_debug!("No stored location, waiting for one");
                false
            }
        }
    }

    /// Persist `coordinate`, make it active and apply the mode for it.
    ///
    /// A failed save is logged; the location is activated regardless.
    pub fn set_location(&mut self, coordinate: Coordinate) -> AppearanceMode {
        if let Err(e) = self.store.save(&coordinate) {
            log_pipe!();
            log_warning!("Could not save location: {:#}", e);
            log_indented!("It will be used until geodark exits");
        }
        self.activate(coordinate)
    }

    /// Re-read the store after a reload and switch if it now holds a
    /// different location. Returns whether anything changed.
    pub fn reload_location(&mut self) -> bool {
        let Some(stored) = self.store.load() else {
            return false;
        };
        if self
            .coordinate()
            .is_some_and(|current| current.approx_eq(&stored, SAME_LOCATION_TOLERANCE))
        {
            return false;
        }
        log_block_start!("Stored location changed to {}", stored);
        self.activate(stored);
        true
    }

    fn activate(&mut self, coordinate: Coordinate) -> AppearanceMode {
        let now = self.clock.now();
        let window = solar::compute(&coordinate, now.date_naive());
        log_solar_window(&window);

        self.state = SchedulerState::Active { coordinate, window };

        let mode = appearance::decide(now, &window);
        self.applier.apply(mode);
        mode
    }

    /// One evaluation cycle.
    ///
    /// Idle: nothing happens and `None` is returned. Active: the window is
    /// recomputed if the local date has changed, the mode is decided for the
    /// current instant and handed to the applier.
    pub fn tick(&mut self) -> Option<ApplyOutcome> {
        let SchedulerState::Active { coordinate, window } = &mut self.state else {
            return None;
        };

        let now = self.clock.now();
        let today = now.date_naive();
        if today != window.date {
            *window = solar::compute(coordinate, today);
            log_debug!("New day, recomputed sunrise/sunset for {}", today);
            log_solar_window(window);
        }

        let mode = appearance::decide(now, window);
        Some(self.applier.apply(mode))
    }

    pub fn state(&self) -> &SchedulerState {
        &self.state
    }

    pub fn is_active(&self) -> bool {
        matches!(self.state, SchedulerState::Active { .. })
    }

    pub fn coordinate(&self) -> Option<Coordinate> {
        match &self.state {
            SchedulerState::Active { coordinate, .. } => Some(*coordinate),
            SchedulerState::Idle => None,
        }
    }

    pub fn window(&self) -> Option<&SolarWindow> {
        match &self.state {
            SchedulerState::Active { window, .. } => Some(window),
            SchedulerState::Idle => None,
        }
    }

    pub fn applier(&self) -> &ModeApplier {
        &self.applier
    }

    pub fn applier_mut(&mut self) -> &mut ModeApplier {
        &mut self.applier
    }

    pub fn clock(&self) -> &Arc<dyn TimeSource> {
        &self.clock
    }

    /// Report the window the last tick decided against, not a fresh one.
    pub fn status(&self) -> StatusSnapshot {
        let now = self.clock.now();
        let coordinate = self.coordinate();
        let window = self.window();
        StatusSnapshot {
            now,
            active: self.is_active(),
            latitude: coordinate.map(|c| c.latitude()),
            longitude: coordinate.map(|c| c.longitude()),
            sunrise: window.map(|w| w.sunrise),
            sunset: window.map(|w| w.sunset),
            mode: window.map(|w| appearance::decide(now, w)),
            last_applied: self.applier.last_applied(),
            setter: Some(self.applier.setter_name().to_string()),
            always_reapply: self.applier.always_reapply(),
        }
    }
}

fn log_solar_window(window: &SolarWindow) {
    log_indented!(
        "Sunrise {} / sunset {} on {}",
        window.sunrise.format("%H:%M"),
        window.sunset.format("%H:%M"),
        window.date
    );
}
