use super::*;
use crate::appearance::testing::RecordingSetter;
use crate::appearance::{AppearanceMode, ModeApplier};
use crate::common::constants::LOCATION_FILE_NAME;
use crate::core::requests::LocationOutcome;
use crate::geo::{CityEntry, CityGeocoder, Coordinate};
use crate::state::LocationStore;
use crate::time::source::{SimulatedTimeSource, TimeSource};
use chrono::{DateTime, Local, TimeZone};
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use tempfile::{TempDir, tempdir};

fn at(h: u32, min: u32) -> DateTime<Local> {
    Local.with_ymd_and_hms(2026, 6, 21, h, min, 0).unwrap()
}

fn london() -> Coordinate {
    Coordinate::new(51.5, -0.12).unwrap()
}

fn geocoder() -> Arc<dyn Geocoder> {
    Arc::new(CityGeocoder::with_entries(vec![
        CityEntry {
            name: "London".into(),
            country: "GB".into(),
            latitude: 51.5,
            longitude: -0.12,
        },
        CityEntry {
            name: "Quito".into(),
            country: "EC".into(),
            latitude: -0.18,
            longitude: -78.47,
        },
    ]))
}

struct Harness {
    temp: TempDir,
    store: LocationStore,
    setter: RecordingSetter,
    signals: SignalState,
    sender: mpsc::Sender<SignalMessage>,
}

fn harness() -> Harness {
    let temp = tempdir().unwrap();
    let store = LocationStore::new(temp.path().join(LOCATION_FILE_NAME));
    let signals = SignalState::detached();
    let sender = signals.signal_sender.clone();
    Harness {
        temp,
        store,
        setter: RecordingSetter::default(),
        signals,
        sender,
    }
}

fn run(
    h: Harness,
    start: DateTime<Local>,
    end: DateTime<Local>,
    config: Config,
    config_path: Option<PathBuf>,
) -> (ScheduleLoop, RecordingSetter, TempDir) {
    let clock = Arc::new(SimulatedTimeSource::new(start, end, 0.0));
    run_with(h, clock, config, config_path)
}

/// Half an hour of simulated time at 10ms per minute, so geocode workers
/// report back while the loop is still running.
fn run_paced(h: Harness) -> (ScheduleLoop, RecordingSetter, TempDir) {
    let clock = Arc::new(SimulatedTimeSource::new(at(12, 0), at(12, 30), 6000.0));
    run_with(h, clock, Config::default(), None)
}

fn run_with(
    h: Harness,
    clock: Arc<dyn TimeSource>,
    config: Config,
    config_path: Option<PathBuf>,
) -> (ScheduleLoop, RecordingSetter, TempDir) {
    let applier = ModeApplier::new(Box::new(h.setter.clone()), config.always_reapply());
    let mut scheduler = ScheduleLoop::new(h.store.clone(), applier, clock);
    scheduler.restore();

    let core = Core::new(CoreParams {
        scheduler,
        config,
        config_path,
        signal_state: h.signals,
        geocoder: geocoder(),
        lock: None,
    });
    let scheduler = core.execute().unwrap();
    (scheduler, h.setter, h.temp)
}

/// Wall clock that can be stepped, as when the user changes the system time.
#[derive(Default)]
struct SteppedClock {
    offset_secs: Mutex<i64>,
}

impl SteppedClock {
    fn step(&self, secs: i64) {
        *self.offset_secs.lock().unwrap() += secs;
    }
}

impl TimeSource for SteppedClock {
    fn now(&self) -> DateTime<Local> {
        Local::now() + chrono::Duration::seconds(*self.offset_secs.lock().unwrap())
    }

    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }

    fn is_simulated(&self) -> bool {
        false
    }
}

fn live_config() -> Config {
    Config {
        always_reapply: Some(true),
        tick_interval: Some(1),
        ..Config::default()
    }
}

/// Run the core on real time while `driver` sends messages from another thread.
/// The driver must end with a shutdown.
fn run_live(
    h: Harness,
    driver: impl FnOnce(mpsc::Sender<SignalMessage>, Arc<SteppedClock>) + Send + 'static,
) -> (RecordingSetter, TempDir) {
    let clock = Arc::new(SteppedClock::default());
    let driver = std::thread::spawn({
        let sender = h.sender.clone();
        let clock = clock.clone();
        move || driver(sender, clock)
    });
    let (_, setter, temp) = run_with(h, clock, live_config(), None);
    driver.join().unwrap();
    (setter, temp)
}

#[test]
fn test_idle_core_never_applies() {
    let h = harness();
    let (scheduler, setter, _temp) = run(h, at(12, 0), at(13, 0), Config::default(), None);
    assert!(!scheduler.is_active());
    assert!(setter.applied().is_empty());
}

#[test]
fn test_change_only_applies_across_sunset() {
    let h = harness();
    h.store.save(&london()).unwrap();

    let (_, setter, _temp) = run(h, at(18, 0), at(20, 0), Config::default(), None);
    assert_eq!(
        setter.applied(),
        vec![AppearanceMode::Day, AppearanceMode::Night]
    );
}

#[test]
fn test_always_reapply_applies_every_tick() {
    let h = harness();
    h.store.save(&london()).unwrap();
    let config = Config {
        always_reapply: Some(true),
        ..Config::default()
    };

    let (_, setter, _temp) = run(h, at(18, 0), at(20, 0), config, None);
    let applied = setter.applied();
    // Restore plus one per minute
    assert_eq!(applied.len(), 121);
    assert_eq!(applied.first(), Some(&AppearanceMode::Day));
    assert_eq!(applied.last(), Some(&AppearanceMode::Night));
}

#[test]
fn test_reapply_message_forces_setter_call() {
    let h = harness();
    h.store.save(&london()).unwrap();
    h.sender.send(SignalMessage::Reapply).unwrap();

    let (_, setter, _temp) = run(h, at(12, 0), at(12, 5), Config::default(), None);
    assert_eq!(
        setter.applied(),
        vec![AppearanceMode::Day, AppearanceMode::Day]
    );
}

#[test]
fn test_shutdown_message_stops_loop() {
    let h = harness();
    h.store.save(&london()).unwrap();
    h.sender.send(SignalMessage::Shutdown).unwrap();

    let start = at(12, 0);
    let (scheduler, _, _temp) = run(h, start, at(23, 0), Config::default(), None);
    assert!(scheduler.clock().now() < at(13, 0));
}

#[test]
fn test_set_location_activates_and_replies() {
    let h = harness();
    let (reply, outcome) = mpsc::channel();
    h.sender
        .send(SignalMessage::SetLocation(LocationRequest::new(
            "London",
            Some(reply),
        )))
        .unwrap();
    let store = h.store.clone();

    let (scheduler, setter, _temp) = run_paced(h);

    match outcome.recv_timeout(Duration::from_secs(5)).unwrap() {
        LocationOutcome::Set {
            display_name, mode, ..
        } => {
            assert!(display_name.starts_with("London"));
            assert_eq!(mode, Some(AppearanceMode::Day));
        }
        other => panic!("unexpected outcome {other:?}"),
    }
    assert!(scheduler.is_active());
    assert_eq!(store.load(), Some(london()));
    assert_eq!(setter.applied().first(), Some(&AppearanceMode::Day));
}

#[test]
fn test_unknown_location_keeps_previous() {
    let h = harness();
    h.store.save(&london()).unwrap();
    let (reply, outcome) = mpsc::channel();
    h.sender
        .send(SignalMessage::SetLocation(LocationRequest::new(
            "Atlantis",
            Some(reply),
        )))
        .unwrap();

    let (scheduler, _, _temp) = run_paced(h);

    assert_eq!(
        outcome.recv_timeout(Duration::from_secs(5)).unwrap(),
        LocationOutcome::Failed {
            message: "Location not found: Atlantis".into()
        }
    );
    assert_eq!(scheduler.coordinate(), Some(london()));
}

#[test]
fn test_only_latest_request_wins() {
    let h = harness();
    let (first_reply, first) = mpsc::channel();
    let (second_reply, second) = mpsc::channel();
    h.sender
        .send(SignalMessage::SetLocation(LocationRequest::new(
            "London",
            Some(first_reply),
        )))
        .unwrap();
    h.sender
        .send(SignalMessage::SetLocation(LocationRequest::new(
            "Quito",
            Some(second_reply),
        )))
        .unwrap();

    let (scheduler, _, _temp) = run_paced(h);

    assert_eq!(
        first.recv_timeout(Duration::from_secs(5)).unwrap(),
        LocationOutcome::Superseded
    );
    assert!(matches!(
        second.recv_timeout(Duration::from_secs(5)).unwrap(),
        LocationOutcome::Set { .. }
    ));
    let quito = Coordinate::new(-0.18, -78.47).unwrap();
    assert_eq!(scheduler.coordinate(), Some(quito));
}

#[test]
fn test_status_request_is_answered() {
    let h = harness();
    h.store.save(&london()).unwrap();
    let (reply, status) = mpsc::channel();
    h.sender.send(SignalMessage::Status(reply)).unwrap();

    run(h, at(21, 0), at(21, 5), Config::default(), None);

    let snapshot = status.recv_timeout(Duration::from_secs(5)).unwrap();
    assert!(snapshot.active);
    assert_eq!(snapshot.mode, Some(AppearanceMode::Night));
    assert_eq!(snapshot.setter.as_deref(), Some("recording"));
}

#[test]
fn test_reload_updates_always_reapply() {
    let h = harness();
    h.store.save(&london()).unwrap();
    let config_path = h.temp.path().join("geodark.toml");
    std::fs::write(&config_path, "always_reapply = true\n").unwrap();
    h.sender.send(SignalMessage::Reload).unwrap();

    let (scheduler, setter, _temp) = run(
        h,
        at(12, 0),
        at(12, 10),
        Config::default(),
        Some(config_path),
    );

    assert!(scheduler.applier().always_reapply());
    // Restore, the re-evaluation after the reload, then one per tick
    assert_eq!(setter.applied().len(), 12);
}

#[test]
fn test_invalid_reload_keeps_running_config() {
    let h = harness();
    h.store.save(&london()).unwrap();
    let config_path = h.temp.path().join("geodark.toml");
    std::fs::write(&config_path, "tick_interval = 1\n").unwrap();
    h.sender.send(SignalMessage::Reload).unwrap();

    let (scheduler, setter, _temp) = run(
        h,
        at(12, 0),
        at(12, 10),
        Config::default(),
        Some(config_path),
    );

    assert!(!scheduler.applier().always_reapply());
    assert_eq!(setter.applied(), vec![AppearanceMode::Day]);
}

#[test]
fn test_ticks_continue_after_clock_set_back() {
    let h = harness();
    h.store.save(&london()).unwrap();

    let (setter, _temp) = run_live(h, |sender, clock| {
        std::thread::sleep(Duration::from_millis(200));
        clock.step(-3600);
        let (reply, _status) = mpsc::channel();
        sender.send(SignalMessage::Status(reply)).unwrap();
        std::thread::sleep(Duration::from_millis(3500));
        sender.send(SignalMessage::Shutdown).unwrap();
    });

    // Restore plus the 1s ticks that followed the step back
    assert!(setter.count() >= 3, "only {} setter calls", setter.count());
}

#[test]
fn test_messages_keep_tick_phase() {
    let h = harness();
    h.store.save(&london()).unwrap();

    let (setter, _temp) = run_live(h, |sender, _| {
        for _ in 0..10 {
            std::thread::sleep(Duration::from_millis(300));
            sender.send(SignalMessage::Reapply).unwrap();
        }
        std::thread::sleep(Duration::from_millis(300));
        sender.send(SignalMessage::Shutdown).unwrap();
    });

    // Restore and ten reapplies, plus ticks that were not pushed back by them
    assert!(setter.count() >= 13, "only {} setter calls", setter.count());
}
