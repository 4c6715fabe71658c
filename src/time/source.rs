//! Clock abstraction for real and simulated time.
//!
//! The scheduler never reads the system clock directly: it holds an
//! `Arc<dyn TimeSource>` so `geodark simulate` and the tests can drive it
//! through days of sunrises and sunsets without waiting. The global instance in
//! this module only serves the logger's timestamp prefix and the commands that
//! install a simulated clock for the whole process.

use chrono::{DateTime, Duration as ChronoDuration, Local, NaiveDateTime, TimeZone};
use once_cell::sync::OnceCell;
use std::sync::{Arc, Mutex};
use std::time::Duration as StdDuration;

static TIME_SOURCE: OnceCell<Arc<dyn TimeSource>> = OnceCell::new();

/// Trait for abstracting time operations.
pub trait TimeSource: Send + Sync {
    /// Current instant in the local time zone.
    fn now(&self) -> DateTime<Local>;

    /// Sleep for `duration` (or advance the simulated clock by it).
    fn sleep(&self, duration: StdDuration);

    /// Whether this clock is simulated.
    fn is_simulated(&self) -> bool;

    /// Whether a simulation has reached its end instant. Always false for real time.
    fn is_ended(&self) -> bool {
        false
    }
}

/// The system clock.
pub struct RealTimeSource;

impl TimeSource for RealTimeSource {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }

    fn sleep(&self, duration: StdDuration) {
        std::thread::sleep(duration);
    }

    fn is_simulated(&self) -> bool {
        false
    }
}

/// Simulated clock running from `start` to `end`.
///
/// With a multiplier of `0.0` the clock fast-forwards: every `sleep` advances
/// simulated time instantly. Any positive multiplier sleeps for the scaled real
/// duration first (e.g. `60.0` = one simulated minute per real second).
pub struct SimulatedTimeSource {
    end_time: DateTime<Local>,
    time_multiplier: f64,
    current: Mutex<DateTime<Local>>,
}

impl SimulatedTimeSource {
    pub fn new(start_time: DateTime<Local>, end_time: DateTime<Local>, multiplier: f64) -> Self {
        Self {
            end_time,
            time_multiplier: if multiplier.is_finite() && multiplier > 0.0 {
                multiplier
            } else {
                0.0
            },
            current: Mutex::new(start_time),
        }
    }

    /// Fast-forward clock with no end in sight, for tests.
    pub fn starting_at(start_time: DateTime<Local>) -> Self {
        Self::new(start_time, start_time + ChronoDuration::days(3650), 0.0)
    }

    /// Jump directly to `instant` (clamped to the end time).
    pub fn set(&self, instant: DateTime<Local>) {
        let mut current = self.current.lock().unwrap_or_else(|e| e.into_inner());
        *current = instant.min(self.end_time);
    }

    pub fn end_time(&self) -> DateTime<Local> {
        self.end_time
    }
}

impl TimeSource for SimulatedTimeSource {
    fn now(&self) -> DateTime<Local> {
        *self.current.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn sleep(&self, duration: StdDuration) {
        let step = ChronoDuration::from_std(duration).unwrap_or(ChronoDuration::MAX);
        let from = self.now();
        let target = from.checked_add_signed(step).unwrap_or(self.end_time).min(self.end_time);

        if self.time_multiplier > 0.0 {
            let simulated = (target - from).to_std().unwrap_or_default();
            let real = simulated.as_secs_f64() / self.time_multiplier;
            if real > 0.0 {
                std::thread::sleep(StdDuration::from_secs_f64(real));
            }
        }

        self.set(target);
    }

    fn is_simulated(&self) -> bool {
        true
    }

    fn is_ended(&self) -> bool {
        self.now() >= self.end_time
    }
}

/// Install the process-wide clock. Only the first call has an effect.
pub fn init_time_source(source: Arc<dyn TimeSource>) {
    TIME_SOURCE.set(source).ok();
}

pub fn is_initialized() -> bool {
    TIME_SOURCE.get().is_some()
}

/// The process-wide clock, defaulting to the system clock.
pub fn current() -> Arc<dyn TimeSource> {
    TIME_SOURCE
        .get_or_init(|| Arc::new(RealTimeSource))
        .clone()
}

pub fn now() -> DateTime<Local> {
    current().now()
}

pub fn is_simulated() -> bool {
    current().is_simulated()
}

/// Parse `"YYYY-MM-DD HH:MM:SS"` as a local date-time.
pub fn parse_datetime(s: &str) -> Result<DateTime<Local>, String> {
    let naive = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .map_err(|e| format!("Invalid datetime format: {e}. Use YYYY-MM-DD HH:MM:SS"))?;

    Local
        .from_local_datetime(&naive)
        .earliest()
        .ok_or_else(|| format!("{s} does not exist in the local time zone"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(s: &str) -> DateTime<Local> {
        parse_datetime(s).unwrap()
    }

    #[test]
    fn test_fast_forward_sleep_advances_exactly() {
        let clock = SimulatedTimeSource::starting_at(at("2026-03-10 12:00:00"));
        clock.sleep(StdDuration::from_secs(90));
        assert_eq!(clock.now(), at("2026-03-10 12:01:30"));
    }

    #[test]
    fn test_simulation_clamps_at_end() {
        let clock = SimulatedTimeSource::new(
            at("2026-03-10 12:00:00"),
            at("2026-03-10 12:05:00"),
            0.0,
        );
        assert!(!clock.is_ended());
        clock.sleep(StdDuration::from_secs(3600));
        assert_eq!(clock.now(), at("2026-03-10 12:05:00"));
        assert!(clock.is_ended());
    }

    #[test]
    fn test_negative_multiplier_means_fast_forward() {
        let clock = SimulatedTimeSource::new(
            at("2026-03-10 12:00:00"),
            at("2026-03-11 12:00:00"),
            -4.0,
        );
        let started = std::time::Instant::now();
        clock.sleep(StdDuration::from_secs(6 * 3600));
        assert!(started.elapsed() < StdDuration::from_secs(1));
        assert_eq!(clock.now(), at("2026-03-10 18:00:00"));
    }

    #[test]
    fn test_parse_datetime_rejects_garbage() {
        assert!(parse_datetime("tomorrow at noon").is_err());
        assert!(parse_datetime("2026-13-01 00:00:00").is_err());
    }

    #[test]
    fn test_real_time_source_is_not_simulated() {
        let clock = RealTimeSource;
        assert!(!clock.is_simulated());
        assert!(!clock.is_ended());
    }
}
