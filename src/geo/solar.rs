//! Approximate sunrise/sunset computation.
//!
//! This is deliberately not an astronomical model. The day is taken as
//! 06:00–18:00 local time and widened symmetrically by up to three hours
//! depending on distance from the equator:
//!
//! ```text
//! adjustment = trunc(|latitude| / 90 × 3)   (whole hours, 0..=3)
//! sunrise    = 06:00 − adjustment
//! sunset     = 18:00 + adjustment
//! ```
//!
//! Longitude and season are ignored. Daylight lasts between 12 and 18 hours.

use chrono::{DateTime, Duration, Local, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};

use super::coordinate::Coordinate;
use crate::common::constants::*;

/// Approximate sunrise and sunset for one coordinate on one local date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SolarWindow {
    pub sunrise: DateTime<Local>,
    pub sunset: DateTime<Local>,
    /// Local calendar date the window was computed for.
    pub date: NaiveDate,
}

impl SolarWindow {
    /// Length of daylight according to the approximation.
    pub fn day_length(&self) -> Duration {
        self.sunset - self.sunrise
    }
}

/// Whole hours the day is widened by on each side.
pub fn latitude_adjustment_hours(latitude: f64) -> i64 {
    (latitude.abs() / MAXIMUM_LATITUDE * MAX_LATITUDE_ADJUSTMENT_HOURS).trunc() as i64
}

/// Compute the solar window for `coordinate` on `date` in the local time zone.
pub fn compute(coordinate: &Coordinate, date: NaiveDate) -> SolarWindow {
    compute_in(coordinate, date, &Local)
}

/// Compute the window in an explicit time zone.
///
/// Exposed separately so the arithmetic can be checked against a fixed offset
/// regardless of the machine's zone.
pub fn compute_in<Tz: TimeZone>(
    coordinate: &Coordinate,
    date: NaiveDate,
    tz: &Tz,
) -> SolarWindow
where
    DateTime<Tz>: Into<DateTime<Local>>,
{
    let adjustment = Duration::hours(latitude_adjustment_hours(coordinate.latitude()));

    let midnight = date.and_time(NaiveTime::default());
    let base_sunrise = midnight + Duration::hours(i64::from(BASE_SUNRISE_HOUR));
    let base_sunset = midnight + Duration::hours(i64::from(BASE_SUNSET_HOUR));

    SolarWindow {
        sunrise: resolve_local(tz, base_sunrise - adjustment).into(),
        sunset: resolve_local(tz, base_sunset + adjustment).into(),
        date,
    }
}

/// Map a wall-clock time to an instant.
///
/// Ambiguous times (DST fall-back) take the earlier instant. Times inside a
/// DST gap move forward until they exist.
pub(super) fn resolve_local<Tz: TimeZone>(tz: &Tz, naive: NaiveDateTime) -> DateTime<Tz> {
    let mut candidate = naive;
    for _ in 0..4 {
        match tz.from_local_datetime(&candidate) {
            LocalResult::Single(dt) => return dt,
            LocalResult::Ambiguous(earliest, _) => return earliest,
            LocalResult::None => candidate += Duration::minutes(30),
        }
    }
    tz.from_utc_datetime(&naive)
}
