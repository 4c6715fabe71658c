use chrono::{Duration, FixedOffset, NaiveDate};
use geodark::appearance::{self, AppearanceMode};
use geodark::geo::Coordinate;
use geodark::geo::solar::{compute_in, latitude_adjustment_hours};
use proptest::prelude::*;

fn coordinate_strategy() -> impl Strategy<Value = (f64, f64)> {
    (-90.0..=90.0, -180.0..=180.0)
}

fn date_strategy() -> impl Strategy<Value = NaiveDate> {
    (2000i32..2100, 1u32..=12, 1u32..=28)
        .prop_map(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d).unwrap())
}

fn utc() -> FixedOffset {
    FixedOffset::east_opt(0).unwrap()
}

proptest! {
    #[test]
    fn adjustment_is_whole_hours_up_to_three((lat, _) in coordinate_strategy()) {
        let adjustment = latitude_adjustment_hours(lat);
        prop_assert!((0..=3).contains(&adjustment));
        prop_assert_eq!(adjustment, latitude_adjustment_hours(-lat));
    }

    #[test]
    fn day_length_follows_latitude((lat, lon) in coordinate_strategy(), date in date_strategy()) {
        let coordinate = Coordinate::new(lat, lon).unwrap();
        let window = compute_in(&coordinate, date, &utc());

        let expected = Duration::hours(12 + 2 * latitude_adjustment_hours(lat));
        prop_assert_eq!(window.day_length(), expected);
        prop_assert!(window.sunrise < window.sunset);
        prop_assert!(window.day_length() >= Duration::hours(12));
        prop_assert!(window.day_length() <= Duration::hours(18));
    }

    #[test]
    fn longitude_does_not_matter(lat in -90.0f64..=90.0, lon_a in -180.0f64..=180.0, lon_b in -180.0f64..=180.0, date in date_strategy()) {
        let a = compute_in(&Coordinate::new(lat, lon_a).unwrap(), date, &utc());
        let b = compute_in(&Coordinate::new(lat, lon_b).unwrap(), date, &utc());
        prop_assert_eq!(a, b);
    }

    #[test]
    fn day_exactly_inside_the_window(
        (lat, lon) in coordinate_strategy(),
        date in date_strategy(),
        minute in 0i64..(24 * 60),
    ) {
        let coordinate = Coordinate::new(lat, lon).unwrap();
        let window = compute_in(&coordinate, date, &utc());
        let midnight = window.sunrise - Duration::hours(6 - latitude_adjustment_hours(lat));
        let now = midnight + Duration::minutes(minute);

        let expected = if now > window.sunrise && now < window.sunset {
            AppearanceMode::Day
        } else {
            AppearanceMode::Night
        };
        prop_assert_eq!(appearance::decide(now, &window), expected);
    }

    #[test]
    fn boundaries_are_night((lat, lon) in coordinate_strategy(), date in date_strategy()) {
        let coordinate = Coordinate::new(lat, lon).unwrap();
        let window = compute_in(&coordinate, date, &utc());
        prop_assert_eq!(appearance::decide(window.sunrise, &window), AppearanceMode::Night);
        prop_assert_eq!(appearance::decide(window.sunset, &window), AppearanceMode::Night);
        prop_assert_eq!(
            appearance::decide(window.sunrise + Duration::minutes(1), &window),
            AppearanceMode::Day
        );
    }
}
