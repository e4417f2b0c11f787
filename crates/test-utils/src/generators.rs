//! Generators for synthetic observation series.
//!
//! The patterns are predictable so tests can check exact values.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;

use series_protocol::{Geometry, Observation, Payload};

/// Hourly numeric series starting at `start`.
///
/// Value `i` is `base + i * step`, built from decimal text so no binary
/// artifacts sneak in.
///
/// # Example
///
/// ```
/// use test_utils::{day_start, hourly_series};
///
/// let series = hourly_series(day_start(), 3, "1.5", "0.25");
/// assert_eq!(series.len(), 3);
/// let last = series[2].value.as_ref().unwrap().as_decimal().unwrap();
/// assert_eq!(last.normalize().to_string(), "2");
/// ```
pub fn hourly_series(start: DateTime<Utc>, count: usize, base: &str, step: &str) -> Vec<Observation> {
    let base = Payload::numeric(base).and_then(|p| p.as_decimal()).unwrap_or_default();
    let step = Payload::numeric(step).and_then(|p| p.as_decimal()).unwrap_or_default();
    (0..count)
        .map(|i| {
            let value = base + step * Decimal::from(i as u64);
            Observation::at(start + Duration::hours(i as i64), Some(Payload::Numeric(value)))
        })
        .collect()
}

/// Hourly interval observations ending on the hour, one hour long each.
pub fn hourly_intervals(start: DateTime<Utc>, values: &[&str]) -> Vec<Observation> {
    values
        .iter()
        .enumerate()
        .map(|(i, v)| {
            let end = start + Duration::hours(i as i64 + 1);
            Observation::interval(end - Duration::hours(1), end, Payload::numeric(v))
        })
        .collect()
}

/// Text observations, one per hour.
pub fn text_series(start: DateTime<Utc>, texts: &[&str]) -> Vec<Observation> {
    texts
        .iter()
        .enumerate()
        .map(|(i, t)| Observation::at(start + Duration::hours(i as i64), Some(Payload::text(*t))))
        .collect()
}

/// A mobile platform moving east by 0.1 degree per hour from `(lon, lat)`.
pub fn moving_track(start: DateTime<Utc>, count: usize, lon: f64, lat: f64) -> Vec<Observation> {
    (0..count)
        .map(|i| {
            Observation::at(start + Duration::hours(i as i64), Payload::numeric("1"))
                .with_geometry(Geometry::point(lon + 0.1 * i as f64, lat))
        })
        .collect()
}
