//! Common test fixtures for series tests.
//!
//! Unless stated otherwise fixtures live on 2024-01-15 UTC: [`hour`] builds
//! instants on that day and [`query_for_day`] covers it exactly.

use chrono::{DateTime, Duration, TimeZone, Utc};

use series_assembly::DatasetDescriptor;
use series_protocol::{Geometry, ParameterStore, Query};

/// Timespan covering the fixture day.
pub const DAY_TIMESPAN: &str = "2024-01-15T00:00:00Z/2024-01-16T00:00:00Z";

/// Common bounding box literals.
pub mod bbox {
    /// Whole world.
    pub const GLOBAL: &str = "-180,-90,180,90";

    /// Germany, roughly.
    pub const GERMANY: &str = "5.5,47,15.5,55.5";

    /// Degenerate box at the origin.
    pub const POINT: &str = "0,0,0,0";
}

/// Stations used across tests, as (name, lon, lat).
pub mod stations {
    pub const MUENSTER: (&str, f64, f64) = ("muenster", 7.63, 51.96);
    pub const BERLIN: (&str, f64, f64) = ("berlin", 13.40, 52.52);
    pub const MADRID: (&str, f64, f64) = ("madrid", -3.70, 40.42);
}

/// Instant at `h` hours after midnight of the fixture day; may roll over.
pub fn hour(h: i64) -> DateTime<Utc> {
    day_start() + Duration::hours(h)
}

pub fn day_start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap()
}

pub fn day_end() -> DateTime<Utc> {
    hour(24)
}

/// Parameter store over the fixture day plus extra pairs.
pub fn params_for_day(pairs: &[(&str, &str)]) -> ParameterStore {
    let mut all = vec![("timespan", DAY_TIMESPAN)];
    all.extend_from_slice(pairs);
    ParameterStore::from_pairs(all)
}

/// Resolved query over the fixture day plus extra pairs.
pub fn query_for_day(pairs: &[(&str, &str)]) -> Query {
    Query::from_parameters(params_for_day(pairs)).unwrap()
}

/// Stationary measurement dataset located at a station.
pub fn station_dataset(id: &str, station: (&str, f64, f64)) -> DatasetDescriptor {
    let (_, lon, lat) = station;
    DatasetDescriptor::new(id).with_geometry(Geometry::point(lon, lat))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_for_day_bounds() {
        let query = query_for_day(&[]);
        assert_eq!(query.timespan().start_utc(), day_start());
        assert_eq!(query.timespan().end_utc(), day_end());
    }

    #[test]
    fn test_hour_rolls_over() {
        assert_eq!(hour(25), Utc.with_ymd_and_hms(2024, 1, 16, 1, 0, 0).unwrap());
    }
}
