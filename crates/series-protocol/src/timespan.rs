//! Requested time window.
//!
//! Accepted forms of the `timespan` parameter (ISO 8601 intervals):
//! - `2024-01-01T00:00:00Z/2024-01-08T00:00:00Z`
//! - `PT12H/2024-01-15T12:00:00+01:00` (duration before end)
//! - `2024-01-15/P1D` (duration after start)
//! - `P1W/now` (`now` in any case is the current time)
//!
//! Without a `timespan` parameter the window is the last week up to now.

use chrono::{DateTime, Duration, FixedOffset, Months, NaiveDate, NaiveDateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::InvalidParameter;
use crate::names;

static NOW_TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)now").expect("valid now pattern"));

static ISO_DURATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^P(?:(\d+)Y)?(?:(\d+)M)?(?:(\d+)W)?(?:(\d+)D)?(?:T(?:(\d+)H)?(?:(\d+)M)?(?:(\d+(?:\.\d+)?)S)?)?$",
    )
    .expect("valid duration pattern")
});

/// A closed time window with the timezone it was requested in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timespan {
    pub start: DateTime<FixedOffset>,
    pub end: DateTime<FixedOffset>,
}

/// ISO 8601 duration split into calendar months and a fixed part.
#[derive(Debug, Clone, Copy, PartialEq)]
struct IsoDuration {
    months: u32,
    fixed: Duration,
}

impl IsoDuration {
    fn parse(s: &str) -> Option<Self> {
        let caps = ISO_DURATION.captures(s)?;
        if s == "P" || s.ends_with('T') {
            return None;
        }
        // Absent fields are zero; present fields must fit the chrono ranges.
        let number = |i: usize| -> Option<i64> {
            caps.get(i).map_or(Some(0), |m| m.as_str().parse::<i64>().ok())
        };
        let seconds: f64 = caps
            .get(7)
            .map_or(Some(0.0), |m| m.as_str().parse::<f64>().ok())?;

        let months = number(1)?.checked_mul(12)?.checked_add(number(2)?)?;
        let months = u32::try_from(months).ok()?;
        let millis = seconds * 1000.0;
        if !millis.is_finite() || millis >= i64::MAX as f64 {
            return None;
        }
        let fixed = Duration::try_weeks(number(3)?)?
            .checked_add(&Duration::try_days(number(4)?)?)?
            .checked_add(&Duration::try_hours(number(5)?)?)?
            .checked_add(&Duration::try_minutes(number(6)?)?)?
            .checked_add(&Duration::try_milliseconds(millis.round() as i64)?)?;
        Some(Self { months, fixed })
    }

    fn before(&self, end: DateTime<FixedOffset>) -> Option<DateTime<FixedOffset>> {
        end.checked_sub_months(Months::new(self.months))?
            .checked_sub_signed(self.fixed)
    }

    fn after(&self, start: DateTime<FixedOffset>) -> Option<DateTime<FixedOffset>> {
        start
            .checked_add_months(Months::new(self.months))?
            .checked_add_signed(self.fixed)
    }
}

fn invalid(timespan: &str) -> InvalidParameter {
    InvalidParameter::new(
        names::TIMESPAN,
        "Expected an ISO 8601 interval: 'start/end', 'duration/end' or 'start/duration'.",
    )
    .with_hint(format!(
        "Example: 'PT12H/2024-01-15T12:00:00Z'. Was: '{}'.",
        timespan
    ))
}

fn parse_instant(s: &str) -> Option<DateTime<FixedOffset>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt);
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc().fixed_offset());
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc().fixed_offset())
}

fn is_duration(s: &str) -> bool {
    s.starts_with('P') || s.starts_with('p')
}

impl Timespan {
    /// Create a window; fails when `start` is after `end`.
    pub fn new(
        start: DateTime<FixedOffset>,
        end: DateTime<FixedOffset>,
    ) -> Result<Self, InvalidParameter> {
        if start > end {
            return Err(InvalidParameter::new(
                names::TIMESPAN,
                format!("Start {} must not be after end {}.", start, end),
            ));
        }
        Ok(Self { start, end })
    }

    /// The week up to `now`, in UTC.
    pub fn last_week(now: DateTime<Utc>) -> Self {
        let end = now.fixed_offset();
        Self {
            start: end - Duration::weeks(1),
            end,
        }
    }

    /// Parse a timespan, replacing `now` with the current time.
    pub fn parse(timespan: &str) -> Result<Self, InvalidParameter> {
        Self::parse_at(timespan, Utc::now())
    }

    /// Parse a timespan, replacing `now` with the given instant.
    pub fn parse_at(timespan: &str, now: DateTime<Utc>) -> Result<Self, InvalidParameter> {
        let normalized = NOW_TOKEN.replace_all(timespan.trim(), now.to_rfc3339().as_str());
        let parts: Vec<&str> = normalized.split('/').map(str::trim).collect();
        let [first, second] = parts.as_slice() else {
            return Err(invalid(timespan));
        };

        let (start, end) = match (is_duration(first), is_duration(second)) {
            (false, false) => (parse_instant(first), parse_instant(second)),
            (true, false) => {
                let end = parse_instant(second);
                let start = IsoDuration::parse(&first.to_uppercase())
                    .zip(end)
                    .and_then(|(d, end)| d.before(end));
                (start, end)
            }
            (false, true) => {
                let start = parse_instant(first);
                let end = IsoDuration::parse(&second.to_uppercase())
                    .zip(start)
                    .and_then(|(d, start)| d.after(start));
                (start, end)
            }
            (true, true) => (None, None),
        };

        match (start, end) {
            (Some(start), Some(end)) => Self::new(start, end),
            _ => Err(invalid(timespan)),
        }
    }

    /// Timezone the window was requested in (offset of its start).
    pub fn timezone(&self) -> FixedOffset {
        *self.start.offset()
    }

    pub fn start_utc(&self) -> DateTime<Utc> {
        self.start.with_timezone(&Utc)
    }

    pub fn end_utc(&self) -> DateTime<Utc> {
        self.end.with_timezone(&Utc)
    }

    /// Check whether an instant lies within the window (bounds inclusive).
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        instant >= self.start_utc() && instant <= self.end_utc()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn utc(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    #[test]
    fn test_parse_start_end() {
        let span = Timespan::parse("2024-01-01T00:00:00Z/2024-01-08T00:00:00Z").unwrap();
        assert_eq!(span.start_utc(), utc(2024, 1, 1, 0));
        assert_eq!(span.end_utc(), utc(2024, 1, 8, 0));
        assert_eq!(span.timezone(), FixedOffset::east_opt(0).unwrap());
    }

    #[test]
    fn test_timezone_from_start() {
        let span = Timespan::parse("2024-01-15T12:00:00+01:00/2024-01-15T18:00:00Z").unwrap();
        assert_eq!(span.timezone(), FixedOffset::east_opt(3600).unwrap());
        assert_eq!(span.start_utc(), utc(2024, 1, 15, 11));
    }

    #[test]
    fn test_parse_duration_before_end() {
        let span = Timespan::parse("PT12H/2024-01-15T12:00:00Z").unwrap();
        assert_eq!(span.start_utc(), utc(2024, 1, 15, 0));
        assert_eq!(span.end_utc(), utc(2024, 1, 15, 12));
    }

    #[test]
    fn test_parse_duration_after_start() {
        let span = Timespan::parse("2024-01-15/P1DT6H").unwrap();
        assert_eq!(span.start_utc(), utc(2024, 1, 15, 0));
        assert_eq!(span.end_utc(), utc(2024, 1, 16, 6));
    }

    #[test]
    fn test_parse_calendar_duration() {
        let span = Timespan::parse("P1M/2024-03-31T00:00:00Z").unwrap();
        assert_eq!(span.start_utc(), utc(2024, 2, 29, 0));
    }

    #[test]
    fn test_parse_now() {
        let now = utc(2024, 6, 1, 12);
        let span = Timespan::parse_at("P1W/NOW", now).unwrap();
        assert_eq!(span.end_utc(), now);
        assert_eq!(span.start_utc(), utc(2024, 5, 25, 12));
    }

    #[test]
    fn test_parse_naive_datetime_as_utc() {
        let span = Timespan::parse("2024-01-15T06:00:00/2024-01-15T07:00:00").unwrap();
        assert_eq!(span.start_utc(), utc(2024, 1, 15, 6));
    }

    #[test]
    fn test_start_after_end_rejected() {
        let result = Timespan::parse("2024-01-08T00:00:00Z/2024-01-01T00:00:00Z");
        assert!(matches!(result, Err(InvalidParameter { ref parameter, .. }) if parameter == "timespan"));
    }

    #[test]
    fn test_malformed_timespans_rejected() {
        for bad in ["2024-01-01", "yesterday/today", "P1D/P2D", "P/2024-01-01", "a/b/c", "PT/2024-01-01"] {
            assert!(Timespan::parse(bad).is_err(), "expected '{}' to fail", bad);
        }
    }

    #[test]
    fn test_out_of_range_durations_rejected() {
        for bad in [
            "P99999999999W/2024-01-15T00:00:00Z",
            "2024-01-15/P9999999999999999D",
            "2024-01-15/P99999999999999999999D",
            "PT9999999999999999H/2024-01-15T00:00:00Z",
            "2024-01-15/P99999999999Y",
            "P1DT99999999999999999999S/now",
        ] {
            let err = Timespan::parse(bad).unwrap_err();
            assert_eq!(err.parameter, names::TIMESPAN, "for '{}'", bad);
        }
    }

    #[test]
    fn test_last_week() {
        let now = utc(2024, 1, 15, 12);
        let span = Timespan::last_week(now);
        assert_eq!(span.end_utc(), now);
        assert_eq!(span.start_utc(), utc(2024, 1, 8, 12));
        assert!(span.contains(utc(2024, 1, 10, 0)));
        assert!(!span.contains(utc(2024, 1, 16, 0)));
    }
}
