//! Observation and value data model.
//!
//! [`Observation`]s are read-only records handed in by the observation source;
//! [`SeriesValue`]s are what the assemblers produce for clients.

use std::collections::BTreeMap;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// GeoJSON geometry attached to observations.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum Geometry {
    /// A point geometry.
    Point {
        /// Coordinates as [x, y].
        coordinates: [f64; 2],
    },

    /// A line string geometry, e.g. a mobile platform's track.
    LineString {
        /// Array of [x, y] coordinate pairs.
        coordinates: Vec<[f64; 2]>,
    },
}

impl Geometry {
    /// Create a point geometry.
    pub fn point(x: f64, y: f64) -> Self {
        Geometry::Point {
            coordinates: [x, y],
        }
    }

    /// Create a line string geometry.
    pub fn line_string(coordinates: Vec<[f64; 2]>) -> Self {
        Geometry::LineString { coordinates }
    }

    /// GeoJSON type name.
    pub fn type_name(&self) -> &'static str {
        match self {
            Geometry::Point { .. } => "Point",
            Geometry::LineString { .. } => "LineString",
        }
    }
}

/// Typed observation payload.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(untagged)]
pub enum Payload {
    /// Exact decimal, serialized as a JSON number.
    Numeric(#[serde(with = "rust_decimal::serde::float")] Decimal),
    Text(String),
    /// Composite value of a record observation.
    Record(serde_json::Map<String, JsonValue>),
}

impl Payload {
    /// Create a numeric payload from its decimal text, e.g. `"1.005"`.
    pub fn numeric(text: &str) -> Option<Self> {
        parse_decimal(text).map(Payload::Numeric)
    }

    pub fn text(text: impl Into<String>) -> Self {
        Payload::Text(text.into())
    }

    /// Convert a JSON literal; `null` yields `None`.
    ///
    /// Numbers are read from their shortest decimal text, so `1.005` stays `1.005`.
    pub fn from_json(value: &JsonValue) -> Option<Self> {
        match value {
            JsonValue::Null => None,
            JsonValue::Number(n) => parse_decimal(&n.to_string()).map(Payload::Numeric),
            JsonValue::String(s) => Some(Payload::Text(s.clone())),
            JsonValue::Object(map) => Some(Payload::Record(map.clone())),
            other => Some(Payload::Text(other.to_string())),
        }
    }

    pub fn as_decimal(&self) -> Option<Decimal> {
        match self {
            Payload::Numeric(d) => Some(*d),
            _ => None,
        }
    }
}

fn parse_decimal(text: &str) -> Option<Decimal> {
    let text = text.trim();
    Decimal::from_str(text)
        .or_else(|_| Decimal::from_scientific(text))
        .ok()
}

/// Period during which an observation is valid.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ValidTime {
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub start: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub end: DateTime<Utc>,
}

/// A stored observation as delivered by the observation source.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    /// Start of the phenomenon time; equals `time_end` for instants.
    pub time_start: DateTime<Utc>,

    /// End of the phenomenon time; the primary timestamp.
    pub time_end: DateTime<Utc>,

    /// Observed value, `None` when the store holds no value.
    pub value: Option<Payload>,

    /// Where the observation was made.
    pub geometry: Option<Geometry>,

    /// Validity period.
    pub valid_time: Option<ValidTime>,

    /// Ad-hoc attributes.
    pub parameters: BTreeMap<String, JsonValue>,
}

impl Observation {
    /// Observation at a single instant.
    pub fn at(timestamp: DateTime<Utc>, value: Option<Payload>) -> Self {
        Self::interval(timestamp, timestamp, value)
    }

    /// Observation over `[start, end)`.
    pub fn interval(start: DateTime<Utc>, end: DateTime<Utc>, value: Option<Payload>) -> Self {
        Self {
            time_start: start,
            time_end: end,
            value,
            geometry: None,
            valid_time: None,
            parameters: BTreeMap::new(),
        }
    }

    pub fn with_geometry(mut self, geometry: Geometry) -> Self {
        self.geometry = Some(geometry);
        self
    }

    pub fn with_valid_time(mut self, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        self.valid_time = Some(ValidTime { start, end });
        self
    }

    pub fn with_parameter(mut self, name: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.parameters.insert(name.into(), value.into());
        self
    }

    /// Copy of this observation's value stamped at another instant.
    pub fn restamped(&self, timestamp: DateTime<Utc>) -> Self {
        Self::at(timestamp, self.value.clone())
    }
}

/// Time part of a [`SeriesValue`].
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
#[serde(untagged)]
pub enum ValueTime {
    Instant {
        #[serde(with = "chrono::serde::ts_milliseconds")]
        timestamp: DateTime<Utc>,
    },
    Interval {
        #[serde(with = "chrono::serde::ts_milliseconds")]
        timestart: DateTime<Utc>,
        #[serde(with = "chrono::serde::ts_milliseconds")]
        timeend: DateTime<Utc>,
    },
}

impl ValueTime {
    /// The primary timestamp (interval end for intervals).
    pub fn primary(&self) -> DateTime<Utc> {
        match self {
            ValueTime::Instant { timestamp } => *timestamp,
            ValueTime::Interval { timeend, .. } => *timeend,
        }
    }
}

/// A client-facing series value.
///
/// `value` is `None` (serialized as `null`) when the source observation was
/// a no-data sentinel.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SeriesValue {
    #[serde(flatten)]
    pub time: ValueTime,

    pub value: Option<Payload>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub geometry: Option<Geometry>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub valid_time: Option<ValidTime>,

    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub parameters: BTreeMap<String, JsonValue>,
}

impl SeriesValue {
    pub fn new(time: ValueTime, value: Option<Payload>) -> Self {
        Self {
            time,
            value,
            geometry: None,
            valid_time: None,
            parameters: BTreeMap::new(),
        }
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.time.primary()
    }
}
