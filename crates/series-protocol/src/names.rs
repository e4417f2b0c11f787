//! Request parameter names and their default values.
//!
//! Names are stored lower-cased; lookups through [`ParameterStore`](crate::ParameterStore)
//! are case-insensitive, so `showTimeIntervals` and `showtimeintervals` are the same key.

pub const OFFSET: &str = "offset";
pub const LIMIT: &str = "limit";
pub const LOCALE: &str = "locale";
pub const TIMESPAN: &str = "timespan";
pub const OUTPUT_TIMEZONE: &str = "outputtimezone";
pub const TIME_FORMAT: &str = "timeformat";
pub const FORMAT: &str = "format";
pub const WIDTH: &str = "width";
pub const HEIGHT: &str = "height";
pub const GRID: &str = "grid";
pub const LEGEND: &str = "legend";
pub const BASE_64: &str = "base64";
pub const GENERALIZE: &str = "generalize";
pub const EXPANDED: &str = "expanded";
pub const SHOW_TIME_INTERVALS: &str = "showtimeintervals";
pub const SHOW_VERTICAL_INTERVALS: &str = "showverticalintervals";
pub const FORCE_XY: &str = "forcexy";
pub const MATCH_DOMAIN_IDS: &str = "matchdomainids";
pub const CRS: &str = "crs";
pub const BBOX: &str = "bbox";
pub const NEAR: &str = "near";

pub const DATASET_TYPES: &str = "datasettypes";
pub const OBSERVATION_TYPES: &str = "observationtypes";
pub const VALUE_TYPES: &str = "valuetypes";
pub const PLATFORM_TYPES: &str = "platformtypes";
pub const PLATFORM_GEOMETRIES: &str = "platformgeometries";
pub const OBSERVED_GEOMETRIES: &str = "observedgeometries";
pub const GEOMETRY_TYPES: &str = "geometrytypes";
pub const FILTER_MOBILE: &str = "mobile";
pub const FILTER_INSITU: &str = "insitu";

/// Base for hrefs in responses; set by the hosting layer, not by clients.
pub const HREF_BASE: &str = "internal.href.base";

/// Wildcard accepted by every type filter.
pub const ALL: &str = "all";

/// Default values for optional parameters.
pub mod defaults {
    pub const OFFSET: i64 = -1;
    pub const LIMIT: i64 = -1;
    pub const LOCALE: &str = "en";
    pub const OUTPUT_TIMEZONE: &str = "UTC";
    pub const FORMAT: &str = "tvp";
    pub const WIDTH: i64 = 800;
    pub const HEIGHT: i64 = 500;
    pub const GRID: bool = true;
    pub const LEGEND: bool = false;
    pub const BASE_64: bool = false;
    pub const GENERALIZE: bool = false;
    pub const EXPANDED: bool = false;
    pub const SHOW_TIME_INTERVALS: bool = false;
    pub const SHOW_VERTICAL_INTERVALS: bool = false;
    pub const FORCE_XY: bool = false;
    pub const MATCH_DOMAIN_IDS: bool = false;
    pub const CRS: &str = "EPSG:4326";
}

/// Hint strings reused by typed accessors.
pub mod hints {
    pub const MUST_BE_INTEGER: &str = "Must be an integer!";
    pub const MUST_BE_BOOLEAN: &str = "Must be 'false' or 'true'!";
    pub const MUST_BE_JSON: &str = "Must be valid JSON!";
}
