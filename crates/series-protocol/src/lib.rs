//! Request parameter resolution for observation series.
//!
//! This crate turns a loosely-typed set of request parameters into a
//! validated, immutable [`Query`]: typed parameter access, type and platform
//! filter predicates, a merged spatial filter and the requested timespan.
//! It also defines the observation/value data model shared with the
//! assembly layer.
//!
//! # Example
//!
//! ```rust
//! use series_protocol::{ParameterStore, Query};
//!
//! let params = ParameterStore::from_pairs([
//!     ("timespan", "2024-01-01T00:00:00Z/2024-01-08T00:00:00Z"),
//!     ("expanded", "true"),
//!     ("bbox", "5,50,8,53"),
//! ]);
//! let query = Query::from_parameters(params).unwrap();
//!
//! assert!(query.is_expanded());
//! assert!(query.spatial_filter().is_some());
//! ```

pub mod crs;
pub mod defaults;
pub mod errors;
pub mod filter;
pub mod names;
pub mod parameters;
pub mod query;
pub mod spatial;
pub mod timespan;
pub mod types;

// Re-export commonly used types
pub use crs::CrsCode;
pub use defaults::{load_default_config, DefaultParameters};
pub use errors::{ExceptionReport, InvalidParameter, SeriesError};
pub use filter::FilterResolver;
pub use parameters::{ParameterStore, ParseErrorHandle};
pub use query::Query;
pub use spatial::{BoundingBox, Point, SpatialFilterResolver, Vicinity};
pub use timespan::Timespan;
pub use types::{Geometry, Observation, Payload, SeriesValue, ValidTime, ValueTime};
