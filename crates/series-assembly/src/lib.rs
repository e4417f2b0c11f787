//! Time series assembly for observation datasets.
//!
//! Given a [`DatasetDescriptor`], a resolved [`Query`](series_protocol::Query)
//! and an [`ObservationSource`], the assembler registered for the dataset's
//! type produces the client-facing value sequence. Reference series attached
//! to a dataset are gap-filled by the [`ReferenceExpander`] when they hold
//! fewer than two observations inside the requested timespan.
//!
//! # Example
//!
//! ```rust,ignore
//! use series_assembly::{DatasetTypeRegistry, SeriesDataService};
//!
//! let service = SeriesDataService::new(DatasetTypeRegistry::default(), descriptors, observations);
//! let data = service.get_data("measurement_42", &query)?;
//! println!("{}", serde_json::to_string(&data)?);
//! ```

pub mod assembler;
pub mod dataset_id;
pub mod descriptor;
pub mod measurement;
pub mod record;
pub mod reference;
pub mod registry;
pub mod service;
pub mod source;
pub mod text;

pub use assembler::{SeriesAssembler, SeriesData};
pub use dataset_id::{extract_id, extract_type, DatasetId};
pub use descriptor::{DatasetDescriptor, NoDataValues};
pub use measurement::MeasurementAssembler;
pub use record::RecordAssembler;
pub use reference::ReferenceExpander;
pub use registry::DatasetTypeRegistry;
pub use service::SeriesDataService;
pub use source::{DatasetDescriptorSource, ObservationSource};
pub use text::TextAssembler;
