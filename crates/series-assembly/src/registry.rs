//! Dispatch from dataset type tag to assembler.

use std::collections::BTreeMap;
use std::sync::Arc;

use series_protocol::SeriesError;

use crate::assembler::SeriesAssembler;
use crate::dataset_id::DatasetId;
use crate::measurement::MeasurementAssembler;
use crate::record::RecordAssembler;
use crate::text::TextAssembler;

/// Static mapping from type tag to assembler.
///
/// Built once at startup and shared read-only across requests.
///
/// # Example
///
/// ```rust
/// use series_assembly::DatasetTypeRegistry;
///
/// let registry = DatasetTypeRegistry::default();
/// assert_eq!(registry.resolve("text").unwrap().entity_type(), "TextObservation");
/// assert!(registry.resolve("profile").is_err());
/// ```
#[derive(Clone)]
pub struct DatasetTypeRegistry {
    assemblers: BTreeMap<String, Arc<dyn SeriesAssembler>>,
}

impl Default for DatasetTypeRegistry {
    /// Measurement (also under the `quantity` alias), text and record.
    fn default() -> Self {
        let measurement: Arc<dyn SeriesAssembler> = Arc::new(MeasurementAssembler);
        Self::empty()
            .with_assembler_as("quantity", measurement.clone())
            .with_assembler(measurement)
            .with_assembler(Arc::new(TextAssembler))
            .with_assembler(Arc::new(RecordAssembler))
    }
}

impl DatasetTypeRegistry {
    /// Registry without any assembler.
    pub fn empty() -> Self {
        Self {
            assemblers: BTreeMap::new(),
        }
    }

    /// Register under the assembler's own type tag.
    pub fn with_assembler(self, assembler: Arc<dyn SeriesAssembler>) -> Self {
        let tag = assembler.dataset_type();
        self.with_assembler_as(tag, assembler)
    }

    /// Register under an explicit tag.
    pub fn with_assembler_as(mut self, tag: &str, assembler: Arc<dyn SeriesAssembler>) -> Self {
        self.assemblers.insert(tag.to_lowercase(), assembler);
        self
    }

    /// Find the assembler for a type tag.
    pub fn resolve(&self, dataset_type: &str) -> Result<Arc<dyn SeriesAssembler>, SeriesError> {
        self.assemblers
            .get(&dataset_type.trim().to_lowercase())
            .cloned()
            .ok_or_else(|| SeriesError::UnknownDatasetType(dataset_type.to_string()))
    }

    /// Find the assembler for a typed dataset id such as `text_7`.
    pub fn resolve_for_id(&self, dataset_id: &str) -> Result<Arc<dyn SeriesAssembler>, SeriesError> {
        self.resolve(&DatasetId::parse(dataset_id).dataset_type)
    }

    /// Stored entity type behind a tag.
    pub fn entity_type(&self, dataset_type: &str) -> Result<&'static str, SeriesError> {
        self.resolve(dataset_type).map(|a| a.entity_type())
    }

    pub fn is_known(&self, dataset_type: &str) -> bool {
        self.assemblers.contains_key(&dataset_type.trim().to_lowercase())
    }

    /// Registered tags in ascending order.
    pub fn dataset_types(&self) -> impl Iterator<Item = &str> {
        self.assemblers.keys().map(String::as_str)
    }
}
