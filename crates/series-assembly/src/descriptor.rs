//! Dataset descriptors and no-data sentinels.

use std::collections::BTreeSet;
use std::str::FromStr;
use std::sync::Arc;

use rust_decimal::Decimal;

use series_protocol::{Geometry, Observation, Payload};

use crate::dataset_id::DEFAULT_DATASET_TYPE;

/// Values a service reserves to mean "missing".
#[derive(Debug, Clone, PartialEq)]
pub struct NoDataValues {
    literals: BTreeSet<String>,
    numbers: Vec<Decimal>,
}

impl Default for NoDataValues {
    fn default() -> Self {
        Self::new(["-9999", "-9999.0", "-999.99", "NaN"])
    }
}

impl NoDataValues {
    /// Build from sentinel literals; numeric literals also match numerically.
    pub fn new<I, S>(literals: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let literals: BTreeSet<String> = literals
            .into_iter()
            .map(|s| s.as_ref().trim().to_string())
            .collect();
        let numbers = literals
            .iter()
            .filter_map(|s| Decimal::from_str(s).ok())
            .collect();
        Self { literals, numbers }
    }

    /// No sentinels at all.
    pub fn none() -> Self {
        Self::new(std::iter::empty::<&str>())
    }

    pub fn literals(&self) -> impl Iterator<Item = &str> {
        self.literals.iter().map(String::as_str)
    }

    /// Check whether an observation carries a no-data value.
    ///
    /// A missing value and an empty text or record are always no-data.
    pub fn is_no_data(&self, observation: &Observation) -> bool {
        match &observation.value {
            None => true,
            Some(Payload::Numeric(n)) => self.numbers.contains(n),
            Some(Payload::Text(text)) => {
                let text = text.trim();
                text.is_empty() || self.literals.contains(text)
            }
            Some(Payload::Record(map)) => map.is_empty(),
        }
    }
}

/// Read-only description of a dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetDescriptor {
    /// Dataset id as used by the observation source.
    pub id: String,

    /// Dataset type tag ("measurement", "text", "record").
    pub dataset_type: String,

    /// Value type used by `valueTypes` filters ("quantity", "text", ...).
    pub value_type: String,

    /// Decimals numeric values are rounded to; `None` leaves them as stored.
    pub number_of_decimals: Option<u32>,

    /// No-data sentinels of the service providing this dataset.
    pub no_data: Arc<NoDataValues>,

    /// Mobile platform (moving sensor) rather than stationary.
    pub mobile: bool,

    /// In-situ platform rather than remote sensing.
    pub insitu: bool,

    /// Platform location, if known.
    pub geometry: Option<Geometry>,

    /// Whether the dataset may be delivered to clients.
    pub published: bool,

    /// Reference datasets (e.g. thresholds) rendered alongside this one.
    pub reference_datasets: Vec<DatasetDescriptor>,
}

impl DatasetDescriptor {
    /// A published, stationary, in-situ measurement dataset without references.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            dataset_type: DEFAULT_DATASET_TYPE.to_string(),
            value_type: "quantity".to_string(),
            number_of_decimals: None,
            no_data: Arc::new(NoDataValues::default()),
            mobile: false,
            insitu: true,
            geometry: None,
            published: true,
            reference_datasets: Vec::new(),
        }
    }

    /// Set the type tag; the value type follows the tag.
    pub fn with_type(mut self, dataset_type: impl Into<String>) -> Self {
        let dataset_type = dataset_type.into().to_lowercase();
        self.value_type = match dataset_type.as_str() {
            "measurement" | "quantity" => "quantity".to_string(),
            other => other.to_string(),
        };
        self.dataset_type = dataset_type;
        self
    }

    pub fn with_decimals(mut self, decimals: u32) -> Self {
        self.number_of_decimals = Some(decimals);
        self
    }

    pub fn with_no_data(mut self, no_data: Arc<NoDataValues>) -> Self {
        self.no_data = no_data;
        self
    }

    pub fn with_mobile(mut self, mobile: bool) -> Self {
        self.mobile = mobile;
        self
    }

    pub fn with_insitu(mut self, insitu: bool) -> Self {
        self.insitu = insitu;
        self
    }

    pub fn with_geometry(mut self, geometry: Geometry) -> Self {
        self.geometry = Some(geometry);
        self
    }

    pub fn with_published(mut self, published: bool) -> Self {
        self.published = published;
        self
    }

    pub fn with_reference(mut self, reference: DatasetDescriptor) -> Self {
        self.reference_datasets.push(reference);
        self
    }

    /// Check the service's no-data sentinels.
    pub fn is_no_data(&self, observation: &Observation) -> bool {
        self.no_data.is_no_data(observation)
    }

    /// Reference datasets that may be delivered.
    pub fn published_references(&self) -> impl Iterator<Item = &DatasetDescriptor> {
        self.reference_datasets.iter().filter(|r| r.published)
    }
}
