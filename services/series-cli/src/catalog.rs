//! Dataset catalog loading and types.
//!
//! A catalog is a YAML document describing the datasets served by the CLI:
//!
//! ```yaml
//! no_data_values: ["-9999", "NaN"]
//! datasets:
//!   - id: level
//!     type: measurement
//!     decimals: 2
//!     geometry: { type: Point, coordinates: [7.63, 51.96] }
//!     references: [warn]
//!     observations:
//!       - { timestamp: "2024-01-15T01:00:00Z", value: 1.005 }
//!       - ~
//!       - { start: "2024-01-15T01:00:00Z", end: "2024-01-15T02:00:00Z", value: 1.2 }
//!   - id: warn
//!     last_valid: { timestamp: "2024-01-10T00:00:00Z", value: 3.5 }
//! ```
//!
//! `~` entries are store gaps.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use series_assembly::{DatasetDescriptor, NoDataValues};
use series_protocol::{Geometry, Observation, Payload};

use crate::store::CatalogStore;

/// Root of a catalog file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Catalog {
    /// Sentinels shared by all datasets; the built-in set when absent.
    #[serde(default)]
    pub no_data_values: Option<Vec<String>>,

    #[serde(default)]
    pub datasets: Vec<DatasetEntry>,
}

/// One dataset in the catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetEntry {
    pub id: String,

    #[serde(rename = "type", default = "default_dataset_type")]
    pub dataset_type: String,

    #[serde(default)]
    pub decimals: Option<u32>,

    #[serde(default)]
    pub mobile: bool,

    #[serde(default = "default_true")]
    pub insitu: bool,

    #[serde(default = "default_true")]
    pub published: bool,

    #[serde(default)]
    pub geometry: Option<Geometry>,

    /// Ids of reference datasets, resolved against this catalog.
    #[serde(default)]
    pub references: Vec<String>,

    #[serde(default)]
    pub last_valid: Option<ObservationEntry>,

    #[serde(default)]
    pub observations: Vec<Option<ObservationEntry>>,
}

fn default_dataset_type() -> String {
    series_assembly::dataset_id::DEFAULT_DATASET_TYPE.to_string()
}

fn default_true() -> bool {
    true
}

/// An observation; either `timestamp` or both `start` and `end` must be set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservationEntry {
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,

    #[serde(default)]
    pub start: Option<DateTime<Utc>>,

    #[serde(default)]
    pub end: Option<DateTime<Utc>>,

    #[serde(default)]
    pub value: serde_json::Value,

    #[serde(default)]
    pub geometry: Option<Geometry>,

    #[serde(default)]
    pub valid_time: Option<ValidTimeEntry>,

    #[serde(default)]
    pub parameters: BTreeMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidTimeEntry {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl ObservationEntry {
    fn to_observation(&self, dataset_id: &str) -> Result<Observation> {
        let value = Payload::from_json(&self.value);
        let mut observation = match (self.timestamp, self.start, self.end) {
            (Some(ts), None, None) => Observation::at(ts, value),
            (None, Some(start), Some(end)) if start <= end => {
                Observation::interval(start, end, value)
            }
            _ => bail!(
                "Observation of dataset '{}' needs either 'timestamp' or 'start' <= 'end'",
                dataset_id
            ),
        };

        if let Some(geometry) = &self.geometry {
            observation = observation.with_geometry(geometry.clone());
        }
        if let Some(valid) = &self.valid_time {
            observation = observation.with_valid_time(valid.start, valid.end);
        }
        observation.parameters = self.parameters.clone();
        Ok(observation)
    }
}

impl Catalog {
    /// Load a catalog from a YAML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read catalog: {:?}", path))?;
        let catalog = Self::from_yaml(&content)
            .with_context(|| format!("Failed to parse catalog: {:?}", path))?;

        tracing::info!(
            "Loaded {} datasets from catalog {:?}",
            catalog.datasets.len(),
            path
        );
        Ok(catalog)
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Build the in-memory store, resolving reference ids.
    pub fn into_store(self) -> Result<CatalogStore> {
        let no_data = Arc::new(match &self.no_data_values {
            Some(values) => NoDataValues::new(values),
            None => NoDataValues::default(),
        });

        let base: HashMap<&str, DatasetDescriptor> = self
            .datasets
            .iter()
            .map(|entry| (entry.id.as_str(), entry.base_descriptor(&no_data)))
            .collect();
        if base.len() != self.datasets.len() {
            bail!("Catalog contains duplicate dataset ids");
        }

        let mut store = CatalogStore::new();
        for entry in &self.datasets {
            let mut descriptor = base[entry.id.as_str()].clone();
            for reference in &entry.references {
                let Some(reference_descriptor) = base.get(reference.as_str()) else {
                    bail!(
                        "Dataset '{}' references unknown dataset '{}'",
                        entry.id,
                        reference
                    );
                };
                descriptor = descriptor.with_reference(reference_descriptor.clone());
            }

            let observations = entry
                .observations
                .iter()
                .map(|o| o.as_ref().map(|o| o.to_observation(&entry.id)).transpose())
                .collect::<Result<Vec<_>>>()?;
            let last_valid = entry
                .last_valid
                .as_ref()
                .map(|o| o.to_observation(&entry.id))
                .transpose()?;

            store.insert(descriptor, observations, last_valid);
        }
        Ok(store)
    }
}

impl DatasetEntry {
    fn base_descriptor(&self, no_data: &Arc<NoDataValues>) -> DatasetDescriptor {
        let mut descriptor = DatasetDescriptor::new(&self.id)
            .with_type(&self.dataset_type)
            .with_no_data(Arc::clone(no_data))
            .with_mobile(self.mobile)
            .with_insitu(self.insitu)
            .with_published(self.published);
        if let Some(decimals) = self.decimals {
            descriptor = descriptor.with_decimals(decimals);
        }
        if let Some(geometry) = &self.geometry {
            descriptor = descriptor.with_geometry(geometry.clone());
        }
        descriptor
    }
}
