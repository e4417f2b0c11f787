//! Command-line front end for observation series.
//!
//! Loads a YAML dataset catalog into memory and answers `data` and
//! `datasets` commands through the series assembly service.

pub mod catalog;
pub mod cli;
pub mod store;

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;

use series_assembly::{DatasetTypeRegistry, SeriesDataService};

/// Load a catalog file and build the service over it.
pub fn load_service(catalog_path: &Path) -> Result<SeriesDataService> {
    let store = Arc::new(catalog::Catalog::load(catalog_path)?.into_store()?);
    for (id, count) in store::observation_counts(&store) {
        tracing::debug!(dataset = id, observations = count, "Catalog dataset");
    }
    Ok(SeriesDataService::new(
        DatasetTypeRegistry::default(),
        store.clone(),
        store,
    ))
}
