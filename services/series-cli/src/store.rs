//! In-memory store backing the CLI, filled from a catalog.

use std::collections::{BTreeMap, HashMap};

use series_assembly::{DatasetDescriptor, DatasetDescriptorSource, ObservationSource};
use series_protocol::{Observation, Query, SeriesError};

#[derive(Debug)]
struct StoredDataset {
    descriptor: DatasetDescriptor,
    observations: Vec<Option<Observation>>,
    last_valid: Option<Observation>,
}

/// Datasets and observations held in memory.
#[derive(Debug, Default)]
pub struct CatalogStore {
    datasets: BTreeMap<String, StoredDataset>,
}

impl CatalogStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a dataset with its observations.
    pub fn insert(
        &mut self,
        descriptor: DatasetDescriptor,
        observations: Vec<Option<Observation>>,
        last_valid: Option<Observation>,
    ) {
        self.datasets.insert(
            descriptor.id.clone(),
            StoredDataset {
                descriptor,
                observations,
                last_valid,
            },
        );
    }

    pub fn len(&self) -> usize {
        self.datasets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.datasets.is_empty()
    }

    fn dataset(&self, dataset_id: &str) -> Result<&StoredDataset, SeriesError> {
        self.datasets
            .get(dataset_id)
            .ok_or_else(|| SeriesError::DatasetNotFound(dataset_id.to_string()))
    }
}

impl ObservationSource for CatalogStore {
    fn fetch_observations(
        &self,
        dataset_id: &str,
        query: &Query,
    ) -> Result<Vec<Option<Observation>>, SeriesError> {
        let timespan = query.timespan();
        let mut observations: Vec<Option<Observation>> = self
            .dataset(dataset_id)?
            .observations
            .iter()
            .filter(|o| o.as_ref().map_or(true, |o| timespan.contains(o.time_end)))
            .cloned()
            .collect();

        // Catalog files are not required to be sorted; gaps stay in place.
        let mut present: Vec<Observation> = observations.iter().flatten().cloned().collect();
        present.sort_by_key(|o| o.time_end);
        let mut sorted = present.into_iter();
        for slot in observations.iter_mut().filter(|o| o.is_some()) {
            *slot = sorted.next();
        }
        Ok(observations)
    }

    fn fetch_last_valid_observation(
        &self,
        dataset_id: &str,
    ) -> Result<Option<Observation>, SeriesError> {
        let dataset = self.dataset(dataset_id)?;
        if dataset.last_valid.is_some() {
            return Ok(dataset.last_valid.clone());
        }
        Ok(dataset
            .observations
            .iter()
            .flatten()
            .filter(|o| o.value.is_some())
            .max_by_key(|o| o.time_end)
            .cloned())
    }
}

impl DatasetDescriptorSource for CatalogStore {
    fn describe(&self, dataset_id: &str) -> Result<DatasetDescriptor, SeriesError> {
        Ok(self.dataset(dataset_id)?.descriptor.clone())
    }

    fn list(&self) -> Result<Vec<DatasetDescriptor>, SeriesError> {
        Ok(self
            .datasets
            .values()
            .map(|d| d.descriptor.clone())
            .collect())
    }
}

/// Count observations per dataset, for startup logging.
pub fn observation_counts(store: &CatalogStore) -> HashMap<&str, usize> {
    store
        .datasets
        .iter()
        .map(|(id, d)| (id.as_str(), d.observations.iter().flatten().count()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use series_protocol::{ParameterStore, Payload};

    fn query() -> Query {
        Query::from_parameters(ParameterStore::from_pairs([(
            "timespan",
            "2024-01-15T00:00:00Z/2024-01-16T00:00:00Z",
        )]))
        .unwrap()
    }

    fn at(h: u32) -> Observation {
        Observation::at(Utc.with_ymd_and_hms(2024, 1, 15, h, 0, 0).unwrap(), Payload::numeric("1"))
    }

    #[test]
    fn test_fetch_sorts_but_keeps_gap_positions() {
        let mut store = CatalogStore::new();
        store.insert(
            DatasetDescriptor::new("a"),
            vec![Some(at(5)), None, Some(at(2))],
            None,
        );

        let fetched = store.fetch_observations("a", &query()).unwrap();
        assert_eq!(fetched[0].as_ref().unwrap().time_end.format("%H").to_string(), "02");
        assert!(fetched[1].is_none());
        assert_eq!(fetched[2].as_ref().unwrap().time_end.format("%H").to_string(), "05");
    }

    #[test]
    fn test_explicit_last_valid_wins() {
        let mut store = CatalogStore::new();
        store.insert(DatasetDescriptor::new("a"), vec![Some(at(5))], Some(at(1)));

        let last = store.fetch_last_valid_observation("a").unwrap().unwrap();
        assert_eq!(last, at(1));
    }

    #[test]
    fn test_unknown_dataset() {
        let store = CatalogStore::new();
        assert!(matches!(
            store.describe("x"),
            Err(SeriesError::DatasetNotFound(_))
        ));
        assert!(store.fetch_observations("x", &query()).is_err());
    }

    #[test]
    fn test_observation_counts() {
        let mut store = CatalogStore::new();
        store.insert(DatasetDescriptor::new("a"), vec![Some(at(1)), None], None);
        assert_eq!(observation_counts(&store)["a"], 1);
        assert_eq!(store.len(), 1);
    }
}
