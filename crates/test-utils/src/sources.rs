//! In-memory observation and descriptor sources.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};

use series_assembly::{DatasetDescriptor, DatasetDescriptorSource, ObservationSource};
use series_protocol::{Observation, Query, SeriesError};

/// A store holding datasets and their observations in memory.
///
/// Observations are filtered by the query's timespan on fetch; gaps (`None`)
/// inside the timespan are handed through. The last valid observation is
/// either set explicitly or derived from the stored observations.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    descriptors: BTreeMap<String, DatasetDescriptor>,
    observations: HashMap<String, Vec<Option<Observation>>>,
    last_valid: HashMap<String, Observation>,
    failing: BTreeSet<String>,
    fetches: AtomicUsize,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a dataset; its reference datasets become describable too.
    pub fn with_dataset(mut self, descriptor: DatasetDescriptor) -> Self {
        for reference in &descriptor.reference_datasets {
            self.descriptors
                .entry(reference.id.clone())
                .or_insert_with(|| reference.clone());
        }
        self.descriptors.insert(descriptor.id.clone(), descriptor);
        self
    }

    pub fn with_observations(self, dataset_id: &str, observations: Vec<Observation>) -> Self {
        self.with_gaps(dataset_id, observations.into_iter().map(Some).collect())
    }

    /// Store observations that may contain gaps.
    pub fn with_gaps(mut self, dataset_id: &str, observations: Vec<Option<Observation>>) -> Self {
        self.observations
            .entry(dataset_id.to_string())
            .or_default()
            .extend(observations);
        self
    }

    pub fn with_last_valid(mut self, dataset_id: &str, observation: Observation) -> Self {
        self.last_valid.insert(dataset_id.to_string(), observation);
        self
    }

    /// Make every read of `dataset_id` fail with a data access error.
    pub fn with_failure(mut self, dataset_id: &str) -> Self {
        self.failing.insert(dataset_id.to_string());
        self
    }

    /// Number of `fetch_observations` calls so far.
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    fn check(&self, dataset_id: &str) -> Result<(), SeriesError> {
        if self.failing.contains(dataset_id) {
            return Err(SeriesError::data_access(format!(
                "store unavailable for dataset {dataset_id}"
            )));
        }
        Ok(())
    }
}

impl ObservationSource for InMemoryStore {
    fn fetch_observations(
        &self,
        dataset_id: &str,
        query: &Query,
    ) -> Result<Vec<Option<Observation>>, SeriesError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.check(dataset_id)?;

        let timespan = query.timespan();
        Ok(self
            .observations
            .get(dataset_id)
            .map(|all| {
                all.iter()
                    .filter(|o| o.as_ref().map_or(true, |o| timespan.contains(o.time_end)))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    fn fetch_last_valid_observation(
        &self,
        dataset_id: &str,
    ) -> Result<Option<Observation>, SeriesError> {
        self.check(dataset_id)?;
        if let Some(last) = self.last_valid.get(dataset_id) {
            return Ok(Some(last.clone()));
        }
        Ok(self
            .observations
            .get(dataset_id)
            .and_then(|all| {
                all.iter()
                    .flatten()
                    .filter(|o| o.value.is_some())
                    .max_by_key(|o| o.time_end)
            })
            .cloned())
    }
}

impl DatasetDescriptorSource for InMemoryStore {
    fn describe(&self, dataset_id: &str) -> Result<DatasetDescriptor, SeriesError> {
        self.check(dataset_id)?;
        self.descriptors
            .get(dataset_id)
            .cloned()
            .ok_or_else(|| SeriesError::DatasetNotFound(dataset_id.to_string()))
    }

    fn list(&self) -> Result<Vec<DatasetDescriptor>, SeriesError> {
        Ok(self.descriptors.values().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{hour, query_for_day};
    use series_protocol::Payload;

    #[test]
    fn test_fetch_filters_by_timespan_and_keeps_gaps() {
        let store = InMemoryStore::new().with_gaps(
            "a",
            vec![
                Some(Observation::at(hour(1), Payload::numeric("1"))),
                None,
                Some(Observation::at(hour(30), Payload::numeric("2"))),
            ],
        );

        let fetched = store.fetch_observations("a", &query_for_day(&[])).unwrap();
        assert_eq!(fetched.len(), 2);
        assert!(fetched[1].is_none());
        assert_eq!(store.fetch_count(), 1);
    }

    #[test]
    fn test_last_valid_is_latest_with_value() {
        let store = InMemoryStore::new().with_observations(
            "a",
            vec![
                Observation::at(hour(1), Payload::numeric("1")),
                Observation::at(hour(2), None),
            ],
        );

        let last = store.fetch_last_valid_observation("a").unwrap().unwrap();
        assert_eq!(last.time_end, hour(1));
    }

    #[test]
    fn test_unknown_dataset_not_found() {
        let err = InMemoryStore::new().describe("nope").unwrap_err();
        assert_eq!(err.status_code(), 404);
    }

    #[test]
    fn test_failure_is_data_access_error() {
        let store = InMemoryStore::new().with_failure("a");
        let err = store.fetch_observations("a", &query_for_day(&[])).unwrap_err();
        assert!(matches!(err, SeriesError::DataAccessFailure(_)));
    }
}
