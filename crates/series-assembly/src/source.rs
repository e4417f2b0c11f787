//! Read interfaces to the persistence layer.
//!
//! Both traits are synchronous; calls block until the store answers. Retries,
//! timeouts and connection handling belong to the implementations.

use series_protocol::{Observation, Query, SeriesError};

use crate::descriptor::DatasetDescriptor;

/// Access to stored observations.
pub trait ObservationSource: Send + Sync {
    /// Observations of `dataset_id` within the query's timespan, ascending by time.
    ///
    /// Entries may be `None` where the store has a gap; assemblers skip them.
    fn fetch_observations(
        &self,
        dataset_id: &str,
        query: &Query,
    ) -> Result<Vec<Option<Observation>>, SeriesError>;

    /// The latest observation of `dataset_id` holding a valid value, regardless of any timespan.
    fn fetch_last_valid_observation(
        &self,
        dataset_id: &str,
    ) -> Result<Option<Observation>, SeriesError>;
}

/// Access to dataset metadata.
pub trait DatasetDescriptorSource: Send + Sync {
    /// Describe one dataset, including its reference datasets.
    fn describe(&self, dataset_id: &str) -> Result<DatasetDescriptor, SeriesError>;

    /// All datasets the source knows about.
    fn list(&self) -> Result<Vec<DatasetDescriptor>, SeriesError> {
        Ok(Vec::new())
    }
}
