//! The series assembly contract shared by all dataset types.
//!
//! An assembler turns stored observations into client-facing
//! [`SeriesValue`]s. The only per-type behaviour is how a payload is
//! formatted ([`SeriesAssembler::format_payload`]); timestamp shape, no-data
//! masking and enrichment are common to all types:
//!
//! - `showTimeIntervals=true` emits `(start, end)`, otherwise only `end`
//! - a no-data observation yields a `null` value but keeps its timestamp
//! - `expanded=true` attaches geometry, valid time and parameters;
//!   otherwise mobile platforms still get their geometry
//! - `None` entries from the source are skipped

use std::collections::BTreeMap;

use serde::Serialize;

use series_protocol::{Observation, Payload, Query, SeriesError, SeriesValue, ValueTime};

use crate::descriptor::DatasetDescriptor;
use crate::reference::ReferenceExpander;
use crate::source::ObservationSource;

/// Primary series plus reference series keyed by reference dataset id.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesData {
    pub values: Vec<SeriesValue>,

    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub reference_values: BTreeMap<String, Vec<SeriesValue>>,
}

impl SeriesData {
    pub fn new(values: Vec<SeriesValue>) -> Self {
        Self {
            values,
            reference_values: BTreeMap::new(),
        }
    }

    /// Apply `(offset, limit)` to the primary values.
    pub fn paginate(mut self, pagination: Option<(usize, usize)>) -> Self {
        if let Some((offset, limit)) = pagination {
            self.values = self.values.into_iter().skip(offset).take(limit).collect();
        }
        self
    }
}

/// Assembles series values for one dataset type.
pub trait SeriesAssembler: Send + Sync {
    /// Type tag this assembler is registered under.
    fn dataset_type(&self) -> &'static str;

    /// Name of the stored entity type backing this dataset type.
    fn entity_type(&self) -> &'static str;

    /// Format a valid (non no-data) payload for output.
    fn format_payload(&self, payload: &Payload, descriptor: &DatasetDescriptor) -> Payload;

    /// Convert one observation into a value.
    fn create_value(
        &self,
        observation: &Observation,
        descriptor: &DatasetDescriptor,
        query: &Query,
    ) -> SeriesValue {
        let payload = if descriptor.is_no_data(observation) {
            None
        } else {
            observation
                .value
                .as_ref()
                .map(|p| self.format_payload(p, descriptor))
        };

        let time = if query.is_show_time_intervals() {
            ValueTime::Interval {
                timestart: observation.time_start,
                timeend: observation.time_end,
            }
        } else {
            ValueTime::Instant {
                timestamp: observation.time_end,
            }
        };

        let mut value = SeriesValue::new(time, payload);
        if query.is_expanded() {
            value.geometry = observation.geometry.clone();
            value.valid_time = observation.valid_time;
            value.parameters = observation.parameters.clone();
        } else if descriptor.mobile {
            value.geometry = observation.geometry.clone();
        }
        value
    }

    /// Convert already fetched observations, skipping gaps.
    fn assemble_observations(
        &self,
        observations: &[Option<Observation>],
        descriptor: &DatasetDescriptor,
        query: &Query,
    ) -> Vec<SeriesValue> {
        observations
            .iter()
            .flatten()
            .map(|observation| self.create_value(observation, descriptor, query))
            .collect()
    }

    /// Fetch and convert the observations of `descriptor` within the query's timespan.
    fn assemble(
        &self,
        descriptor: &DatasetDescriptor,
        query: &Query,
        source: &dyn ObservationSource,
    ) -> Result<Vec<SeriesValue>, SeriesError> {
        let observations = source.fetch_observations(&descriptor.id, query)?;
        Ok(self.assemble_observations(&observations, descriptor, query))
    }

    /// Assemble the primary series and every published reference series.
    ///
    /// Sparse reference series are filled up to the timespan bounds by the
    /// [`ReferenceExpander`].
    fn assemble_with_references(
        &self,
        descriptor: &DatasetDescriptor,
        query: &Query,
        source: &dyn ObservationSource,
    ) -> Result<SeriesData, SeriesError> {
        let mut data = SeriesData::new(self.assemble(descriptor, query, source)?);

        let expander = ReferenceExpander::new(source);
        for reference in descriptor.published_references() {
            let values = expander.assemble_reference(self, reference, query)?;
            data.reference_values.insert(reference.id.clone(), values);
        }
        Ok(data)
    }
}
