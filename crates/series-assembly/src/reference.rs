//! Gap filling for sparse reference series.
//!
//! A reference series (e.g. a threshold line) with fewer than two
//! observations inside the requested timespan cannot be drawn across the
//! time axis. The expander then emits two synthetic values stamped at the
//! timespan start and end:
//!
//! | observations in timespan | result                                  |
//! |--------------------------|-----------------------------------------|
//! | 0                        | last valid value at start and end       |
//! | 1                        | that value at start and end             |
//! | 2 or more                | the observations, assembled as usual    |
//!
//! The trigger counts the raw, non-null observations of a single fetch.

use tracing::debug;

use series_protocol::{Observation, Query, SeriesError, SeriesValue};

use crate::assembler::SeriesAssembler;
use crate::descriptor::DatasetDescriptor;
use crate::source::ObservationSource;

/// Fills sparse reference series up to the timespan bounds.
pub struct ReferenceExpander<'a> {
    source: &'a dyn ObservationSource,
}

impl<'a> ReferenceExpander<'a> {
    pub fn new(source: &'a dyn ObservationSource) -> Self {
        Self { source }
    }

    /// Assemble one reference series, expanding it when it is too sparse.
    pub fn assemble_reference<A>(
        &self,
        assembler: &A,
        reference: &DatasetDescriptor,
        query: &Query,
    ) -> Result<Vec<SeriesValue>, SeriesError>
    where
        A: SeriesAssembler + ?Sized,
    {
        let observations = self.source.fetch_observations(&reference.id, query)?;
        let present: Vec<&Observation> = observations.iter().flatten().collect();

        let anchor = match present.as_slice() {
            [] => match self.source.fetch_last_valid_observation(&reference.id)? {
                Some(last) => last,
                None => {
                    debug!(
                        reference = %reference.id,
                        "No observations and no last valid value for reference series"
                    );
                    return Ok(Vec::new());
                }
            },
            [single] => (*single).clone(),
            _ => return Ok(assembler.assemble_observations(&observations, reference, query)),
        };

        debug!(
            reference = %reference.id,
            observations = present.len(),
            "Expanding reference series to timespan bounds"
        );
        Ok(self.boundary_values(assembler, &anchor, reference, query))
    }

    fn boundary_values<A>(
        &self,
        assembler: &A,
        anchor: &Observation,
        reference: &DatasetDescriptor,
        query: &Query,
    ) -> Vec<SeriesValue>
    where
        A: SeriesAssembler + ?Sized,
    {
        let timespan = query.timespan();
        [timespan.start_utc(), timespan.end_utc()]
            .into_iter()
            .map(|ts| assembler.create_value(&anchor.restamped(ts), reference, query))
            .collect()
    }
}
