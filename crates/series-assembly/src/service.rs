//! Entry point tying descriptor lookup, type dispatch and assembly together.

use std::sync::Arc;

use tracing::{debug, info};

use series_protocol::spatial::Point;
use series_protocol::{FilterResolver, Geometry, Query, SeriesError};

use crate::assembler::SeriesData;
use crate::dataset_id::DatasetId;
use crate::descriptor::DatasetDescriptor;
use crate::registry::DatasetTypeRegistry;
use crate::source::{DatasetDescriptorSource, ObservationSource};

/// Serves series data for datasets known to a descriptor source.
#[derive(Clone)]
pub struct SeriesDataService {
    registry: DatasetTypeRegistry,
    descriptors: Arc<dyn DatasetDescriptorSource>,
    observations: Arc<dyn ObservationSource>,
}

impl SeriesDataService {
    pub fn new(
        registry: DatasetTypeRegistry,
        descriptors: Arc<dyn DatasetDescriptorSource>,
        observations: Arc<dyn ObservationSource>,
    ) -> Self {
        Self {
            registry,
            descriptors,
            observations,
        }
    }

    pub fn registry(&self) -> &DatasetTypeRegistry {
        &self.registry
    }

    /// Assemble the series of one dataset.
    ///
    /// `dataset_id` may carry its type tag (`measurement_42`). Reference series
    /// are only included for expanded queries. Unpublished datasets are
    /// reported as not found.
    pub fn get_data(&self, dataset_id: &str, query: &Query) -> Result<SeriesData, SeriesError> {
        let descriptor = self.describe(dataset_id)?;
        if !descriptor.published {
            return Err(SeriesError::DatasetNotFound(dataset_id.to_string()));
        }
        let assembler = self.registry.resolve(&descriptor.dataset_type)?;

        let data = if query.is_expanded() {
            assembler.assemble_with_references(&descriptor, query, self.observations.as_ref())?
        } else {
            SeriesData::new(assembler.assemble(&descriptor, query, self.observations.as_ref())?)
        };

        info!(
            dataset = %dataset_id,
            dataset_type = assembler.dataset_type(),
            values = data.values.len(),
            references = data.reference_values.len(),
            "Assembled series"
        );
        Ok(data.paginate(query.pagination()))
    }

    /// Describe a plain or typed id.
    ///
    /// A typed id falls back to its raw id when no dataset carries the full id;
    /// its tag must then dispatch to the same assembler as the dataset's type.
    fn describe(&self, dataset_id: &str) -> Result<DatasetDescriptor, SeriesError> {
        match self.descriptors.describe(dataset_id) {
            Err(SeriesError::DatasetNotFound(_)) if DatasetId::has_type_prefix(dataset_id) => {
                let typed = DatasetId::parse(dataset_id);
                let descriptor = self.descriptors.describe(&typed.raw_id)?;
                let requested = self.registry.resolve_for_id(dataset_id)?;
                let actual = self.registry.resolve(&descriptor.dataset_type)?;
                if requested.dataset_type() != actual.dataset_type() {
                    debug!(%typed, actual = %descriptor.dataset_type, "Type tag does not match dataset");
                    return Err(SeriesError::DatasetNotFound(dataset_id.to_string()));
                }
                Ok(descriptor)
            }
            described => described,
        }
    }

    /// Published datasets matching the query's type, platform and spatial filters.
    pub fn find_datasets(&self, query: &Query) -> Result<Vec<DatasetDescriptor>, SeriesError> {
        let filter = query.filter();
        let found: Vec<DatasetDescriptor> = self
            .descriptors
            .list()?
            .into_iter()
            .filter(|d| d.published && self.registry.is_known(&d.dataset_type))
            .filter(|d| matches_types(filter, d))
            .filter(|d| matches_platform(filter, d))
            .filter(|d| matches_geometry(query, d))
            .collect();

        debug!(matches = found.len(), "Filtered datasets");
        Ok(found)
    }
}

fn matches_types(filter: &FilterResolver, descriptor: &DatasetDescriptor) -> bool {
    filter.shall_include_all_dataset_types()
        || filter.shall_include_dataset_type(&descriptor.dataset_type)
        || filter.shall_include_observation_type(&descriptor.dataset_type)
        || filter.shall_include_value_type(&descriptor.value_type)
}

fn matches_platform(filter: &FilterResolver, descriptor: &DatasetDescriptor) -> bool {
    let flags = filter.mobile_filter().map_or(true, |m| m == descriptor.mobile)
        && filter.insitu_filter().map_or(true, |i| i == descriptor.insitu);

    let mobility = if descriptor.mobile {
        filter.shall_include_mobile_platform_types()
    } else {
        filter.shall_include_stationary_platform_types()
    };
    let sensing = if descriptor.insitu {
        filter.shall_include_insitu_platform_types()
    } else {
        filter.shall_include_remote_platform_types()
    };
    flags && mobility && sensing
}

fn matches_geometry(query: &Query, descriptor: &DatasetDescriptor) -> bool {
    let Some(geometry) = &descriptor.geometry else {
        return query.spatial_filter().is_none();
    };
    if !query.filter().shall_include_geometry_type(geometry.type_name()) {
        return false;
    }
    let Some(bbox) = query.spatial_filter() else {
        return true;
    };
    match geometry {
        Geometry::Point { coordinates } => {
            bbox.contains(&Point::new(coordinates[0], coordinates[1]))
        }
        Geometry::LineString { coordinates } => coordinates
            .iter()
            .any(|c| bbox.contains(&Point::new(c[0], c[1]))),
    }
}
