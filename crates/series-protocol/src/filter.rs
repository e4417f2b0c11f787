//! Inclusion predicates derived from request parameters.
//!
//! A [`FilterResolver`] reads its type sets and platform flags once when built
//! and then answers predicates without touching the parameter store again.
//! Every type set accepts `all` as a wildcard.

use std::collections::BTreeSet;

use crate::errors::InvalidParameter;
use crate::names::{self, ALL};
use crate::parameters::ParameterStore;

pub const PLATFORM_TYPE_STATIONARY: &str = "stationary";
pub const PLATFORM_TYPE_MOBILE: &str = "mobile";
pub const PLATFORM_TYPE_INSITU: &str = "insitu";
pub const PLATFORM_TYPE_REMOTE: &str = "remote";

/// Resolved filter sets and flags for one request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterResolver {
    dataset_types: BTreeSet<String>,
    observation_types: BTreeSet<String>,
    value_types: BTreeSet<String>,
    platform_types: BTreeSet<String>,
    platform_geometries: BTreeSet<String>,
    observed_geometries: BTreeSet<String>,
    geometry_types: BTreeSet<String>,
    mobile: Option<bool>,
    insitu: Option<bool>,
}

impl FilterResolver {
    /// Resolve filters from a parameter store.
    pub fn new(params: &ParameterStore) -> Result<Self, InvalidParameter> {
        Ok(Self {
            dataset_types: params.get_csv_set(names::DATASET_TYPES),
            observation_types: params.get_csv_set(names::OBSERVATION_TYPES),
            value_types: params.get_csv_set(names::VALUE_TYPES),
            platform_types: params.get_csv_set(names::PLATFORM_TYPES),
            platform_geometries: params.get_csv_set(names::PLATFORM_GEOMETRIES),
            observed_geometries: params.get_csv_set(names::OBSERVED_GEOMETRIES),
            geometry_types: params.get_csv_set(names::GEOMETRY_TYPES),
            mobile: params.get_optional_bool(names::FILTER_MOBILE)?,
            insitu: params.get_optional_bool(names::FILTER_INSITU)?,
        })
    }

    // ------------------------------------------------------------------
    // dataset, observation and value types
    // ------------------------------------------------------------------

    pub fn shall_include_all_dataset_types(&self) -> bool {
        let unfiltered = self.dataset_types.is_empty()
            && self.observation_types.is_empty()
            && self.value_types.is_empty();
        unfiltered || self.dataset_types.contains(ALL)
    }

    pub fn shall_include_dataset_type(&self, dataset_type: &str) -> bool {
        includes(&self.dataset_types, dataset_type)
    }

    pub fn shall_include_observation_type(&self, observation_type: &str) -> bool {
        includes(&self.observation_types, observation_type)
    }

    pub fn shall_include_value_type(&self, value_type: &str) -> bool {
        includes(&self.value_types, value_type)
    }

    /// True when the geometry type set is empty or admits `geometry_type`.
    pub fn shall_include_geometry_type(&self, geometry_type: &str) -> bool {
        self.geometry_types.is_empty() || includes(&self.geometry_types, geometry_type)
    }

    // ------------------------------------------------------------------
    // explicit mobile / insitu flags
    // ------------------------------------------------------------------

    pub fn is_mobile_filter(&self) -> bool {
        self.mobile.unwrap_or(false)
    }

    pub fn is_insitu_filter(&self) -> bool {
        self.insitu.unwrap_or(false)
    }

    /// The `mobile` flag as given, `None` when absent.
    pub fn mobile_filter(&self) -> Option<bool> {
        self.mobile
    }

    /// The `insitu` flag as given, `None` when absent.
    pub fn insitu_filter(&self) -> Option<bool> {
        self.insitu
    }

    /// True iff neither the mobile nor the insitu flag was given.
    pub fn shall_include_all_datasets(&self) -> bool {
        self.mobile.is_none() && self.insitu.is_none()
    }

    // ------------------------------------------------------------------
    // platform types
    // ------------------------------------------------------------------

    pub fn is_set_platform_type_filter(&self) -> bool {
        !self.platform_types.is_empty()
    }

    pub fn shall_include_all_platform_types(&self) -> bool {
        !self.is_set_platform_type_filter() || self.platform_types.contains(ALL)
    }

    pub fn is_set_stationary_filter(&self) -> bool {
        includes(&self.platform_types, PLATFORM_TYPE_STATIONARY)
    }

    pub fn is_set_mobile_filter(&self) -> bool {
        includes(&self.platform_types, PLATFORM_TYPE_MOBILE)
    }

    pub fn is_set_insitu_filter(&self) -> bool {
        includes(&self.platform_types, PLATFORM_TYPE_INSITU)
    }

    pub fn is_set_remote_filter(&self) -> bool {
        includes(&self.platform_types, PLATFORM_TYPE_REMOTE)
    }

    pub fn shall_include_mobile_platform_types(&self) -> bool {
        self.shall_include_all_platform_types()
            || self.is_set_mobile_filter()
            || !self.is_set_stationary_filter()
    }

    pub fn shall_include_stationary_platform_types(&self) -> bool {
        self.shall_include_all_platform_types()
            || self.is_set_stationary_filter()
            || !self.is_set_mobile_filter()
    }

    pub fn shall_include_insitu_platform_types(&self) -> bool {
        self.shall_include_all_platform_types()
            || self.is_set_insitu_filter()
            || !self.is_set_remote_filter()
    }

    pub fn shall_include_remote_platform_types(&self) -> bool {
        self.shall_include_all_platform_types()
            || self.is_set_remote_filter()
            || !self.is_set_insitu_filter()
    }

    // ------------------------------------------------------------------
    // platform and observed geometries
    // ------------------------------------------------------------------

    fn shall_include_all_platform_geometries(&self) -> bool {
        self.platform_geometries.is_empty() || self.platform_geometries.contains(ALL)
    }

    fn shall_include_all_observed_geometries(&self) -> bool {
        self.observed_geometries.is_empty() || self.observed_geometries.contains(ALL)
    }

    fn is_set_static_filter(&self) -> bool {
        includes(&self.observed_geometries, "static")
    }

    fn is_set_dynamic_filter(&self) -> bool {
        includes(&self.observed_geometries, "dynamic")
    }

    pub fn shall_include_platform_geometries_site(&self) -> bool {
        let unfiltered = self.shall_include_all_platform_geometries()
            && self.shall_include_all_platform_types()
            && self.observed_geometries.is_empty()
            && !self.is_set_mobile_filter()
            && !self.is_set_remote_filter();
        unfiltered
            || self.is_set_stationary_filter()
            || self.is_set_insitu_filter()
            || self.platform_geometries.contains("site")
    }

    pub fn shall_include_platform_geometries_track(&self) -> bool {
        let unfiltered = self.shall_include_all_platform_geometries()
            && self.shall_include_all_platform_types()
            && self.observed_geometries.is_empty()
            && !self.is_set_stationary_filter()
            && !self.is_set_remote_filter();
        unfiltered
            || self.is_set_mobile_filter()
            || self.is_set_insitu_filter()
            || self.platform_geometries.contains("track")
    }

    pub fn shall_include_observed_geometries_static(&self) -> bool {
        (self.shall_include_all_observed_geometries() && self.shall_include_all_platform_types())
            || self.is_set_static_filter()
            || (!self.is_set_dynamic_filter() && !self.is_set_insitu_filter())
    }

    pub fn shall_include_observed_geometries_dynamic(&self) -> bool {
        (self.shall_include_all_observed_geometries() && self.shall_include_all_platform_types())
            || self.is_set_dynamic_filter()
            || (!self.is_set_static_filter() && !self.is_set_insitu_filter())
    }

    /// True when neither platform type nor value/dataset type filters are set.
    pub fn shall_behave_backwards_compatible(&self) -> bool {
        !(self.is_set_platform_type_filter()
            || !self.value_types.is_empty()
            || !self.dataset_types.is_empty())
    }
}

fn includes(set: &BTreeSet<String>, tag: &str) -> bool {
    set.contains(&tag.to_lowercase()) || set.contains(ALL)
}
