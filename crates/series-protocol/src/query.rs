//! The resolved, immutable query handed to every assembly call.

use chrono::{DateTime, Utc};

use crate::crs::CrsCode;
use crate::errors::InvalidParameter;
use crate::filter::FilterResolver;
use crate::names::{self, defaults};
use crate::parameters::ParameterStore;
use crate::spatial::{BoundingBox, SpatialFilterResolver};
use crate::timespan::Timespan;

/// Snapshot of a request's parameters with everything pre-parsed.
///
/// Built once per request through [`Query::from_parameters`]; derivations
/// produce new values.
#[derive(Debug, Clone)]
pub struct Query {
    params: ParameterStore,
    timespan: Timespan,
    offset: i64,
    limit: i64,
    locale: String,
    output_timezone: String,
    format: String,
    time_format: Option<String>,
    width: i64,
    height: i64,
    expanded: bool,
    show_time_intervals: bool,
    show_vertical_intervals: bool,
    generalize: bool,
    base64: bool,
    grid: bool,
    legend: bool,
    force_xy: bool,
    match_domain_ids: bool,
    crs: CrsCode,
    href_base: Option<String>,
    filter: FilterResolver,
    spatial_filter: Option<BoundingBox>,
}

impl Query {
    /// Resolve a query; `now` in timespans is the current time.
    pub fn from_parameters(params: ParameterStore) -> Result<Self, InvalidParameter> {
        Self::from_parameters_at(params, Utc::now())
    }

    /// Resolve a query relative to a fixed `now`.
    pub fn from_parameters_at(
        params: ParameterStore,
        now: DateTime<Utc>,
    ) -> Result<Self, InvalidParameter> {
        let timespan = match params.get(names::TIMESPAN) {
            Some(raw) => Timespan::parse_at(&raw, now)?,
            None => Timespan::last_week(now),
        };
        let crs = match params.get(names::CRS) {
            Some(raw) => CrsCode::parse(&raw)?,
            None => CrsCode::default(),
        };

        let query = Self {
            timespan,
            offset: params.get_int(names::OFFSET, defaults::OFFSET)?,
            limit: params.get_int(names::LIMIT, defaults::LIMIT)?,
            locale: params.get_or(names::LOCALE, defaults::LOCALE),
            output_timezone: params.get_or(names::OUTPUT_TIMEZONE, defaults::OUTPUT_TIMEZONE),
            format: params.get_or(names::FORMAT, defaults::FORMAT),
            time_format: params.get(names::TIME_FORMAT),
            width: params.get_int(names::WIDTH, defaults::WIDTH)?,
            height: params.get_int(names::HEIGHT, defaults::HEIGHT)?,
            expanded: params.get_bool(names::EXPANDED, defaults::EXPANDED)?,
            show_time_intervals: params
                .get_bool(names::SHOW_TIME_INTERVALS, defaults::SHOW_TIME_INTERVALS)?,
            show_vertical_intervals: params
                .get_bool(names::SHOW_VERTICAL_INTERVALS, defaults::SHOW_VERTICAL_INTERVALS)?,
            generalize: params.get_bool(names::GENERALIZE, defaults::GENERALIZE)?,
            base64: params.get_bool(names::BASE_64, defaults::BASE_64)?,
            grid: params.get_bool(names::GRID, defaults::GRID)?,
            legend: params.get_bool(names::LEGEND, defaults::LEGEND)?,
            force_xy: params.get_bool(names::FORCE_XY, defaults::FORCE_XY)?,
            match_domain_ids: params.get_bool(names::MATCH_DOMAIN_IDS, defaults::MATCH_DOMAIN_IDS)?,
            crs,
            href_base: params.get(names::HREF_BASE),
            filter: FilterResolver::new(&params)?,
            spatial_filter: SpatialFilterResolver::resolve(&params)?,
            params,
        };

        tracing::debug!(
            start = %query.timespan.start,
            end = %query.timespan.end,
            expanded = query.expanded,
            "Resolved query"
        );
        Ok(query)
    }

    /// Same query over another window.
    pub fn with_timespan(&self, timespan: Timespan) -> Self {
        Self {
            timespan,
            ..self.clone()
        }
    }

    pub fn parameters(&self) -> &ParameterStore {
        &self.params
    }

    pub fn timespan(&self) -> &Timespan {
        &self.timespan
    }

    /// `(offset, limit)` when both are set to non-negative values.
    pub fn pagination(&self) -> Option<(usize, usize)> {
        let offset = usize::try_from(self.offset).ok()?;
        let limit = usize::try_from(self.limit).ok()?;
        Some((offset, limit))
    }

    pub fn locale(&self) -> &str {
        &self.locale
    }

    pub fn output_timezone(&self) -> &str {
        &self.output_timezone
    }

    pub fn format(&self) -> &str {
        &self.format
    }

    pub fn time_format(&self) -> Option<&str> {
        self.time_format.as_deref()
    }

    /// Chart dimensions as `(width, height)`.
    pub fn chart_size(&self) -> (i64, i64) {
        (self.width, self.height)
    }

    pub fn is_expanded(&self) -> bool {
        self.expanded
    }

    pub fn is_show_time_intervals(&self) -> bool {
        self.show_time_intervals
    }

    pub fn is_show_vertical_intervals(&self) -> bool {
        self.show_vertical_intervals
    }

    pub fn is_generalize(&self) -> bool {
        self.generalize
    }

    pub fn is_base64(&self) -> bool {
        self.base64
    }

    pub fn is_grid(&self) -> bool {
        self.grid
    }

    pub fn is_legend(&self) -> bool {
        self.legend
    }

    pub fn is_force_xy(&self) -> bool {
        self.force_xy
    }

    pub fn is_match_domain_ids(&self) -> bool {
        self.match_domain_ids
    }

    pub fn is_backwards_compatible(&self) -> bool {
        self.filter.shall_behave_backwards_compatible()
    }

    pub fn crs(&self) -> CrsCode {
        self.crs
    }

    pub fn href_base(&self) -> Option<&str> {
        self.href_base.as_deref()
    }

    pub fn filter(&self) -> &FilterResolver {
        &self.filter
    }

    pub fn spatial_filter(&self) -> Option<&BoundingBox> {
        self.spatial_filter.as_ref()
    }
}
