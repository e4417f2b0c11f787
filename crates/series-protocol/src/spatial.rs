//! Spatial filter: bounding boxes, vicinities and their union.
//!
//! # Parameters
//!
//! - `bbox`: either `minx,miny,maxx,maxy` or
//!   `{"ll":{"type":"Point","coordinates":[x,y]},"ur":{...}}`
//! - `near`: either `lon,lat,radiusKm` or
//!   `{"center":{"type":"Point","coordinates":[x,y]},"radius":r}`
//! - `crs`: CRS of the `near` center; defaults to EPSG:4326
//!
//! When both `bbox` and `near` are given, the resolved filter is the union of
//! both rectangles.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::crs::CrsCode;
use crate::errors::InvalidParameter;
use crate::names;
use crate::parameters::ParameterStore;
use crate::types::Geometry;

static BBOX_LITERAL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*([+-]?\d*\.?\d*\s*,\s*){3}[+-]?\d*\.?\d*\s*$").expect("valid bbox pattern")
});

static NEAR_LITERAL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*([+-]?\d*\.?\d*\s*,\s*){2}[+-]?\d*\.?\d*\s*$").expect("valid near pattern")
});

/// A 2D coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    fn from_geometry(geometry: &Geometry, parameter: &str) -> Result<Self, InvalidParameter> {
        match geometry {
            Geometry::Point { coordinates } => Ok(Point::new(coordinates[0], coordinates[1])),
            _ => Err(InvalidParameter::new(
                parameter,
                "Expected a GeoJSON geometry of type 'Point'.",
            )),
        }
    }
}

/// A rectangle given by its lower-left and upper-right corners.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub lower_left: Point,
    pub upper_right: Point,
    pub crs: CrsCode,
}

impl BoundingBox {
    pub fn new(lower_left: Point, upper_right: Point, crs: CrsCode) -> Self {
        Self {
            lower_left,
            upper_right,
            crs,
        }
    }

    /// Create a box from corner coordinates, swapping so min <= max.
    pub fn from_corners(x1: f64, y1: f64, x2: f64, y2: f64, crs: CrsCode) -> Self {
        Self::new(
            Point::new(x1.min(x2), y1.min(y2)),
            Point::new(x1.max(x2), y1.max(y2)),
            crs,
        )
    }

    /// Parse a `minx,miny,maxx,maxy` literal; `None` if `s` is not of that shape.
    pub fn parse_literal(s: &str) -> Option<Result<Self, InvalidParameter>> {
        if !BBOX_LITERAL.is_match(s) {
            return None;
        }
        Some(parse_numbers(s, names::BBOX).map(|n| {
            Self::from_corners(n[0], n[1], n[2], n[3], CrsCode::default())
        }))
    }

    /// Width of the bounding box in coordinate units.
    pub fn width(&self) -> f64 {
        self.upper_right.x - self.lower_left.x
    }

    /// Height of the bounding box in coordinate units.
    pub fn height(&self) -> f64 {
        self.upper_right.y - self.lower_left.y
    }

    /// Check if a point is contained within this box (edges inclusive).
    pub fn contains(&self, point: &Point) -> bool {
        point.x >= self.lower_left.x
            && point.x <= self.upper_right.x
            && point.y >= self.lower_left.y
            && point.y <= self.upper_right.y
    }

    /// Smallest box containing this box and `point`; the CRS is kept.
    pub fn extended_by(self, point: Point) -> Self {
        if self.contains(&point) {
            return self;
        }
        Self {
            lower_left: Point::new(self.lower_left.x.min(point.x), self.lower_left.y.min(point.y)),
            upper_right: Point::new(
                self.upper_right.x.max(point.x),
                self.upper_right.y.max(point.y),
            ),
            crs: self.crs,
        }
    }

    /// Smallest box containing both boxes.
    pub fn union(self, other: &BoundingBox) -> Self {
        self.extended_by(other.lower_left)
            .extended_by(other.upper_right)
    }
}

#[derive(Debug, Deserialize)]
struct BboxJson {
    ll: Geometry,
    ur: Geometry,
}

/// A circular filter: center plus radius in kilometers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vicinity {
    pub center: Point,
    pub radius_km: f64,
    pub crs: CrsCode,
}

#[derive(Debug, Deserialize)]
struct VicinityJson {
    center: Geometry,
    radius: f64,
}

impl Vicinity {
    /// Mean earth radius in kilometers.
    pub const EARTH_MEAN_RADIUS_KM: f64 = 6371.0;

    pub fn new(center: Point, radius_km: f64) -> Self {
        Self {
            center,
            radius_km,
            crs: CrsCode::default(),
        }
    }

    /// Parse a `lon,lat,radiusKm` literal; `None` if `s` is not of that shape.
    pub fn parse_literal(s: &str) -> Option<Result<Self, InvalidParameter>> {
        if !NEAR_LITERAL.is_match(s) {
            return None;
        }
        Some(parse_numbers(s, names::NEAR).and_then(|n| {
            if n[2] < 0.0 {
                return Err(InvalidParameter::new(names::NEAR, "Radius must not be negative."));
            }
            Ok(Self::new(Point::new(n[0], n[1]), n[2]))
        }))
    }

    /// Express the center in another CRS, transforming it to WGS84.
    pub fn in_crs(self, crs: CrsCode) -> Self {
        let (x, y) = crs.to_wgs84(self.center.x, self.center.y);
        Self {
            center: Point::new(x, y),
            radius_km: self.radius_km,
            crs: CrsCode::default(),
        }
    }

    /// Latitude span of the radius, in degrees.
    pub fn latitude_delta(&self) -> f64 {
        (self.radius_km / Self::EARTH_MEAN_RADIUS_KM).to_degrees() % 180.0
    }

    /// Longitude span of the radius at the center latitude, in degrees.
    pub fn longitude_delta(&self) -> f64 {
        let circle_radius = Self::EARTH_MEAN_RADIUS_KM * self.center.y.to_radians().cos();
        (self.radius_km / circle_radius).to_degrees() % 360.0
    }

    /// The rectangle enclosing this vicinity, in WGS84.
    pub fn bounding_box(&self) -> BoundingBox {
        let lat_delta = self.latitude_delta();
        let lon_delta = self.longitude_delta();
        let Point { x, y } = self.center;

        BoundingBox::new(
            Point::new(normalize_longitude(x - lon_delta), normalize_latitude(y - lat_delta)),
            Point::new(normalize_longitude(x + lon_delta), normalize_latitude(y + lat_delta)),
            CrsCode::default(),
        )
    }
}

/// Wrap a longitude into [-180, 180].
pub fn normalize_longitude(longitude: f64) -> f64 {
    if longitude > 180.0 {
        (longitude - 360.0) % 180.0
    } else if longitude < -180.0 {
        (longitude + 360.0) % 180.0
    } else {
        longitude
    }
}

/// Fold a latitude beyond a pole back into [-90, 90].
pub fn normalize_latitude(latitude: f64) -> f64 {
    if latitude > 90.0 {
        (360.0 - latitude) % 90.0
    } else if latitude < -90.0 {
        (-360.0 - latitude) % 90.0
    } else {
        latitude
    }
}

fn parse_numbers(s: &str, parameter: &str) -> Result<Vec<f64>, InvalidParameter> {
    s.split(',')
        .map(|part| {
            part.trim().parse::<f64>().map_err(|_| {
                InvalidParameter::new(parameter, format!("Invalid number '{}'.", part.trim()))
            })
        })
        .collect()
}

fn format_hint(parameter: &str) -> InvalidParameter {
    match parameter {
        names::BBOX => InvalidParameter::new(
            names::BBOX,
            "Expected 'minx,miny,maxx,maxy' or {\"ll\":{\"type\":\"Point\",\"coordinates\":[x,y]},\"ur\":{...}}.",
        ),
        _ => InvalidParameter::new(
            names::NEAR,
            "Expected 'lon,lat,radius' or {\"center\":{\"type\":\"Point\",\"coordinates\":[x,y]},\"radius\":r}.",
        ),
    }
}

/// Resolves `bbox`, `near` and `crs` into one spatial filter.
pub struct SpatialFilterResolver;

impl SpatialFilterResolver {
    /// Resolve the spatial filter; `None` when neither `bbox` nor `near` is present.
    pub fn resolve(params: &ParameterStore) -> Result<Option<BoundingBox>, InvalidParameter> {
        if !params.contains(names::BBOX) && !params.contains(names::NEAR) {
            return Ok(None);
        }

        // Parse strictly so the format hints are attached before the handle sees the error.
        let strict = params.without_parse_error_handle();
        let bbox = Self::parse_bbox(&strict).or_else(|e| params.report(e).map(|_| None))?;
        let vicinity = Self::parse_vicinity(&strict)
            .or_else(|e| params.report(e).map(|_| None))?
            .map(|v| v.bounding_box());
        let merged = Self::merge(bbox, vicinity);
        tracing::debug!(?merged, "Resolved spatial filter");
        Ok(merged)
    }

    /// Extend `bbox` by the corners of `vicinity`; either side may be absent.
    pub fn merge(bbox: Option<BoundingBox>, vicinity: Option<BoundingBox>) -> Option<BoundingBox> {
        match (bbox, vicinity) {
            (Some(b), Some(v)) => Some(b.union(&v)),
            (Some(b), None) => Some(b),
            (None, v) => v,
        }
    }

    fn parse_bbox(params: &ParameterStore) -> Result<Option<BoundingBox>, InvalidParameter> {
        let Some(raw) = params.get(names::BBOX) else {
            return Ok(None);
        };
        if let Some(literal) = BoundingBox::parse_literal(&raw) {
            return literal.map(Some);
        }

        let json: Option<BboxJson> = params.get_json(names::BBOX).map_err(|e| {
            let mut hinted = format_hint(names::BBOX);
            hinted.hints.extend(e.hints);
            hinted
        })?;
        json.map(|b| {
            let ll = Point::from_geometry(&b.ll, names::BBOX)?;
            let ur = Point::from_geometry(&b.ur, names::BBOX)?;
            Ok(BoundingBox::new(ll, ur, CrsCode::default()))
        })
        .transpose()
    }

    fn parse_vicinity(params: &ParameterStore) -> Result<Option<Vicinity>, InvalidParameter> {
        let Some(raw) = params.get(names::NEAR) else {
            return Ok(None);
        };

        let vicinity = match Vicinity::parse_literal(&raw) {
            Some(literal) => Some(literal?),
            None => {
                let json: Option<VicinityJson> = params.get_json(names::NEAR).map_err(|e| {
                    let mut hinted = format_hint(names::NEAR);
                    hinted.hints.extend(e.hints);
                    hinted
                })?;
                json.map(|v| {
                    Point::from_geometry(&v.center, names::NEAR)
                        .map(|center| Vicinity::new(center, v.radius))
                })
                .transpose()?
            }
        };

        match (vicinity, params.get(names::CRS)) {
            (Some(v), Some(crs)) => {
                let crs = CrsCode::parse(&crs)?;
                Ok(Some(v.in_crs(crs)))
            }
            (v, _) => Ok(v),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use test_utils::assert_approx_eq;

    const ERROR_DELTA: f64 = 0.1;

    fn store(pairs: &[(&str, &str)]) -> ParameterStore {
        ParameterStore::from_pairs(pairs.iter().copied())
    }

    #[test]
    fn test_no_spatial_parameters() {
        assert_eq!(SpatialFilterResolver::resolve(&store(&[])).unwrap(), None);
    }

    #[test]
    fn test_bbox_literal() {
        let bbox = SpatialFilterResolver::resolve(&store(&[("bbox", "-180,-90,180,90")]))
            .unwrap()
            .unwrap();
        assert_eq!(bbox.lower_left, Point::new(-180.0, -90.0));
        assert_eq!(bbox.upper_right, Point::new(180.0, 90.0));
        assert_eq!(bbox.crs, CrsCode::Epsg4326);
    }

    #[test]
    fn test_bbox_literal_with_spaces() {
        let bbox = BoundingBox::parse_literal("5.5, 50.1, 7.25, 52 ").unwrap().unwrap();
        assert_eq!(bbox.lower_left, Point::new(5.5, 50.1));
        assert_eq!(bbox.upper_right, Point::new(7.25, 52.0));
    }

    #[test]
    fn test_bbox_json() {
        let json = r#"{"ll":{"type":"Point","coordinates":[5.0,50.0]},"ur":{"type":"Point","coordinates":[8.0,53.0]}}"#;
        let bbox = SpatialFilterResolver::resolve(&store(&[("bbox", json)]))
            .unwrap()
            .unwrap();
        assert_eq!(bbox.lower_left, Point::new(5.0, 50.0));
        assert_eq!(bbox.upper_right, Point::new(8.0, 53.0));
    }

    #[test]
    fn test_bbox_malformed_names_formats() {
        let err = SpatialFilterResolver::resolve(&store(&[("bbox", "north-west")])).unwrap_err();
        assert_eq!(err.parameter, "bbox");
        assert!(err.hints[0].contains("minx,miny,maxx,maxy"));
    }

    #[test]
    fn test_parse_error_handle_sees_format_hints() {
        let reported = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&reported);
        let params = store(&[("bbox", "{\"ll\":"), ("near", "10,10,1")])
            .with_parse_error_handle(move |_, err| sink.lock().unwrap().push(err.clone()));

        let resolved = SpatialFilterResolver::resolve(&params).unwrap().unwrap();
        assert!(resolved.contains(&Point::new(10.0, 10.0)));
        assert!(!resolved.contains(&Point::new(0.0, 0.0)));

        let reported = reported.lock().unwrap();
        assert_eq!(reported.len(), 1);
        assert_eq!(reported[0].parameter, "bbox");
        assert!(reported[0].hints[0].contains("minx,miny,maxx,maxy"));
        assert!(reported[0].hints.len() > 1);
    }

    #[test]
    fn test_near_literal() {
        let bbox = SpatialFilterResolver::resolve(&store(&[("near", "0,0,500")]))
            .unwrap()
            .unwrap();
        assert_approx_eq!(bbox.lower_left.y, -bbox.upper_right.y, ERROR_DELTA);
        assert_approx_eq!(bbox.lower_left.x, -bbox.upper_right.x, ERROR_DELTA);
    }

    #[test]
    fn test_near_negative_radius() {
        let result = SpatialFilterResolver::resolve(&store(&[("near", "7,51,-1")]));
        assert!(result.is_err());
    }

    #[test]
    fn test_near_json_with_web_mercator_center() {
        let near = r#"{"center":{"type":"Point","coordinates":[779236.435552915,6621293.722740169]},"radius":10}"#;
        let bbox = SpatialFilterResolver::resolve(&store(&[("near", near), ("crs", "EPSG:3857")]))
            .unwrap()
            .unwrap();
        assert!(bbox.contains(&Point::new(7.0, 51.0)));
        assert!(bbox.width() < 1.0);
    }

    #[test]
    fn test_near_with_unknown_crs() {
        let err = SpatialFilterResolver::resolve(&store(&[("near", "7,51,10"), ("crs", "EPSG:1")]))
            .unwrap_err();
        assert_eq!(err.parameter, "crs");
    }

    #[test]
    fn test_vicinity_symmetric_at_equator() {
        let bounds = Vicinity::new(Point::new(0.0, 0.0), 500.0).bounding_box();
        assert_approx_eq!(bounds.lower_left.y, -bounds.upper_right.y, ERROR_DELTA);
        assert_approx_eq!(bounds.lower_left.x, -bounds.upper_right.x, ERROR_DELTA);
    }

    #[test]
    fn test_vicinity_common_latitude_circle_at_north_pole() {
        let bounds = Vicinity::new(Point::new(-89.99, 89.999), 500.0).bounding_box();
        assert_approx_eq!(bounds.lower_left.y, bounds.upper_right.y, ERROR_DELTA);
    }

    #[test]
    fn test_vicinity_common_latitude_circle_at_south_pole() {
        let bounds = Vicinity::new(Point::new(-89.99, -89.999), 500.0).bounding_box();
        assert_approx_eq!(bounds.lower_left.y, bounds.upper_right.y, ERROR_DELTA);
    }

    #[test]
    fn test_merge_bbox_and_vicinity() {
        let bbox = BoundingBox::from_corners(0.0, 0.0, 10.0, 10.0, CrsCode::Epsg4326);
        let vicinity = BoundingBox::from_corners(20.0, 20.0, 25.0, 25.0, CrsCode::Epsg4326);

        let merged = SpatialFilterResolver::merge(Some(bbox), Some(vicinity)).unwrap();
        assert_eq!(merged.lower_left, Point::new(0.0, 0.0));
        assert_eq!(merged.upper_right, Point::new(25.0, 25.0));
        assert_eq!(merged.crs, CrsCode::Epsg4326);
    }

    #[test]
    fn test_merge_single_side_unchanged() {
        let bbox = BoundingBox::from_corners(1.0, 2.0, 3.0, 4.0, CrsCode::Epsg4326);
        assert_eq!(SpatialFilterResolver::merge(Some(bbox), None), Some(bbox));
        assert_eq!(SpatialFilterResolver::merge(None, Some(bbox)), Some(bbox));
        assert_eq!(SpatialFilterResolver::merge(None, None), None);
    }

    #[test]
    fn test_resolve_merges_both_parameters() {
        let merged = SpatialFilterResolver::resolve(&store(&[("bbox", "0,0,1,1"), ("near", "10,10,1")]))
            .unwrap()
            .unwrap();
        assert_eq!(merged.lower_left, Point::new(0.0, 0.0));
        assert!(merged.upper_right.x > 10.0);
        assert!(merged.upper_right.y > 10.0);
    }

    #[test]
    fn test_normalize_coordinates() {
        assert_eq!(normalize_latitude(95.0), 85.0);
        assert_eq!(normalize_latitude(-95.0), -85.0);
        assert_eq!(normalize_longitude(190.0), -170.0);
        assert_eq!(normalize_longitude(-190.0), 170.0);
        assert_eq!(normalize_longitude(45.0), 45.0);
    }
}
