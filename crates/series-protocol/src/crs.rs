//! Coordinate reference systems accepted in spatial filters.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::InvalidParameter;
use crate::names;

/// Sphere radius used by Web Mercator, in meters.
const WEB_MERCATOR_RADIUS_M: f64 = 6_378_137.0;

/// CRS codes the spatial filter understands.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CrsCode {
    /// WGS84 geographic; the default CRS.
    #[default]
    Epsg4326,
    /// ETRS89 geographic (treated as WGS84)
    Epsg4258,
    /// Web Mercator (meters)
    Epsg3857,
}

impl CrsCode {
    /// Parse a CRS identifier.
    ///
    /// Accepts formats like:
    /// - "EPSG:4326", "epsg:3857"
    /// - "CRS:84"
    /// - "urn:ogc:def:crs:EPSG::4326"
    /// - "http://www.opengis.net/def/crs/EPSG/0/4326"
    pub fn parse(s: &str) -> Result<Self, InvalidParameter> {
        let normalized = s.trim().to_uppercase();
        let code = normalized
            .strip_prefix("URN:OGC:DEF:CRS:EPSG::")
            .or_else(|| normalized.strip_prefix("HTTP://WWW.OPENGIS.NET/DEF/CRS/EPSG/0/"))
            .or_else(|| normalized.strip_prefix("EPSG:"))
            .unwrap_or(normalized.as_str());

        match code {
            "4326" | "CRS:84" | "URN:OGC:DEF:CRS:OGC:1.3:CRS84" => Ok(CrsCode::Epsg4326),
            "4258" => Ok(CrsCode::Epsg4258),
            "3857" | "900913" | "3785" => Ok(CrsCode::Epsg3857),
            _ => Err(Self::invalid(s)),
        }
    }

    fn invalid(s: &str) -> InvalidParameter {
        InvalidParameter::new(
            names::CRS,
            format!("Check if 'crs' parameter is a valid EPSG CRS. Was: '{}'.", s),
        )
        .with_hint("Refer to http://www.epsg-registry.org/ for valid codes.")
    }

    /// Check if this is a geographic (lon/lat) CRS.
    pub fn is_geographic(&self) -> bool {
        matches!(self, CrsCode::Epsg4326 | CrsCode::Epsg4258)
    }

    /// Transform a coordinate of this CRS into WGS84 lon/lat.
    pub fn to_wgs84(&self, x: f64, y: f64) -> (f64, f64) {
        match self {
            CrsCode::Epsg4326 | CrsCode::Epsg4258 => (x, y),
            CrsCode::Epsg3857 => {
                let lon = (x / WEB_MERCATOR_RADIUS_M).to_degrees();
                let lat = (2.0 * (y / WEB_MERCATOR_RADIUS_M).exp().atan()
                    - std::f64::consts::FRAC_PI_2)
                    .to_degrees();
                (lon, lat)
            }
        }
    }
}

impl fmt::Display for CrsCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let code = match self {
            CrsCode::Epsg4326 => "EPSG:4326",
            CrsCode::Epsg4258 => "EPSG:4258",
            CrsCode::Epsg3857 => "EPSG:3857",
        };
        write!(f, "{}", code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_crs() {
        assert_eq!(CrsCode::parse("EPSG:4326").unwrap(), CrsCode::Epsg4326);
        assert_eq!(CrsCode::parse("epsg:3857").unwrap(), CrsCode::Epsg3857);
        assert_eq!(CrsCode::parse("CRS:84").unwrap(), CrsCode::Epsg4326);
        assert_eq!(
            CrsCode::parse("urn:ogc:def:crs:EPSG::4258").unwrap(),
            CrsCode::Epsg4258
        );
        assert_eq!(
            CrsCode::parse("http://www.opengis.net/def/crs/EPSG/0/900913").unwrap(),
            CrsCode::Epsg3857
        );
    }

    #[test]
    fn test_invalid_crs_names_registry() {
        let err = CrsCode::parse("EPSG:99999").unwrap_err();
        assert_eq!(err.parameter, "crs");
        assert!(err.hints[0].contains("EPSG:99999"));
        assert!(err.hints[1].contains("epsg-registry"));
    }

    #[test]
    fn test_web_mercator_to_wgs84() {
        let (lon, lat) = CrsCode::Epsg3857.to_wgs84(0.0, 0.0);
        assert!(lon.abs() < 1e-9);
        assert!(lat.abs() < 1e-9);

        // 7.0 E, 51.0 N in Web Mercator
        let (lon, lat) = CrsCode::Epsg3857.to_wgs84(779_236.435_552_915, 6_621_293.722_740_165);
        assert!((lon - 7.0).abs() < 1e-4);
        assert!((lat - 51.0).abs() < 1e-4);
    }

    #[test]
    fn test_geographic_is_identity() {
        assert!(CrsCode::Epsg4326.is_geographic());
        assert!(!CrsCode::Epsg3857.is_geographic());
        assert_eq!(CrsCode::Epsg4258.to_wgs84(7.5, 51.9), (7.5, 51.9));
    }
}
