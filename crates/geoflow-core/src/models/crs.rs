//! Coordinate reference system record.
//!
//! A `Crs` is produced by the resolver in [`crate::crs`] and is immutable
//! afterwards. Collections carry exactly one of these; geometries never
//! carry their own.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Order of the two horizontal axes in the CRS definition.
///
/// Stored as metadata only: transforms go through
/// `Proj::new_known_crs`, which normalizes coordinates to
/// easting/northing regardless of the authority definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum AxisOrder {
    /// x = easting/longitude, y = northing/latitude
    #[default]
    EastNorth,
    /// Authority definition lists latitude/northing first
    NorthEast,
}

/// A resolved coordinate reference system.
///
/// Two values are equal iff they share the same canonical definition:
/// the canonical WKT when the registry knows it, otherwise the
/// normalized `EPSG:code` string.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Crs {
    /// Authority namespace, currently always "EPSG"
    pub authority: String,
    /// Code within the authority namespace
    pub code: u32,
    /// Display name, e.g. "WGS 84"
    pub name: String,
    /// Geodetic datum name, e.g. "World Geodetic System 1984"
    pub datum: String,
    /// Axis order of the authority definition
    pub axis_order: AxisOrder,
    /// Area of use as [west, south, east, north] in degrees, if known
    pub area_of_use: Option<[f64; 4]>,
    /// Canonical WKT, if the registry carries one
    pub wkt: Option<String>,
}

impl Crs {
    /// Authority-prefixed code, e.g. "EPSG:4326"
    pub fn authority_code(&self) -> String {
        format!("{}:{}", self.authority, self.code)
    }

    /// The canonical definition this CRS compares by: the registry WKT
    /// when known, the normalized authority code otherwise.
    pub fn canonical(&self) -> std::borrow::Cow<'_, str> {
        match &self.wkt {
            Some(wkt) => std::borrow::Cow::Borrowed(wkt.as_str()),
            None => std::borrow::Cow::Owned(self.authority_code()),
        }
    }

    /// Whether `point` (x=lon, y=lat in degrees) falls inside the area of
    /// use. Returns `true` when no area is recorded.
    pub fn contains_lon_lat(&self, lon: f64, lat: f64) -> bool {
        match self.area_of_use {
            Some([west, south, east, north]) => {
                lon >= west && lon <= east && lat >= south && lat <= north
            }
            None => true,
        }
    }
}

impl PartialEq for Crs {
    fn eq(&self, other: &Self) -> bool {
        self.canonical() == other.canonical()
    }
}

impl Eq for Crs {}

impl fmt::Display for Crs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.authority_code(), self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crs::registry;

    #[test]
    fn test_equality_by_canonical_wkt() {
        let a = registry::lookup_epsg(4326).unwrap();
        let b = registry::lookup_epsg(4326).unwrap();
        let c = registry::lookup_epsg(3857).unwrap();

        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_authority_code() {
        let crs = registry::lookup_epsg(2154).unwrap();
        assert_eq!(crs.authority_code(), "EPSG:2154");
    }

    #[test]
    fn test_area_of_use() {
        let lambert = registry::lookup_epsg(2154).unwrap();
        // Paris is inside the Lambert-93 area of use
        assert!(lambert.contains_lon_lat(2.35, 48.85));
        // Sydney is not
        assert!(!lambert.contains_lon_lat(151.2, -33.9));
    }
}
