//! Geometry validation.
//!
//! Loaders run lenient validation (finite coordinates, minimum vertex
//! counts); strict mode additionally requires closed polygon rings.
//! Simplification can introduce self-intersections, so callers that
//! need validity after simplifying re-run this check.

use geo::Geometry;

use geoflow_core::config::ValidityMode;
use geoflow_core::error::{GeoflowError, Result};
use geoflow_core::models::FeatureCollection;

/// Validation result with details
#[derive(Debug, Clone)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<ValidationError>,
}

/// Validation error with location details
#[derive(Debug, Clone)]
pub struct ValidationError {
    pub location: String,
    pub reason: String,
}

impl ValidationResult {
    /// Create a valid result
    pub fn valid() -> Self {
        Self {
            is_valid: true,
            errors: Vec::new(),
        }
    }

    /// Add an error to the result
    pub fn add_error(&mut self, location: String, reason: String) {
        self.is_valid = false;
        self.errors.push(ValidationError { location, reason });
    }

    fn absorb(&mut self, prefix: &str, other: ValidationResult) {
        for error in other.errors {
            self.add_error(format!("{}.{}", prefix, error.location), error.reason);
        }
    }
}

/// Validate a geometry
pub fn validate_geometry(geometry: &Geometry<f64>, mode: ValidityMode) -> ValidationResult {
    match geometry {
        Geometry::Point(p) => validate_point(p),
        Geometry::Line(line) => {
            let mut result = ValidationResult::valid();
            for (i, coord) in [line.start, line.end].iter().enumerate() {
                if !coord.x.is_finite() || !coord.y.is_finite() {
                    result.add_error(
                        format!("Line[{}]", i),
                        "Coordinates must be finite".to_string(),
                    );
                }
            }
            result
        }
        Geometry::LineString(ls) => validate_linestring(ls),
        Geometry::Polygon(polygon) => validate_polygon(polygon, mode),
        Geometry::MultiPoint(mp) => {
            let mut result = ValidationResult::valid();
            for (i, point) in mp.iter().enumerate() {
                result.absorb(&format!("MultiPoint[{}]", i), validate_point(point));
            }
            result
        }
        Geometry::MultiLineString(mls) => {
            let mut result = ValidationResult::valid();
            for (i, ls) in mls.iter().enumerate() {
                result.absorb(&format!("MultiLineString[{}]", i), validate_linestring(ls));
            }
            result
        }
        Geometry::MultiPolygon(mp) => {
            let mut result = ValidationResult::valid();
            for (i, polygon) in mp.iter().enumerate() {
                result.absorb(
                    &format!("MultiPolygon[{}]", i),
                    validate_polygon(polygon, mode),
                );
            }
            result
        }
        Geometry::GeometryCollection(gc) => {
            let mut result = ValidationResult::valid();
            for (i, member) in gc.iter().enumerate() {
                result.absorb(
                    &format!("GeometryCollection[{}]", i),
                    validate_geometry(member, mode),
                );
            }
            result
        }
        Geometry::Rect(_) | Geometry::Triangle(_) => ValidationResult::valid(),
    }
}

fn validate_point(point: &geo::Point<f64>) -> ValidationResult {
    let mut result = ValidationResult::valid();
    if !point.x().is_finite() || !point.y().is_finite() {
        result.add_error(
            format!("Point({}, {})", point.x(), point.y()),
            "Coordinates must be finite".to_string(),
        );
    }
    result
}

fn validate_linestring(linestring: &geo::LineString<f64>) -> ValidationResult {
    let mut result = ValidationResult::valid();

    if linestring.0.len() < 2 {
        result.add_error(
            "LineString".to_string(),
            format!(
                "LineString must have at least 2 points, found {}",
                linestring.0.len()
            ),
        );
        return result;
    }

    for (i, coord) in linestring.0.iter().enumerate() {
        if !coord.x.is_finite() || !coord.y.is_finite() {
            result.add_error(
                format!("LineString[{}]", i),
                "Coordinates must be finite".to_string(),
            );
        }
    }

    result
}

fn validate_polygon(polygon: &geo::Polygon<f64>, mode: ValidityMode) -> ValidationResult {
    let mut result = ValidationResult::valid();

    validate_ring(&mut result, polygon.exterior(), "Polygon exterior", mode);
    for (i, interior) in polygon.interiors().iter().enumerate() {
        validate_ring(
            &mut result,
            interior,
            &format!("Polygon interior[{}]", i),
            mode,
        );
    }

    result
}

fn validate_ring(
    result: &mut ValidationResult,
    ring: &geo::LineString<f64>,
    location: &str,
    mode: ValidityMode,
) {
    if ring.0.len() < 4 {
        result.add_error(
            location.to_string(),
            format!("Ring must have at least 4 points, found {}", ring.0.len()),
        );
        return;
    }

    for (i, coord) in ring.0.iter().enumerate() {
        if !coord.x.is_finite() || !coord.y.is_finite() {
            result.add_error(
                format!("{}[{}]", location, i),
                "Coordinates must be finite".to_string(),
            );
        }
    }

    if mode == ValidityMode::Strict {
        if let (Some(first), Some(last)) = (ring.0.first(), ring.0.last()) {
            if first != last {
                result.add_error(
                    location.to_string(),
                    "Ring must be closed (first point == last point)".to_string(),
                );
            }
        }
    }
}

/// Validate every feature of a collection, mapping the first failure to
/// an `InvalidGeometry` error with the feature's position.
pub fn validate_collection(collection: &FeatureCollection, mode: ValidityMode) -> Result<()> {
    for (idx, feature) in collection.iter().enumerate() {
        let result = validate_geometry(&feature.geometry, mode);
        if !result.is_valid {
            let first = &result.errors[0];
            return Err(GeoflowError::InvalidGeometry {
                location: format!("feature[{}].{}", idx, first.location),
                reason: first.reason.clone(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{line_string, polygon, Point};
    use geoflow_core::crs::lookup_epsg;
    use geoflow_core::models::Feature;

    #[test]
    fn test_finite_point_is_valid() {
        let result = validate_geometry(
            &Geometry::Point(Point::new(1.0, 2.0)),
            ValidityMode::Lenient,
        );
        assert!(result.is_valid);
    }

    #[test]
    fn test_nan_coordinates_rejected() {
        let result = validate_geometry(
            &Geometry::Point(Point::new(f64::NAN, 2.0)),
            ValidityMode::Lenient,
        );
        assert!(!result.is_valid);
        assert_eq!(result.errors[0].reason, "Coordinates must be finite");
    }

    #[test]
    fn test_short_linestring_rejected() {
        let result = validate_geometry(
            &Geometry::LineString(line_string![(x: 0.0, y: 0.0)]),
            ValidityMode::Lenient,
        );
        assert!(!result.is_valid);
    }

    #[test]
    fn test_open_ring_passes_lenient_fails_strict() {
        // Four points, not closed
        let open = Geometry::Polygon(geo::Polygon::new(
            geo::LineString::from(vec![(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)]),
            vec![],
        ));

        assert!(validate_geometry(&open, ValidityMode::Lenient).is_valid);
        assert!(!validate_geometry(&open, ValidityMode::Strict).is_valid);
    }

    #[test]
    fn test_closed_ring_passes_strict() {
        let closed = Geometry::Polygon(polygon![
            (x: 0.0, y: 0.0),
            (x: 1.0, y: 0.0),
            (x: 1.0, y: 1.0),
            (x: 0.0, y: 1.0),
            (x: 0.0, y: 0.0),
        ]);
        assert!(validate_geometry(&closed, ValidityMode::Strict).is_valid);
    }

    #[test]
    fn test_collection_error_names_the_feature() {
        let mut collection = FeatureCollection::new(lookup_epsg(4326).unwrap());
        collection.push(Feature::new(Geometry::Point(Point::new(0.0, 0.0))));
        collection.push(Feature::new(Geometry::Point(Point::new(f64::NAN, 0.0))));

        let result = validate_collection(&collection, ValidityMode::Lenient);
        match result {
            Err(GeoflowError::InvalidGeometry { location, .. }) => {
                assert!(location.starts_with("feature[1]"));
            }
            other => panic!("Expected InvalidGeometry, got {:?}", other),
        }
    }
}
