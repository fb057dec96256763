//! Geometry simplification with Ramer-Douglas-Peucker.
//!
//! Polygons are simplified by running the algorithm on each of their
//! rings; multi-geometries on each constituent. No remaining point
//! deviates from the original line by more than the tolerance, in the
//! geometry's own CRS units. Topology validity across related
//! geometries is not guaranteed: simplification can introduce
//! self-intersections, and callers that need validity re-check with
//! [`crate::validation`].

use geo::{Geometry, GeometryCollection, Simplify};

use geoflow_core::models::{Feature, FeatureCollection};

/// Simplify a single geometry within the error tolerance.
///
/// A tolerance of zero or less returns the geometry unaltered, as do
/// point-like geometries. Larger tolerances never increase the vertex
/// count.
pub fn simplify_geometry(geometry: &Geometry<f64>, tolerance: f64) -> Geometry<f64> {
    if tolerance <= 0.0 {
        return geometry.clone();
    }

    match geometry {
        Geometry::LineString(ls) => Geometry::LineString(ls.simplify(&tolerance)),
        Geometry::MultiLineString(mls) => Geometry::MultiLineString(mls.simplify(&tolerance)),
        Geometry::Polygon(polygon) => Geometry::Polygon(polygon.simplify(&tolerance)),
        Geometry::MultiPolygon(mp) => Geometry::MultiPolygon(mp.simplify(&tolerance)),
        Geometry::GeometryCollection(gc) => {
            Geometry::GeometryCollection(GeometryCollection::new_from(
                gc.iter().map(|g| simplify_geometry(g, tolerance)).collect(),
            ))
        }
        // Point-like and already-minimal geometries have nothing to drop
        other => other.clone(),
    }
}

/// Simplify every feature of a collection.
///
/// Attributes, ids, and the collection CRS are untouched; the operation
/// is pure.
pub fn simplify(collection: &FeatureCollection, tolerance: f64) -> FeatureCollection {
    let features = collection
        .iter()
        .map(|feature| Feature {
            id: feature.id.clone(),
            geometry: simplify_geometry(&feature.geometry, tolerance),
            properties: feature.properties.clone(),
        })
        .collect();

    FeatureCollection::from_features(collection.crs().clone(), features)
}

/// Total vertex count of a geometry, used to check the monotonicity
/// guarantee
pub fn vertex_count(geometry: &Geometry<f64>) -> usize {
    use geo::CoordsIter;
    geometry.coords_count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{line_string, polygon, Point};
    use geoflow_core::crs::lookup_epsg;
    use geoflow_core::models::Crs;
    use proptest::prelude::*;

    fn wgs84() -> Crs {
        lookup_epsg(4326).unwrap()
    }

    fn wiggly_line() -> Geometry<f64> {
        Geometry::LineString(line_string![
            (x: 0.0, y: 0.0),
            (x: 5.0, y: 4.0),
            (x: 11.0, y: 5.5),
            (x: 17.3, y: 3.2),
            (x: 27.8, y: 0.1),
        ])
    }

    #[test]
    fn test_vertex_count_drops() {
        let simplified = simplify_geometry(&wiggly_line(), 1.0);
        assert!(vertex_count(&simplified) < vertex_count(&wiggly_line()));
    }

    #[test]
    fn test_zero_tolerance_is_identity() {
        let original = wiggly_line();
        assert_eq!(simplify_geometry(&original, 0.0), original);
        assert_eq!(simplify_geometry(&original, -1.0), original);
    }

    #[test]
    fn test_points_unaltered() {
        let point = Geometry::Point(Point::new(1.0, 2.0));
        assert_eq!(simplify_geometry(&point, 100.0), point);
    }

    #[test]
    fn test_polygon_rings_simplified() {
        let original = Geometry::Polygon(polygon![
            (x: 0.0, y: 0.0),
            (x: 5.0, y: 0.1),
            (x: 10.0, y: 0.0),
            (x: 10.0, y: 10.0),
            (x: 0.0, y: 10.0),
            (x: 0.0, y: 0.0),
        ]);

        let simplified = simplify_geometry(&original, 1.0);
        // The near-collinear midpoint on the bottom edge goes away
        assert!(vertex_count(&simplified) < vertex_count(&original));
    }

    #[test]
    fn test_collection_attributes_untouched() {
        let mut collection = FeatureCollection::new(wgs84());
        collection.push(
            Feature::new(wiggly_line())
                .with_id("road-1")
                .with_property("lanes", serde_json::json!(2)),
        );

        let result = simplify(&collection, 1.0);

        assert_eq!(result.crs(), collection.crs());
        assert_eq!(result.features()[0].id.as_deref(), Some("road-1"));
        assert_eq!(
            result.features()[0].properties["lanes"],
            serde_json::json!(2)
        );
    }

    proptest! {
        /// A larger tolerance never yields more vertices than a
        /// smaller one on the same geometry.
        #[test]
        fn monotonic_in_tolerance(
            points in proptest::collection::vec((-100.0..100.0f64, -100.0..100.0f64), 2..40),
            t1 in 0.001..10.0f64,
            factor in 1.0..20.0f64,
        ) {
            let line = Geometry::LineString(geo::LineString::from(points));
            let t2 = t1 * factor;

            let coarse = simplify_geometry(&line, t2);
            let fine = simplify_geometry(&line, t1);

            prop_assert!(vertex_count(&fine) >= vertex_count(&coarse));
        }
    }
}
