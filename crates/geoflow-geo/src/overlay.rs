//! Overlay analysis: set-theoretic combinations of two collections.
//!
//! Both inputs must share one CRS and be polygonal; geometry algebra
//! delegates to `geo::BooleanOps`. Pieces whose area does not exceed
//! the epsilon are degenerate and emit no output feature. Residual
//! pieces are always computed by subtracting the *other* input, so
//! boundary-coincident slivers consistently resolve in favor of the
//! first input.

use std::str::FromStr;

use geo::{Area, BooleanOps, Geometry, MultiPolygon};

use geoflow_core::error::{GeoflowError, Result};
use geoflow_core::models::{Feature, FeatureCollection, Properties};

use crate::index::SpatialIndex;

/// Area below which an overlay piece is considered degenerate, in
/// squared CRS units.
pub const DEFAULT_OVERLAY_EPSILON: f64 = 1e-9;

/// Set-theoretic overlay mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayMode {
    /// Pieces common to both inputs, attributes from both sides
    Intersection,
    /// Intersection pieces plus both inputs' residuals
    Union,
    /// The first input minus the second
    Difference,
    /// Both residuals, without the common pieces
    SymmetricDifference,
    /// The first input, split by the second where they overlap
    Identity,
}

impl FromStr for OverlayMode {
    type Err = GeoflowError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().replace('_', "-").as_str() {
            "intersection" => Ok(Self::Intersection),
            "union" => Ok(Self::Union),
            "difference" => Ok(Self::Difference),
            "symmetric-difference" => Ok(Self::SymmetricDifference),
            "identity" => Ok(Self::Identity),
            other => Err(GeoflowError::ConfigInvalid {
                key: "mode".to_string(),
                reason: format!(
                    "unknown overlay mode '{}': expected intersection, union, difference, symmetric-difference, or identity",
                    other
                ),
            }),
        }
    }
}

/// Overlay two collections with the default epsilon.
pub fn overlay(
    a: &FeatureCollection,
    b: &FeatureCollection,
    mode: OverlayMode,
) -> Result<FeatureCollection> {
    overlay_with_epsilon(a, b, mode, DEFAULT_OVERLAY_EPSILON)
}

/// Overlay two collections.
///
/// Precondition: `a.crs() == b.crs()`, otherwise `CrsMismatch`; a CRS
/// difference is never resolved by silent reprojection. The output is
/// in the shared CRS; inputs are untouched.
pub fn overlay_with_epsilon(
    a: &FeatureCollection,
    b: &FeatureCollection,
    mode: OverlayMode,
    epsilon: f64,
) -> Result<FeatureCollection> {
    if a.crs() != b.crs() {
        return Err(GeoflowError::CrsMismatch {
            left: a.crs().to_string(),
            right: b.crs().to_string(),
        });
    }

    let a_polys = polygonal_input(a, "first")?;
    let b_polys = polygonal_input(b, "second")?;

    let b_index = SpatialIndex::from_collection(b);

    let mut features = Vec::new();

    if matches!(
        mode,
        OverlayMode::Intersection | OverlayMode::Union | OverlayMode::Identity
    ) {
        features.extend(intersection_pieces(a, &a_polys, b, &b_polys, &b_index, epsilon));
    }

    if matches!(
        mode,
        OverlayMode::Union | OverlayMode::Difference | OverlayMode::SymmetricDifference | OverlayMode::Identity
    ) {
        features.extend(residual_pieces(a, &a_polys, &b_polys, &b_index, epsilon));
    }

    if matches!(
        mode,
        OverlayMode::Union | OverlayMode::SymmetricDifference
    ) {
        let a_index = SpatialIndex::from_collection(a);
        features.extend(residual_pieces(b, &b_polys, &a_polys, &a_index, epsilon));
    }

    tracing::debug!(
        "overlay {:?}: {} x {} features -> {} pieces",
        mode,
        a.len(),
        b.len(),
        features.len()
    );

    Ok(FeatureCollection::from_features(a.crs().clone(), features))
}

/// Normalize a collection into per-feature multipolygons, rejecting
/// non-polygonal geometries.
fn polygonal_input(
    collection: &FeatureCollection,
    which: &str,
) -> Result<Vec<MultiPolygon<f64>>> {
    collection
        .iter()
        .enumerate()
        .map(|(idx, feature)| match &feature.geometry {
            Geometry::Polygon(p) => Ok(MultiPolygon::new(vec![p.clone()])),
            Geometry::MultiPolygon(mp) => Ok(mp.clone()),
            other => Err(GeoflowError::invalid_geometry(
                format!("{} input, feature[{}]", which, idx),
                format!(
                    "overlay requires polygonal geometries, got {}",
                    geometry_kind(other)
                ),
            )),
        })
        .collect()
}

fn geometry_kind(geometry: &Geometry<f64>) -> &'static str {
    match geometry {
        Geometry::Point(_) => "Point",
        Geometry::Line(_) => "Line",
        Geometry::LineString(_) => "LineString",
        Geometry::Polygon(_) => "Polygon",
        Geometry::MultiPoint(_) => "MultiPoint",
        Geometry::MultiLineString(_) => "MultiLineString",
        Geometry::MultiPolygon(_) => "MultiPolygon",
        Geometry::GeometryCollection(_) => "GeometryCollection",
        Geometry::Rect(_) => "Rect",
        Geometry::Triangle(_) => "Triangle",
    }
}

/// One output feature per overlapping (a, b) pair
fn intersection_pieces(
    a: &FeatureCollection,
    a_polys: &[MultiPolygon<f64>],
    b: &FeatureCollection,
    b_polys: &[MultiPolygon<f64>],
    b_index: &SpatialIndex,
    epsilon: f64,
) -> Vec<Feature> {
    let mut features = Vec::new();

    for (i, a_feature) in a.iter().enumerate() {
        for j in b_index.candidates(&a_feature.geometry) {
            let piece = a_polys[i].intersection(&b_polys[j]);
            if piece.unsigned_area() > epsilon {
                features.push(Feature {
                    id: None,
                    geometry: normalize(piece),
                    properties: merge_properties(
                        &a_feature.properties,
                        &b.features()[j].properties,
                    ),
                });
            }
        }
    }

    features
}

/// Each feature of `own` minus everything it overlaps in the other
/// input; attributes stay with their own side.
fn residual_pieces(
    own: &FeatureCollection,
    own_polys: &[MultiPolygon<f64>],
    other_polys: &[MultiPolygon<f64>],
    other_index: &SpatialIndex,
    epsilon: f64,
) -> Vec<Feature> {
    let mut features = Vec::new();

    for (i, feature) in own.iter().enumerate() {
        let mut piece = own_polys[i].clone();
        for j in other_index.candidates(&feature.geometry) {
            piece = piece.difference(&other_polys[j]);
            if piece.0.is_empty() {
                break;
            }
        }
        if piece.unsigned_area() > epsilon {
            features.push(Feature {
                id: feature.id.clone(),
                geometry: normalize(piece),
                properties: feature.properties.clone(),
            });
        }
    }

    features
}

/// Attribute merge for intersection pieces: colliding column names get
/// a `_1` (first input) / `_2` (second input) suffix; the rest pass
/// through unchanged.
fn merge_properties(a: &Properties, b: &Properties) -> Properties {
    let mut merged = Properties::new();
    for (name, value) in a {
        if b.contains_key(name) {
            merged.insert(format!("{}_1", name), value.clone());
        } else {
            merged.insert(name.clone(), value.clone());
        }
    }
    for (name, value) in b {
        if a.contains_key(name) {
            merged.insert(format!("{}_2", name), value.clone());
        } else {
            merged.insert(name.clone(), value.clone());
        }
    }
    merged
}

/// Collapse single-polygon results back to plain polygons
fn normalize(mut multi: MultiPolygon<f64>) -> Geometry<f64> {
    if multi.0.len() == 1 {
        Geometry::Polygon(multi.0.remove(0))
    } else {
        Geometry::MultiPolygon(multi)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{polygon, Point};
    use geoflow_core::crs::lookup_epsg;
    use geoflow_core::models::Crs;

    fn wgs84() -> Crs {
        lookup_epsg(4326).unwrap()
    }

    fn square(x: f64, y: f64, size: f64) -> Geometry<f64> {
        Geometry::Polygon(polygon![
            (x: x, y: y),
            (x: x + size, y: y),
            (x: x + size, y: y + size),
            (x: x, y: y + size),
            (x: x, y: y),
        ])
    }

    fn single(geometry: Geometry<f64>, name: &str) -> FeatureCollection {
        let mut collection = FeatureCollection::new(wgs84());
        collection.push(
            Feature::new(geometry).with_property("name", serde_json::json!(name)),
        );
        collection
    }

    fn total_area(collection: &FeatureCollection) -> f64 {
        collection
            .iter()
            .map(|f| match &f.geometry {
                Geometry::Polygon(p) => p.unsigned_area(),
                Geometry::MultiPolygon(mp) => mp.unsigned_area(),
                _ => 0.0,
            })
            .sum()
    }

    #[test]
    fn test_half_overlap_intersection() {
        // B covers exactly the right half of A
        let a = single(square(0.0, 0.0, 2.0), "a");
        let b = single(square(1.0, 0.0, 2.0), "b");

        let result = overlay(&a, &b, OverlayMode::Intersection).unwrap();

        assert_eq!(result.len(), 1);
        let area = total_area(&result);
        assert!(
            (area - 2.0).abs() < 1e-9,
            "intersection area should be half of A's 4.0, got {}",
            area
        );
    }

    #[test]
    fn test_crs_mismatch_never_reprojects() {
        let a = single(square(0.0, 0.0, 2.0), "a");
        let mut b = FeatureCollection::new(lookup_epsg(3857).unwrap());
        b.push(Feature::new(square(0.0, 0.0, 2.0)));

        for mode in [
            OverlayMode::Intersection,
            OverlayMode::Union,
            OverlayMode::Difference,
            OverlayMode::SymmetricDifference,
            OverlayMode::Identity,
        ] {
            let result = overlay(&a, &b, mode);
            assert!(
                matches!(result, Err(GeoflowError::CrsMismatch { .. })),
                "mode {:?} must fail with CrsMismatch",
                mode
            );
        }
    }

    #[test]
    fn test_union_area_completeness() {
        // Two unit-4 squares overlapping by 2
        let a = single(square(0.0, 0.0, 2.0), "a");
        let b = single(square(1.0, 0.0, 2.0), "b");

        let result = overlay(&a, &b, OverlayMode::Union).unwrap();

        // sum of inputs minus overlap: 4 + 4 - 2
        let area = total_area(&result);
        assert!(
            (area - 6.0).abs() < 1e-9,
            "union output area should be 6.0, got {}",
            area
        );
    }

    #[test]
    fn test_difference() {
        let a = single(square(0.0, 0.0, 2.0), "a");
        let b = single(square(1.0, 0.0, 2.0), "b");

        let result = overlay(&a, &b, OverlayMode::Difference).unwrap();

        assert_eq!(result.len(), 1);
        assert!((total_area(&result) - 2.0).abs() < 1e-9);
        // Difference keeps only the first input's attributes
        assert_eq!(
            result.features()[0].properties["name"],
            serde_json::json!("a")
        );
    }

    #[test]
    fn test_symmetric_difference() {
        let a = single(square(0.0, 0.0, 2.0), "a");
        let b = single(square(1.0, 0.0, 2.0), "b");

        let result = overlay(&a, &b, OverlayMode::SymmetricDifference).unwrap();

        assert_eq!(result.len(), 2);
        assert!((total_area(&result) - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_identity_preserves_first_extent() {
        let a = single(square(0.0, 0.0, 2.0), "a");
        let b = single(square(1.0, 0.0, 2.0), "b");

        let result = overlay(&a, &b, OverlayMode::Identity).unwrap();

        // The split pieces together cover exactly A
        assert_eq!(result.len(), 2);
        assert!((total_area(&result) - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_disjoint_intersection_is_empty() {
        let a = single(square(0.0, 0.0, 1.0), "a");
        let b = single(square(10.0, 10.0, 1.0), "b");

        let result = overlay(&a, &b, OverlayMode::Intersection).unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn test_attribute_suffixes_on_collision() {
        let a = single(square(0.0, 0.0, 2.0), "left");
        let b = single(square(1.0, 0.0, 2.0), "right");

        let result = overlay(&a, &b, OverlayMode::Intersection).unwrap();

        let properties = &result.features()[0].properties;
        assert_eq!(properties["name_1"], serde_json::json!("left"));
        assert_eq!(properties["name_2"], serde_json::json!("right"));
        assert!(!properties.contains_key("name"));
    }

    #[test]
    fn test_distinct_columns_kept_as_is() {
        let mut a = FeatureCollection::new(wgs84());
        a.push(
            Feature::new(square(0.0, 0.0, 2.0))
                .with_property("commune", serde_json::json!("Paris")),
        );
        let mut b = FeatureCollection::new(wgs84());
        b.push(
            Feature::new(square(1.0, 0.0, 2.0))
                .with_property("zone", serde_json::json!("flood")),
        );

        let result = overlay(&a, &b, OverlayMode::Intersection).unwrap();

        let properties = &result.features()[0].properties;
        assert_eq!(properties["commune"], serde_json::json!("Paris"));
        assert_eq!(properties["zone"], serde_json::json!("flood"));
    }

    #[test]
    fn test_non_polygonal_input_rejected() {
        let a = single(Geometry::Point(Point::new(0.0, 0.0)), "a");
        let b = single(square(0.0, 0.0, 1.0), "b");

        let result = overlay(&a, &b, OverlayMode::Intersection);
        assert!(matches!(result, Err(GeoflowError::InvalidGeometry { .. })));
    }

    #[test]
    fn test_mode_parsing() {
        assert_eq!(
            "symmetric_difference".parse::<OverlayMode>().unwrap(),
            OverlayMode::SymmetricDifference
        );
        assert_eq!(
            "Intersection".parse::<OverlayMode>().unwrap(),
            OverlayMode::Intersection
        );
        assert!("bogus".parse::<OverlayMode>().is_err());
    }
}
