//! End-to-end pipeline test: load → reproject → overlay → dissolve →
//! simplify → save, across both file formats.

use std::collections::HashMap;
use std::fs;

use geo::{Area, Geometry};
use geoflow_core::crs::lookup_epsg;
use geoflow_core::formats;
use geoflow_geo::dissolve::{dissolve, Aggregate};
use geoflow_geo::overlay::{overlay, OverlayMode};
use geoflow_geo::simplify::simplify;
use geoflow_geo::transform::reproject;
use geoflow_geo::validation::validate_collection;
use tempfile::TempDir;

use geoflow_core::config::ValidityMode;

fn parcels_geojson() -> &'static str {
    r#"{
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "id": "p1",
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[[2.30, 48.80], [2.40, 48.80], [2.40, 48.90], [2.30, 48.90], [2.30, 48.80]]]
                },
                "properties": { "commune": "Paris", "area_ha": 10 }
            },
            {
                "type": "Feature",
                "id": "p2",
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[[2.40, 48.80], [2.50, 48.80], [2.50, 48.90], [2.40, 48.90], [2.40, 48.80]]]
                },
                "properties": { "commune": "Paris", "area_ha": 12 }
            },
            {
                "type": "Feature",
                "id": "p3",
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[[2.60, 48.80], [2.70, 48.80], [2.70, 48.90], [2.60, 48.90], [2.60, 48.80]]]
                },
                "properties": { "commune": "Vincennes", "area_ha": 8 }
            }
        ]
    }"#
}

fn zones_geojson() -> &'static str {
    r#"{
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[[2.35, 48.75], [2.45, 48.75], [2.45, 48.95], [2.35, 48.95], [2.35, 48.75]]]
                },
                "properties": { "zone": "flood" }
            }
        ]
    }"#
}

#[test]
fn test_full_pipeline() {
    let temp_dir = TempDir::new().unwrap();
    let parcels_path = temp_dir.path().join("parcels.geojson");
    let zones_path = temp_dir.path().join("zones.geojson");
    fs::write(&parcels_path, parcels_geojson()).unwrap();
    fs::write(&zones_path, zones_geojson()).unwrap();

    // Load and validate
    let parcels = formats::load(&parcels_path).unwrap();
    let zones = formats::load(&zones_path).unwrap();
    validate_collection(&parcels, ValidityMode::Strict).unwrap();
    assert_eq!(parcels.crs().code, 4326);

    // Overlay: which parcel pieces fall in the flood zone
    let flooded = overlay(&parcels, &zones, OverlayMode::Intersection).unwrap();
    assert_eq!(
        flooded.len(),
        2,
        "the flood zone crosses parcels p1 and p2 only"
    );
    for feature in flooded.iter() {
        assert_eq!(feature.properties["zone"], serde_json::json!("flood"));
        assert!(feature.properties.contains_key("commune"));
    }

    // Dissolve the parcels by commune, summing areas
    let mut aggregations = HashMap::new();
    aggregations.insert("area_ha".to_string(), Aggregate::Sum);
    let communes = dissolve(&parcels, "commune", &aggregations).unwrap();
    assert_eq!(communes.len(), 2);
    assert_eq!(communes.features()[0].id.as_deref(), Some("Paris"));
    assert_eq!(
        communes.features()[0].properties["area_ha"],
        serde_json::json!(22.0)
    );

    // Reproject the dissolved collection to Web Mercator and back
    let mercator = lookup_epsg(3857).unwrap();
    let wgs84 = lookup_epsg(4326).unwrap();
    let projected = reproject(&communes, &mercator).unwrap();
    assert_eq!(projected.crs(), &mercator);

    let back = reproject(&projected, &wgs84).unwrap();
    let (before, after) = (
        area_of(&communes.features()[0].geometry),
        area_of(&back.features()[0].geometry),
    );
    assert!(
        (before - after).abs() / before < 1e-6,
        "round-trip must preserve area within tolerance"
    );

    // Simplify and persist as a shapefile
    let simplified = simplify(&projected, 1.0);
    let out_path = temp_dir.path().join("communes.shp");
    formats::save(&simplified, &out_path).unwrap();

    let read_back = formats::load(&out_path).unwrap();
    assert_eq!(read_back.crs().code, 3857);
    assert_eq!(read_back.len(), 2);
}

#[test]
fn test_overlay_requires_shared_crs() {
    let temp_dir = TempDir::new().unwrap();
    let parcels_path = temp_dir.path().join("parcels.geojson");
    let zones_path = temp_dir.path().join("zones.geojson");
    fs::write(&parcels_path, parcels_geojson()).unwrap();
    fs::write(&zones_path, zones_geojson()).unwrap();

    let parcels = formats::load(&parcels_path).unwrap();
    let zones = formats::load(&zones_path).unwrap();

    let mercator = lookup_epsg(3857).unwrap();
    let projected_zones = reproject(&zones, &mercator).unwrap();

    let result = overlay(&parcels, &projected_zones, OverlayMode::Intersection);
    assert!(
        result.is_err(),
        "overlay across CRS must fail, not silently reproject"
    );
}

fn area_of(geometry: &Geometry<f64>) -> f64 {
    match geometry {
        Geometry::Polygon(p) => p.unsigned_area(),
        Geometry::MultiPolygon(mp) => mp.unsigned_area(),
        _ => 0.0,
    }
}
