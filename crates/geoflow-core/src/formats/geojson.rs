//! GeoJSON format reader and writer.
//!
//! Coordinates are taken as-is; per RFC 7946 a GeoJSON document is in
//! WGS 84 unless the legacy `crs` foreign member says otherwise, which
//! this reader still honors for data exported by older tooling.

use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::Path;

use crate::crs::{CrsDefinition, CrsResolver};
use crate::error::{GeoflowError, Result};
use crate::formats::{FormatReader, FormatValidation, FormatWriter};
use crate::models::{Feature, FeatureCollection};

/// GeoJSON format reader
pub struct GeoJsonReader;

impl FormatReader for GeoJsonReader {
    fn read(&self, path: &Path) -> Result<FeatureCollection> {
        let content = fs::read_to_string(path).map_err(GeoflowError::Io)?;

        let geojson: geojson::GeoJson = content.parse().map_err(|e| {
            GeoflowError::format_error("GeoJSON", format!("Failed to parse GeoJSON: {}", e))
        })?;

        let epsg = extract_epsg(&geojson);
        let mut resolver = CrsResolver::new();
        let crs = resolver.resolve(&CrsDefinition::Epsg(epsg))?;

        let features = match geojson {
            geojson::GeoJson::FeatureCollection(fc) => fc
                .features
                .into_iter()
                .enumerate()
                .map(|(idx, feature)| convert_feature(feature, idx))
                .collect::<Result<Vec<_>>>()?,
            geojson::GeoJson::Feature(feature) => vec![convert_feature(feature, 0)?],
            geojson::GeoJson::Geometry(geometry) => {
                vec![Feature::new(convert_geometry(geometry, 0)?)]
            }
        };

        Ok(FeatureCollection::from_features(crs, features))
    }

    fn supported_extensions(&self) -> &[&str] {
        &["json", "geojson"]
    }

    fn format_name(&self) -> &str {
        "GeoJSON"
    }

    fn validate(&self, path: &Path) -> Result<FormatValidation> {
        let mut validation = FormatValidation::file_exists(path);
        if !validation.is_valid() {
            return Ok(validation);
        }

        match fs::read_to_string(path) {
            Ok(content) => {
                if let Err(e) = content.parse::<geojson::GeoJson>() {
                    validation.errors.push(format!("Invalid GeoJSON: {}", e));
                }
            }
            Err(e) => {
                validation.errors.push(format!("Cannot read file: {}", e));
            }
        }

        Ok(validation)
    }
}

/// Extract the EPSG code of the document, honoring the legacy `crs`
/// foreign member; RFC 7946 documents have none and default to 4326.
fn extract_epsg(geojson: &geojson::GeoJson) -> u32 {
    let foreign = match geojson {
        geojson::GeoJson::FeatureCollection(fc) => fc.foreign_members.as_ref(),
        geojson::GeoJson::Feature(feature) => feature.foreign_members.as_ref(),
        geojson::GeoJson::Geometry(_) => None,
    };

    match foreign.and_then(|fm| fm.get("crs")) {
        Some(crs_member) => match epsg_from_crs_member(crs_member) {
            Some(code) => code,
            None => {
                tracing::warn!("Unparseable crs member {}, assuming EPSG:4326", crs_member);
                4326
            }
        },
        None => 4326,
    }
}

/// Parse "EPSG:4326" or "urn:ogc:def:crs:EPSG::4326" name forms
fn epsg_from_crs_member(crs: &serde_json::Value) -> Option<u32> {
    let name = crs.get("properties")?.get("name")?.as_str()?;
    let code = name.rsplit(':').next()?;
    code.parse().ok()
}

/// Convert a GeoJSON feature, using the index for error locations and
/// missing ids
fn convert_feature(feature: geojson::Feature, idx: usize) -> Result<Feature> {
    let geometry = feature.geometry.ok_or_else(|| {
        GeoflowError::invalid_geometry(format!("feature[{}]", idx), "feature has no geometry")
    })?;

    let id = feature.id.map(|id| match id {
        geojson::feature::Id::String(s) => s,
        geojson::feature::Id::Number(n) => n.to_string(),
    });

    let properties: HashMap<String, serde_json::Value> = feature
        .properties
        .map(|props| props.into_iter().collect())
        .unwrap_or_default();

    Ok(Feature {
        id,
        geometry: convert_geometry(geometry, idx)?,
        properties,
    })
}

fn convert_geometry(geometry: geojson::Geometry, idx: usize) -> Result<geo::Geometry<f64>> {
    geo::Geometry::<f64>::try_from(geometry.value).map_err(|e| {
        GeoflowError::invalid_geometry(format!("feature[{}]", idx), e.to_string())
    })
}

/// GeoJSON format writer
pub struct GeoJsonWriter;

impl FormatWriter for GeoJsonWriter {
    fn write(&self, collection: &FeatureCollection, path: &Path) -> Result<()> {
        let features: Vec<geojson::Feature> = collection
            .iter()
            .map(|feature| geojson::Feature {
                bbox: None,
                geometry: Some(geojson::Geometry::new(geojson::Value::from(
                    &feature.geometry,
                ))),
                id: feature
                    .id
                    .clone()
                    .map(geojson::feature::Id::String),
                properties: Some(
                    feature
                        .properties
                        .iter()
                        .map(|(k, v)| (k.clone(), v.clone()))
                        .collect(),
                ),
                foreign_members: None,
            })
            .collect();

        // Emit the legacy crs member only when the collection is not in
        // the RFC 7946 default.
        let foreign_members = if collection.crs().code != 4326 {
            let mut members = serde_json::Map::new();
            members.insert(
                "crs".to_string(),
                serde_json::json!({
                    "type": "name",
                    "properties": {
                        "name": format!("urn:ogc:def:crs:EPSG::{}", collection.crs().code)
                    }
                }),
            );
            Some(members)
        } else {
            None
        };

        let fc = geojson::FeatureCollection {
            bbox: None,
            features,
            foreign_members,
        };

        let mut file = fs::File::create(path).map_err(GeoflowError::Io)?;
        let serialized = geojson::GeoJson::FeatureCollection(fc).to_string();
        file.write_all(serialized.as_bytes()).map_err(GeoflowError::Io)?;
        Ok(())
    }

    fn supported_extensions(&self) -> &[&str] {
        &["json", "geojson"]
    }

    fn format_name(&self) -> &str {
        "GeoJSON"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{Geometry, Point};

    #[test]
    fn test_read_feature_collection() {
        let reader = GeoJsonReader;

        let temp_dir = tempfile::tempdir().unwrap();
        let file_path = temp_dir.path().join("test.geojson");

        let geojson_content = r#"{
            "type": "FeatureCollection",
            "features": [
                {
                    "type": "Feature",
                    "id": "feature1",
                    "geometry": {
                        "type": "Point",
                        "coordinates": [2.35, 48.85]
                    },
                    "properties": {
                        "name": "Paris"
                    }
                }
            ]
        }"#;

        fs::write(&file_path, geojson_content).unwrap();

        let collection = reader.read(&file_path).unwrap();

        assert_eq!(collection.crs().code, 4326);
        assert_eq!(collection.len(), 1);
        assert_eq!(collection.features()[0].id.as_deref(), Some("feature1"));
        assert_eq!(
            collection.features()[0].properties["name"],
            serde_json::json!("Paris")
        );
    }

    #[test]
    fn test_read_with_legacy_crs_member() {
        let reader = GeoJsonReader;

        let temp_dir = tempfile::tempdir().unwrap();
        let file_path = temp_dir.path().join("test.geojson");

        let geojson_content = r#"{
            "type": "FeatureCollection",
            "crs": {
                "type": "name",
                "properties": { "name": "urn:ogc:def:crs:EPSG::3857" }
            },
            "features": [
                {
                    "type": "Feature",
                    "geometry": { "type": "Point", "coordinates": [0.0, 0.0] },
                    "properties": {}
                }
            ]
        }"#;

        fs::write(&file_path, geojson_content).unwrap();

        let collection = reader.read(&file_path).unwrap();
        assert_eq!(collection.crs().code, 3857);
    }

    #[test]
    fn test_read_single_feature_defaults_to_wgs84() {
        let reader = GeoJsonReader;

        let temp_dir = tempfile::tempdir().unwrap();
        let file_path = temp_dir.path().join("test.geojson");

        let geojson_content = r#"{
            "type": "Feature",
            "geometry": { "type": "Point", "coordinates": [1.0, 2.0] },
            "properties": { "name": "single" }
        }"#;

        fs::write(&file_path, geojson_content).unwrap();

        let collection = reader.read(&file_path).unwrap();
        assert_eq!(collection.crs().code, 4326);
        assert_eq!(collection.len(), 1);
    }

    #[test]
    fn test_validate_rejects_invalid_json() {
        let reader = GeoJsonReader;

        let temp_dir = tempfile::tempdir().unwrap();
        let file_path = temp_dir.path().join("invalid.geojson");
        fs::write(&file_path, "not valid json").unwrap();

        let validation = reader.validate(&file_path).unwrap();
        assert!(!validation.is_valid());
    }

    #[test]
    fn test_write_then_read_preserves_crs_and_attributes() {
        let temp_dir = tempfile::tempdir().unwrap();
        let file_path = temp_dir.path().join("out.geojson");

        let crs = crate::crs::lookup_epsg(3857).unwrap();
        let mut collection = FeatureCollection::new(crs);
        collection.push(
            Feature::new(Geometry::Point(Point::new(261848.0, 6250566.0)))
                .with_id("p1")
                .with_property("name", serde_json::json!("Paris")),
        );

        GeoJsonWriter.write(&collection, &file_path).unwrap();
        let read_back = GeoJsonReader.read(&file_path).unwrap();

        assert_eq!(read_back.crs().code, 3857);
        assert_eq!(read_back.len(), 1);
        assert_eq!(read_back.features()[0].id.as_deref(), Some("p1"));
        assert_eq!(
            read_back.features()[0].properties["name"],
            serde_json::json!("Paris")
        );
    }

    #[test]
    fn test_supported_extensions() {
        assert_eq!(GeoJsonReader.supported_extensions(), &["json", "geojson"]);
        assert_eq!(GeoJsonWriter.format_name(), "GeoJSON");
    }
}
