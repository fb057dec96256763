//! Shapefile format reader and writer.
//!
//! Shapefiles consist of multiple component files (.shp, .shx, .dbf,
//! .prj) that must all be present for proper reading. The `.prj`
//! sidecar carries the CRS as WKT and is parsed through the CRS
//! resolver; a missing or unresolvable sidecar falls back to EPSG:4326
//! with a warning.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use shapefile::dbase::{self, FieldValue as DbaseFieldValue};
use shapefile::{PolygonRing, Shape};

use crate::crs::{CrsDefinition, CrsResolver};
use crate::error::{GeoflowError, Result};
use crate::formats::{FormatReader, FormatValidation, FormatWriter};
use crate::models::{Crs, Feature, FeatureCollection, Properties};

/// Threshold used when resolving `.prj` content. Sidecars written by
/// desktop GIS tools often lack authority tags, so name matching has to
/// be allowed to win.
const PRJ_CONFIDENCE_THRESHOLD: u8 = 40;

const REQUIRED_EXTENSIONS: [&str; 3] = ["shp", "shx", "dbf"];

/// Shapefile format reader
pub struct ShapefileReader;

impl FormatReader for ShapefileReader {
    fn read(&self, path: &Path) -> Result<FeatureCollection> {
        verify_components(path)?;

        let mut reader = shapefile::Reader::from_path(path).map_err(|e| {
            GeoflowError::format_error("Shapefile", format!("Failed to open shapefile: {}", e))
        })?;

        let crs = extract_crs(path)?;
        let mut features = Vec::new();

        for (idx, result) in reader.iter_shapes_and_records().enumerate() {
            let (shape, record) = result.map_err(|e| {
                GeoflowError::format_error("Shapefile", format!("Failed to read feature: {}", e))
            })?;

            let geometry = match convert_shape(shape, idx)? {
                Some(geometry) => geometry,
                None => {
                    tracing::warn!("Skipping null shape at record {}", idx);
                    continue;
                }
            };

            features.push(Feature {
                id: Some(idx.to_string()),
                geometry,
                properties: convert_record(record),
            });
        }

        Ok(FeatureCollection::from_features(crs, features))
    }

    fn supported_extensions(&self) -> &[&str] {
        &["shp"]
    }

    fn format_name(&self) -> &str {
        "Shapefile"
    }

    fn validate(&self, path: &Path) -> Result<FormatValidation> {
        let mut validation = FormatValidation::file_exists(path);
        if !validation.is_valid() {
            return Ok(validation);
        }

        let base = match shapefile_base(path) {
            Ok(base) => base,
            Err(e) => {
                validation.errors.push(format!("Invalid shapefile path: {}", e));
                return Ok(validation);
            }
        };

        let mut components = FormatValidation::default();
        for ext in REQUIRED_EXTENSIONS {
            if !base.with_extension(ext).exists() {
                components
                    .errors
                    .push(format!("Missing required component file: .{}", ext));
            }
        }
        if !base.with_extension("prj").exists() {
            components
                .warnings
                .push("No .prj sidecar; CRS will default to EPSG:4326".to_string());
        }

        Ok(FormatValidation::merge(vec![validation, components]))
    }
}

/// Base path of the shapefile (without extension)
fn shapefile_base(path: &Path) -> Result<PathBuf> {
    let is_shp = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("shp"))
        .unwrap_or(false);
    if !is_shp {
        return Err(GeoflowError::format_error(
            "Shapefile",
            format!("Not a shapefile (.shp): {}", path.display()),
        ));
    }
    Ok(path.with_extension(""))
}

/// Verify that all required shapefile component files exist
fn verify_components(path: &Path) -> Result<()> {
    let base = shapefile_base(path)?;
    let missing: Vec<String> = REQUIRED_EXTENSIONS
        .iter()
        .filter(|ext| !base.with_extension(ext).exists())
        .map(|ext| format!(".{}", ext))
        .collect();

    if !missing.is_empty() {
        return Err(GeoflowError::format_error(
            "Shapefile",
            format!("Missing required component files: {}", missing.join(", ")),
        ));
    }
    Ok(())
}

/// Resolve the CRS from the `.prj` sidecar, defaulting to EPSG:4326
fn extract_crs(path: &Path) -> Result<Crs> {
    let base = shapefile_base(path)?;
    let prj_path = base.with_extension("prj");
    let mut resolver = CrsResolver::with_threshold(PRJ_CONFIDENCE_THRESHOLD);

    if !prj_path.exists() {
        tracing::warn!(
            "No .prj sidecar for {}, assuming EPSG:4326",
            path.display()
        );
        return resolver.resolve(&CrsDefinition::Epsg(4326));
    }

    let prj_content = fs::read_to_string(&prj_path).map_err(|e| {
        GeoflowError::format_error("Shapefile", format!("Failed to read .prj file: {}", e))
    })?;

    match resolver.resolve(&CrsDefinition::Wkt(prj_content)) {
        Ok(crs) => Ok(crs),
        Err(e) => {
            tracing::warn!(
                "Could not resolve .prj for {} ({}), assuming EPSG:4326",
                path.display(),
                e
            );
            resolver.resolve(&CrsDefinition::Epsg(4326))
        }
    }
}

/// Convert a shapefile shape to a geo geometry. `Ok(None)` is a null
/// shape (no geometry).
fn convert_shape(shape: Shape, idx: usize) -> Result<Option<geo::Geometry<f64>>> {
    let geometry = match shape {
        Shape::Point(p) => geo::Geometry::Point(geo::Point::new(p.x, p.y)),
        Shape::PointZ(p) => geo::Geometry::Point(geo::Point::new(p.x, p.y)),
        Shape::PointM(p) => geo::Geometry::Point(geo::Point::new(p.x, p.y)),
        Shape::Polyline(polyline) => polyline_to_geo(
            polyline.parts().iter().map(|part| part.iter().map(|p| (p.x, p.y)).collect()),
        ),
        Shape::PolylineZ(polyline) => polyline_to_geo(
            polyline.parts().iter().map(|part| part.iter().map(|p| (p.x, p.y)).collect()),
        ),
        Shape::PolylineM(polyline) => polyline_to_geo(
            polyline.parts().iter().map(|part| part.iter().map(|p| (p.x, p.y)).collect()),
        ),
        Shape::Polygon(polygon) => rings_to_geo(
            polygon
                .rings()
                .iter()
                .map(|ring| {
                    let points = ring.points().iter().map(|p| (p.x, p.y)).collect();
                    (matches!(ring, PolygonRing::Outer(_)), points)
                })
                .collect(),
        ),
        Shape::PolygonZ(polygon) => rings_to_geo(
            polygon
                .rings()
                .iter()
                .map(|ring| {
                    let points = ring.points().iter().map(|p| (p.x, p.y)).collect();
                    (matches!(ring, PolygonRing::Outer(_)), points)
                })
                .collect(),
        ),
        Shape::PolygonM(polygon) => rings_to_geo(
            polygon
                .rings()
                .iter()
                .map(|ring| {
                    let points = ring.points().iter().map(|p| (p.x, p.y)).collect();
                    (matches!(ring, PolygonRing::Outer(_)), points)
                })
                .collect(),
        ),
        Shape::Multipoint(multipoint) => geo::Geometry::MultiPoint(geo::MultiPoint::new(
            multipoint.points().iter().map(|p| geo::Point::new(p.x, p.y)).collect(),
        )),
        Shape::MultipointZ(multipoint) => geo::Geometry::MultiPoint(geo::MultiPoint::new(
            multipoint.points().iter().map(|p| geo::Point::new(p.x, p.y)).collect(),
        )),
        Shape::MultipointM(multipoint) => geo::Geometry::MultiPoint(geo::MultiPoint::new(
            multipoint.points().iter().map(|p| geo::Point::new(p.x, p.y)).collect(),
        )),
        Shape::Multipatch(_) => {
            return Err(GeoflowError::invalid_geometry(
                format!("record[{}]", idx),
                "Multipatch geometry type is not supported",
            ));
        }
        Shape::NullShape => return Ok(None),
    };

    Ok(Some(geometry))
}

fn polyline_to_geo(parts: impl Iterator<Item = Vec<(f64, f64)>>) -> geo::Geometry<f64> {
    let lines: Vec<geo::LineString<f64>> = parts
        .map(|part| geo::LineString::from(part))
        .collect();

    if lines.len() == 1 {
        geo::Geometry::LineString(lines.into_iter().next().unwrap())
    } else {
        geo::Geometry::MultiLineString(geo::MultiLineString::new(lines))
    }
}

/// Reassemble shapefile rings into polygons: each outer ring starts a
/// new polygon, inner rings attach to the most recent outer.
fn rings_to_geo(rings: Vec<(bool, Vec<(f64, f64)>)>) -> geo::Geometry<f64> {
    let mut polygons: Vec<(geo::LineString<f64>, Vec<geo::LineString<f64>>)> = Vec::new();

    for (is_outer, points) in rings {
        let ring = geo::LineString::from(points);
        if is_outer || polygons.is_empty() {
            polygons.push((ring, Vec::new()));
        } else {
            polygons.last_mut().unwrap().1.push(ring);
        }
    }

    let mut built: Vec<geo::Polygon<f64>> = polygons
        .into_iter()
        .map(|(exterior, interiors)| geo::Polygon::new(exterior, interiors))
        .collect();

    if built.len() == 1 {
        geo::Geometry::Polygon(built.remove(0))
    } else {
        geo::Geometry::MultiPolygon(geo::MultiPolygon::new(built))
    }
}

/// Convert a dBase record to an attribute map
fn convert_record(record: dbase::Record) -> Properties {
    let mut properties = Properties::new();
    for (name, value) in record {
        properties.insert(name, convert_dbase_value(value));
    }
    properties
}

fn convert_dbase_value(value: DbaseFieldValue) -> serde_json::Value {
    match value {
        DbaseFieldValue::Character(Some(s)) => serde_json::Value::String(s),
        DbaseFieldValue::Character(None) => serde_json::Value::Null,
        DbaseFieldValue::Numeric(Some(n)) => number_value(n),
        DbaseFieldValue::Numeric(None) => serde_json::Value::Null,
        DbaseFieldValue::Logical(Some(b)) => serde_json::Value::Bool(b),
        DbaseFieldValue::Logical(None) => serde_json::Value::Null,
        DbaseFieldValue::Date(Some(date)) => serde_json::Value::String(format!(
            "{:04}-{:02}-{:02}",
            date.year(),
            date.month(),
            date.day()
        )),
        DbaseFieldValue::Date(None) => serde_json::Value::Null,
        DbaseFieldValue::Float(Some(f)) => number_value(f as f64),
        DbaseFieldValue::Float(None) => serde_json::Value::Null,
        DbaseFieldValue::Integer(i) => serde_json::Value::Number(i.into()),
        DbaseFieldValue::Currency(c) => number_value(c),
        DbaseFieldValue::DateTime(dt) => serde_json::Value::String(format!(
            "{:04}-{:02}-{:02}",
            dt.date().year(),
            dt.date().month(),
            dt.date().day()
        )),
        DbaseFieldValue::Double(d) => number_value(d),
        DbaseFieldValue::Memo(s) => serde_json::Value::String(s),
    }
}

fn number_value(n: f64) -> serde_json::Value {
    serde_json::Number::from_f64(n)
        .map(serde_json::Value::Number)
        .unwrap_or(serde_json::Value::Null)
}

/// The single shape class a shapefile can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ShapeClass {
    Point,
    Multipoint,
    Polyline,
    Polygon,
}

impl ShapeClass {
    fn of(geometry: &geo::Geometry<f64>, idx: usize) -> Result<Self> {
        match geometry {
            geo::Geometry::Point(_) => Ok(Self::Point),
            geo::Geometry::MultiPoint(_) => Ok(Self::Multipoint),
            geo::Geometry::LineString(_) | geo::Geometry::MultiLineString(_) => Ok(Self::Polyline),
            geo::Geometry::Polygon(_) | geo::Geometry::MultiPolygon(_) => Ok(Self::Polygon),
            other => Err(GeoflowError::invalid_geometry(
                format!("feature[{}]", idx),
                format!("geometry type {:?} cannot be stored in a shapefile", kind_of(other)),
            )),
        }
    }
}

fn kind_of(geometry: &geo::Geometry<f64>) -> &'static str {
    match geometry {
        geo::Geometry::Point(_) => "Point",
        geo::Geometry::Line(_) => "Line",
        geo::Geometry::LineString(_) => "LineString",
        geo::Geometry::Polygon(_) => "Polygon",
        geo::Geometry::MultiPoint(_) => "MultiPoint",
        geo::Geometry::MultiLineString(_) => "MultiLineString",
        geo::Geometry::MultiPolygon(_) => "MultiPolygon",
        geo::Geometry::GeometryCollection(_) => "GeometryCollection",
        geo::Geometry::Rect(_) => "Rect",
        geo::Geometry::Triangle(_) => "Triangle",
    }
}

/// Column schema derived from the collection's attributes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColumnType {
    Character,
    Numeric,
    Logical,
}

/// Shapefile format writer
pub struct ShapefileWriter;

impl FormatWriter for ShapefileWriter {
    fn write(&self, collection: &FeatureCollection, path: &Path) -> Result<()> {
        let base = shapefile_base(path)?;

        let class = collection_class(collection)?;
        let columns = infer_columns(collection)?;

        let mut table_builder = dbase::TableWriterBuilder::new();
        for (name, column_type) in &columns {
            let field_name = dbase::FieldName::try_from(name.as_str()).map_err(|e| {
                GeoflowError::format_error(
                    "Shapefile",
                    format!("Invalid dBase field name '{}': {}", name, e),
                )
            })?;
            table_builder = match column_type {
                ColumnType::Character => table_builder.add_character_field(field_name, 254),
                ColumnType::Numeric => table_builder.add_numeric_field(field_name, 24, 6),
                ColumnType::Logical => table_builder.add_logical_field(field_name),
            };
        }

        let mut writer = shapefile::Writer::from_path(path, table_builder).map_err(|e| {
            GeoflowError::format_error("Shapefile", format!("Failed to create shapefile: {}", e))
        })?;

        for (idx, feature) in collection.iter().enumerate() {
            let record = build_record(&columns, feature);
            write_feature(&mut writer, class, &feature.geometry, &record, idx)?;
        }

        write_prj(&base, collection.crs());
        Ok(())
    }

    fn supported_extensions(&self) -> &[&str] {
        &["shp"]
    }

    fn format_name(&self) -> &str {
        "Shapefile"
    }
}

/// The shape class shared by every feature. A shapefile holds exactly
/// one class; mixed collections are rejected before any file is
/// created.
fn collection_class(collection: &FeatureCollection) -> Result<ShapeClass> {
    let mut class = None;
    for (idx, feature) in collection.iter().enumerate() {
        let this = ShapeClass::of(&feature.geometry, idx)?;
        match class {
            None => class = Some(this),
            Some(existing) if existing == this => {}
            Some(existing) => {
                return Err(GeoflowError::invalid_geometry(
                    format!("feature[{}]", idx),
                    format!(
                        "shapefiles hold one shape class per file; collection mixes {:?} and {:?}",
                        existing, this
                    ),
                ));
            }
        }
    }
    class.ok_or_else(|| {
        GeoflowError::format_error("Shapefile", "Cannot write an empty collection")
    })
}

/// Truncate an attribute name to the 10-character dBase limit
fn dbase_name(name: &str) -> String {
    name.chars().take(10).collect()
}

/// Derive the dBase schema: first non-null value per column decides the
/// type; names are truncated to the 10-character dBase limit.
fn infer_columns(collection: &FeatureCollection) -> Result<Vec<(String, ColumnType)>> {
    let mut columns = Vec::new();
    let mut seen = std::collections::HashSet::new();

    for name in collection.columns() {
        let truncated = dbase_name(&name);
        if !seen.insert(truncated.clone()) {
            return Err(GeoflowError::format_error(
                "Shapefile",
                format!(
                    "Column '{}' collides with another column after truncation to the dBase 10-character limit",
                    name
                ),
            ));
        }

        let column_type = collection
            .iter()
            .filter_map(|f| f.properties.get(&name))
            .find(|v| !v.is_null())
            .map(|v| match v {
                serde_json::Value::Number(_) => ColumnType::Numeric,
                serde_json::Value::Bool(_) => ColumnType::Logical,
                _ => ColumnType::Character,
            })
            .unwrap_or(ColumnType::Character);

        columns.push((name, truncated, column_type));
    }

    Ok(columns
        .into_iter()
        .map(|(_, truncated, column_type)| (truncated, column_type))
        .collect())
}

fn build_record(columns: &[(String, ColumnType)], feature: &Feature) -> dbase::Record {
    // Truncated column names still index the original properties
    let by_truncated: HashMap<String, &serde_json::Value> = feature
        .properties
        .iter()
        .map(|(k, v)| (dbase_name(k), v))
        .collect();

    let mut record = dbase::Record::default();
    for (name, column_type) in columns {
        let value = by_truncated.get(name).copied();

        let field_value = match column_type {
            ColumnType::Character => DbaseFieldValue::Character(value.and_then(|v| match v {
                serde_json::Value::String(s) => Some(s.clone()),
                serde_json::Value::Null => None,
                other => Some(other.to_string()),
            })),
            ColumnType::Numeric => DbaseFieldValue::Numeric(value.and_then(|v| v.as_f64())),
            ColumnType::Logical => DbaseFieldValue::Logical(value.and_then(|v| v.as_bool())),
        };
        record.insert(name.clone(), field_value);
    }
    record
}

fn write_feature(
    writer: &mut shapefile::Writer<std::io::BufWriter<std::fs::File>>,
    class: ShapeClass,
    geometry: &geo::Geometry<f64>,
    record: &dbase::Record,
    idx: usize,
) -> Result<()> {
    let write_error = |e: shapefile::Error| {
        GeoflowError::format_error("Shapefile", format!("Failed to write feature {}: {}", idx, e))
    };

    match (class, geometry) {
        (ShapeClass::Point, geo::Geometry::Point(p)) => {
            let shape = shapefile::Point::new(p.x(), p.y());
            writer.write_shape_and_record(&shape, record).map_err(write_error)
        }
        (ShapeClass::Multipoint, geo::Geometry::MultiPoint(mp)) => {
            let points: Vec<shapefile::Point> =
                mp.iter().map(|p| shapefile::Point::new(p.x(), p.y())).collect();
            let shape = shapefile::Multipoint::new(points);
            writer.write_shape_and_record(&shape, record).map_err(write_error)
        }
        (ShapeClass::Polyline, geo::Geometry::LineString(ls)) => {
            let shape = shapefile::Polyline::new(line_points(ls));
            writer.write_shape_and_record(&shape, record).map_err(write_error)
        }
        (ShapeClass::Polyline, geo::Geometry::MultiLineString(mls)) => {
            let parts: Vec<Vec<shapefile::Point>> = mls.iter().map(line_points).collect();
            let shape = shapefile::Polyline::with_parts(parts);
            writer.write_shape_and_record(&shape, record).map_err(write_error)
        }
        (ShapeClass::Polygon, geo::Geometry::Polygon(polygon)) => {
            let shape = shapefile::Polygon::with_rings(polygon_rings(polygon));
            writer.write_shape_and_record(&shape, record).map_err(write_error)
        }
        (ShapeClass::Polygon, geo::Geometry::MultiPolygon(mp)) => {
            let rings: Vec<PolygonRing<shapefile::Point>> =
                mp.iter().flat_map(polygon_rings).collect();
            let shape = shapefile::Polygon::with_rings(rings);
            writer.write_shape_and_record(&shape, record).map_err(write_error)
        }
        _ => Err(GeoflowError::invalid_geometry(
            format!("feature[{}]", idx),
            "geometry does not match the collection's shape class",
        )),
    }
}

fn line_points(line: &geo::LineString<f64>) -> Vec<shapefile::Point> {
    line.coords().map(|c| shapefile::Point::new(c.x, c.y)).collect()
}

fn ring_points(ring: &geo::LineString<f64>) -> Vec<shapefile::Point> {
    let mut points = line_points(ring);
    // Shapefile rings must be explicitly closed
    if points.first().map(|p| (p.x, p.y)) != points.last().map(|p| (p.x, p.y)) {
        if let Some(first) = points.first().copied() {
            points.push(first);
        }
    }
    points
}

fn polygon_rings(polygon: &geo::Polygon<f64>) -> Vec<PolygonRing<shapefile::Point>> {
    let mut rings = vec![PolygonRing::Outer(ring_points(polygon.exterior()))];
    for interior in polygon.interiors() {
        rings.push(PolygonRing::Inner(ring_points(interior)));
    }
    rings
}

/// Write the `.prj` sidecar from the collection CRS's canonical WKT
fn write_prj(base: &Path, crs: &Crs) {
    match &crs.wkt {
        Some(wkt) => {
            if let Err(e) = fs::write(base.with_extension("prj"), wkt) {
                tracing::warn!("Failed to write .prj sidecar: {}", e);
            }
        }
        None => {
            tracing::warn!(
                "No canonical WKT for {}; skipping .prj sidecar",
                crs.authority_code()
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{polygon, Geometry, Point};

    fn wgs84() -> Crs {
        crate::crs::lookup_epsg(4326).unwrap()
    }

    #[test]
    fn test_supported_extensions() {
        assert_eq!(ShapefileReader.supported_extensions(), &["shp"]);
        assert_eq!(ShapefileWriter.format_name(), "Shapefile");
    }

    #[test]
    fn test_validate_missing_file() {
        let validation = ShapefileReader
            .validate(Path::new("/nonexistent/test.shp"))
            .unwrap();
        assert!(!validation.is_valid());
    }

    #[test]
    fn test_not_a_shp_path() {
        assert!(shapefile_base(Path::new("data.geojson")).is_err());
        assert!(shapefile_base(Path::new("data.shp")).is_ok());
    }

    #[test]
    fn test_rings_reassembly() {
        // One outer square with one hole, then a second outer square
        let rings = vec![
            (true, vec![(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0), (0.0, 0.0)]),
            (false, vec![(4.0, 4.0), (6.0, 4.0), (6.0, 6.0), (4.0, 6.0), (4.0, 4.0)]),
            (true, vec![(20.0, 0.0), (30.0, 0.0), (30.0, 10.0), (20.0, 10.0), (20.0, 0.0)]),
        ];

        match rings_to_geo(rings) {
            geo::Geometry::MultiPolygon(mp) => {
                assert_eq!(mp.0.len(), 2);
                assert_eq!(mp.0[0].interiors().len(), 1);
                assert_eq!(mp.0[1].interiors().len(), 0);
            }
            other => panic!("Expected MultiPolygon, got {:?}", other),
        }
    }

    #[test]
    fn test_mixed_collection_rejected() {
        let mut collection = FeatureCollection::new(wgs84());
        collection.push(Feature::new(Geometry::Point(Point::new(0.0, 0.0))));
        collection.push(Feature::new(Geometry::Polygon(polygon![
            (x: 0.0, y: 0.0),
            (x: 1.0, y: 0.0),
            (x: 1.0, y: 1.0),
            (x: 0.0, y: 0.0),
        ])));

        let result = collection_class(&collection);
        assert!(matches!(result, Err(GeoflowError::InvalidGeometry { .. })));
    }

    #[test]
    fn test_column_truncation_collision() {
        let mut collection = FeatureCollection::new(wgs84());
        collection.push(
            Feature::new(Geometry::Point(Point::new(0.0, 0.0)))
                .with_property("population_a", serde_json::json!(1))
                .with_property("population_b", serde_json::json!(2)),
        );

        let result = infer_columns(&collection);
        assert!(matches!(result, Err(GeoflowError::FormatError { .. })));
    }

    #[test]
    fn test_write_then_read_polygons() {
        let temp_dir = tempfile::tempdir().unwrap();
        let file_path = temp_dir.path().join("parcels.shp");

        let mut collection = FeatureCollection::new(wgs84());
        collection.push(
            Feature::new(Geometry::Polygon(polygon![
                (x: 0.0, y: 0.0),
                (x: 1.0, y: 0.0),
                (x: 1.0, y: 1.0),
                (x: 0.0, y: 1.0),
                (x: 0.0, y: 0.0),
            ]))
            .with_property("name", serde_json::json!("parcel-1"))
            .with_property("area_ha", serde_json::json!(1.25)),
        );

        ShapefileWriter.write(&collection, &file_path).unwrap();

        // The .prj sidecar must exist for a registry CRS
        assert!(temp_dir.path().join("parcels.prj").exists());

        let read_back = ShapefileReader.read(&file_path).unwrap();
        assert_eq!(read_back.crs().code, 4326);
        assert_eq!(read_back.len(), 1);
        assert!(matches!(
            read_back.features()[0].geometry,
            Geometry::Polygon(_)
        ));
        assert_eq!(
            read_back.features()[0].properties["name"],
            serde_json::json!("parcel-1")
        );
    }
}
