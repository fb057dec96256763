//! Info command: summarize a vector dataset

use anyhow::Result;
use geo::algorithm::bounding_rect::BoundingRect;
use serde::Serialize;
use std::collections::BTreeSet;
use tabled::Tabled;

use geoflow_core::config::LayeredConfig;
use geoflow_core::models::FeatureCollection;

use crate::cli::InfoArgs;
use crate::commands::load_validated;
use crate::output::OutputWriter;

#[derive(Tabled, Serialize)]
struct DatasetSummary {
    #[tabled(rename = "Dataset")]
    name: String,
    #[tabled(rename = "Features")]
    features: usize,
    #[tabled(rename = "Geometry")]
    geometry_types: String,
    #[tabled(rename = "CRS")]
    crs: String,
    #[tabled(rename = "Columns")]
    columns: String,
    #[tabled(rename = "Bounds")]
    bounds: String,
}

pub fn execute(args: InfoArgs, config: &LayeredConfig, output: &OutputWriter) -> Result<()> {
    let collection = load_validated(&args.path, config)?;

    let name = args
        .path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("unnamed")
        .to_string();

    let summary = DatasetSummary {
        name,
        features: collection.len(),
        geometry_types: geometry_types(&collection),
        crs: collection.crs().to_string(),
        columns: collection.columns().join(", "),
        bounds: bounds_of(&collection),
    };

    output.table(&[summary]);
    Ok(())
}

fn geometry_types(collection: &FeatureCollection) -> String {
    let kinds: BTreeSet<&str> = collection
        .iter()
        .map(|f| match &f.geometry {
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
        })
        .collect();
    kinds.into_iter().collect::<Vec<_>>().join(", ")
}

fn bounds_of(collection: &FeatureCollection) -> String {
    let mut min_x = f64::INFINITY;
    let mut min_y = f64::INFINITY;
    let mut max_x = f64::NEG_INFINITY;
    let mut max_y = f64::NEG_INFINITY;

    for feature in collection.iter() {
        if let Some(rect) = feature.geometry.bounding_rect() {
            min_x = min_x.min(rect.min().x);
            min_y = min_y.min(rect.min().y);
            max_x = max_x.max(rect.max().x);
            max_y = max_y.max(rect.max().y);
        }
    }

    if min_x.is_finite() {
        format!("[{:.4}, {:.4}, {:.4}, {:.4}]", min_x, min_y, max_x, max_y)
    } else {
        "empty".to_string()
    }
}
