//! Resolve command: run the CRS resolver on a textual definition

use anyhow::Result;
use serde::Serialize;
use tabled::Tabled;

use geoflow_core::config::LayeredConfig;
use geoflow_core::crs::CrsResolver;
use geoflow_core::models::AxisOrder;

use crate::cli::ResolveArgs;
use crate::output::OutputWriter;

#[derive(Tabled, Serialize)]
struct CrsRow {
    #[tabled(rename = "CRS")]
    code: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Datum")]
    datum: String,
    #[tabled(rename = "Axis order")]
    axis_order: String,
    #[tabled(rename = "Area of use")]
    area_of_use: String,
}

pub fn execute(args: ResolveArgs, config: &LayeredConfig, output: &OutputWriter) -> Result<()> {
    let threshold = args
        .threshold
        .unwrap_or(config.confidence_threshold.value);
    let mut resolver = CrsResolver::with_threshold(threshold);

    let crs = resolver.resolve_str(&args.definition)?;

    let row = CrsRow {
        code: crs.authority_code(),
        name: crs.name.clone(),
        datum: crs.datum.clone(),
        axis_order: match crs.axis_order {
            AxisOrder::EastNorth => "east, north".to_string(),
            AxisOrder::NorthEast => "north, east".to_string(),
        },
        area_of_use: match crs.area_of_use {
            Some([w, s, e, n]) => format!("[{}, {}, {}, {}]", w, s, e, n),
            None => "unknown".to_string(),
        },
    };

    output.table(&[row]);
    Ok(())
}
