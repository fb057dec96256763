//! Reproject command: load, transform into the target CRS, save

use anyhow::{Context, Result};

use geoflow_core::config::LayeredConfig;
use geoflow_core::crs::CrsResolver;
use geoflow_core::formats;
use geoflow_geo::transform::reproject;

use crate::cli::ReprojectArgs;
use crate::commands::load_validated;
use crate::output::OutputWriter;

pub fn execute(args: ReprojectArgs, config: &LayeredConfig, output: &OutputWriter) -> Result<()> {
    let collection = load_validated(&args.input, config)?;

    let mut resolver = CrsResolver::with_threshold(config.confidence_threshold.value);
    let target = resolver
        .resolve_str(&args.to)
        .with_context(|| format!("Cannot resolve target CRS '{}'", args.to))?;

    let source = collection.crs().clone();
    let reprojected = reproject(&collection, &target)?;

    formats::save(&reprojected, &args.output)
        .with_context(|| format!("Failed to save {}", args.output.display()))?;

    output.success(format!(
        "Reprojected {} features from {} to {} into {}",
        reprojected.len(),
        source,
        target,
        args.output.display()
    ));
    Ok(())
}
