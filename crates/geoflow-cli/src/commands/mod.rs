//! Command implementations

mod dissolve;
mod info;
mod overlay;
mod reproject;
mod resolve;
mod simplify;

use anyhow::{Context, Result};
use std::path::Path;

use geoflow_core::config::LayeredConfig;
use geoflow_core::formats;
use geoflow_core::models::FeatureCollection;
use geoflow_geo::validation::validate_collection;

use crate::cli::{Cli, Commands};
use crate::output::OutputWriter;

/// Execute a CLI command
pub fn execute(cli: Cli) -> Result<()> {
    let output = OutputWriter::new(cli.json);

    let mut config = LayeredConfig::with_defaults();
    if let Some(path) = &cli.config {
        config = config
            .load_from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?;
    }
    let config = config.load_from_env();
    tracing::debug!("effective configuration: {:?}", config);

    match cli.command {
        Commands::Info(args) => info::execute(args, &config, &output),
        Commands::Resolve(args) => resolve::execute(args, &config, &output),
        Commands::Reproject(args) => reproject::execute(args, &config, &output),
        Commands::Overlay(args) => overlay::execute(args, &config, &output),
        Commands::Dissolve(args) => dissolve::execute(args, &config, &output),
        Commands::Simplify(args) => simplify::execute(args, &config, &output),
    }
}

/// Load a dataset and validate its geometries per the configured mode
pub(crate) fn load_validated(path: &Path, config: &LayeredConfig) -> Result<FeatureCollection> {
    let collection =
        formats::load(path).with_context(|| format!("Failed to load {}", path.display()))?;
    validate_collection(&collection, config.geometry_validity.value)
        .with_context(|| format!("Invalid geometry in {}", path.display()))?;
    Ok(collection)
}
