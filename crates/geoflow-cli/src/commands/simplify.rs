//! Simplify command: reduce vertex counts within a tolerance

use anyhow::{Context, Result};

use geoflow_core::config::LayeredConfig;
use geoflow_core::formats;
use geoflow_geo::simplify::{simplify, vertex_count};

use crate::cli::SimplifyArgs;
use crate::commands::load_validated;
use crate::output::OutputWriter;

pub fn execute(args: SimplifyArgs, config: &LayeredConfig, output: &OutputWriter) -> Result<()> {
    let collection = load_validated(&args.input, config)?;

    let before: usize = collection.iter().map(|f| vertex_count(&f.geometry)).sum();
    let result = simplify(&collection, args.tolerance);
    let after: usize = result.iter().map(|f| vertex_count(&f.geometry)).sum();

    formats::save(&result, &args.output)
        .with_context(|| format!("Failed to save {}", args.output.display()))?;

    output.success(format!(
        "Simplified {} features ({} -> {} vertices, tolerance {}) into {}",
        result.len(),
        before,
        after,
        args.tolerance,
        args.output.display()
    ));
    Ok(())
}
