//! Overlay command: set-theoretic combination of two datasets

use anyhow::{Context, Result};

use geoflow_core::config::LayeredConfig;
use geoflow_core::formats;
use geoflow_geo::overlay::{overlay_with_epsilon, OverlayMode};

use crate::cli::OverlayArgs;
use crate::commands::load_validated;
use crate::output::OutputWriter;

pub fn execute(args: OverlayArgs, config: &LayeredConfig, output: &OutputWriter) -> Result<()> {
    let mode: OverlayMode = args.mode.parse()?;
    let epsilon = args.epsilon.unwrap_or(config.overlay_epsilon.value);

    let first = load_validated(&args.first, config)?;
    let second = load_validated(&args.second, config)?;

    let result = overlay_with_epsilon(&first, &second, mode, epsilon)?;
    if result.is_empty() {
        output.info("The overlay produced no features");
    }

    formats::save(&result, &args.output)
        .with_context(|| format!("Failed to save {}", args.output.display()))?;

    output.success(format!(
        "Overlay ({:?}) of {} x {} features produced {} features into {}",
        mode,
        first.len(),
        second.len(),
        result.len(),
        args.output.display()
    ));
    Ok(())
}
