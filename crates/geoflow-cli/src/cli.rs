use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Geoflow - batch vector-GIS transformation pipeline
#[derive(Parser, Debug)]
#[command(name = "geoflow")]
#[command(about = "Batch vector-GIS transformation pipeline", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Output results in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Path to a TOML configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Summarize a vector dataset
    Info(InfoArgs),

    /// Resolve a CRS definition to its canonical record
    Resolve(ResolveArgs),

    /// Reproject a dataset into a target CRS
    Reproject(ReprojectArgs),

    /// Overlay two datasets
    Overlay(OverlayArgs),

    /// Dissolve a dataset by a key column
    Dissolve(DissolveArgs),

    /// Simplify a dataset's geometries
    Simplify(SimplifyArgs),
}

#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// Dataset to summarize (.geojson or .shp)
    pub path: PathBuf,
}

#[derive(Parser, Debug)]
pub struct ResolveArgs {
    /// CRS definition: EPSG code, WKT, PROJ string, or PROJJSON
    pub definition: String,

    /// Confidence threshold (0-100) below which resolution fails
    #[arg(long)]
    pub threshold: Option<u8>,
}

#[derive(Parser, Debug)]
pub struct ReprojectArgs {
    /// Input dataset
    pub input: PathBuf,

    /// Output dataset
    pub output: PathBuf,

    /// Target CRS definition, e.g. "EPSG:3857"
    #[arg(long)]
    pub to: String,
}

#[derive(Parser, Debug)]
pub struct OverlayArgs {
    /// First input dataset
    pub first: PathBuf,

    /// Second input dataset
    pub second: PathBuf,

    /// Output dataset
    pub output: PathBuf,

    /// Overlay mode: intersection, union, difference,
    /// symmetric-difference, or identity
    #[arg(long, default_value = "intersection")]
    pub mode: String,

    /// Degenerate-piece area threshold, in squared CRS units
    #[arg(long)]
    pub epsilon: Option<f64>,
}

#[derive(Parser, Debug)]
pub struct DissolveArgs {
    /// Input dataset
    pub input: PathBuf,

    /// Output dataset
    pub output: PathBuf,

    /// Key column to group by
    #[arg(long)]
    pub by: String,

    /// Aggregations as "column=fn,..." with fn one of first, last,
    /// sum, min, max, count, list. Unlisted columns are dropped.
    #[arg(long)]
    pub agg: Option<String>,
}

#[derive(Parser, Debug)]
pub struct SimplifyArgs {
    /// Input dataset
    pub input: PathBuf,

    /// Output dataset
    pub output: PathBuf,

    /// Error tolerance in the dataset's CRS units
    #[arg(long)]
    pub tolerance: f64,
}
