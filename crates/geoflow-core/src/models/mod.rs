//! Canonical data model shared across all geoflow crates.

pub mod crs;
pub mod feature;

pub use crs::{AxisOrder, Crs};
pub use feature::{Feature, FeatureCollection, Properties};
