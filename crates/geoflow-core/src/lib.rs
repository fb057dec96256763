//! Geoflow Core - Domain models, CRS resolution, configuration, and file formats
//!
//! This crate contains the data model of the pipeline (CRS, features,
//! feature collections), the CRS resolver, the layered configuration, and
//! the format abstraction layer for loading and saving collections.

pub mod config;
pub mod crs;
pub mod error;
pub mod formats;
pub mod models;

pub use error::{GeoflowError, Result};
