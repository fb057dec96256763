//! Format abstraction layer for loading and saving feature collections.
//!
//! Each format implements the `FormatReader` and `FormatWriter` traits;
//! the `FormatRegistry` detects the format from the file extension and
//! dispatches to the right implementation. The module-level [`load`] and
//! [`save`] functions are the pipeline's IO contract.
//!
//! The traits are synchronous: the pipeline is single-threaded and
//! batch-oriented, with no suspension points.

use std::path::Path;

use crate::error::{GeoflowError, Result};
use crate::models::FeatureCollection;

pub mod geojson;
pub mod shapefile;

pub use self::geojson::{GeoJsonReader, GeoJsonWriter};
pub use self::shapefile::{ShapefileReader, ShapefileWriter};

/// Format reader trait that all format implementations must implement
pub trait FormatReader: Send + Sync {
    /// Read a feature collection from the given path
    fn read(&self, path: &Path) -> Result<FeatureCollection>;

    /// Get supported file extensions (e.g., ["shp", "geojson"])
    fn supported_extensions(&self) -> &[&str];

    /// Get human-readable format name (e.g., "Shapefile", "GeoJSON")
    fn format_name(&self) -> &str;

    /// Validate file structure without a full read.
    ///
    /// Allows callers to run quick checks before attempting a full
    /// read operation.
    fn validate(&self, _path: &Path) -> Result<FormatValidation> {
        Ok(FormatValidation::default())
    }
}

/// Format writer trait for persisting feature collections
pub trait FormatWriter: Send + Sync {
    /// Write a feature collection to the given path
    fn write(&self, collection: &FeatureCollection, path: &Path) -> Result<()>;

    /// Get supported file extensions
    fn supported_extensions(&self) -> &[&str];

    /// Get human-readable format name
    fn format_name(&self) -> &str;
}

/// Result of format validation
#[derive(Debug, Clone, Default)]
pub struct FormatValidation {
    /// Validation errors that prevent reading
    pub errors: Vec<String>,

    /// Warnings that don't prevent reading but indicate potential issues
    pub warnings: Vec<String>,
}

impl FormatValidation {
    /// Check if validation passed (no errors)
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Check if there are any warnings
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Validation of the bare existence of a file
    pub(crate) fn file_exists(path: &Path) -> Self {
        let mut validation = Self::default();
        if !path.exists() {
            validation
                .errors
                .push(format!("File does not exist: {}", path.display()));
        }
        validation
    }

    /// Fold several validations into one
    pub(crate) fn merge(parts: Vec<Self>) -> Self {
        let mut merged = Self::default();
        for part in parts {
            merged.errors.extend(part.errors);
            merged.warnings.extend(part.warnings);
        }
        merged
    }
}

/// Central registry for format readers and writers.
///
/// The registry maintains the available implementations and provides
/// format detection based on file extensions.
pub struct FormatRegistry {
    readers: Vec<Box<dyn FormatReader>>,
    writers: Vec<Box<dyn FormatWriter>>,
}

impl FormatRegistry {
    /// Create a new empty format registry
    pub fn new() -> Self {
        Self {
            readers: Vec::new(),
            writers: Vec::new(),
        }
    }

    /// Registry with both built-in formats registered
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register_reader(Box::new(geojson::GeoJsonReader));
        registry.register_writer(Box::new(geojson::GeoJsonWriter));
        registry.register_reader(Box::new(shapefile::ShapefileReader));
        registry.register_writer(Box::new(shapefile::ShapefileWriter));
        registry
    }

    /// Register a format reader
    pub fn register_reader(&mut self, reader: Box<dyn FormatReader>) {
        self.readers.push(reader);
    }

    /// Register a format writer
    pub fn register_writer(&mut self, writer: Box<dyn FormatWriter>) {
        self.writers.push(writer);
    }

    /// Detect the format of `path` and return the matching reader
    pub fn detect_reader(&self, path: &Path) -> Result<&dyn FormatReader> {
        let extension = extension_of(path, self.supported_formats())?;
        self.readers
            .iter()
            .find(|r| r.supported_extensions().contains(&extension))
            .map(|r| r.as_ref())
            .ok_or_else(|| GeoflowError::UnsupportedFormat {
                extension: extension.to_string(),
                supported: self.supported_formats(),
            })
    }

    /// Detect the format of `path` and return the matching writer
    pub fn detect_writer(&self, path: &Path) -> Result<&dyn FormatWriter> {
        let extension = extension_of(path, self.supported_formats())?;
        self.writers
            .iter()
            .find(|w| w.supported_extensions().contains(&extension))
            .map(|w| w.as_ref())
            .ok_or_else(|| GeoflowError::UnsupportedFormat {
                extension: extension.to_string(),
                supported: self.supported_formats(),
            })
    }

    /// Get list of all supported format extensions
    pub fn supported_formats(&self) -> Vec<String> {
        self.readers
            .iter()
            .flat_map(|r| r.supported_extensions())
            .map(|s| s.to_string())
            .collect()
    }
}

impl Default for FormatRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn extension_of<'p>(path: &'p Path, supported: Vec<String>) -> Result<&'p str> {
    path.extension()
        .and_then(|e| e.to_str())
        .ok_or(GeoflowError::UnsupportedFormat {
            extension: "none".to_string(),
            supported,
        })
}

/// Load a feature collection, detecting the format from the extension
pub fn load(path: &Path) -> Result<FeatureCollection> {
    FormatRegistry::with_defaults().detect_reader(path)?.read(path)
}

/// Save a feature collection, detecting the format from the extension
pub fn save(collection: &FeatureCollection, path: &Path) -> Result<()> {
    FormatRegistry::with_defaults()
        .detect_writer(path)?
        .write(collection, path)
}
