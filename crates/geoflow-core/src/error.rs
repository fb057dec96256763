//! Error types for geoflow

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GeoflowError {
    // CRS errors
    #[error("Unresolved CRS '{definition}': best candidate scored {best}, threshold is {threshold}")]
    UnresolvedCrs {
        definition: String,
        best: u8,
        threshold: u8,
    },

    #[error("CRS mismatch: first input has {left}, second input has {right}")]
    CrsMismatch { left: String, right: String },

    #[error("No transform path from {source} to {target}: {reason}")]
    UnsupportedTransform {
        source: String,
        target: String,
        reason: String,
    },

    // Geometry errors
    #[error("Invalid geometry at {location}: {reason}")]
    InvalidGeometry { location: String, reason: String },

    // Attribute errors
    #[error("Column '{column}' not found in collection")]
    MissingColumn { column: String },

    // Format errors
    #[error("Unsupported format '.{extension}'. Supported: {}", .supported.join(", "))]
    UnsupportedFormat {
        extension: String,
        supported: Vec<String>,
    },

    #[error("{format} error: {message}")]
    FormatError { format: String, message: String },

    // Configuration errors
    #[error("Invalid configuration value for {key}: {reason}")]
    ConfigInvalid { key: String, reason: String },

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl GeoflowError {
    /// Create an invalid-geometry error with location context
    pub fn invalid_geometry(location: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidGeometry {
            location: location.into(),
            reason: reason.into(),
        }
    }

    /// Create a format error
    pub fn format_error(format: impl Into<String>, message: impl Into<String>) -> Self {
        Self::FormatError {
            format: format.into(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, GeoflowError>;
