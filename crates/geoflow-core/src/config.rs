//! Layered pipeline configuration.
//!
//! Values come from four layers with increasing precedence: built-in
//! defaults, a TOML config file, `GEOFLOW_*` environment variables, and
//! CLI arguments.

use crate::error::{GeoflowError, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;

/// How strictly geometries are validated on load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ValidityMode {
    /// Check coordinate finiteness and minimum vertex counts only
    #[default]
    Lenient,
    /// Additionally require closed polygon rings
    Strict,
}

impl std::str::FromStr for ValidityMode {
    type Err = GeoflowError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "lenient" => Ok(Self::Lenient),
            "strict" => Ok(Self::Strict),
            other => Err(GeoflowError::ConfigInvalid {
                key: "geometry_validity".to_string(),
                reason: format!("expected 'lenient' or 'strict', got '{}'", other),
            }),
        }
    }
}

/// Configuration source for tracking where values come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    /// Default value
    Default,
    /// Loaded from config file
    File,
    /// Loaded from environment variable
    Environment,
    /// Provided via CLI argument
    Cli,
}

impl ConfigSource {
    /// Returns the precedence level (higher = higher priority)
    pub fn precedence(&self) -> u8 {
        match self {
            ConfigSource::Default => 0,
            ConfigSource::File => 1,
            ConfigSource::Environment => 2,
            ConfigSource::Cli => 3,
        }
    }
}

/// A configuration value with its source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigValue<T> {
    pub value: T,
    pub source: ConfigSource,
}

impl<T> ConfigValue<T> {
    pub fn new(value: T, source: ConfigSource) -> Self {
        Self { value, source }
    }

    /// Update the value if the new source has higher precedence
    pub fn update(&mut self, value: T, source: ConfigSource) {
        if source.precedence() > self.source.precedence() {
            self.value = value;
            self.source = source;
        }
    }
}

/// Layered configuration for the geoflow pipeline
#[derive(Debug, Clone)]
pub struct LayeredConfig {
    /// CRS assumed for sources that do not declare one (EPSG code)
    pub default_crs: ConfigValue<u32>,
    /// CRS resolver confidence threshold, 0-100
    pub confidence_threshold: ConfigValue<u8>,
    /// Area below which overlay pieces are considered degenerate,
    /// in squared CRS units
    pub overlay_epsilon: ConfigValue<f64>,
    /// Geometry validation strictness
    pub geometry_validity: ConfigValue<ValidityMode>,
}

impl LayeredConfig {
    /// Create a new configuration with default values
    pub fn with_defaults() -> Self {
        Self {
            default_crs: ConfigValue::new(4326, ConfigSource::Default),
            confidence_threshold: ConfigValue::new(
                crate::crs::DEFAULT_CONFIDENCE_THRESHOLD,
                ConfigSource::Default,
            ),
            overlay_epsilon: ConfigValue::new(1e-9, ConfigSource::Default),
            geometry_validity: ConfigValue::new(ValidityMode::Lenient, ConfigSource::Default),
        }
    }

    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self> {
        let content =
            fs::read_to_string(path.as_ref()).map_err(|e| GeoflowError::ConfigInvalid {
                key: "file".to_string(),
                reason: format!("Failed to read config file: {}", e),
            })?;

        let file_config: FileConfig =
            toml::from_str(&content).map_err(|e| GeoflowError::ConfigInvalid {
                key: "file".to_string(),
                reason: format!("Failed to parse TOML: {}", e),
            })?;

        if let Some(crs) = file_config.default_crs {
            self.default_crs.update(crs, ConfigSource::File);
        }

        if let Some(threshold) = file_config.confidence_threshold {
            self.confidence_threshold.update(threshold, ConfigSource::File);
        }

        if let Some(epsilon) = file_config.overlay_epsilon {
            self.overlay_epsilon.update(epsilon, ConfigSource::File);
        }

        if let Some(validity) = file_config.geometry_validity {
            self.geometry_validity.update(validity, ConfigSource::File);
        }

        Ok(self)
    }

    /// Load configuration from environment variables
    pub fn load_from_env(mut self) -> Self {
        if let Ok(crs_str) = env::var("GEOFLOW_CRS") {
            match crs_str.parse::<u32>() {
                Ok(crs) => self.default_crs.update(crs, ConfigSource::Environment),
                Err(_) => tracing::warn!(
                    "Invalid GEOFLOW_CRS value '{}': expected integer EPSG code",
                    crs_str
                ),
            }
        }

        if let Ok(threshold_str) = env::var("GEOFLOW_CONFIDENCE_THRESHOLD") {
            match threshold_str.parse::<u8>() {
                Ok(threshold) if threshold <= 100 => {
                    self.confidence_threshold.update(threshold, ConfigSource::Environment)
                }
                _ => tracing::warn!(
                    "Invalid GEOFLOW_CONFIDENCE_THRESHOLD value '{}': expected 0-100",
                    threshold_str
                ),
            }
        }

        if let Ok(epsilon_str) = env::var("GEOFLOW_OVERLAY_EPSILON") {
            match epsilon_str.parse::<f64>() {
                Ok(epsilon) if epsilon.is_finite() && epsilon >= 0.0 => {
                    self.overlay_epsilon.update(epsilon, ConfigSource::Environment)
                }
                _ => tracing::warn!(
                    "Invalid GEOFLOW_OVERLAY_EPSILON value '{}': expected non-negative number",
                    epsilon_str
                ),
            }
        }

        if let Ok(validity_str) = env::var("GEOFLOW_GEOMETRY_VALIDITY") {
            match validity_str.parse::<ValidityMode>() {
                Ok(validity) => {
                    self.geometry_validity.update(validity, ConfigSource::Environment)
                }
                Err(_) => tracing::warn!(
                    "Invalid GEOFLOW_GEOMETRY_VALIDITY value '{}': expected 'lenient' or 'strict'",
                    validity_str
                ),
            }
        }

        self
    }
}

impl Default for LayeredConfig {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// Mirror of the TOML config file structure
#[derive(Debug, Deserialize)]
struct FileConfig {
    default_crs: Option<u32>,
    confidence_threshold: Option<u8>,
    overlay_epsilon: Option<f64>,
    geometry_validity: Option<ValidityMode>,
}
