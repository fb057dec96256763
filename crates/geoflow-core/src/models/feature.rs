//! Features and feature collections.

use std::collections::HashMap;

use geo::Geometry;

use super::crs::Crs;

/// Attribute map of a feature: column name to scalar JSON value.
pub type Properties = HashMap<String, serde_json::Value>;

/// A single feature: one geometry plus its attribute columns.
///
/// Features do not carry a CRS; the owning [`FeatureCollection`] does.
#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    /// Row identifier, if the source format carried one or an operation
    /// assigned one (dissolve promotes the key column here)
    pub id: Option<String>,
    pub geometry: Geometry<f64>,
    pub properties: Properties,
}

impl Feature {
    /// Create a feature with no id and empty properties
    pub fn new(geometry: Geometry<f64>) -> Self {
        Self {
            id: None,
            geometry,
            properties: Properties::new(),
        }
    }

    /// Builder-style id setter
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Builder-style property setter
    pub fn with_property(mut self, name: impl Into<String>, value: serde_json::Value) -> Self {
        self.properties.insert(name.into(), value);
        self
    }
}

/// An ordered sequence of features sharing one CRS.
///
/// The CRS is a collection-level invariant: features have no CRS of
/// their own, so two features in one collection can never disagree.
/// Operations that take two collections check CRS equality up front and
/// fail rather than silently reprojecting.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureCollection {
    crs: Crs,
    features: Vec<Feature>,
}

impl FeatureCollection {
    /// Create an empty collection in the given CRS
    pub fn new(crs: Crs) -> Self {
        Self {
            crs,
            features: Vec::new(),
        }
    }

    /// Create a collection from parts
    pub fn from_features(crs: Crs, features: Vec<Feature>) -> Self {
        Self { crs, features }
    }

    pub fn crs(&self) -> &Crs {
        &self.crs
    }

    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn push(&mut self, feature: Feature) {
        self.features.push(feature);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Feature> {
        self.features.iter()
    }

    /// Consume the collection, yielding its parts.
    ///
    /// Used by operations that rebuild a collection wholesale (e.g.
    /// reprojection constructs a new collection in the target CRS).
    pub fn into_parts(self) -> (Crs, Vec<Feature>) {
        (self.crs, self.features)
    }

    /// Distinct attribute column names, in first-seen order
    pub fn columns(&self) -> Vec<String> {
        let mut seen = std::collections::HashSet::new();
        let mut columns = Vec::new();
        for feature in &self.features {
            for name in feature.properties.keys() {
                if seen.insert(name.clone()) {
                    columns.push(name.clone());
                }
            }
        }
        columns
    }
}
