//! Bounding-box index over a feature collection.
//!
//! Overlay iterates candidate feature pairs; the index keeps that from
//! degenerating into a full cross product by pruning pairs whose
//! envelopes cannot intersect.

use geo::algorithm::bounding_rect::BoundingRect;
use geo::Geometry;
use rstar::{RTree, RTreeObject, AABB};

use geoflow_core::models::FeatureCollection;

/// A feature's position in its collection plus its precomputed envelope
#[derive(Debug, Clone, PartialEq)]
pub struct IndexedFeature {
    pub position: usize,
    envelope: AABB<[f64; 2]>,
}

impl IndexedFeature {
    fn new(position: usize, geometry: &Geometry<f64>) -> Self {
        Self {
            position,
            envelope: envelope_of(geometry),
        }
    }
}

impl RTreeObject for IndexedFeature {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

fn envelope_of(geometry: &Geometry<f64>) -> AABB<[f64; 2]> {
    match geometry.bounding_rect() {
        Some(rect) => AABB::from_corners(
            [rect.min().x, rect.min().y],
            [rect.max().x, rect.max().y],
        ),
        // Empty geometries get a degenerate envelope at the origin.
        // A false positive here only costs one exact intersection test.
        None => AABB::from_point([0.0, 0.0]),
    }
}

/// Spatial index over one collection's feature envelopes
pub struct SpatialIndex {
    tree: RTree<IndexedFeature>,
}

impl SpatialIndex {
    /// Build an index over every feature of the collection
    pub fn from_collection(collection: &FeatureCollection) -> Self {
        let indexed: Vec<IndexedFeature> = collection
            .iter()
            .enumerate()
            .map(|(position, feature)| IndexedFeature::new(position, &feature.geometry))
            .collect();

        Self {
            tree: RTree::bulk_load(indexed),
        }
    }

    /// Positions of features whose envelope intersects the query
    /// geometry's envelope, in ascending position order.
    pub fn candidates(&self, geometry: &Geometry<f64>) -> Vec<usize> {
        let query = envelope_of(geometry);
        let mut positions: Vec<usize> = self
            .tree
            .locate_in_envelope_intersecting(&query)
            .map(|indexed| indexed.position)
            .collect();
        positions.sort_unstable();
        positions
    }

    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }
}
