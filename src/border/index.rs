//! Spatial index over border pieces.

use geo::{BoundingRect, Geometry, Polygon};
use rstar::{RTree, RTreeObject, AABB};
use tracing::info;

/// Wrapper for R-tree indexing of partition pieces
#[derive(Debug, Clone)]
pub struct IndexedPiece {
    pub polygon: Polygon<f64>,
    envelope: AABB<[f64; 2]>,
}

impl RTreeObject for IndexedPiece {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

impl IndexedPiece {
    /// Pieces without coordinates have no envelope and are not indexed
    pub fn new(polygon: Polygon<f64>) -> Option<Self> {
        let rect = polygon.bounding_rect()?;
        Some(Self {
            polygon,
            envelope: AABB::from_corners(
                [rect.min().x, rect.min().y],
                [rect.max().x, rect.max().y],
            ),
        })
    }
}

/// Query envelope of an arbitrary geometry
pub fn envelope_of(geometry: &Geometry<f64>) -> Option<AABB<[f64; 2]>> {
    let rect = geometry.bounding_rect()?;
    Some(AABB::from_corners(
        [rect.min().x, rect.min().y],
        [rect.max().x, rect.max().y],
    ))
}

/// Static R-tree over the pieces of a partitioned border
pub struct ContainmentIndex {
    tree: RTree<IndexedPiece>,
}

impl ContainmentIndex {
    /// Build the index from partition pieces
    pub fn build(pieces: Vec<Polygon<f64>>) -> Self {
        info!("Building spatial index for {} pieces...", pieces.len());

        let indexed: Vec<IndexedPiece> = pieces.into_iter().filter_map(IndexedPiece::new).collect();
        let tree = RTree::bulk_load(indexed);

        info!("Spatial index built with {} entries", tree.size());

        Self { tree }
    }

    /// Pieces whose bounding box intersects the geometry's bounding box.
    ///
    /// This over-approximates: callers still need an exact test.
    pub fn query<'a>(
        &'a self,
        geometry: &Geometry<f64>,
    ) -> impl Iterator<Item = &'a Polygon<f64>> + 'a {
        let envelope = envelope_of(geometry);
        envelope
            .into_iter()
            .flat_map(move |envelope| self.tree.locate_in_envelope_intersecting(&envelope))
            .map(|piece| &piece.polygon)
    }

    /// Get total number of indexed pieces
    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }

    /// Iterate over all indexed pieces
    pub fn pieces(&self) -> impl Iterator<Item = &Polygon<f64>> {
        self.tree.iter().map(|piece| &piece.polygon)
    }
}
