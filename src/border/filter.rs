//! Keeps the features that lie inside a border.
//!
//! Containment is decided per partition piece: a feature is kept when one
//! piece covers it entirely. Features that are inside the border but cross
//! the boundary between two pieces are therefore dropped. Points and small
//! features are rarely affected; large polygons often are.

use std::time::Instant;

use geo::{BoundingRect, Geometry, Polygon, Rect, Relate};
use rayon::prelude::*;
use tracing::info;

use super::error::Result;
use super::index::ContainmentIndex;
use super::partition::Partitioner;
use super::shape::Shape;

/// A partitioned, indexed border ready to test features against
pub struct ContainmentFilter {
    index: ContainmentIndex,
}

impl ContainmentFilter {
    /// Partition and index `border` with pieces no larger than `threshold` degrees
    pub fn new(border: Shape, threshold: f64) -> Result<Self> {
        Self::with_partitioner(border, Partitioner::new(threshold)?)
    }

    pub fn with_partitioner(border: Shape, partitioner: Partitioner) -> Result<Self> {
        border.validate()?;

        let start = Instant::now();
        let pieces = partitioner.partition(border);
        info!(
            "Partitioned border into {} pieces (threshold {}) in {} ms",
            pieces.len(),
            partitioner.threshold(),
            start.elapsed().as_millis()
        );

        Ok(Self {
            index: ContainmentIndex::build(pieces),
        })
    }

    pub fn index(&self) -> &ContainmentIndex {
        &self.index
    }

    /// Whether a single piece covers the geometry, boundary included
    pub fn contains(&self, geometry: &Geometry<f64>) -> bool {
        let Some(bounds) = geometry.bounding_rect() else {
            return false;
        };
        self.index
            .query(geometry)
            .any(|piece| covers(piece, &bounds, geometry))
    }

    /// Keep the contained features, in input order
    pub fn filter<M: Sync>(&self, features: Vec<(Geometry<f64>, M)>) -> Vec<(Geometry<f64>, M)> {
        self.filter_by(features, |(geometry, _)| Some(geometry))
    }

    /// Keep the items whose geometry is contained, in input order.
    ///
    /// Items for which `geometry_of` yields nothing are dropped.
    pub fn filter_by<T, F>(&self, items: Vec<T>, geometry_of: F) -> Vec<T>
    where
        T: Sync,
        F: Fn(&T) -> Option<&Geometry<f64>> + Sync,
    {
        let start = Instant::now();
        let keep: Vec<bool> = items
            .par_iter()
            .map(|item| {
                geometry_of(item)
                    .map(|geometry| self.contains(geometry))
                    .unwrap_or(false)
            })
            .collect();

        let total = items.len();
        let kept: Vec<T> = items
            .into_iter()
            .zip(keep)
            .filter_map(|(item, keep)| keep.then_some(item))
            .collect();

        info!(
            "Kept {} of {} features in {} ms",
            kept.len(),
            total,
            start.elapsed().as_millis()
        );
        kept
    }
}

fn covers(piece: &Polygon<f64>, bounds: &Rect<f64>, geometry: &Geometry<f64>) -> bool {
    let Some(piece_bounds) = piece.bounding_rect() else {
        return false;
    };
    let inside_bounds = piece_bounds.min().x <= bounds.min().x
        && piece_bounds.min().y <= bounds.min().y
        && piece_bounds.max().x >= bounds.max().x
        && piece_bounds.max().y >= bounds.max().y;

    inside_bounds && piece.relate(geometry).is_covers()
}

/// Filter `features` down to those inside `border`
pub fn filter_inside<M: Sync>(
    features: Vec<(Geometry<f64>, M)>,
    border: Shape,
    threshold: f64,
) -> Result<Vec<(Geometry<f64>, M)>> {
    let filter = ContainmentFilter::new(border, threshold)?;
    Ok(filter.filter(features))
}
