//! Recursive decomposition of a border into size-bounded pieces.
//!
//! The border is halved along its longer bounding-box dimension until every
//! piece fits inside `threshold` degrees in both directions. Splitting stops
//! early once `max_depth` halvings have been applied to a piece; such pieces
//! are kept even though they exceed the threshold.

use geo::{coord, Polygon, Rect};
use tracing::debug;

use super::error::{BorderError, Result};
use super::shape::Shape;

/// Default cap on the number of successive halvings of one piece
pub const DEFAULT_MAX_DEPTH: usize = 250;

/// Splits borders into pieces no larger than a threshold
#[derive(Debug, Clone, Copy)]
pub struct Partitioner {
    threshold: f64,
    max_depth: usize,
}

impl Partitioner {
    /// Create a partitioner for a positive, finite threshold in degrees
    pub fn new(threshold: f64) -> Result<Self> {
        if !threshold.is_finite() || threshold <= 0.0 {
            return Err(BorderError::InvalidThreshold(threshold));
        }
        Ok(Self {
            threshold,
            max_depth: DEFAULT_MAX_DEPTH,
        })
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Partition a shape into simple polygons.
    ///
    /// Pieces come out in depth-first order: the lower (or left) half of every
    /// split is fully decomposed before the upper (or right) half.
    pub fn partition(&self, shape: Shape) -> Vec<Polygon<f64>> {
        let mut pieces = Vec::new();
        let mut stack = vec![(shape, 0usize)];
        let mut capped = 0usize;

        while let Some((shape, depth)) = stack.pop() {
            let Some((first, second)) = self.split_windows(&shape) else {
                pieces.extend(shape.into_polygons());
                continue;
            };
            if depth >= self.max_depth {
                capped += 1;
                pieces.extend(shape.into_polygons());
                continue;
            }

            let mut parts = shape.clip(&first).into_shapes();
            parts.extend(shape.clip(&second).into_shapes());

            // Reversed so the first part is popped next
            stack.extend(parts.into_iter().rev().map(|part| (part, depth + 1)));
        }

        if capped > 0 {
            debug!(
                "{} pieces reached the depth cap of {} and exceed the threshold",
                capped, self.max_depth
            );
        }

        pieces
    }

    /// The two halves of the shape's bounding box, or `None` when the shape
    /// already fits the threshold.
    fn split_windows(&self, shape: &Shape) -> Option<(Rect<f64>, Rect<f64>)> {
        let (width, height) = shape.extent();
        if width.max(height) <= self.threshold {
            return None;
        }
        let rect = shape.bounding_rect()?;
        let (min, max) = (rect.min(), rect.max());

        let halves = if height >= width {
            let mid = min.y + height / 2.0;
            (
                Rect::new(min, coord! { x: max.x, y: mid }),
                Rect::new(coord! { x: min.x, y: mid }, max),
            )
        } else {
            let mid = min.x + width / 2.0;
            (
                Rect::new(min, coord! { x: mid, y: max.y }),
                Rect::new(coord! { x: mid, y: min.y }, max),
            )
        };
        Some(halves)
    }
}

/// Partition `shape` with the default depth cap
pub fn partition(shape: Shape, threshold: f64) -> Result<Vec<Polygon<f64>>> {
    Ok(Partitioner::new(threshold)?.partition(shape))
}
