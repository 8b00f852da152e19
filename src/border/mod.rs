//! Border partitioning and containment filtering.
//!
//! Splits a border into size-bounded pieces, indexes them with an R-tree
//! and keeps the features a single piece fully covers.

mod error;
mod filter;
mod index;
mod partition;
mod shape;

pub use error::{BorderError, Result};
pub use filter::{filter_inside, ContainmentFilter};
pub use index::{ContainmentIndex, IndexedPiece};
pub use partition::{partition, Partitioner, DEFAULT_MAX_DEPTH};
pub use shape::{geometry_kind, Clip, Shape};
