//! Alfresco - outdoor seating extraction from OpenStreetMap
//!
//! The `border` module holds the geometric core: it partitions a border into
//! size-bounded pieces, indexes them and filters features by containment.
//! The remaining modules fetch borders and candidate features from Overpass.

pub mod border;
pub mod config;
pub mod models;
pub mod overpass;
pub mod seatings;

pub use border::{filter_inside, partition, ContainmentFilter, ContainmentIndex, Partitioner, Shape};
pub use models::{Country, Feature, FeatureCollection};
