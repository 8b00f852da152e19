//! Overpass API access: queries, response caching and GeoJSON conversion.

mod cache;
mod client;
pub mod convert;
mod response;
mod rings;

pub use cache::ResponseCache;
pub use client::{CachedOverpass, OverpassClient};
pub use convert::{to_feature_collection, ConvertOptions};
pub use response::{Element, LatLon, Member, OverpassResponse, Tags};
pub use rings::stitch_rings;
