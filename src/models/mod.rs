//! Data models shared by the pipeline and the CLI.

pub mod country;
pub mod geojson;

pub use country::{name_from_tags, AdminCenter, Country};
pub use geojson::{Feature, FeatureCollection, GeoJsonError, GeoJsonGeometry};
