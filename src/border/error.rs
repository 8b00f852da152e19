//! Error types for border partitioning and containment.

use thiserror::Error;

/// Border processing errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BorderError {
    /// The border is not a polygon or multipolygon.
    #[error("Border must be a Polygon or MultiPolygon, got {0}")]
    NotAreal(&'static str),

    /// A ring is not closed or has non-finite coordinates.
    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),

    /// Split threshold must be positive and finite.
    #[error("Invalid split threshold: {0}")]
    InvalidThreshold(f64),
}

/// Result type for border operations.
pub type Result<T> = std::result::Result<T, BorderError>;
