//! Error types for shape construction.

use thiserror::Error;

/// Errors raised when a shape cannot be built from the given coordinates.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    /// A polygon needs at least three vertices
    #[error("Polygon needs at least 3 vertices, got {count}")]
    TooFewVertices {
        /// Number of vertices supplied
        count: usize,
    },

    /// All vertices are collinear or coincident, so there is no centroid
    #[error("Polygon has zero area")]
    ZeroArea,

    /// A coordinate was NaN or infinite
    #[error("Non-finite coordinate: {value}")]
    NonFinite {
        /// The offending value
        value: f32,
    },

    /// A circle radius must be positive
    #[error("Invalid radius: {radius}")]
    InvalidRadius {
        /// The offending radius
        radius: f32,
    },
}
