//! Error types for area ingestion and configuration.

use imagemap_geometry::{AreaId, GeometryError};
use thiserror::Error;

/// Reasons an area definition is rejected at ingestion.
///
/// None of these are fatal to the map: the definition is dropped and the
/// remaining hotspots keep working.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AreaError {
    /// Id missing, non-numeric or zero
    #[error("Invalid area id '{id}'")]
    InvalidId {
        /// The raw id as it appeared in the definition
        id: String,
    },

    /// Another area already uses this id
    #[error("Duplicate area id {id}")]
    DuplicateId {
        /// The id that is already registered
        id: AreaId,
    },

    /// Shape keyword is not rect, circle or poly
    #[error("Unsupported shape '{shape}'")]
    UnsupportedShape {
        /// The keyword that was encountered
        shape: String,
    },

    /// Wrong number of coordinates for the shape
    #[error("Shape '{shape}' expects {expected} coordinates, got {found}")]
    CoordinateCount {
        /// The shape keyword
        shape: String,
        /// Human-readable expectation, e.g. "4" or "an even number >= 6"
        expected: String,
        /// How many numbers were supplied
        found: usize,
    },

    /// A coordinate is not a number
    #[error("Invalid coordinate '{value}'")]
    InvalidCoordinate {
        /// The token that failed to parse
        value: String,
    },

    /// The coordinates parse but do not describe a usable shape
    #[error("Invalid geometry: {0}")]
    Geometry(#[from] GeometryError),
}

impl AreaError {
    /// Create an invalid id error.
    pub fn invalid_id(id: impl Into<String>) -> Self {
        Self::InvalidId { id: id.into() }
    }

    /// Create an unsupported shape error.
    pub fn unsupported_shape(shape: impl Into<String>) -> Self {
        Self::UnsupportedShape {
            shape: shape.into(),
        }
    }

    /// Create a coordinate count error.
    pub fn coordinate_count(shape: impl Into<String>, expected: impl Into<String>, found: usize) -> Self {
        Self::CoordinateCount {
            shape: shape.into(),
            expected: expected.into(),
            found,
        }
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// JSON parsing error
    #[error("Failed to parse configuration: {0}")]
    ParseError(#[from] serde_json::Error),

    /// Configuration version is newer than supported
    #[error(
        "Configuration file version {file_version} is newer than supported version {supported_version}"
    )]
    VersionTooNew {
        file_version: u32,
        supported_version: u32,
    },

    /// I/O error when reading/writing config
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}
