//! Error types for the clustering engine.
//!
//! None of these are fatal: each component recovers at its boundary by
//! dropping a row, clamping a value, or surfacing an empty map.

use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, InstapointsError>;

#[derive(Debug, Error)]
pub enum InstapointsError {
    /// Latitude/longitude outside `[-90,90]×[-180,180]` or not finite.
    #[error("Invalid coordinate for point {id}: {reason}")]
    InvalidCoordinate { id: u64, reason: String },

    /// No valid point survived ingestion.
    #[error("Dataset contains no valid points")]
    EmptyDataset,

    #[error("Zoom {requested} outside supported range [{min}, {max}]")]
    ZoomOutOfBounds { requested: i32, min: u8, max: u8 },

    /// Required `latitude`/`longitude` columns are absent.
    #[error("Input must contain 'latitude' and 'longitude' columns. Columns found: {}", .found.join(", "))]
    MissingColumns { found: Vec<String> },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("GeoJSON error: {0}")]
    GeoJson(String),
}
