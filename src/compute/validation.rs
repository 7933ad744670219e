//! Validation for geographic coordinates.
//!
//! Out-of-range values are rejected, never clamped.

use crate::error::{InstapointsError, Result};
use instapoints_types::point::MapPoint;
use std::sync::Arc;

/// Validates a latitude/longitude pair belonging to point `id`.
///
/// Longitude: [-180.0, 180.0], Latitude: [-90.0, 90.0]
///
/// # Examples
///
/// ```
/// use instapoints::compute::validation::validate_coordinates;
///
/// assert!(validate_coordinates(0, 40.7128, -74.0060).is_ok());
///
/// // Invalid latitude
/// assert!(validate_coordinates(1, 95.0, -74.0).is_err());
///
/// // Invalid longitude
/// assert!(validate_coordinates(2, 40.0, 200.0).is_err());
/// ```
pub fn validate_coordinates(id: u64, latitude: f64, longitude: f64) -> Result<()> {
    let invalid = |reason: String| InstapointsError::InvalidCoordinate { id, reason };

    if !latitude.is_finite() {
        return Err(invalid(format!("Latitude must be finite, got: {}", latitude)));
    }

    if !longitude.is_finite() {
        return Err(invalid(format!(
            "Longitude must be finite, got: {}",
            longitude
        )));
    }

    if !(-90.0..=90.0).contains(&latitude) {
        return Err(invalid(format!(
            "Latitude out of range [-90.0, 90.0]: {}",
            latitude
        )));
    }

    if !(-180.0..=180.0).contains(&longitude) {
        return Err(invalid(format!(
            "Longitude out of range [-180.0, 180.0]: {}",
            longitude
        )));
    }

    Ok(())
}

/// Validates a single point.
pub fn validate_point(point: &MapPoint) -> Result<()> {
    validate_coordinates(point.id(), point.latitude(), point.longitude())
}

/// Validates multiple points, failing on the first invalid one.
///
/// # Examples
///
/// ```
/// use instapoints::compute::validation::validate_points;
/// use instapoints::MapPoint;
/// use std::sync::Arc;
///
/// let points = vec![
///     Arc::new(MapPoint::new(0, 40.7, -74.0)),
///     Arc::new(MapPoint::new(1, 40.8, -73.9)),
///     Arc::new(MapPoint::new(2, 40.0, 999.0)), // Invalid
/// ];
///
/// assert!(validate_points(&points).is_err());
/// ```
pub fn validate_points(points: &[Arc<MapPoint>]) -> Result<()> {
    for point in points {
        validate_point(point)?;
    }
    Ok(())
}
