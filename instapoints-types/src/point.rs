use geo::Point;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Schema-less attribute bag carried by every point.
///
/// Keys are the original column names; values keep whatever type the
/// ingestor produced (string, number, bool, null).
pub type Attributes = BTreeMap<String, serde_json::Value>;

/// An immutable geographic point loaded from a dataset.
///
/// The `id` is assigned once at ingestion (the zero-based row position) and is
/// used as the deterministic ordering key by the cluster engine.
///
/// # Examples
///
/// ```
/// use instapoints_types::point::MapPoint;
///
/// let point = MapPoint::new(0, 40.7128, -74.0060).with_attribute("name", "NYC");
/// assert_eq!(point.latitude(), 40.7128);
/// assert_eq!(point.longitude(), -74.0060);
/// assert_eq!(point.attributes()["name"], "NYC");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapPoint {
    id: u64,
    location: Point<f64>,
    #[serde(default)]
    attributes: Attributes,
}

impl MapPoint {
    /// Create a point without attributes.
    ///
    /// # Arguments
    ///
    /// * `id` - Identifier, unique within one dataset
    /// * `latitude` - Latitude in decimal degrees
    /// * `longitude` - Longitude in decimal degrees
    pub fn new(id: u64, latitude: f64, longitude: f64) -> Self {
        Self {
            id,
            location: Point::new(longitude, latitude),
            attributes: Attributes::new(),
        }
    }

    /// Create a point with a full attribute map.
    pub fn with_attributes(id: u64, latitude: f64, longitude: f64, attributes: Attributes) -> Self {
        Self {
            id,
            location: Point::new(longitude, latitude),
            attributes,
        }
    }

    /// Add a single attribute, consuming and returning the point.
    pub fn with_attribute(
        mut self,
        key: impl Into<String>,
        value: impl Into<serde_json::Value>,
    ) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn latitude(&self) -> f64 {
        self.location.y()
    }

    pub fn longitude(&self) -> f64 {
        self.location.x()
    }

    /// The location as a `geo::Point` (x = longitude, y = latitude).
    pub fn location(&self) -> Point<f64> {
        self.location
    }

    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }
}
