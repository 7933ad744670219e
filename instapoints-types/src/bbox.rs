use geo::{Point, Rect};
use serde::{Deserialize, Serialize};

/// Latitude range representable on the map, in degrees.
pub const LATITUDE_RANGE: (f64, f64) = (-90.0, 90.0);

/// Longitude range representable on the map, in degrees.
pub const LONGITUDE_RANGE: (f64, f64) = (-180.0, 180.0);

/// A geographic axis-aligned bounding box.
///
/// Wraps `geo::Rect` with `x = longitude` and `y = latitude`. Used both for
/// viewport bounds and for dataset extents. Bounds never cross the
/// antimeridian.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoBounds {
    /// The underlying geometric rectangle
    pub rect: Rect,
}

impl GeoBounds {
    /// Create a new bounding box from minimum and maximum coordinates.
    ///
    /// # Arguments
    ///
    /// * `min_x` - Minimum longitude
    /// * `min_y` - Minimum latitude
    /// * `max_x` - Maximum longitude
    /// * `max_y` - Maximum latitude
    ///
    /// # Examples
    ///
    /// ```
    /// use instapoints_types::bbox::GeoBounds;
    ///
    /// let bbox = GeoBounds::new(-74.0, 40.7, -73.9, 40.8);
    /// assert_eq!(bbox.lat_min(), 40.7);
    /// ```
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            rect: Rect::new(
                geo::coord! { x: min_x, y: min_y },
                geo::coord! { x: max_x, y: max_y },
            ),
        }
    }

    /// Create a bounding box from latitude and longitude extents.
    pub fn from_lat_lon(lat_min: f64, lat_max: f64, lon_min: f64, lon_max: f64) -> Self {
        Self::new(lon_min, lat_min, lon_max, lat_max)
    }

    /// The whole WGS84 coordinate space.
    pub fn world() -> Self {
        Self::new(
            LONGITUDE_RANGE.0,
            LATITUDE_RANGE.0,
            LONGITUDE_RANGE.1,
            LATITUDE_RANGE.1,
        )
    }

    /// Smallest box containing every point, or `None` for an empty input.
    pub fn from_points<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = Point>,
    {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let (mut min_x, mut min_y) = (first.x(), first.y());
        let (mut max_x, mut max_y) = (min_x, min_y);

        for p in iter {
            min_x = min_x.min(p.x());
            min_y = min_y.min(p.y());
            max_x = max_x.max(p.x());
            max_y = max_y.max(p.y());
        }

        Some(Self::new(min_x, min_y, max_x, max_y))
    }

    pub fn lat_min(&self) -> f64 {
        self.rect.min().y
    }

    pub fn lat_max(&self) -> f64 {
        self.rect.max().y
    }

    pub fn lon_min(&self) -> f64 {
        self.rect.min().x
    }

    pub fn lon_max(&self) -> f64 {
        self.rect.max().x
    }

    /// Get the center point of the bounding box.
    pub fn center(&self) -> Point {
        Point::new(
            (self.lon_min() + self.lon_max()) / 2.0,
            (self.lat_min() + self.lat_max()) / 2.0,
        )
    }

    /// Longitude span in degrees.
    pub fn width(&self) -> f64 {
        self.lon_max() - self.lon_min()
    }

    /// Latitude span in degrees.
    pub fn height(&self) -> f64 {
        self.lat_max() - self.lat_min()
    }

    /// Check if a point is contained within this bounding box (edges included).
    pub fn contains_point(&self, point: &Point) -> bool {
        point.x() >= self.lon_min()
            && point.x() <= self.lon_max()
            && point.y() >= self.lat_min()
            && point.y() <= self.lat_max()
    }

    /// Check if this bounding box intersects with another.
    pub fn intersects(&self, other: &GeoBounds) -> bool {
        !(self.lon_max() < other.lon_min()
            || self.lon_min() > other.lon_max()
            || self.lat_max() < other.lat_min()
            || self.lat_min() > other.lat_max())
    }

    /// Grow the box on every side by `ratio` times its own span.
    ///
    /// A ratio of `0.25` adds a quarter of the height above and below and a
    /// quarter of the width left and right. The result is clamped to the
    /// world.
    ///
    /// ```
    /// use instapoints_types::bbox::GeoBounds;
    ///
    /// let padded = GeoBounds::from_lat_lon(0.0, 4.0, 10.0, 18.0).pad(0.25);
    /// assert_eq!(padded.lat_min(), -1.0);
    /// assert_eq!(padded.lat_max(), 5.0);
    /// assert_eq!(padded.lon_min(), 8.0);
    /// assert_eq!(padded.lon_max(), 20.0);
    /// ```
    pub fn pad(&self, ratio: f64) -> Self {
        let dy = self.height() * ratio;
        let dx = self.width() * ratio;
        Self::new(
            self.lon_min() - dx,
            self.lat_min() - dy,
            self.lon_max() + dx,
            self.lat_max() + dy,
        )
        .clamp_to_world()
    }

    /// Clamp every edge into the valid latitude/longitude range.
    pub fn clamp_to_world(&self) -> Self {
        Self::new(
            self.lon_min().clamp(LONGITUDE_RANGE.0, LONGITUDE_RANGE.1),
            self.lat_min().clamp(LATITUDE_RANGE.0, LATITUDE_RANGE.1),
            self.lon_max().clamp(LONGITUDE_RANGE.0, LONGITUDE_RANGE.1),
            self.lat_max().clamp(LATITUDE_RANGE.0, LATITUDE_RANGE.1),
        )
    }
}
