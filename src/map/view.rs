//! View state: where the map is looking and at what zoom.

use crate::compute::projection::{MAX_MERCATOR_LATITUDE, project, unproject, world_size};
use crate::config::Config;
use geo::Point;
use instapoints_types::bbox::{GeoBounds, LATITUDE_RANGE, LONGITUDE_RANGE};
use serde::{Deserialize, Serialize};

/// Size of the map surface in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewportSize {
    pub width: u32,
    pub height: u32,
}

impl ViewportSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.viewport_width, config.viewport_height)
    }
}

/// Current center, zoom and visible bounds of one session's map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewState {
    pub zoom: u8,
    pub center_lat: f64,
    pub center_lon: f64,
    pub viewport: GeoBounds,
    pub size: ViewportSize,
}

impl ViewState {
    /// Build a view centered on `(latitude, longitude)`.
    ///
    /// The center is clamped to the Mercator square and `zoom` is expected to
    /// be already clamped by the caller.
    pub fn new(latitude: f64, longitude: f64, zoom: u8, size: ViewportSize) -> Self {
        let center_lat = latitude.clamp(-MAX_MERCATOR_LATITUDE, MAX_MERCATOR_LATITUDE);
        let center_lon = longitude.clamp(LONGITUDE_RANGE.0, LONGITUDE_RANGE.1);

        Self {
            zoom,
            center_lat,
            center_lon,
            viewport: viewport_bounds(center_lat, center_lon, zoom, size),
            size,
        }
    }

    /// Whole-world view used when there is nothing to show.
    pub fn global(config: &Config, size: ViewportSize) -> Self {
        Self::new(0.0, 0.0, config.min_zoom, size)
    }

    /// View centered on `bounds` at the largest zoom where it fits the viewport.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use instapoints::{Config, GeoBounds};
    /// use instapoints::map::{ViewState, ViewportSize};
    ///
    /// let config = Config::default();
    /// let brazil_south_east = GeoBounds::from_lat_lon(-25.0, -19.0, -50.0, -40.0);
    /// let view = ViewState::fit(&brazil_south_east, &config, ViewportSize::new(1000, 600));
    ///
    /// assert_eq!(view.center_lat, -22.0);
    /// assert_eq!(view.center_lon, -45.0);
    /// assert!(view.viewport.lat_min() <= -25.0 && view.viewport.lat_max() >= -19.0);
    /// ```
    pub fn fit(bounds: &GeoBounds, config: &Config, size: ViewportSize) -> Self {
        let center = bounds.center();
        let zoom = (config.min_zoom..=config.max_zoom)
            .rev()
            .find(|&zoom| {
                let [x0, y0] = project(bounds.lat_max(), bounds.lon_min(), zoom);
                let [x1, y1] = project(bounds.lat_min(), bounds.lon_max(), zoom);
                x1 - x0 <= f64::from(size.width) && y1 - y0 <= f64::from(size.height)
            })
            .unwrap_or(config.min_zoom);

        Self::new(center.y(), center.x(), zoom, size)
    }

    pub fn center(&self) -> Point {
        Point::new(self.center_lon, self.center_lat)
    }

    /// Same center at another zoom.
    pub fn with_zoom(&self, zoom: u8) -> Self {
        Self::new(self.center_lat, self.center_lon, zoom, self.size)
    }

    /// Same center and zoom on a resized surface.
    pub fn with_size(&self, size: ViewportSize) -> Self {
        Self::new(self.center_lat, self.center_lon, self.zoom, size)
    }

    /// Move the center by a screen offset in pixels (positive `dy` is south).
    pub fn panned_by(&self, dx: f64, dy: f64) -> Self {
        let [x, y] = project(self.center_lat, self.center_lon, self.zoom);
        let size = world_size(self.zoom);
        let (lat, lon) = unproject(
            (x + dx).clamp(0.0, size),
            (y + dy).clamp(0.0, size),
            self.zoom,
        );
        Self::new(lat, lon, self.zoom, self.size)
    }
}

/// Geographic bounds of a `size` pixel window centered on the given point.
///
/// Edges that reach the border of the Mercator square snap to the full
/// latitude/longitude range so the polar caps stay queryable.
fn viewport_bounds(center_lat: f64, center_lon: f64, zoom: u8, size: ViewportSize) -> GeoBounds {
    let [cx, cy] = project(center_lat, center_lon, zoom);
    let world = world_size(zoom);
    let half_w = f64::from(size.width) / 2.0;
    let half_h = f64::from(size.height) / 2.0;

    let (x0, x1) = (cx - half_w, cx + half_w);
    let (y0, y1) = (cy - half_h, cy + half_h);

    let (lat_max, lon_min) = unproject(x0.max(0.0), y0.max(0.0), zoom);
    let (lat_min, lon_max) = unproject(x1.min(world), y1.min(world), zoom);

    GeoBounds::from_lat_lon(
        if y1 >= world { LATITUDE_RANGE.0 } else { lat_min },
        if y0 <= 0.0 { LATITUDE_RANGE.1 } else { lat_max },
        if x0 <= 0.0 { LONGITUDE_RANGE.0 } else { lon_min },
        if x1 >= world { LONGITUDE_RANGE.1 } else { lon_max },
    )
}
