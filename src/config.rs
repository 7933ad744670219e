//! Engine configuration.
//!
//! Every field has a serde default so partial documents load cleanly.

use crate::error::{InstapointsError, Result};
use serde::{Deserialize, Serialize};

/// Highest zoom level the projection and grid index support.
pub const MAX_SUPPORTED_ZOOM: u8 = 24;

/// Clustering and interaction settings.
///
/// # Example
///
/// ```rust
/// use instapoints::Config;
///
/// let config = Config::default();
/// assert_eq!(config.pixel_radius, 50.0);
///
/// let json = r#"{
///     "pixel_radius": 60.0,
///     "max_zoom": 16
/// }"#;
/// let config = Config::from_json(json).unwrap();
/// assert_eq!(config.pixel_radius, 60.0);
/// assert_eq!(config.min_zoom, 0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Cluster merge distance in screen pixels
    #[serde(default = "Config::default_pixel_radius")]
    pub pixel_radius: f64,

    #[serde(default)]
    pub min_zoom: u8,

    #[serde(default = "Config::default_max_zoom")]
    pub max_zoom: u8,

    /// Fraction of the viewport span added on each side for buffered queries
    #[serde(default = "Config::default_viewport_buffer_margin")]
    pub viewport_buffer_margin: f64,

    /// Zoom levels gained when a cluster marker is clicked
    #[serde(default = "Config::default_max_zoom_step_per_cluster_click")]
    pub max_zoom_step_per_cluster_click: u8,

    /// Map surface width in pixels
    #[serde(default = "Config::default_viewport_width")]
    pub viewport_width: u32,

    /// Map surface height in pixels
    #[serde(default = "Config::default_viewport_height")]
    pub viewport_height: u32,
}

impl Config {
    const fn default_pixel_radius() -> f64 {
        50.0
    }

    const fn default_max_zoom() -> u8 {
        18
    }

    const fn default_viewport_buffer_margin() -> f64 {
        0.25
    }

    const fn default_max_zoom_step_per_cluster_click() -> u8 {
        1
    }

    const fn default_viewport_width() -> u32 {
        1000
    }

    const fn default_viewport_height() -> u32 {
        600
    }

    pub fn with_pixel_radius(mut self, pixel_radius: f64) -> Self {
        self.pixel_radius = pixel_radius;
        self
    }

    pub fn with_zoom_range(mut self, min_zoom: u8, max_zoom: u8) -> Self {
        self.min_zoom = min_zoom;
        self.max_zoom = max_zoom;
        self
    }

    pub fn with_viewport_buffer_margin(mut self, margin: f64) -> Self {
        self.viewport_buffer_margin = margin;
        self
    }

    pub fn with_cluster_click_step(mut self, step: u8) -> Self {
        self.max_zoom_step_per_cluster_click = step;
        self
    }

    /// Set the size of the map surface in pixels.
    pub fn with_viewport_size(mut self, width: u32, height: u32) -> Self {
        self.viewport_width = width;
        self.viewport_height = height;
        self
    }

    /// Clamp a requested zoom into `[min_zoom, max_zoom]`.
    pub fn clamp_zoom(&self, zoom: i32) -> u8 {
        zoom.clamp(self.min_zoom as i32, self.max_zoom as i32) as u8
    }

    /// Check that a requested zoom lies in `[min_zoom, max_zoom]`.
    pub fn check_zoom(&self, zoom: i32) -> Result<u8> {
        if zoom < self.min_zoom as i32 || zoom > self.max_zoom as i32 {
            return Err(InstapointsError::ZoomOutOfBounds {
                requested: zoom,
                min: self.min_zoom,
                max: self.max_zoom,
            });
        }
        Ok(zoom as u8)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if !self.pixel_radius.is_finite() || self.pixel_radius <= 0.0 {
            return Err(InstapointsError::InvalidConfig(format!(
                "Pixel radius must be positive and finite, got: {}",
                self.pixel_radius
            )));
        }

        if self.min_zoom > self.max_zoom {
            return Err(InstapointsError::InvalidConfig(format!(
                "Minimum zoom {} is greater than maximum zoom {}",
                self.min_zoom, self.max_zoom
            )));
        }

        if self.max_zoom > MAX_SUPPORTED_ZOOM {
            return Err(InstapointsError::InvalidConfig(format!(
                "Maximum zoom must be at most {}, got: {}",
                MAX_SUPPORTED_ZOOM, self.max_zoom
            )));
        }

        if !self.viewport_buffer_margin.is_finite() || self.viewport_buffer_margin < 0.0 {
            return Err(InstapointsError::InvalidConfig(format!(
                "Viewport buffer margin must be a non-negative fraction, got: {}",
                self.viewport_buffer_margin
            )));
        }

        if self.max_zoom_step_per_cluster_click == 0 {
            return Err(InstapointsError::InvalidConfig(
                "Cluster click zoom step must be greater than zero".to_string(),
            ));
        }

        if self.viewport_width == 0 || self.viewport_height == 0 {
            return Err(InstapointsError::InvalidConfig(
                "Viewport dimensions must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }

    /// Load configuration from JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration as JSON string
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load configuration from TOML string (requires toml feature)
    #[cfg(feature = "toml")]
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let config: Config = toml::from_str(toml_str)
            .map_err(|e| InstapointsError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration as TOML string (requires toml feature)
    #[cfg(feature = "toml")]
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| InstapointsError::InvalidConfig(e.to_string()))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            pixel_radius: Self::default_pixel_radius(),
            min_zoom: 0,
            max_zoom: Self::default_max_zoom(),
            viewport_buffer_margin: Self::default_viewport_buffer_margin(),
            max_zoom_step_per_cluster_click: Self::default_max_zoom_step_per_cluster_click(),
            viewport_width: Self::default_viewport_width(),
            viewport_height: Self::default_viewport_height(),
        }
    }
}
