//! Map session builder
//!
//! Collects configuration and an optional initial dataset, then creates a
//! [`MapController`] with the data already loaded.

use crate::config::Config;
use crate::error::Result;
use crate::ingest::PointRecord;
use crate::map::{LoadReport, MapController};
use instapoints_types::point::MapPoint;

#[derive(Debug, Clone)]
enum InitialData {
    Points(Vec<MapPoint>),
    Records(Vec<PointRecord>),
    JsonRows(String),
    #[cfg(feature = "geojson")]
    GeoJson(String),
}

/// Builder for a map session with custom clustering settings and initial data.
#[derive(Debug, Clone, Default)]
pub struct MapBuilder {
    config: Config,
    data: Option<InitialData>,
}

impl MapBuilder {
    /// Create a builder with default configuration and no data.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole configuration.
    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    pub fn pixel_radius(mut self, pixel_radius: f64) -> Self {
        self.config = self.config.with_pixel_radius(pixel_radius);
        self
    }

    pub fn zoom_range(mut self, min_zoom: u8, max_zoom: u8) -> Self {
        self.config = self.config.with_zoom_range(min_zoom, max_zoom);
        self
    }

    pub fn viewport_size(mut self, width: u32, height: u32) -> Self {
        self.config = self.config.with_viewport_size(width, height);
        self
    }

    /// Load these points on build. Replaces any data set earlier.
    pub fn points<I>(mut self, points: I) -> Self
    where
        I: IntoIterator<Item = MapPoint>,
    {
        self.data = Some(InitialData::Points(points.into_iter().collect()));
        self
    }

    /// Load these records on build, ids assigned by position.
    pub fn records<I>(mut self, records: I) -> Self
    where
        I: IntoIterator<Item = PointRecord>,
    {
        self.data = Some(InitialData::Records(records.into_iter().collect()));
        self
    }

    /// Parse and load a JSON array of rows on build.
    pub fn json_rows(mut self, json: impl Into<String>) -> Self {
        self.data = Some(InitialData::JsonRows(json.into()));
        self
    }

    /// Parse and load a GeoJSON FeatureCollection on build.
    #[cfg(feature = "geojson")]
    pub fn geojson(mut self, text: impl Into<String>) -> Self {
        self.data = Some(InitialData::GeoJson(text.into()));
        self
    }

    /// Build the controller. Fails on invalid configuration or unreadable input.
    pub fn build(self) -> Result<MapController> {
        self.build_with_report().map(|(map, _)| map)
    }

    /// Build the controller and return the load report of the initial data, if any.
    pub fn build_with_report(self) -> Result<(MapController, Option<LoadReport>)> {
        let mut map = MapController::new(self.config)?;

        let report = match self.data {
            None => None,
            Some(InitialData::Points(points)) => Some(map.load_points(points)),
            Some(InitialData::Records(records)) => Some(map.load_records(records)),
            Some(InitialData::JsonRows(json)) => Some(map.load_json_rows(&json)?),
            #[cfg(feature = "geojson")]
            Some(InitialData::GeoJson(text)) => Some(map.load_geojson(&text)?),
        };

        Ok((map, report))
    }
}
