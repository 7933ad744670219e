//! Inputs to and outputs from the map controller.

use super::view::{ViewState, ViewportSize};
use crate::compute::spatial::Rejection;
use crate::error::InstapointsError;
use instapoints_types::marker::Marker;
use instapoints_types::point::MapPoint;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// User interaction reported by the renderer.
#[derive(Debug, Clone, PartialEq)]
pub enum MapEvent {
    /// Recenter on a coordinate, keeping the zoom.
    PanTo { latitude: f64, longitude: f64 },
    /// Drag the map by a screen offset in pixels.
    PanBy { dx: f64, dy: f64 },
    ZoomTo(i32),
    ZoomBy(i32),
    /// Replace center and zoom at once.
    SetView {
        latitude: f64,
        longitude: f64,
        zoom: i32,
    },
    Resize(ViewportSize),
    MarkerClicked(Marker),
}

/// Side effect requested by the controller.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Markers for this generation must be recomputed.
    Recompute { generation: u64 },
    Redraw(Frame),
    Popup(Arc<MapPoint>),
}

/// Everything the renderer needs to draw one state of the map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub generation: u64,
    pub view: ViewState,
    pub markers: Vec<Marker>,
}

impl Frame {
    /// Total number of points represented by the frame's markers.
    pub fn point_count(&self) -> usize {
        self.markers.iter().map(Marker::count).sum()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatasetStatus {
    Ready,
    /// No valid point survived ingestion.
    Empty,
}

/// Outcome of replacing the controller's dataset.
#[derive(Debug, Clone)]
pub struct LoadReport {
    pub status: DatasetStatus,
    pub generation: u64,
    pub loaded: usize,
    /// Rows dropped before reaching the index (missing or non-numeric coordinates).
    pub dropped_rows: usize,
    /// Points the index refused, with the reason.
    pub rejected: Vec<Rejection>,
}

impl LoadReport {
    pub fn is_empty(&self) -> bool {
        self.status == DatasetStatus::Empty
    }

    /// Message to show in place of the map when nothing could be loaded.
    pub fn empty_message(&self) -> Option<String> {
        self.is_empty()
            .then(|| InstapointsError::EmptyDataset.to_string())
    }

    pub fn skipped(&self) -> usize {
        self.dropped_rows + self.rejected.len()
    }
}

/// Counters describing how the controller handled events.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ControllerStats {
    pub events: u64,
    pub recomputes: u64,
    /// Pending views overwritten before a job picked them up.
    pub coalesced: u64,
    /// Finished jobs dropped because a reload happened in between.
    pub stale_discarded: u64,
    pub reloads: u64,
}
