//! Spatial indexing for point datasets.
//!
//! The index answers one question per view change: which points lie in the
//! (buffered) viewport. Lookups touch only the grid cells overlapping the
//! query, so cost tracks the number of points returned rather than the
//! dataset size.

pub mod grid;

pub use grid::{IndexStats, LevelStats, Rejection, SpatialIndex};
