//! Multi-level grid index over the points of one dataset.
//!
//! One grid level exists per supported zoom. A level's cells are squares of
//! `pixel_radius * degrees_per_pixel(zoom)` degrees, so a cell covers roughly
//! one clustering radius on screen at that zoom.
//!
//! ```text
//! SpatialIndex
//! ├─ points: Vec<Arc<MapPoint>>      (sorted by id, slot = position)
//! ├─ levels[zoom - min_zoom]: GridLevel
//! │  ├─ (412, 233) -> [0, 7, 9]
//! │  ├─ (412, 234) -> [3]
//! │  └─ ...
//! └─ rejected: Vec<Rejection>        (rows dropped at build time)
//! ```
//!
//! The index is read-only once built; a new dataset gets a new index.

use crate::compute::projection::degrees_per_pixel;
use crate::compute::validation::validate_point;
use crate::config::Config;
use crate::error::{InstapointsError, Result};
use instapoints_types::bbox::GeoBounds;
use instapoints_types::point::MapPoint;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use std::sync::Arc;

type CellKey = (i64, i64);
type Bucket = SmallVec<[u32; 8]>;

/// A point dropped while building the index.
#[derive(Debug, Clone, PartialEq)]
pub struct Rejection {
    pub id: u64,
    pub reason: String,
}

/// Statistics for a single grid level.
#[derive(Debug, Clone)]
pub struct LevelStats {
    pub zoom: u8,
    /// Cell edge length in degrees
    pub cell_size_degrees: f64,
    /// Number of non-empty cells
    pub occupied_cells: usize,
    /// Largest number of points in one cell
    pub max_cell_population: usize,
}

/// Overall statistics for the index.
#[derive(Debug, Clone)]
pub struct IndexStats {
    pub point_count: usize,
    pub rejected_count: usize,
    pub levels: Vec<LevelStats>,
}

#[derive(Debug, Clone)]
struct GridLevel {
    zoom: u8,
    cell_deg: f64,
    cells: FxHashMap<CellKey, Bucket>,
}

impl GridLevel {
    fn new(zoom: u8, pixel_radius: f64) -> Self {
        Self {
            zoom,
            cell_deg: pixel_radius * degrees_per_pixel(zoom),
            cells: FxHashMap::default(),
        }
    }

    fn key(&self, latitude: f64, longitude: f64) -> CellKey {
        (
            ((longitude + 180.0) / self.cell_deg).floor() as i64,
            ((latitude + 90.0) / self.cell_deg).floor() as i64,
        )
    }

    /// Slots of every point in cells overlapping `area`.
    fn collect(&self, area: &GeoBounds, out: &mut Vec<u32>) {
        let (x0, y0) = self.key(area.lat_min(), area.lon_min());
        let (x1, y1) = self.key(area.lat_max(), area.lon_max());
        let span = (x1 - x0 + 1) as u128 * (y1 - y0 + 1) as u128;

        if span > self.cells.len() as u128 {
            // Sparse data under a wide view: walk occupied cells instead.
            for (&(x, y), bucket) in &self.cells {
                if (x0..=x1).contains(&x) && (y0..=y1).contains(&y) {
                    out.extend_from_slice(bucket);
                }
            }
        } else {
            for x in x0..=x1 {
                for y in y0..=y1 {
                    if let Some(bucket) = self.cells.get(&(x, y)) {
                        out.extend_from_slice(bucket);
                    }
                }
            }
        }
    }
}

/// Queryable spatial structure over one dataset.
///
/// # Examples
///
/// ```rust
/// use instapoints::{GeoBounds, MapPoint, SpatialIndex};
///
/// let index = SpatialIndex::build(vec![
///     MapPoint::new(0, -23.55, -46.63),
///     MapPoint::new(1, -22.90, -43.17),
///     MapPoint::new(2, 95.0, 0.0), // rejected
/// ]);
/// assert_eq!(index.len(), 2);
/// assert_eq!(index.rejected().len(), 1);
///
/// let sao_paulo = GeoBounds::from_lat_lon(-24.0, -23.0, -47.0, -46.0);
/// let found = index.query(&sao_paulo, 8);
/// assert_eq!(found.len(), 1);
/// assert_eq!(found[0].id(), 0);
/// ```
#[derive(Debug, Clone)]
pub struct SpatialIndex {
    points: Vec<Arc<MapPoint>>,
    slots_by_id: FxHashMap<u64, u32>,
    levels: Vec<GridLevel>,
    min_zoom: u8,
    max_zoom: u8,
    buffer_margin: f64,
    rejected: Vec<Rejection>,
    extent: Option<GeoBounds>,
}

impl SpatialIndex {
    /// Build an index with the default configuration.
    pub fn build<I>(points: I) -> Self
    where
        I: IntoIterator<Item = MapPoint>,
    {
        Self::build_validated(points, &Config::default())
    }

    /// Build an index using the zoom range, pixel radius and buffer margin of
    /// `config`.
    ///
    /// Fails with [`InstapointsError::InvalidConfig`] when `config` does not
    /// validate. Invalid coordinates and repeated ids are dropped and recorded
    /// in [`rejected`](Self::rejected).
    pub fn build_with_config<I>(points: I, config: &Config) -> Result<Self>
    where
        I: IntoIterator<Item = MapPoint>,
    {
        config.validate()?;
        Ok(Self::build_validated(points, config))
    }

    /// An index with no points.
    pub fn empty(config: &Config) -> Result<Self> {
        Self::build_with_config(Vec::new(), config)
    }

    /// Build with a `config` the caller has already validated.
    pub(crate) fn build_validated<I>(points: I, config: &Config) -> Self
    where
        I: IntoIterator<Item = MapPoint>,
    {
        let mut accepted: Vec<MapPoint> = Vec::new();
        let mut rejected = Vec::new();

        for point in points {
            match validate_point(&point) {
                Ok(()) => accepted.push(point),
                Err(InstapointsError::InvalidCoordinate { id, reason }) => {
                    log::debug!("Dropping point {}: {}", id, reason);
                    rejected.push(Rejection { id, reason });
                }
                Err(other) => rejected.push(Rejection {
                    id: point.id(),
                    reason: other.to_string(),
                }),
            }
        }

        accepted.sort_by_key(MapPoint::id);
        let mut points: Vec<Arc<MapPoint>> = Vec::with_capacity(accepted.len());
        for point in accepted {
            if points.last().is_some_and(|last| last.id() == point.id()) {
                rejected.push(Rejection {
                    id: point.id(),
                    reason: "Duplicate point id".to_string(),
                });
                continue;
            }
            points.push(Arc::new(point));
        }

        if !rejected.is_empty() {
            log::warn!(
                "Skipped {} invalid row(s) while building spatial index ({} kept)",
                rejected.len(),
                points.len()
            );
        }

        let min_zoom = config.min_zoom.min(config.max_zoom);
        let max_zoom = config.max_zoom;
        let mut levels: Vec<GridLevel> = (min_zoom..=max_zoom)
            .map(|zoom| GridLevel::new(zoom, config.pixel_radius))
            .collect();

        let mut slots_by_id = FxHashMap::default();
        slots_by_id.reserve(points.len());

        for (slot, point) in points.iter().enumerate() {
            let slot = slot as u32;
            slots_by_id.insert(point.id(), slot);
            for level in &mut levels {
                let key = level.key(point.latitude(), point.longitude());
                level.cells.entry(key).or_default().push(slot);
            }
        }

        let extent = GeoBounds::from_points(points.iter().map(|p| p.location()));

        Self {
            points,
            slots_by_id,
            levels,
            min_zoom,
            max_zoom,
            buffer_margin: config.viewport_buffer_margin,
            rejected,
            extent,
        }
    }

    /// Points whose location falls inside `bounds` grown by the buffer margin.
    ///
    /// `zoom` selects the grid level and is clamped into the index's range.
    /// Results are ordered by ascending id.
    pub fn query(&self, bounds: &GeoBounds, zoom: u8) -> Vec<Arc<MapPoint>> {
        if self.points.is_empty() {
            return Vec::new();
        }

        let area = self.buffered(bounds);
        let level = self.level(zoom);

        let mut slots = Vec::new();
        level.collect(&area, &mut slots);
        slots.sort_unstable();

        slots
            .into_iter()
            .map(|slot| &self.points[slot as usize])
            .filter(|point| area.contains_point(&point.location()))
            .cloned()
            .collect()
    }

    /// `bounds` grown on each side by the configured buffer margin.
    pub fn buffered(&self, bounds: &GeoBounds) -> GeoBounds {
        bounds.pad(self.buffer_margin)
    }

    /// Look a point up by id.
    pub fn get(&self, id: u64) -> Option<&Arc<MapPoint>> {
        self.slots_by_id
            .get(&id)
            .map(|&slot| &self.points[slot as usize])
    }

    /// All indexed points, ascending by id.
    pub fn points(&self) -> &[Arc<MapPoint>] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Points dropped at build time.
    pub fn rejected(&self) -> &[Rejection] {
        &self.rejected
    }

    /// Bounding box of all indexed points, `None` when empty.
    pub fn extent(&self) -> Option<GeoBounds> {
        self.extent
    }

    pub fn zoom_range(&self) -> (u8, u8) {
        (self.min_zoom, self.max_zoom)
    }

    pub fn stats(&self) -> IndexStats {
        let levels = self
            .levels
            .iter()
            .map(|level| LevelStats {
                zoom: level.zoom,
                cell_size_degrees: level.cell_deg,
                occupied_cells: level.cells.len(),
                max_cell_population: level.cells.values().map(|b| b.len()).max().unwrap_or(0),
            })
            .collect();

        IndexStats {
            point_count: self.points.len(),
            rejected_count: self.rejected.len(),
            levels,
        }
    }

    fn level(&self, zoom: u8) -> &GridLevel {
        let zoom = zoom.clamp(self.min_zoom, self.max_zoom);
        &self.levels[(zoom - self.min_zoom) as usize]
    }
}
