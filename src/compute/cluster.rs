//! Greedy single-pass point clustering in screen space.
//!
//! Points are visited in ascending id order. Each one joins the nearest open
//! centroid within `pixel_radius` pixels at the given zoom (ties go to the
//! centroid opened first) or opens a new centroid. A centroid is the mean
//! latitude/longitude of its members and is re-projected after every join.
//!
//! Open centroids live in an R-tree keyed by projected pixel position, so each
//! step is a radius lookup rather than a scan over every centroid.

use crate::compute::projection::project;
use crate::compute::validation::validate_points;
use crate::error::{InstapointsError, Result};
use instapoints_types::marker::{ClusterMarker, Marker, SinglePointMarker};
use instapoints_types::point::MapPoint;
use rstar::RTree;
use rstar::primitives::GeomWithData;
use std::sync::Arc;

/// An open centroid in the R-tree: pixel position plus group slot.
type OpenCentroid = GeomWithData<[f64; 2], usize>;

struct Group {
    sum_lat: f64,
    sum_lon: f64,
    pixel: [f64; 2],
    members: Vec<Arc<MapPoint>>,
}

impl Group {
    fn seed(point: &Arc<MapPoint>, pixel: [f64; 2]) -> Self {
        Self {
            sum_lat: point.latitude(),
            sum_lon: point.longitude(),
            pixel,
            members: vec![Arc::clone(point)],
        }
    }

    fn centroid(&self) -> (f64, f64) {
        let n = self.members.len() as f64;
        (self.sum_lat / n, self.sum_lon / n)
    }

    fn join(&mut self, point: &Arc<MapPoint>, zoom: u8) {
        self.sum_lat += point.latitude();
        self.sum_lon += point.longitude();
        self.members.push(Arc::clone(point));

        let (lat, lon) = self.centroid();
        self.pixel = project(lat, lon, zoom);
    }

    fn into_marker(mut self) -> Marker {
        if self.members.len() == 1 {
            if let Some(point) = self.members.pop() {
                return Marker::Single(SinglePointMarker { point });
            }
        }

        let (centroid_lat, centroid_lon) = self.centroid();
        Marker::Cluster(ClusterMarker {
            centroid_lat,
            centroid_lon,
            count: self.members.len(),
            member_ids: self.members.iter().map(|p| p.id()).collect(),
        })
    }
}

fn distance_2(a: &[f64; 2], b: &[f64; 2]) -> f64 {
    let dx = a[0] - b[0];
    let dy = a[1] - b[1];
    dx * dx + dy * dy
}

/// Group candidate points into markers for one zoom level.
///
/// # Arguments
///
/// * `candidates` - Points to group, in any order
/// * `zoom` - Zoom level used to project points to pixels
/// * `pixel_radius` - Merge distance in pixels (inclusive)
///
/// # Returns
///
/// Markers in the order their centroids were opened. Identical arguments
/// always yield identical output.
///
/// # Errors
///
/// `InvalidCoordinate` if a candidate lies outside `[-90,90]×[-180,180]`,
/// `InvalidInput` if `pixel_radius` is negative or not finite.
///
/// # Examples
///
/// ```rust
/// use instapoints::compute::cluster::cluster;
/// use instapoints::{MapPoint, Marker};
/// use std::sync::Arc;
///
/// let points = vec![
///     Arc::new(MapPoint::new(0, 0.0, 0.0)),
///     Arc::new(MapPoint::new(1, 0.0, 0.0001)),
///     Arc::new(MapPoint::new(2, 50.0, 50.0)),
/// ];
///
/// let markers = cluster(&points, 10, 50.0)?;
/// assert_eq!(markers.len(), 2);
/// assert!(matches!(&markers[0], Marker::Cluster(c) if c.count == 2));
/// assert!(matches!(&markers[1], Marker::Single(s) if s.point.id() == 2));
/// # Ok::<(), instapoints::InstapointsError>(())
/// ```
pub fn cluster(candidates: &[Arc<MapPoint>], zoom: u8, pixel_radius: f64) -> Result<Vec<Marker>> {
    if !pixel_radius.is_finite() || pixel_radius < 0.0 {
        return Err(InstapointsError::InvalidInput(format!(
            "Pixel radius must be finite and non-negative, got: {}",
            pixel_radius
        )));
    }
    validate_points(candidates)?;

    let mut ordered: Vec<&Arc<MapPoint>> = candidates.iter().collect();
    ordered.sort_by_key(|p| p.id());

    let max_distance_2 = pixel_radius * pixel_radius;
    let mut groups: Vec<Group> = Vec::new();
    let mut open: RTree<OpenCentroid> = RTree::new();

    for point in ordered {
        let pixel = project(point.latitude(), point.longitude(), zoom);

        let nearest = open
            .locate_within_distance(pixel, max_distance_2)
            .map(|centroid| (distance_2(centroid.geom(), &pixel), centroid.data))
            .min_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));

        match nearest {
            Some((_, slot)) => {
                let group = &mut groups[slot];
                open.remove(&OpenCentroid::new(group.pixel, slot));
                group.join(point, zoom);
                open.insert(OpenCentroid::new(group.pixel, slot));
            }
            None => {
                let slot = groups.len();
                groups.push(Group::seed(point, pixel));
                open.insert(OpenCentroid::new(pixel, slot));
            }
        }
    }

    log::debug!(
        "Clustered {} point(s) into {} marker(s) at zoom {} (radius {}px)",
        candidates.len(),
        groups.len(),
        zoom,
        pixel_radius
    );

    Ok(groups.into_iter().map(Group::into_marker).collect())
}
