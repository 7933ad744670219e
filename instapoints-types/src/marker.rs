use crate::point::MapPoint;
use geo::Point;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::Arc;

/// A group of two or more nearby points drawn as one icon with a count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterMarker {
    pub centroid_lat: f64,
    pub centroid_lon: f64,
    /// Number of member points, always `>= 2`
    pub count: usize,
    pub member_ids: BTreeSet<u64>,
}

impl ClusterMarker {
    /// The centroid as a `geo::Point` (x = longitude, y = latitude).
    pub fn centroid(&self) -> Point {
        Point::new(self.centroid_lon, self.centroid_lat)
    }
}

/// A point drawn on its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SinglePointMarker {
    pub point: Arc<MapPoint>,
}

/// One render unit produced by a clustering pass.
///
/// Markers are recomputed from scratch on every view change and never
/// mutated afterwards.
///
/// # Examples
///
/// ```
/// use instapoints_types::marker::{Marker, SinglePointMarker};
/// use instapoints_types::point::MapPoint;
/// use std::sync::Arc;
///
/// let marker = Marker::Single(SinglePointMarker {
///     point: Arc::new(MapPoint::new(4, 1.0, 2.0)),
/// });
/// assert_eq!(marker.count(), 1);
/// assert_eq!(marker.ids(), vec![4]);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Marker {
    Cluster(ClusterMarker),
    Single(SinglePointMarker),
}

impl Marker {
    /// Number of points represented by this marker.
    pub fn count(&self) -> usize {
        match self {
            Marker::Cluster(cluster) => cluster.count,
            Marker::Single(_) => 1,
        }
    }

    /// Ids of every point represented by this marker, ascending.
    pub fn ids(&self) -> Vec<u64> {
        match self {
            Marker::Cluster(cluster) => cluster.member_ids.iter().copied().collect(),
            Marker::Single(single) => vec![single.point.id()],
        }
    }

    /// Where the marker is drawn.
    pub fn position(&self) -> Point {
        match self {
            Marker::Cluster(cluster) => cluster.centroid(),
            Marker::Single(single) => single.point.location(),
        }
    }

    pub fn is_cluster(&self) -> bool {
        matches!(self, Marker::Cluster(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cluster_marker_ids_and_position() {
        let marker = Marker::Cluster(ClusterMarker {
            centroid_lat: 10.0,
            centroid_lon: 20.0,
            count: 3,
            member_ids: [5, 1, 3].into_iter().collect(),
        });

        assert!(marker.is_cluster());
        assert_eq!(marker.count(), 3);
        assert_eq!(marker.ids(), vec![1, 3, 5]);
        assert_eq!(marker.position(), Point::new(20.0, 10.0));
    }

    #[test]
    fn test_marker_serializes_with_kind_tag() {
        let marker = Marker::Single(SinglePointMarker {
            point: Arc::new(MapPoint::new(1, 0.5, 0.25)),
        });
        let json = serde_json::to_value(&marker).unwrap();
        assert_eq!(json["kind"], "single");
    }
}
