//! GeoJSON export of rendered frames.

use crate::error::Result;
use crate::map::Frame;
use geojson::feature::Id;
use geojson::{Feature, FeatureCollection, Geometry, Value};
use instapoints_types::marker::Marker;
use serde_json::Map;

/// Converts one marker to a GeoJSON Feature.
///
/// Clusters carry `kind = "cluster"`, `count` and `member_ids`. Single points
/// carry `kind = "point"`, their `id` and their attributes.
pub fn marker_to_feature(marker: &Marker) -> Feature {
    let position = marker.position();
    let geometry = Geometry::new(Value::Point(vec![position.x(), position.y()]));
    let mut props = Map::new();

    let id = match marker {
        Marker::Cluster(cluster) => {
            props.insert("kind".to_string(), "cluster".into());
            props.insert("count".to_string(), cluster.count.into());
            props.insert(
                "member_ids".to_string(),
                cluster.member_ids.iter().copied().collect::<Vec<u64>>().into(),
            );
            None
        }
        Marker::Single(single) => {
            let point = &single.point;
            for (key, value) in point.attributes() {
                props.insert(key.clone(), value.clone());
            }
            props.insert("kind".to_string(), "point".into());
            props.insert("id".to_string(), point.id().into());
            Some(Id::Number(point.id().into()))
        }
    };

    Feature {
        bbox: None,
        geometry: Some(geometry),
        id,
        properties: Some(props),
        foreign_members: None,
    }
}

/// Converts markers to a GeoJSON FeatureCollection string.
pub fn markers_to_feature_collection(markers: &[Marker]) -> Result<String> {
    let collection = FeatureCollection {
        bbox: None,
        features: markers.iter().map(marker_to_feature).collect(),
        foreign_members: None,
    };

    Ok(serde_json::to_string(&collection)?)
}

/// Converts a frame to a GeoJSON FeatureCollection string.
///
/// The collection's `bbox` is the viewport; `zoom`, `center` and
/// `generation` are added as foreign members.
///
/// # Examples
///
/// ```rust
/// use instapoints::compute::geojson::frame_to_feature_collection;
/// use instapoints::map::Effect;
/// use instapoints::{Config, MapController, MapPoint};
///
/// let mut map = MapController::new(Config::default())?;
/// map.load_points(vec![MapPoint::new(0, 48.85, 2.35), MapPoint::new(1, 48.85, 2.35)]);
/// map.pump();
///
/// let json = frame_to_feature_collection(map.frame().unwrap())?;
/// assert!(json.contains("\"kind\":\"cluster\""));
/// # Ok::<(), instapoints::InstapointsError>(())
/// ```
pub fn frame_to_feature_collection(frame: &Frame) -> Result<String> {
    let viewport = &frame.view.viewport;

    let mut members = Map::new();
    members.insert("zoom".to_string(), frame.view.zoom.into());
    members.insert(
        "center".to_string(),
        vec![frame.view.center_lon, frame.view.center_lat].into(),
    );
    members.insert("generation".to_string(), frame.generation.into());

    let collection = FeatureCollection {
        bbox: Some(vec![
            viewport.lon_min(),
            viewport.lat_min(),
            viewport.lon_max(),
            viewport.lat_max(),
        ]),
        features: frame.markers.iter().map(marker_to_feature).collect(),
        foreign_members: Some(members),
    };

    Ok(serde_json::to_string(&collection)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use instapoints_types::marker::{ClusterMarker, SinglePointMarker};
    use instapoints_types::point::MapPoint;
    use std::collections::BTreeSet;
    use std::sync::Arc;

    fn cluster() -> Marker {
        Marker::Cluster(ClusterMarker {
            centroid_lat: 10.0,
            centroid_lon: 20.0,
            count: 3,
            member_ids: BTreeSet::from([4, 1, 9]),
        })
    }

    fn single() -> Marker {
        let point = MapPoint::new(7, -23.5, -46.6).with_attribute("name", "Sao Paulo");
        Marker::Single(SinglePointMarker {
            point: Arc::new(point),
        })
    }

    #[test]
    fn test_cluster_feature() {
        let feature = marker_to_feature(&cluster());
        let props = feature.properties.unwrap();

        assert_eq!(props["kind"], "cluster");
        assert_eq!(props["count"], 3);
        assert_eq!(props["member_ids"], serde_json::json!([1, 4, 9]));
        assert_eq!(
            feature.geometry.unwrap().value,
            Value::Point(vec![20.0, 10.0])
        );
        assert!(feature.id.is_none());
    }

    #[test]
    fn test_single_feature_keeps_attributes() {
        let feature = marker_to_feature(&single());
        let props = feature.properties.unwrap();

        assert_eq!(props["kind"], "point");
        assert_eq!(props["id"], 7);
        assert_eq!(props["name"], "Sao Paulo");
        assert_eq!(feature.id, Some(Id::Number(7u64.into())));
    }

    #[test]
    fn test_markers_to_feature_collection() {
        let json = markers_to_feature_collection(&[cluster(), single()]).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed["type"], "FeatureCollection");
        assert_eq!(parsed["features"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_empty_collection() {
        let json = markers_to_feature_collection(&[]).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert!(parsed["features"].as_array().unwrap().is_empty());
    }
}
