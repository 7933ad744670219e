use instapoints::ingest::records_from_json_rows;
use instapoints::map::{ControllerState, DatasetStatus, Effect};
use instapoints::{
    Config, GeoBounds, InstapointsError, MapBuilder, MapController, MapEvent, MapPoint, Marker,
    SpatialIndex,
};

/// Test 1: Large dataset, small window at high zoom
#[test]
fn test_large_dataset_deep_zoom() {
    let points: Vec<MapPoint> = (0..10_000u64)
        .map(|i| {
            let lat = 40.0 + (i % 100) as f64 * 0.001;
            let lon = -74.0 + (i / 100) as f64 * 0.001;
            MapPoint::new(i, lat, lon)
        })
        .collect();

    let mut map = MapBuilder::new().points(points).build().unwrap();
    map.apply(MapEvent::SetView {
        latitude: 40.05,
        longitude: -73.95,
        zoom: 18,
    });

    let drawn: usize = map.markers().iter().map(Marker::count).sum();
    assert!(drawn > 0);
    assert!(drawn < 10_000);
    // Grid spacing is ~110m, far beyond 50px at zoom 18
    assert!(map.markers().iter().all(|m| !m.is_cluster()));
}

/// Test 2: Poles and the antimeridian
#[test]
fn test_extreme_coordinates() {
    let mut map = MapController::new(Config::default()).unwrap();
    let report = map.load_points(vec![
        MapPoint::new(0, 90.0, 0.0),
        MapPoint::new(1, -90.0, 0.0),
        MapPoint::new(2, 0.0, 180.0),
        MapPoint::new(3, 0.0, -180.0),
    ]);
    assert_eq!(report.loaded, 4);

    map.apply(MapEvent::ZoomTo(0));
    let drawn: usize = map.markers().iter().map(Marker::count).sum();
    assert_eq!(drawn, 4);
}

/// Test 3: Coincident points never split, even at max zoom
#[test]
fn test_coincident_points_stay_clustered() {
    let points: Vec<MapPoint> = (0..25).map(|i| MapPoint::new(i, 35.6762, 139.6503)).collect();
    let mut map = MapBuilder::new().points(points).build().unwrap();
    map.pump();
    assert_eq!(map.view().zoom, 18);

    let cluster = map.markers()[0].clone();
    assert_eq!(cluster.count(), 25);

    // Clicking at max zoom recenters without zooming further
    map.apply(MapEvent::MarkerClicked(cluster));
    assert_eq!(map.view().zoom, 18);
    assert_eq!(map.markers().len(), 1);
}

/// Test 4: Missing or misspelled coordinate columns
#[test]
fn test_missing_columns() {
    let err = records_from_json_rows(r#"[{"lat": 1, "lon": 2, "name": "x"}]"#).unwrap_err();
    match err {
        InstapointsError::MissingColumns { found } => {
            assert!(found.contains(&"lat".to_string()));
            assert!(found.contains(&"lon".to_string()));
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

/// Test 5: Rows with unusable coordinates are dropped, not fatal
#[test]
fn test_unusable_values_drop_rows() {
    let report = records_from_json_rows(
        r#"[
            {"latitude": true, "longitude": 1.0},
            {"latitude": "", "longitude": 1.0},
            {"latitude": {"x": 1}, "longitude": 1.0},
            {"latitude": " 12.5 ", "longitude": "-3"},
            {"longitude": 4.0}
        ]"#,
    )
    .unwrap();

    assert_eq!(report.records.len(), 1);
    assert_eq!(report.dropped.len(), 4);
    assert_eq!(report.records[0].latitude, 12.5);
    assert_eq!(report.records[0].longitude, -3.0);
}

/// Test 6: Only invalid rows leaves an empty map
#[test]
fn test_all_rows_invalid() {
    let mut map = MapController::new(Config::default()).unwrap();
    let report = map
        .load_json_rows(r#"[{"latitude": 100, "longitude": 0}, {"latitude": null, "longitude": 0}]"#)
        .unwrap();

    assert_eq!(report.status, DatasetStatus::Empty);
    assert_eq!(report.skipped(), 2);
    assert_eq!(
        report.empty_message().as_deref(),
        Some("Dataset contains no valid points")
    );

    let effects = map.pump();
    assert!(matches!(effects.as_slice(), [Effect::Redraw(frame)] if frame.markers.is_empty()));
}

/// Test 7: Duplicate ids keep the first occurrence
#[test]
fn test_duplicate_ids() {
    let mut map = MapController::new(Config::default()).unwrap();
    let report = map.load_points(vec![
        MapPoint::new(1, 10.0, 10.0),
        MapPoint::new(1, 20.0, 20.0),
        MapPoint::new(2, 30.0, 30.0),
    ]);

    assert_eq!(report.loaded, 2);
    assert_eq!(report.rejected.len(), 1);
    assert_eq!(map.index().get(1).unwrap().latitude(), 10.0);
}

/// Test 8: Invalid configuration is refused up front
#[test]
fn test_invalid_config() {
    let bad = [
        Config::default().with_pixel_radius(0.0),
        Config::default().with_pixel_radius(f64::NAN),
        Config::default().with_zoom_range(10, 2),
        Config::default().with_zoom_range(0, 30),
        Config::default().with_viewport_buffer_margin(-0.1),
        Config::default().with_cluster_click_step(0),
        Config::default().with_viewport_size(0, 600),
    ];

    for config in bad {
        let err = MapController::new(config).unwrap_err();
        assert!(matches!(err, InstapointsError::InvalidConfig(_)));
    }
}

/// Test 9: A reload mid-job wins over the job
#[test]
fn test_reload_during_recompute() {
    let mut map = MapBuilder::new()
        .points(vec![MapPoint::new(0, 1.0, 1.0), MapPoint::new(1, 1.0, 1.0)])
        .build()
        .unwrap();

    let job = map.start_recompute().unwrap();
    assert_eq!(map.state(), ControllerState::Recomputing);

    map.load_points(vec![MapPoint::new(0, -5.0, -5.0)]);
    map.dispatch(MapEvent::ZoomBy(-1));

    assert!(map.complete(job.run()).is_none());
    assert_eq!(map.state(), ControllerState::Idle);

    map.pump();
    let frame = map.frame().unwrap();
    assert_eq!(frame.generation, 2);
    assert_eq!(frame.point_count(), 1);
    assert_eq!(map.stats().stale_discarded, 1);
}

/// Test 10: Points exactly on the query edge are included
#[test]
fn test_points_on_viewport_edge() {
    let config = Config::default().with_viewport_buffer_margin(0.0);
    let index = SpatialIndex::build_with_config(
        vec![
            MapPoint::new(0, 0.0, 0.0),
            MapPoint::new(1, 10.0, 10.0),
            MapPoint::new(2, 10.000001, 10.0),
        ],
        &config,
    )
    .unwrap();

    let bounds = GeoBounds::from_lat_lon(0.0, 10.0, 0.0, 10.0);
    let ids: Vec<u64> = index.query(&bounds, 5).iter().map(|p| p.id()).collect();
    assert_eq!(ids, vec![0, 1]);
}
