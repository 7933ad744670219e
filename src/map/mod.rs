//! Map interaction controller.
//!
//! One [`MapController`] owns the state of a single map session: the spatial
//! index of the loaded dataset, the current view, and the markers last drawn
//! for it. User gestures come in as [`MapEvent`]s and go out as [`Effect`]s
//! for the renderer.
//!
//! Recomputing markers is split in three steps so the clustering pass can run
//! without holding on to the controller:
//!
//! 1. [`MapController::start_recompute`] snapshots the pending view and the
//!    current index into a [`RecomputeJob`].
//! 2. [`RecomputeJob::run`] queries the index and clusters the candidates.
//! 3. [`MapController::complete`] installs the resulting [`Frame`].
//!
//! Events that arrive while a job is outstanding overwrite a single pending
//! slot, so only the latest requested view is ever recomputed. Reloading the
//! dataset bumps a generation counter and results of older generations are
//! discarded on completion. [`MapController::pump`] runs all three steps in
//! sequence for callers that do not need the split.
//!
//! # Examples
//!
//! ```rust
//! use instapoints::{Config, MapController, MapEvent, MapPoint};
//! use instapoints::map::Effect;
//!
//! let mut map = MapController::new(Config::default())?;
//! let report = map.load_points(vec![
//!     MapPoint::new(0, 0.0, 0.0),
//!     MapPoint::new(1, 0.0, 0.0001),
//!     MapPoint::new(2, 50.0, 50.0),
//! ]);
//! assert_eq!(report.loaded, 3);
//!
//! let effects = map.pump();
//! assert!(matches!(effects.as_slice(), [Effect::Redraw(frame)] if frame.markers.len() == 2));
//!
//! map.apply(MapEvent::ZoomBy(1));
//! assert_eq!(map.view().zoom, 4);
//! # Ok::<(), instapoints::InstapointsError>(())
//! ```

mod event;
mod recompute;
mod view;

pub use event::{ControllerStats, DatasetStatus, Effect, Frame, LoadReport, MapEvent};
pub use recompute::{RecomputeJob, RecomputeOutcome};
pub use view::{ViewState, ViewportSize};

use crate::compute::spatial::SpatialIndex;
use crate::config::Config;
use crate::error::Result;
#[cfg(feature = "geojson")]
use crate::ingest::records_from_geojson;
use crate::ingest::{IngestReport, PointRecord, records_from_json_rows, records_into_points};
use instapoints_types::marker::Marker;
use instapoints_types::point::MapPoint;
use std::sync::Arc;

/// Whether a recompute job is outstanding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    Idle,
    Recomputing,
}

/// State machine driving one map session.
#[derive(Debug)]
pub struct MapController {
    config: Config,
    index: Arc<SpatialIndex>,
    view: ViewState,
    state: ControllerState,
    pending: Option<ViewState>,
    generation: u64,
    frame: Option<Frame>,
    stats: ControllerStats,
}

impl MapController {
    /// Create a controller with no data and the global default view.
    ///
    /// A recompute for the initial view is already pending, so the first
    /// [`pump`](Self::pump) yields an empty frame.
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;

        let view = ViewState::global(&config, ViewportSize::from_config(&config));
        let index = Arc::new(SpatialIndex::empty(&config)?);

        Ok(Self {
            config,
            index,
            pending: Some(view.clone()),
            view,
            state: ControllerState::Idle,
            generation: 0,
            frame: None,
            stats: ControllerStats::default(),
        })
    }

    /// Replace the dataset with `points`.
    ///
    /// The new index is built before the old one is dropped. The view resets
    /// to the extent of the accepted points, or to the global view when none
    /// were accepted. Any job still outstanding becomes stale and the
    /// controller is `Idle` again, whether or not that job is ever completed.
    pub fn load_points<I>(&mut self, points: I) -> LoadReport
    where
        I: IntoIterator<Item = MapPoint>,
    {
        self.install(points, 0)
    }

    /// Replace the dataset with records, assigning ids by position.
    pub fn load_records<I>(&mut self, records: I) -> LoadReport
    where
        I: IntoIterator<Item = PointRecord>,
    {
        self.install(records_into_points(records), 0)
    }

    /// Replace the dataset with the output of an ingestion pass.
    pub fn load_ingested(&mut self, report: IngestReport) -> LoadReport {
        let dropped = report.dropped.len();
        self.install(records_into_points(report.records), dropped)
    }

    /// Parse a JSON array of rows and load it.
    ///
    /// On a parse error the previous dataset and view stay in place.
    pub fn load_json_rows(&mut self, json: &str) -> Result<LoadReport> {
        let report = records_from_json_rows(json)?;
        Ok(self.load_ingested(report))
    }

    /// Parse a GeoJSON FeatureCollection of points and load it.
    ///
    /// On a parse error the previous dataset and view stay in place.
    #[cfg(feature = "geojson")]
    pub fn load_geojson(&mut self, text: &str) -> Result<LoadReport> {
        let report = records_from_geojson(text)?;
        Ok(self.load_ingested(report))
    }

    fn install<I>(&mut self, points: I, dropped_rows: usize) -> LoadReport
    where
        I: IntoIterator<Item = MapPoint>,
    {
        let index = SpatialIndex::build_validated(points, &self.config);
        let size = self.view.size;
        let (view, status) = match index.extent() {
            Some(extent) => (
                ViewState::fit(&extent, &self.config, size),
                DatasetStatus::Ready,
            ),
            None => (ViewState::global(&self.config, size), DatasetStatus::Empty),
        };

        self.generation += 1;
        self.stats.reloads += 1;

        let report = LoadReport {
            status,
            generation: self.generation,
            loaded: index.len(),
            dropped_rows,
            rejected: index.rejected().to_vec(),
        };

        match status {
            DatasetStatus::Ready => log::info!(
                "Loaded {} point(s), skipped {} (generation {}, zoom {})",
                report.loaded,
                report.skipped(),
                self.generation,
                view.zoom
            ),
            DatasetStatus::Empty => log::warn!(
                "No valid points after loading, {} row(s) skipped (generation {})",
                report.skipped(),
                self.generation
            ),
        }

        self.index = Arc::new(index);
        self.state = ControllerState::Idle;
        self.frame = None;
        self.view = view.clone();
        self.pending = Some(view);

        report
    }

    /// Translate a user event into effects.
    ///
    /// View changes fill the pending slot and return
    /// [`Effect::Recompute`]; nothing is clustered until the next
    /// [`start_recompute`](Self::start_recompute) or [`pump`](Self::pump).
    pub fn dispatch(&mut self, event: MapEvent) -> Vec<Effect> {
        self.stats.events += 1;
        let base = self.target_view().clone();

        let target = match event {
            MapEvent::MarkerClicked(Marker::Single(single)) => {
                return vec![Effect::Popup(single.point)];
            }
            MapEvent::MarkerClicked(Marker::Cluster(cluster)) => {
                if !cluster.centroid_lat.is_finite() || !cluster.centroid_lon.is_finite() {
                    log::warn!(
                        "Ignoring click on cluster with non-finite centroid ({}, {})",
                        cluster.centroid_lat,
                        cluster.centroid_lon
                    );
                    return Vec::new();
                }
                let zoom = base
                    .zoom
                    .saturating_add(self.config.max_zoom_step_per_cluster_click)
                    .min(self.config.max_zoom);
                ViewState::new(cluster.centroid_lat, cluster.centroid_lon, zoom, base.size)
            }
            MapEvent::PanTo {
                latitude,
                longitude,
            } => {
                if !latitude.is_finite() || !longitude.is_finite() {
                    log::warn!("Ignoring pan to non-finite center ({}, {})", latitude, longitude);
                    return Vec::new();
                }
                ViewState::new(latitude, longitude, base.zoom, base.size)
            }
            MapEvent::PanBy { dx, dy } => {
                if !dx.is_finite() || !dy.is_finite() {
                    log::warn!("Ignoring non-finite pan offset ({}, {})", dx, dy);
                    return Vec::new();
                }
                base.panned_by(dx, dy)
            }
            MapEvent::ZoomTo(zoom) => base.with_zoom(self.resolve_zoom(zoom)),
            MapEvent::ZoomBy(delta) => {
                base.with_zoom(self.resolve_zoom(i32::from(base.zoom).saturating_add(delta)))
            }
            MapEvent::SetView {
                latitude,
                longitude,
                zoom,
            } => {
                if !latitude.is_finite() || !longitude.is_finite() {
                    log::warn!("Ignoring view with non-finite center ({}, {})", latitude, longitude);
                    return Vec::new();
                }
                ViewState::new(latitude, longitude, self.resolve_zoom(zoom), base.size)
            }
            MapEvent::Resize(size) => base.with_size(size),
        };

        self.schedule(target)
    }

    /// [`dispatch`](Self::dispatch) followed by [`pump`](Self::pump).
    pub fn apply(&mut self, event: MapEvent) -> Vec<Effect> {
        let mut effects = self.dispatch(event);
        effects.extend(self.pump());
        effects
    }

    fn schedule(&mut self, target: ViewState) -> Vec<Effect> {
        if self.pending.is_none() && self.frame.is_some() && target == self.view {
            return Vec::new();
        }

        if self.pending.replace(target).is_some() {
            self.stats.coalesced += 1;
            log::debug!("Coalesced pending view (generation {})", self.generation);
        }

        vec![Effect::Recompute {
            generation: self.generation,
        }]
    }

    fn resolve_zoom(&self, zoom: i32) -> u8 {
        match self.config.check_zoom(zoom) {
            Ok(zoom) => zoom,
            Err(err) => {
                log::debug!("{}, clamping", err);
                self.config.clamp_zoom(zoom)
            }
        }
    }

    /// The latest requested view: pending if any, otherwise the current one.
    fn target_view(&self) -> &ViewState {
        self.pending.as_ref().unwrap_or(&self.view)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn index(&self) -> &SpatialIndex {
        &self.index
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn pending_view(&self) -> Option<&ViewState> {
        self.pending.as_ref()
    }

    pub fn state(&self) -> ControllerState {
        self.state
    }

    /// Dataset generation, bumped on every load.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Last frame installed for the current generation.
    pub fn frame(&self) -> Option<&Frame> {
        self.frame.as_ref()
    }

    pub fn markers(&self) -> &[Marker] {
        self.frame.as_ref().map_or(&[], |frame| frame.markers.as_slice())
    }

    pub fn stats(&self) -> ControllerStats {
        self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::InstapointsError;
    use instapoints_types::bbox::GeoBounds;
    use instapoints_types::marker::{ClusterMarker, SinglePointMarker};
    use std::collections::BTreeSet;

    fn controller() -> MapController {
        MapController::new(Config::default()).unwrap()
    }

    fn scenario_a() -> Vec<MapPoint> {
        vec![
            MapPoint::new(0, 0.0, 0.0),
            MapPoint::new(1, 0.0, 0.0001),
            MapPoint::new(2, 50.0, 50.0),
        ]
    }

    fn redraw(effects: &[Effect]) -> &Frame {
        effects
            .iter()
            .find_map(|effect| match effect {
                Effect::Redraw(frame) => Some(frame),
                _ => None,
            })
            .expect("no redraw effect")
    }

    #[test]
    fn test_new_controller_draws_empty_global_view() {
        let mut map = controller();
        let effects = map.pump();
        let frame = redraw(&effects);

        assert!(frame.markers.is_empty());
        assert_eq!(frame.view.zoom, 0);
        assert_eq!(frame.view.center_lat, 0.0);
        assert_eq!(frame.view.center_lon, 0.0);
        assert_eq!(map.state(), ControllerState::Idle);
    }

    #[test]
    fn test_load_empty_dataset() {
        let mut map = controller();
        map.load_points(scenario_a());
        map.pump();

        let report = map.load_points(Vec::new());
        assert!(report.is_empty());
        assert!(report.empty_message().is_some());
        assert_eq!(map.view().zoom, map.config().min_zoom);
        assert!(map.markers().is_empty());

        let effects = map.pump();
        assert!(redraw(&effects).markers.is_empty());
    }

    #[test]
    fn test_load_fits_view_and_clusters() {
        let mut map = controller();
        let report = map.load_points(scenario_a());
        assert_eq!(report.status, DatasetStatus::Ready);
        assert_eq!(report.loaded, 3);
        assert_eq!(report.generation, 1);

        assert_eq!(map.view().zoom, 3);
        assert_eq!(map.view().center_lat, 25.0);
        assert_eq!(map.view().center_lon, 25.0);

        let effects = map.pump();
        let frame = redraw(&effects);
        assert_eq!(frame.markers.len(), 2);
        assert_eq!(frame.point_count(), 3);
        assert!(matches!(&frame.markers[0], Marker::Cluster(c) if c.count == 2));
        assert!(matches!(&frame.markers[1], Marker::Single(s) if s.point.id() == 2));
    }

    #[test]
    fn test_invalid_latitude_is_skipped_not_fatal() {
        let mut map = controller();
        let report = map.load_points(vec![
            MapPoint::new(0, 95.0, 10.0),
            MapPoint::new(1, 45.0, 10.0),
            MapPoint::new(2, 46.0, 11.0),
        ]);

        assert_eq!(report.status, DatasetStatus::Ready);
        assert_eq!(report.loaded, 2);
        assert_eq!(report.rejected.len(), 1);
        assert_eq!(report.rejected[0].id, 0);
        assert!(map.index().get(0).is_none());
    }

    #[test]
    fn test_cluster_click_zooms_and_recenters() {
        let mut map = controller();
        map.load_points(scenario_a());
        map.apply(MapEvent::ZoomTo(3));
        assert_eq!(map.view().zoom, 3);

        let clicked = Marker::Cluster(ClusterMarker {
            centroid_lat: 10.0,
            centroid_lon: 20.0,
            count: 5,
            member_ids: (0..5).collect(),
        });
        let effects = map.dispatch(MapEvent::MarkerClicked(clicked));
        assert_eq!(effects, vec![Effect::Recompute { generation: 1 }]);

        map.pump();
        assert_eq!(map.view().zoom, 4);
        assert_eq!(map.view().center_lat, 10.0);
        assert_eq!(map.view().center_lon, 20.0);
    }

    #[test]
    fn test_cluster_click_capped_at_max_zoom() {
        let mut map = MapController::new(
            Config::default()
                .with_zoom_range(0, 10)
                .with_cluster_click_step(3),
        )
        .unwrap();
        map.apply(MapEvent::ZoomTo(9));

        let clicked = Marker::Cluster(ClusterMarker {
            centroid_lat: 1.0,
            centroid_lon: 1.0,
            count: 2,
            member_ids: BTreeSet::from([0, 1]),
        });
        map.apply(MapEvent::MarkerClicked(clicked));
        assert_eq!(map.view().zoom, 10);
    }

    #[test]
    fn test_single_click_only_opens_popup() {
        let mut map = controller();
        map.load_points(scenario_a());
        map.pump();
        let before = map.view().clone();
        let recomputes = map.stats().recomputes;

        let point = Arc::new(MapPoint::new(2, 50.0, 50.0));
        let effects = map.apply(MapEvent::MarkerClicked(Marker::Single(SinglePointMarker {
            point: point.clone(),
        })));

        assert_eq!(effects, vec![Effect::Popup(point)]);
        assert_eq!(map.view(), &before);
        assert!(map.pending_view().is_none());
        assert_eq!(map.stats().recomputes, recomputes);
    }

    #[test]
    fn test_events_coalesce_into_latest_view() {
        let mut map = controller();
        map.load_points(scenario_a());
        map.pump();

        map.dispatch(MapEvent::PanTo {
            latitude: 10.0,
            longitude: 10.0,
        });
        map.dispatch(MapEvent::ZoomTo(5));
        map.dispatch(MapEvent::PanTo {
            latitude: -10.0,
            longitude: 30.0,
        });

        assert_eq!(map.stats().coalesced, 2);
        let pending = map.pending_view().unwrap();
        assert_eq!(pending.zoom, 5);
        assert_eq!(pending.center_lat, -10.0);
        assert_eq!(pending.center_lon, 30.0);

        let recomputes = map.stats().recomputes;
        let effects = map.pump();
        assert_eq!(effects.len(), 1);
        assert_eq!(map.stats().recomputes, recomputes + 1);
        assert_eq!(map.view().zoom, 5);
    }

    #[test]
    fn test_zoom_events_accumulate_while_pending() {
        let mut map = controller();
        map.load_points(scenario_a());
        map.pump();

        map.dispatch(MapEvent::ZoomBy(1));
        map.dispatch(MapEvent::ZoomBy(1));
        map.pump();
        assert_eq!(map.view().zoom, 5);
    }

    #[test]
    fn test_zoom_out_of_bounds_is_clamped() {
        let mut map = controller();
        map.apply(MapEvent::ZoomTo(40));
        assert_eq!(map.view().zoom, 18);

        map.apply(MapEvent::ZoomBy(-100));
        assert_eq!(map.view().zoom, 0);

        map.apply(MapEvent::SetView {
            latitude: 1.0,
            longitude: 2.0,
            zoom: -3,
        });
        assert_eq!(map.view().zoom, 0);
        assert_eq!(map.view().center_lat, 1.0);
    }

    #[test]
    fn test_no_op_event_requests_nothing() {
        let mut map = controller();
        map.pump();
        map.apply(MapEvent::ZoomTo(18));

        assert!(map.dispatch(MapEvent::ZoomBy(1)).is_empty());
        assert!(map.pending_view().is_none());
    }

    #[test]
    fn test_non_finite_pan_is_ignored() {
        let mut map = controller();
        map.pump();
        assert!(
            map.dispatch(MapEvent::PanTo {
                latitude: f64::NAN,
                longitude: 0.0
            })
            .is_empty()
        );
        assert!(map.dispatch(MapEvent::PanBy { dx: f64::INFINITY, dy: 0.0 }).is_empty());
    }

    #[test]
    fn test_cluster_click_with_non_finite_centroid_is_ignored() {
        let mut map = controller();
        map.load_points(scenario_a());
        map.pump();
        let before = map.view().clone();

        let clicked = Marker::Cluster(ClusterMarker {
            centroid_lat: f64::NAN,
            centroid_lon: 20.0,
            count: 2,
            member_ids: BTreeSet::from([0, 1]),
        });
        assert!(map.apply(MapEvent::MarkerClicked(clicked)).is_empty());
        assert_eq!(map.view(), &before);
        assert!(map.pending_view().is_none());
        assert_eq!(map.markers().len(), 2);
    }

    #[test]
    fn test_resize_updates_viewport() {
        let mut map = controller();
        map.load_points(scenario_a());
        map.pump();
        let before = map.view().viewport;

        map.apply(MapEvent::Resize(ViewportSize::new(500, 300)));
        assert_eq!(map.view().size, ViewportSize::new(500, 300));
        assert!(map.view().viewport.width() < before.width());
    }

    #[test]
    fn test_failed_reload_keeps_previous_state() {
        let mut map = controller();
        map.load_points(scenario_a());
        map.pump();
        let view = map.view().clone();

        let err = map.load_json_rows(r#"[{"lat": 1.0, "lng": 2.0}]"#).unwrap_err();
        assert!(matches!(err, InstapointsError::MissingColumns { .. }));
        assert_eq!(map.generation(), 1);
        assert_eq!(map.index().len(), 3);
        assert_eq!(map.view(), &view);
        assert_eq!(map.markers().len(), 2);
    }

    #[test]
    fn test_load_json_rows_counts_dropped() {
        let mut map = controller();
        let report = map
            .load_json_rows(
                r#"[
                    {"latitude": 1.0, "longitude": 2.0},
                    {"latitude": null, "longitude": 2.0},
                    {"latitude": "95", "longitude": 2.0}
                ]"#,
            )
            .unwrap();

        assert_eq!(report.loaded, 1);
        assert_eq!(report.dropped_rows, 1);
        assert_eq!(report.rejected.len(), 1);
        assert_eq!(report.skipped(), 2);
    }

    #[test]
    fn test_frame_covers_buffered_viewport_exactly_once() {
        let mut map = controller();
        let points: Vec<MapPoint> = (0..400u32)
            .map(|i| {
                let lat = -40.0 + f64::from(i % 20) * 4.0;
                let lon = -60.0 + f64::from(i / 20) * 6.0;
                MapPoint::new(u64::from(i), lat, lon)
            })
            .collect();
        map.load_points(points);
        map.pump();

        for event in [
            MapEvent::ZoomTo(4),
            MapEvent::PanBy { dx: 300.0, dy: -120.0 },
            MapEvent::ZoomBy(2),
        ] {
            map.apply(event);
            let view = map.view();
            let mut expected: Vec<u64> = map
                .index()
                .query(&view.viewport, view.zoom)
                .iter()
                .map(|p| p.id())
                .collect();
            expected.sort_unstable();

            let mut drawn: Vec<u64> = map.markers().iter().flat_map(Marker::ids).collect();
            drawn.sort_unstable();
            assert_eq!(drawn, expected);
        }
    }

    #[test]
    fn test_default_view_contains_all_points() {
        let mut map = controller();
        let points = vec![
            MapPoint::new(0, -33.9, 18.4),
            MapPoint::new(1, 30.0, 31.2),
            MapPoint::new(2, 6.5, 3.4),
        ];
        map.load_points(points.clone());

        let bounds = GeoBounds::from_points(points.iter().map(MapPoint::location)).unwrap();
        let viewport = map.view().viewport;
        assert!(viewport.lat_min() <= bounds.lat_min() && viewport.lat_max() >= bounds.lat_max());
        assert!(viewport.lon_min() <= bounds.lon_min() && viewport.lon_max() >= bounds.lon_max());
    }
}
