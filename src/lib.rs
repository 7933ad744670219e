//! Viewport-driven point clustering for interactive maps.
//!
//! Load a dataset of latitude/longitude points, then feed the controller pan,
//! zoom and click events. After each view change it returns the markers to
//! draw: clusters of nearby points with a count, and single points.
//!
//! ```rust
//! use instapoints::prelude::*;
//!
//! let mut map = MapBuilder::new()
//!     .pixel_radius(50.0)
//!     .json_rows(r#"[
//!         {"latitude": -23.55, "longitude": -46.63, "name": "Sao Paulo"},
//!         {"latitude": -23.56, "longitude": -46.64, "name": "Pinheiros"},
//!         {"latitude": -22.90, "longitude": -43.17, "name": "Rio"}
//!     ]"#)
//!     .build()?;
//!
//! map.pump();
//! let total: usize = map.markers().iter().map(Marker::count).sum();
//! assert_eq!(total, 3);
//!
//! map.apply(MapEvent::ZoomBy(2));
//! # Ok::<(), instapoints::InstapointsError>(())
//! ```

pub mod builder;
pub mod compute;
pub mod config;
pub mod error;
pub mod ingest;
pub mod map;

pub use builder::MapBuilder;
pub use config::Config;
pub use error::{InstapointsError, Result};

pub use compute::cluster::cluster;
pub use compute::spatial::SpatialIndex;

pub use ingest::{IngestReport, PointRecord};

pub use map::{Effect, Frame, LoadReport, MapController, MapEvent, ViewState};

pub use instapoints_types::bbox::GeoBounds;
pub use instapoints_types::marker::{ClusterMarker, Marker, SinglePointMarker};
pub use instapoints_types::point::{Attributes, MapPoint};

pub use geo::Point;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Common imports
pub mod prelude {

    pub use crate::{InstapointsError, MapBuilder, Result};

    pub use crate::{Config, MapController};

    pub use crate::map::{ControllerState, DatasetStatus, Effect, Frame, MapEvent, ViewState};

    pub use crate::{ClusterMarker, GeoBounds, MapPoint, Marker, SinglePointMarker};

    pub use geo::Point;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
