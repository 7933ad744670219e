//! # instapoints-types
//!
//! Core data types shared between the Instapoints clustering engine and the
//! renderers that draw its output.
//!
//! - **Point types**: `MapPoint`, `Attributes`
//! - **Bounds**: `GeoBounds`
//! - **Marker types**: `Marker`, `ClusterMarker`, `SinglePointMarker`
//!
//! All types are serializable with Serde and built on top of the `geo` crate's
//! geometric primitives. Coordinates follow the `geo` convention of
//! `x = longitude`, `y = latitude`.
//!
//! ## Examples
//!
//! ```rust
//! use instapoints_types::bbox::GeoBounds;
//! use instapoints_types::point::MapPoint;
//!
//! let museum = MapPoint::new(7, -23.5874, -46.6576);
//! let sao_paulo = GeoBounds::from_lat_lon(-24.0, -23.3, -47.0, -46.3);
//! assert!(sao_paulo.contains_point(&museum.location()));
//! ```

pub mod bbox;
pub mod marker;
pub mod point;
