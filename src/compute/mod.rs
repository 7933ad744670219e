//! Compute layer: projection, indexing, clustering and export.
//!
//! Everything here is a pure function of its inputs. Session state lives in
//! [`crate::map`].

pub mod cluster;
#[cfg(feature = "geojson")]
pub mod geojson;
pub mod projection;
pub mod spatial;
pub mod validation;
