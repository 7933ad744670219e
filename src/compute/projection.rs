//! Web Mercator projection between geographic and world-pixel coordinates.
//!
//! World pixels grow right (east) and down (south); the whole world is a
//! square of `TILE_SIZE * 2^zoom` pixels.

use std::f64::consts::PI;

/// Edge length of one map tile in pixels.
pub const TILE_SIZE: f64 = 256.0;

/// Latitude limit of the Web Mercator square.
pub const MAX_MERCATOR_LATITUDE: f64 = 85.051_128_779_806_59;

/// Width (and height) of the world in pixels at `zoom`.
pub fn world_size(zoom: u8) -> f64 {
    TILE_SIZE * f64::from(1u32 << zoom.min(31))
}

/// Longitude degrees covered by one pixel at `zoom`.
///
/// ```
/// use instapoints::compute::projection::degrees_per_pixel;
///
/// assert_eq!(degrees_per_pixel(0), 360.0 / 256.0);
/// assert_eq!(degrees_per_pixel(1), degrees_per_pixel(0) / 2.0);
/// ```
pub fn degrees_per_pixel(zoom: u8) -> f64 {
    360.0 / world_size(zoom)
}

/// Project a latitude/longitude pair to world pixels `[x, y]` at `zoom`.
///
/// Latitudes beyond the Mercator limit are clamped to the map edge.
pub fn project(latitude: f64, longitude: f64, zoom: u8) -> [f64; 2] {
    let size = world_size(zoom);
    let lat = latitude.clamp(-MAX_MERCATOR_LATITUDE, MAX_MERCATOR_LATITUDE);
    let sin_lat = lat.to_radians().sin();

    let x = (longitude + 180.0) / 360.0 * size;
    let y = (0.5 - ((1.0 + sin_lat) / (1.0 - sin_lat)).ln() / (4.0 * PI)) * size;
    [x, y]
}

/// Inverse of [`project`]: world pixels back to `(latitude, longitude)`.
pub fn unproject(x: f64, y: f64, zoom: u8) -> (f64, f64) {
    let size = world_size(zoom);
    let longitude = x / size * 360.0 - 180.0;
    let n = PI * (1.0 - 2.0 * y / size);
    let latitude = n.sinh().atan().to_degrees();
    (latitude, longitude)
}

/// Euclidean distance in pixels between two locations at `zoom`.
pub fn pixel_distance(a: (f64, f64), b: (f64, f64), zoom: u8) -> f64 {
    let pa = project(a.0, a.1, zoom);
    let pb = project(b.0, b.1, zoom);
    ((pa[0] - pb[0]).powi(2) + (pa[1] - pb[1]).powi(2)).sqrt()
}
