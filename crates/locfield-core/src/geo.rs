//! Great-circle distance helpers.

use crate::types::Coordinate;

/// Mean Earth radius in meters.
const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Haversine great-circle distance between two points, in meters.
///
/// Identical inputs short-circuit to exactly `0.0`; the intermediate value
/// fed to `sqrt`/`asin` is clamped so floating-point noise at antipodal or
/// coincident points cannot produce a `NaN`.
#[must_use]
pub fn distance_between(a: Coordinate, b: Coordinate) -> f64 {
    if a == b {
        return 0.0;
    }
    let lat_a = a.lat.to_radians();
    let lat_b = b.lat.to_radians();
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lng = (b.lng - a.lng).to_radians();

    let h = (d_lat / 2.0).sin().powi(2)
        + lat_a.cos() * lat_b.cos() * (d_lng / 2.0).sin().powi(2);
    let h = h.clamp(0.0, 1.0);

    2.0 * EARTH_RADIUS_M * h.sqrt().asin()
}

/// Whether `b` lies within `radius_m` meters of `a`.
#[must_use]
pub fn is_within_radius(a: Coordinate, b: Coordinate, radius_m: f64) -> bool {
    distance_between(a, b) <= radius_m
}
