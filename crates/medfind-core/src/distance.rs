//! Great-circle distance on a spherical earth.
//!
//! This is the single distance implementation used for radius filtering and
//! ranking. Any storage-side geometric filter is checked against it.

use crate::types::Coordinate;

/// Mean earth radius used by the Haversine formula.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Haversine distance between two coordinates in kilometres.
///
/// Symmetric and exactly `0.0` for identical inputs. The `1 - h` term is
/// clamped at zero so floating-point overshoot near antipodal points cannot
/// push `sqrt` into a negative domain.
#[must_use]
pub fn distance_km(a: Coordinate, b: Coordinate) -> f64 {
    let d_lat = (b.latitude - a.latitude).to_radians();
    let d_lon = (b.longitude - a.longitude).to_radians();

    let half_lat = (d_lat / 2.0).sin();
    let half_lon = (d_lon / 2.0).sin();
    let h = half_lat * half_lat
        + a.latitude.to_radians().cos() * b.latitude.to_radians().cos() * half_lon * half_lon;

    2.0 * EARTH_RADIUS_KM * h.sqrt().atan2((1.0 - h).max(0.0).sqrt())
}
