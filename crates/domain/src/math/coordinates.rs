//! Basic operations on geographic coordinates.

use crate::value_objects::geo_point::GeoPoint;

/// Mean Earth radius in meters.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// True if both latitude and longitude compare equal.
///
/// This is exact floating point equality, not a distance threshold: two
/// points a millimeter apart are different points.
pub fn points_equal(a: GeoPoint, b: GeoPoint) -> bool {
    a.latitude == b.latitude && a.longitude == b.longitude
}

/// Spherical midpoint of the great-circle segment from `a` to `b`.
///
/// Bx = cos φ2 · cos Δλ, By = cos φ2 · sin Δλ
/// φm = atan2(sin φ1 + sin φ2, √((cos φ1 + Bx)² + By²))
/// λm = λ1 + atan2(By, cos φ1 + Bx)
pub fn midpoint(a: GeoPoint, b: GeoPoint) -> GeoPoint {
    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let lon1 = a.longitude.to_radians();
    let d_lon = (b.longitude - a.longitude).to_radians();

    let bx = lat2.cos() * d_lon.cos();
    let by = lat2.cos() * d_lon.sin();

    let lat = (lat1.sin() + lat2.sin()).atan2(((lat1.cos() + bx).powi(2) + by * by).sqrt());
    let lon = lon1 + by.atan2(lat1.cos() + bx);

    GeoPoint::new(lat.to_degrees(), lon.to_degrees())
}

/// Haversine great-circle distance in meters.
pub fn distance_m(a: GeoPoint, b: GeoPoint) -> f64 {
    let d_lat = (b.latitude - a.latitude).to_radians();
    let d_lon = (b.longitude - a.longitude).to_radians();

    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();

    let h = (d_lat * 0.5).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon * 0.5).sin().powi(2);

    2.0 * EARTH_RADIUS_M * h.sqrt().atan2((1.0 - h).sqrt())
}
