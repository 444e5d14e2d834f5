/// Meters per degree used by the flat-earth projection.
pub const METERS_PER_DEGREE: f64 = 111_000.0;

/// Planar distance in meters between two coordinates.
///
/// Both axes are scaled by the same factor, so this is only usable over a few kilometers
/// and is not a geodesic distance.
pub fn distance_meters(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    let dx = (lat1 - lat2) * METERS_PER_DEGREE;
    let dy = (lng1 - lng2) * METERS_PER_DEGREE;
    (dx * dx + dy * dy).sqrt()
}
