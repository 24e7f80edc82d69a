/// The initial bearing along the great circle from the first point to the second, in degrees
/// clockwise from north, within [0, 360). Identical points have a bearing of 0.
pub fn bearing(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    if lat1 == lat2 && lon1 == lon2 {
        return 0.0;
    }

    let (phi1, phi2) = (lat1.to_radians(), lat2.to_radians());
    let delta_lon = (lon2 - lon1).to_radians();

    let y = delta_lon.sin() * phi2.cos();
    let x = phi1.cos() * phi2.sin() - phi1.sin() * phi2.cos() * delta_lon.cos();
    let degrees = y.atan2(x).to_degrees();
    // atan2 gives (-180, 180]
    (degrees + 360.0) % 360.0
}

/// How far to rotate the route arrow glyph, which points east when unrotated.
pub fn arrow_rotation(bearing: f64) -> f64 {
    bearing - 90.0
}
