use crate::types::Vector3;

/// Wraps an angle in degrees into (-180, 180]
pub fn normalize_angle(degrees: f64) -> f64 {
    let wrapped = degrees.rem_euclid(360.0);
    if wrapped > 180.0 { wrapped - 360.0 } else { wrapped }
}

/// Yaw in degrees of a direction on the ground plane (0 = +Z, 90 = +X)
pub fn yaw_of(direction: Vector3) -> f64 {
    direction.x.atan2(direction.z).to_degrees()
}

/// Unit ground-plane direction for a yaw in degrees
pub fn direction_from_yaw(yaw_degrees: f64) -> Vector3 {
    let rad = yaw_degrees.to_radians();
    Vector3::new(rad.sin(), 0.0, rad.cos())
}

/// Signed shortest rotation from `from` to `to`, in degrees
pub fn shortest_delta(from: f64, to: f64) -> f64 {
    normalize_angle(to - from)
}

/// Steps `from` towards `to` along the shortest arc by at most `max_delta` degrees
pub fn rotate_towards(from: f64, to: f64, max_delta: f64) -> f64 {
    let delta = shortest_delta(from, to);
    let step = delta.clamp(-max_delta.abs(), max_delta.abs());
    normalize_angle(from + step)
}

/// Projects onto the ground plane and normalizes; `None` when nothing is left
pub fn flat_direction(v: Vector3) -> Option<Vector3> {
    let flat = v.project_on_plane(Vector3::UP);
    if flat.is_zero() { None } else { Some(flat.normalized()) }
}
