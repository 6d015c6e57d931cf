//! Minimal vector algebra for steering and anchoring.
//!
//! Every function here is total: degenerate inputs fall back to a defined
//! vector instead of producing NaN.

use crate::constants::DEGENERATE_LENGTH_SQ;
use crate::types::Vector3;

/// Unit +Z, returned when a direction cannot be derived.
pub const FALLBACK_DIRECTION: Vector3 = Vector3::Z;

/// Normalize `v`, or return [`FALLBACK_DIRECTION`] when `v` is near zero.
pub fn normalize(v: Vector3) -> Vector3 {
    normalize_or(v, FALLBACK_DIRECTION)
}

/// Normalize `v`, or return `fallback` when `v` is near zero.
pub fn normalize_or(v: Vector3, fallback: Vector3) -> Vector3 {
    let len_sq = v.length_squared();
    if len_sq < DEGENERATE_LENGTH_SQ || !len_sq.is_finite() {
        fallback
    } else {
        v / len_sq.sqrt()
    }
}

/// Rotate `v` around `axis` by `angle` radians (Rodrigues' rotation formula).
///
/// A degenerate axis leaves `v` unchanged.
pub fn rotate_around_axis(v: Vector3, axis: Vector3, angle: f64) -> Vector3 {
    if axis.length_squared() < DEGENERATE_LENGTH_SQ {
        return v;
    }
    let k = axis.normalize();
    let (sin, cos) = angle.sin_cos();
    v * cos + k.cross(v) * sin + k * (k.dot(v) * (1.0 - cos))
}

/// Remove the component of `v` along `normal` and normalize the rest.
///
/// When `v` is (anti)parallel to `normal`, any unit vector perpendicular to
/// `normal` is returned instead.
pub fn project_onto_plane(v: Vector3, normal: Vector3) -> Vector3 {
    let n = normalize(normal);
    let projected = v - n * v.dot(n);
    if projected.length_squared() < DEGENERATE_LENGTH_SQ {
        return any_perpendicular(n);
    }
    projected.normalize()
}

/// Some unit vector perpendicular to `v`.
pub fn any_perpendicular(v: Vector3) -> Vector3 {
    let n = normalize(v);
    // Cross with whichever world axis is least aligned.
    let helper = if n.x.abs() < 0.9 { Vector3::X } else { Vector3::Y };
    normalize(n.cross(helper))
}

/// Scale `v` down to at most `max` length.
pub fn clamp_length(v: Vector3, max: f64) -> Vector3 {
    let len_sq = v.length_squared();
    if max <= 0.0 {
        return Vector3::ZERO;
    }
    if len_sq > max * max {
        v * (max / len_sq.sqrt())
    } else {
        v
    }
}

/// Linear interpolation between two vectors.
pub fn lerp(a: Vector3, b: Vector3, t: f64) -> Vector3 {
    a + (b - a) * t
}

/// Linear interpolation between two scalars.
pub fn lerp_scalar(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// Angle between two directions in degrees, using a clamped dot product.
pub fn angle_between_degrees(a: Vector3, b: Vector3) -> f64 {
    let dot = normalize(a).dot(normalize(b)).clamp(-1.0, 1.0);
    dot.acos().to_degrees()
}

/// Rotate `v` around +Y by `degrees`, using the host's body-yaw convention.
pub fn rotate_y_degrees(v: Vector3, degrees: f64) -> Vector3 {
    let (sin, cos) = degrees.to_radians().sin_cos();
    Vector3::new(v.x * cos - v.z * sin, v.y, v.x * sin + v.z * cos)
}

/// Wrap an angle into `[-180, 180)`.
pub fn wrap_degrees(degrees: f64) -> f64 {
    (degrees + 180.0).rem_euclid(360.0) - 180.0
}

/// Horizontal (XZ) length of `v`.
pub fn horizontal_length(v: Vector3) -> f64 {
    (v.x * v.x + v.z * v.z).sqrt()
}
