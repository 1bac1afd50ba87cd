//! Quaternion helpers shared by the orientation stages.
//!
//! Angle conversions assume a unit quaternion and return radians.

use core::f32::consts::{PI, TAU};

use nalgebra::{Quaternion, Vector3};

/// Rotation about the sensor's x axis, in (-π, π].
pub fn roll(q: &Quaternion<f32>) -> f32 {
    (2.0 * (q.w * q.i + q.j * q.k)).atan2(1.0 - 2.0 * (q.i * q.i + q.j * q.j))
}

/// Rotation about the sensor's y axis, in [-π/2, π/2].
pub fn pitch(q: &Quaternion<f32>) -> f32 {
    (2.0 * (q.w * q.j - q.k * q.i)).clamp(-1.0, 1.0).asin()
}

/// Rotation about the sensor's z axis, in (-π, π].
pub fn yaw(q: &Quaternion<f32>) -> f32 {
    (2.0 * (q.w * q.k + q.i * q.j)).atan2(1.0 - 2.0 * (q.j * q.j + q.k * q.k))
}

/// Folds `angle` into (-π, π]. Non-finite input is returned unchanged.
pub fn wrap_angle(angle: f32) -> f32 {
    if !angle.is_finite() || (angle > -PI && angle <= PI) {
        return angle;
    }
    let wrapped = (angle + PI).rem_euclid(TAU) - PI;
    if wrapped <= -PI {
        PI
    } else {
        wrapped
    }
}

/// Signed change of `conversion` going from `reference` to `live`.
pub fn relative_angle(
    reference: &Quaternion<f32>,
    live: &Quaternion<f32>,
    conversion: fn(&Quaternion<f32>) -> f32,
) -> f32 {
    wrap_angle(conversion(live) - conversion(reference))
}

/// `q * v * q̄` with `v` embedded as a pure quaternion.
pub fn rotate(q: &Quaternion<f32>, v: &Vector3<f32>) -> Vector3<f32> {
    (q * Quaternion::from_imag(*v) * q.conjugate()).imag()
}
