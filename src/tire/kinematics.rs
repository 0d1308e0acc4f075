// ==============================================================================
// kinematics.rs — WHEEL BASIS + SLIP DECOMPOSITION (WORLD SPACE)
// ------------------------------------------------------------------------------
// wheel_basis_world(body, steer):
// - forward: body +Z rotated about up by -steer (positive steer turns right)
// - side:    body +X rotated the same way
//
// slip_components(delta, forward, side, dt):
// - Projects the mount point's displacement since the previous frame:
//     v_long = dot(delta, forward) / dt
//     v_lat  = dot(delta, side)    / dt
// - A non-positive dt yields zero speeds.
// ==============================================================================

use nalgebra::{UnitQuaternion, Vector3};

use crate::physics::RigidBody;

/// Returns (wheel_forward, wheel_side) in world space.
#[inline]
pub fn wheel_basis_world(body: &RigidBody, steer_angle: f32) -> (Vector3<f32>, Vector3<f32>) {
    let steer = UnitQuaternion::from_axis_angle(&Vector3::y_axis(), -steer_angle);

    let forward = body.local_dir_to_world(&(steer * Vector3::z()));
    let side = body.local_dir_to_world(&(steer * Vector3::x()));

    (forward, side)
}

/// Compute (v_long, v_lat) from a frame displacement and the wheel basis.
#[inline]
pub fn slip_components(
    delta: Vector3<f32>,
    wheel_forward: Vector3<f32>,
    wheel_side: Vector3<f32>,
    dt: f32,
) -> (f32, f32) {
    if dt <= 0.0 {
        return (0.0, 0.0);
    }
    (delta.dot(&wheel_forward) / dt, delta.dot(&wheel_side) / dt)
}
