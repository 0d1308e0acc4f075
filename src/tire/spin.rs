// ==============================================================================
// spin.rs — WHEEL ROTATION STATE
// ------------------------------------------------------------------------------
//   ground = v_long / (spin_radius_factor * radius)
//   ω     += (ground - ω) * (1 - slip) + slip * torque / powertrain_inertia * dt
//
// With no slip the wheel follows the ground. Under wheelspin the drivetrain
// torque term takes over and the wheel can outrun the car.
// ==============================================================================

use crate::tire::types::{TireConfig, WheelState};

#[inline]
pub fn ground_spin(cfg: &TireConfig, wheel: &WheelState, v_long: f32) -> f32 {
    v_long / (cfg.spin_radius_factor * wheel.radius)
}

pub fn update_spin(
    cfg: &TireConfig,
    wheel: &mut WheelState,
    v_long: f32,
    torque: f32,
    slip_factor: f32,
    dt: f32,
) {
    let target = ground_spin(cfg, wheel, v_long);
    wheel.rot_speed += (target - wheel.rot_speed) * (1.0 - slip_factor)
        + slip_factor * torque / cfg.powertrain_inertia * dt;
}

/// Cosmetic: advance the visual spin angle.
pub fn advance_spin_angle(wheel: &mut WheelState, dt: f32) {
    wheel.spin_angle = (wheel.spin_angle + wheel.rot_speed * dt) % std::f32::consts::TAU;
}
