// ==============================================================================
// longitudinal.rs — LONGITUDINAL (DRIVE + BRAKE) TIRE MODEL
// ==============================================================================
// Drive (driven wheels only):
// - traction = friction * mass * traction_scale
// - excess   = |torque| - traction
// - slip     = clamp(slip + excess * dt, 0, 1)   (grows while excess > 0,
//                                                 decays while excess < 0)
// - cap      = (slip_headroom - slip) * traction
// - force    = clamp(torque, -cap, cap)
//
// The slip factor is ONE scalar shared by every driven wheel of the vehicle.
// Left/right wheelspin are therefore coupled: a wheel over its traction limit
// raises the slip seen by its partner on the same step. Splitting it per wheel
// would need a slip field on WheelState instead of the drivetrain.
//
// Brake (all wheels):
// - opposes the sign of v_long, scaled by brake_torque * pedal
// - magnitude capped at wheel.mass * |v_long| / dt, the force that stops this
//   wheel's share of the chassis in one step; it can never flip the motion
// - inactive below min_velocity so a stopped car is never pushed backwards
// ==============================================================================

use crate::physics::sign;
use crate::tire::types::{TireConfig, WheelState};

// ====================================================================
// Result of drive solve
// ====================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DriveResult {
    pub force: f32,
    pub slipping: bool,
}

pub fn solve_drive(
    cfg: &TireConfig,
    wheel: &WheelState,
    torque: f32,
    slip_factor: &mut f32,
    dt: f32,
) -> DriveResult {
    let traction = wheel.traction_limit(cfg);
    let excess = torque.abs() - traction;

    *slip_factor = (*slip_factor + excess * dt.max(0.0)).clamp(0.0, 1.0);

    let cap = ((cfg.slip_headroom - *slip_factor) * traction).max(0.0);

    DriveResult {
        force: torque.clamp(-cap, cap),
        slipping: excess > 0.0,
    }
}

pub fn solve_brake(
    cfg: &TireConfig,
    wheel: &WheelState,
    v_long: f32,
    brake_pedal: f32,
    brake_torque: f32,
    dt: f32,
) -> f32 {
    // Deadzone near zero speed
    if dt <= 0.0 || v_long.abs() <= cfg.min_velocity {
        return 0.0;
    }
    let stop = wheel.mass * v_long.abs() / dt;
    -sign(v_long) * (brake_torque * brake_pedal).min(stop)
}
