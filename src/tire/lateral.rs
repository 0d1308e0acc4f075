// ==============================================================================
// lateral.rs — SATURATING LATERAL (CORNERING) TIRE MODEL
// ==============================================================================
// grip(v_lat):
// - quadratic ramp      (v_lat / grip_point)²  capped at 1
// - sliding plateau     slide_grip once |v_lat| > slip_point, or whenever the
//                       wheel is already spinning up longitudinally
//
// force = -sign(v_lat) * grip * traction
//
// Output is a scalar along the wheel's side axis; solve.rs turns it into a
// world-space force at the mount point.
// ==============================================================================

use crate::physics::sign;
use crate::tire::types::{TireConfig, WheelState};

/// Grip ratio in [0, 1] for a given lateral speed.
pub fn lateral_grip(cfg: &TireConfig, v_lat: f32, slipping: bool) -> f32 {
    if slipping || v_lat.abs() > cfg.slip_point {
        return cfg.slide_grip;
    }
    (v_lat / cfg.grip_point).powi(2).min(1.0)
}

pub fn solve_lateral(cfg: &TireConfig, wheel: &WheelState, v_lat: f32, slipping: bool) -> f32 {
    -sign(v_lat) * lateral_grip(cfg, v_lat, slipping) * wheel.traction_limit(cfg)
}
