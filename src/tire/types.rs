//! Core shared types for the tire model.
// tire/types.rs
use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================
// Wheel identification
// ============================================

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WheelSide { Left, Right }

impl WheelSide {
    pub const BOTH: [WheelSide; 2] = [WheelSide::Left, WheelSide::Right];

    /// Lateral sign in the body frame (+X is left).
    pub fn lateral_sign(&self) -> f32 {
        match self {
            WheelSide::Left => 1.0,
            WheelSide::Right => -1.0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            WheelSide::Left => "left",
            WheelSide::Right => "right",
        }
    }
}

impl fmt::Display for WheelSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================
// ----- tuning -------------------------------
// ============================================

/// Empirical game-feel constants of the tire model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TireConfig {
    pub traction_scale: f32,      // friction * mass * scale = max tractive force
    pub slip_headroom: f32,       // drive cap = (headroom - slip) * traction
    pub grip_point: f32,          // m/s lateral speed where grip saturates
    pub slip_point: f32,          // m/s lateral speed where the tire lets go
    pub slide_grip: f32,          // 0..1 grip ratio while sliding
    pub powertrain_inertia: f32,  // torque -> spin under wheelspin
    pub spin_radius_factor: f32,  // target spin = v_long / (factor * radius)
    pub min_velocity: f32,        // m/s, brake deadzone
}

impl Default for TireConfig {
    fn default() -> Self {
        Self {
            traction_scale: 10.0,
            slip_headroom: 1.1,
            grip_point: 2.5,
            slip_point: 12.0,
            slide_grip: 0.2,
            powertrain_inertia: 100.0,
            spin_radius_factor: 2.0,
            min_velocity: crate::physics::PHYSICS_MIN_VELOCITY,
        }
    }
}

// ============================================
// ----- per-wheel state ----------------------
// ============================================

/// Mutable state of one wheel, owned by its axle.
#[derive(Debug, Clone)]
pub struct WheelState {
    pub radius: f32,        // m
    pub friction: f32,      // dimensionless
    pub mass: f32,          // kg carried by this wheel
    pub rot_speed: f32,     // rad/s
    pub spin_angle: f32,    // rad, accumulated (cosmetic)

    last_world_position: Point3<f32>,
    tracking: bool,         // false until the first position sample
}

impl WheelState {
    pub fn new(radius: f32, friction: f32, mass: f32) -> Self {
        Self {
            radius,
            friction,
            mass,
            rot_speed: 0.0,
            spin_angle: 0.0,
            last_world_position: Point3::origin(),
            tracking: false,
        }
    }

    /// Maximum force the contact patch can transmit.
    #[inline]
    pub fn traction_limit(&self, cfg: &TireConfig) -> f32 {
        self.friction * self.mass * cfg.traction_scale
    }

    /// Record this frame's mount position; returns the displacement since the
    /// previous sample (zero on the first one).
    pub fn track(&mut self, world: Point3<f32>) -> Vector3<f32> {
        let delta = if self.tracking {
            world - self.last_world_position
        } else {
            Vector3::zeros()
        };
        self.last_world_position = world;
        self.tracking = true;
        delta
    }

    pub fn is_tracking(&self) -> bool {
        self.tracking
    }
}

// ============================================
// ----- per-step inputs / outputs ------------
// ============================================

/// Inputs shared by every wheel for one step.
#[derive(Debug, Clone, Copy)]
pub struct SolveContext {
    pub dt: f32,              // s
    pub steer_angle: f32,     // rad, applied to steering wheels only
    pub wheel_torque: f32,    // requested per driven wheel
    pub brake_pedal: f32,     // 0..1
    pub brake_torque: f32,    // N at full pedal
}

/// Where a wheel sits and what it does.
#[derive(Debug, Clone, Copy)]
pub struct WheelMount {
    pub position: Point3<f32>,  // body local
    pub drive: bool,
    pub steer: bool,
}

/// What the solver did to one wheel this step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct WheelForces {
    pub drive: f32,     // N along wheel forward
    pub brake: f32,     // N along wheel forward
    pub lateral: f32,   // N along wheel side
    pub v_long: f32,    // m/s
    pub v_lat: f32,     // m/s
    pub slipping: bool,
}
