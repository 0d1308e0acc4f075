// ==============================================================================
// telemetry.rs — READ-ONLY OUTPUTS (DISPLAY, PRESENTATION, OBSERVERS)
// ------------------------------------------------------------------------------
// Telemetry        rpm / gear / speed for a dashboard
// VehicleSnapshot  chassis pose + body tilt + per-wheel visual state for a
//                  renderer; computed after the physics step, never read back
// StepObserver     optional per-step hook replacing inline diagnostics
//
// Nothing here feeds back into the physics step.
// ==============================================================================

use serde::Serialize;

use crate::body_tilt::BodyTilt;
use crate::drivetrain::GearboxPhase;
use crate::tire::{WheelForces, WheelSide};

/// m/s -> km/h
pub const MS_TO_KMH: f32 = 3600.0 / 1000.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Telemetry {
    pub rpm: f32,
    pub gear: i32,      // effective gear, 0 while shifting
    pub speed: f32,     // km/h
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WheelVisual {
    pub axle: usize,
    pub side: WheelSide,
    pub position: [f32; 3],   // body local, wheel center
    pub steer_angle: f32,     // rad
    pub spin_angle: f32,      // rad
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VehicleSnapshot {
    pub position: [f32; 3],
    pub rotation: [f32; 4],   // quaternion [x, y, z, w]
    pub tilt: BodyTilt,
    pub wheels: Vec<WheelVisual>,
}

/// Everything an observer may want to know about one step.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepReport {
    pub dt: f32,
    pub telemetry: Telemetry,
    pub slip_factor: f32,
    pub steer_angle: f32,
    pub wheel_torque: f32,
    pub gearbox: GearboxPhase,
    pub pending_gear: i32,
    pub wheels: Vec<WheelForces>,   // axle order, left then right
}

pub trait StepObserver: Send {
    fn on_step(&mut self, report: &StepReport);
}

impl<F> StepObserver for F
where
    F: FnMut(&StepReport) + Send,
{
    fn on_step(&mut self, report: &StepReport) {
        self(report)
    }
}

/// Emits one `trace` event per step, tagged with a vehicle label.
#[derive(Debug, Clone)]
pub struct TracingObserver {
    pub label: String,
}

impl TracingObserver {
    pub fn new(label: impl Into<String>) -> Self {
        Self { label: label.into() }
    }
}

impl StepObserver for TracingObserver {
    fn on_step(&mut self, r: &StepReport) {
        tracing::trace!(
            vehicle = %self.label,
            rpm = r.telemetry.rpm,
            gear = r.telemetry.gear,
            speed_kmh = r.telemetry.speed,
            slip = r.slip_factor,
            steer = r.steer_angle,
            torque = r.wheel_torque,
            gearbox = %r.gearbox,
            slipping_wheels = r.wheels.iter().filter(|w| w.slipping).count(),
            "vehicle step"
        );
    }
}
