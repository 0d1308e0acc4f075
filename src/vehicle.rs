// ==============================================================================
// vehicle.rs — CHASSIS CONFIG + PER-FRAME VEHICLE DYNAMICS
// ------------------------------------------------------------------------------
// VehicleDynamics::update(dt) runs, in order:
//   1) steering rate limiter
//   2) force accumulation: reset, tire solve per wheel, air drag
//   3) rigid body integration
//   4) drivetrain: rpm from driven wheel spin, gearbox state machine
//   5) presentation state: wheel spin angles, body tilt
//   6) optional observer callback
//
// Everything happens synchronously inside one call; nothing persists between
// steps except the state fields below.
// ==============================================================================

use nalgebra::{Point3, UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};

use crate::body_tilt::{BodyTilt, TiltConfig};
use crate::drivetrain::{Direction, Drivetrain, EngineConfig, GearboxConfig, PowertrainTuning};
use crate::error::ConfigError;
use crate::physics::{Force, RigidBody};
use crate::telemetry::{StepObserver, StepReport, Telemetry, VehicleSnapshot, WheelVisual, MS_TO_KMH};
use crate::tire::spin::advance_spin_angle;
use crate::tire::steering::{update_steering_angle, SteeringConfig};
use crate::tire::{solve_wheel, SolveContext, TireConfig, WheelForces, WheelMount, WheelSide, WheelState};

/// Named game-feel constants, grouped by the subsystem that reads them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub tire: TireConfig,
    pub steering: SteeringConfig,
    pub tilt: TiltConfig,
    pub powertrain: PowertrainTuning,
}

// ============================================
// Axles
// ============================================

#[derive(Debug, Clone)]
pub struct AxleState {
    pub left_wheel: WheelState,
    pub right_wheel: WheelState,
    pub axle_width: f32,      // m, left to right
    pub axle_position: f32,   // m along body +Z from the origin
    pub is_driving: bool,
    pub is_steering: bool,
}

impl AxleState {
    pub fn wheel(&self, side: WheelSide) -> &WheelState {
        match side {
            WheelSide::Left => &self.left_wheel,
            WheelSide::Right => &self.right_wheel,
        }
    }

    pub fn wheel_mut(&mut self, side: WheelSide) -> &mut WheelState {
        match side {
            WheelSide::Left => &mut self.left_wheel,
            WheelSide::Right => &mut self.right_wheel,
        }
    }

    /// Body-local contact mount for one side (+X is left).
    pub fn mount(&self, side: WheelSide) -> WheelMount {
        WheelMount {
            position: Point3::new(side.lateral_sign() * self.axle_width * 0.5, 0.0, self.axle_position),
            drive: self.is_driving,
            steer: self.is_steering,
        }
    }
}

// ============================================
// Chassis
// ============================================

#[derive(Debug, Clone)]
pub struct ChassisConfig {
    pub mass: f32,                  // kg
    pub inertia: f32,               // kg*m² (yaw)
    pub center_of_mass: [f32; 3],   // body local
    pub axles: Vec<AxleState>,      // front to back
    pub engine: EngineConfig,
    pub gearbox: GearboxConfig,
    pub suspension_hardness: f32,   // tilt filter stiffness
    pub brake_torque: f32,          // N at full pedal, per wheel
    pub max_steer_angle: f32,       // rad
    pub air_friction: f32,          // drag = -|v|² * air_friction
    pub tuning: Tuning,
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value > 0.0 { Ok(()) } else { Err(ConfigError::NonPositive { field, value }) }
}

fn non_negative(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value >= 0.0 { Ok(()) } else { Err(ConfigError::Negative { field, value }) }
}

impl ChassisConfig {
    pub fn driven_wheel_count(&self) -> usize {
        self.axles.iter().filter(|a| a.is_driving).count() * 2
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.mass > 0.0) {
            return Err(ConfigError::NonPositiveMass(self.mass));
        }
        if !(self.inertia > 0.0) {
            return Err(ConfigError::NonPositiveInertia(self.inertia));
        }
        if self.axles.is_empty() {
            return Err(ConfigError::NoAxles);
        }
        if !self.axles.iter().any(|a| a.is_driving) {
            return Err(ConfigError::NoDrivenAxle);
        }

        for (axle, a) in self.axles.iter().enumerate() {
            for side in WheelSide::BOTH {
                let w = a.wheel(side);
                if !(w.radius > 0.0) {
                    return Err(ConfigError::NonPositiveWheelRadius { axle, side, radius: w.radius });
                }
                if !(w.mass > 0.0) {
                    return Err(ConfigError::NonPositiveWheelMass { axle, side, mass: w.mass });
                }
                if !(w.friction >= 0.0) {
                    return Err(ConfigError::NegativeFriction { axle, side, friction: w.friction });
                }
            }
        }

        // --- drivetrain ---
        if self.gearbox.ratios.len() < 3 {
            return Err(ConfigError::GearTableTooShort(self.gearbox.ratios.len()));
        }
        if !(self.gearbox.main_ratio > 0.0) {
            return Err(ConfigError::NonPositiveMainRatio(self.gearbox.main_ratio));
        }
        let e = &self.engine;
        if !(e.pick_rpm_min > 0.0 && e.pick_rpm_max >= e.pick_rpm_min) {
            return Err(ConfigError::InvalidTorquePlateau { min: e.pick_rpm_min, max: e.pick_rpm_max });
        }
        let g = &self.gearbox;
        if !(g.max_rpm > g.min_rpm) {
            return Err(ConfigError::InvalidShiftWindow { min: g.min_rpm, max: g.max_rpm });
        }
        non_negative("engine.max_torque", e.max_torque)?;
        non_negative("engine.idle_rpm", e.idle_rpm)?;
        non_negative("gearbox.shift_time", g.shift_time)?;

        // --- chassis ---
        if !(self.suspension_hardness > 0.0) {
            return Err(ConfigError::NonPositiveSuspensionHardness(self.suspension_hardness));
        }
        non_negative("brake_torque", self.brake_torque)?;
        non_negative("air_friction", self.air_friction)?;
        non_negative("max_steer_angle", self.max_steer_angle)?;

        // --- tuning (divisors) ---
        let t = &self.tuning;
        positive("tuning.tire.grip_point", t.tire.grip_point)?;
        positive("tuning.tire.powertrain_inertia", t.tire.powertrain_inertia)?;
        positive("tuning.tire.spin_radius_factor", t.tire.spin_radius_factor)?;
        positive("tuning.steering.reference_speed", t.steering.reference_speed)?;
        positive("tuning.tilt.reference_accel", t.tilt.reference_accel)?;

        Ok(())
    }
}

// ============================================
// Vehicle
// ============================================

pub struct VehicleDynamics {
    chassis: ChassisConfig,
    body: RigidBody,
    drivetrain: Drivetrain,

    pedal_accel: f32,         // 0..1
    pedal_brake: f32,         // 0..1
    controls_steering: f32,   // -1..1
    steer_angle: f32,         // rad, rate limited
    direction: Direction,

    wheel_torque: f32,        // last request per driven wheel
    wheel_forces: Vec<WheelForces>, // last step, axle order, left then right
    tilt: BodyTilt,

    observer: Option<Box<dyn StepObserver>>,
}

#[inline]
fn clamp_input(value: f32, min: f32, max: f32) -> f32 {
    if value.is_nan() { 0.0 } else { value.clamp(min, max) }
}

impl VehicleDynamics {
    pub fn new(chassis: ChassisConfig) -> Result<Self, ConfigError> {
        chassis.validate()?;

        let [cx, cy, cz] = chassis.center_of_mass;
        let body = RigidBody::new(chassis.mass, chassis.inertia).with_center_of_mass(Point3::new(cx, cy, cz));
        let drivetrain = Drivetrain::new(
            chassis.engine,
            chassis.gearbox.clone(),
            chassis.tuning.powertrain,
            chassis.driven_wheel_count(),
        );

        Ok(Self {
            chassis,
            body,
            drivetrain,
            pedal_accel: 0.0,
            pedal_brake: 0.0,
            controls_steering: 0.0,
            steer_angle: 0.0,
            direction: Direction::Neutral,
            wheel_torque: 0.0,
            wheel_forces: Vec::new(),
            tilt: BodyTilt::default(),
            observer: None,
        })
    }

    /// Place the chassis; `yaw` follows the body's own rotation sense.
    pub fn with_spawn(mut self, position: Point3<f32>, yaw: f32) -> Self {
        let orientation = UnitQuaternion::from_axis_angle(&Vector3::y_axis(), yaw);
        self.body = self.body.with_pose(position, orientation);
        self
    }

    pub fn set_observer(&mut self, observer: Box<dyn StepObserver>) {
        self.observer = Some(observer);
    }

    pub fn clear_observer(&mut self) {
        self.observer = None;
    }

    // =========================================================================
    // Driver inputs
    // =========================================================================
    pub fn set_accel(&mut self, value: f32) {
        self.pedal_accel = clamp_input(value, 0.0, 1.0);
    }

    pub fn set_brake(&mut self, value: f32) {
        self.pedal_brake = clamp_input(value, 0.0, 1.0);
    }

    pub fn set_steering(&mut self, value: f32) {
        self.controls_steering = clamp_input(value, -1.0, 1.0);
    }

    pub fn set_direction(&mut self, direction: Direction) {
        self.direction = direction;
    }

    // =========================================================================
    // Step
    // =========================================================================
    pub fn update(&mut self, dt: f32) {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };

        self.update_steering(dt);
        self.update_forces(dt);
        self.body.update(dt);

        // No time passed: spin, rpm, gearbox and tilt hold their state.
        if dt > 0.0 {
            self.update_drivetrain(dt);
            self.update_wheels(dt);
            self.update_tilt(dt);
        }

        if let Some(observer) = self.observer.as_mut() {
            let report = StepReport {
                dt,
                telemetry: Self::telemetry_of(&self.body, &self.drivetrain),
                slip_factor: self.drivetrain.slip_factor(),
                steer_angle: self.steer_angle,
                wheel_torque: self.wheel_torque,
                gearbox: self.drivetrain.gearbox().phase(),
                pending_gear: self.drivetrain.gearbox().pending_gear(),
                wheels: self.wheel_forces.clone(),
            };
            observer.on_step(&report);
        }
    }

    fn update_steering(&mut self, dt: f32) {
        self.steer_angle = update_steering_angle(
            &self.chassis.tuning.steering,
            self.steer_angle,
            self.controls_steering,
            self.chassis.max_steer_angle,
            self.body.velocity().norm(),
            dt,
        );
    }

    fn update_forces(&mut self, dt: f32) {
        self.body.reset_forces();

        self.wheel_torque = self.drivetrain.wheel_torque(self.pedal_accel);

        let ctx = SolveContext {
            dt,
            steer_angle: self.steer_angle,
            wheel_torque: self.wheel_torque,
            brake_pedal: self.pedal_brake,
            brake_torque: self.chassis.brake_torque,
        };
        let tire_cfg = self.chassis.tuning.tire;
        let slip = self.drivetrain.slip_factor_mut();
        self.wheel_forces.clear();

        for axle in self.chassis.axles.iter_mut() {
            for side in WheelSide::BOTH {
                let mount = axle.mount(side);
                let forces = solve_wheel(&tire_cfg, &ctx, &mut self.body, axle.wheel_mut(side), &mount, slip);
                self.wheel_forces.push(forces);
            }
        }

        self.apply_air_drag();
    }

    fn apply_air_drag(&mut self) {
        let v = self.body.velocity();
        let speed = v.norm();
        if speed <= 0.0 {
            return;
        }
        // -(v/|v|) * |v|² * k
        let drag = -v * speed * self.chassis.air_friction;
        self.body.apply_force(Force::new(drag, self.body.center_of_mass()));
    }

    fn update_drivetrain(&mut self, dt: f32) {
        let (sum, count) = self
            .chassis
            .axles
            .iter()
            .filter(|a| a.is_driving)
            .fold((0.0, 0usize), |(s, n), a| {
                (s + a.left_wheel.rot_speed + a.right_wheel.rot_speed, n + 2)
            });
        let avg = if count > 0 { sum / count as f32 } else { 0.0 };

        self.drivetrain.update_rpm(avg);
        self.drivetrain.update_gearbox(self.direction, dt);
    }

    fn update_wheels(&mut self, dt: f32) {
        for axle in self.chassis.axles.iter_mut() {
            advance_spin_angle(&mut axle.left_wheel, dt);
            advance_spin_angle(&mut axle.right_wheel, dt);
        }
    }

    fn update_tilt(&mut self, dt: f32) {
        let local = self.body.world_dir_to_local(&self.body.acceleration());
        self.tilt.update(
            &self.chassis.tuning.tilt,
            local.z,
            local.x,
            self.chassis.suspension_hardness,
            dt,
        );
    }

    // =========================================================================
    // Outputs
    // =========================================================================
    fn telemetry_of(body: &RigidBody, drivetrain: &Drivetrain) -> Telemetry {
        Telemetry {
            rpm: drivetrain.rpm(),
            gear: drivetrain.gearbox().effective_gear(),
            speed: body.velocity().norm() * MS_TO_KMH,
        }
    }

    pub fn telemetry(&self) -> Telemetry {
        Self::telemetry_of(&self.body, &self.drivetrain)
    }

    pub fn snapshot(&self) -> VehicleSnapshot {
        let p = self.body.position();
        let q = self.body.orientation();

        let mut wheels = Vec::with_capacity(self.chassis.axles.len() * 2);
        for (i, axle) in self.chassis.axles.iter().enumerate() {
            for side in WheelSide::BOTH {
                let w = axle.wheel(side);
                wheels.push(WheelVisual {
                    axle: i,
                    side,
                    position: [side.lateral_sign() * axle.axle_width * 0.5, w.radius, axle.axle_position],
                    steer_angle: if axle.is_steering { self.steer_angle } else { 0.0 },
                    spin_angle: w.spin_angle,
                });
            }
        }

        VehicleSnapshot {
            position: [p.x, p.y, p.z],
            rotation: [q.i, q.j, q.k, q.w],
            tilt: self.tilt,
            wheels,
        }
    }

    pub fn accel(&self) -> f32 { self.pedal_accel }
    pub fn brake(&self) -> f32 { self.pedal_brake }
    pub fn steering_input(&self) -> f32 { self.controls_steering }
    pub fn steer_angle(&self) -> f32 { self.steer_angle }
    pub fn direction(&self) -> Direction { self.direction }
    pub fn wheel_torque(&self) -> f32 { self.wheel_torque }
    pub fn wheel_forces(&self) -> &[WheelForces] { &self.wheel_forces }
    pub fn tilt(&self) -> BodyTilt { self.tilt }
    pub fn body(&self) -> &RigidBody { &self.body }
    pub fn drivetrain(&self) -> &Drivetrain { &self.drivetrain }
    pub fn chassis(&self) -> &ChassisConfig { &self.chassis }
    pub fn axles(&self) -> &[AxleState] { &self.chassis.axles }

    #[cfg(test)]
    pub(crate) fn drivetrain_mut(&mut self) -> &mut Drivetrain { &mut self.drivetrain }
}
