// ==============================================================================
// drivetrain — ENGINE + GEARBOX + SHARED SLIP STATE
// ------------------------------------------------------------------------------
// wheel_torque(pedal):
//   pedal'  = idle_throttle        if rpm <= idle and pedal < idle_throttle
//   brake   = max_torque * engine_brake_fraction   if rpm > idle, else 0
//   T_wheel = (T_engine(rpm) * ratio(gear) * main * pedal'
//              - brake * (1 - pedal') * dir(gear)) / driven_wheels
//
// update_rpm(avg driven wheel spin):
//   rpm = max(idle * idle_rpm_floor, ω_avg * ratio(gear) * main * 60 / 2π)
//
// `gear` is always the effective gear, so a running shift cuts engine output.
// The slip factor lives here as the single value all driven wheels share.
// ==============================================================================

pub mod engine;
pub mod gearbox;

pub use engine::EngineConfig;
pub use gearbox::{Direction, Gearbox, GearboxConfig, GearboxPhase};

use serde::{Deserialize, Serialize};
use std::f32::consts::PI;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PowertrainTuning {
    pub idle_throttle: f32,          // minimum pedal at/below idle
    pub engine_brake_fraction: f32,  // of max_torque, above idle
    pub idle_rpm_floor: f32,         // of idle_rpm, lowest reported rpm
}

impl Default for PowertrainTuning {
    fn default() -> Self {
        Self {
            idle_throttle: 0.2,
            engine_brake_fraction: 0.05,
            idle_rpm_floor: 0.7,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Drivetrain {
    engine: EngineConfig,
    gearbox_cfg: GearboxConfig,
    tuning: PowertrainTuning,
    driven_wheels: usize,

    gearbox: Gearbox,
    rpm: f32,
    slip_factor: f32,   // 0..1, shared by all driven wheels
}

impl Drivetrain {
    pub fn new(
        engine: EngineConfig,
        gearbox_cfg: GearboxConfig,
        tuning: PowertrainTuning,
        driven_wheels: usize,
    ) -> Self {
        let rpm = engine.idle_rpm;
        Self {
            engine,
            gearbox_cfg,
            tuning,
            driven_wheels: driven_wheels.max(1),
            gearbox: Gearbox::default(),
            rpm,
            slip_factor: 0.0,
        }
    }

    pub fn rpm(&self) -> f32 { self.rpm }
    pub fn gearbox(&self) -> &Gearbox { &self.gearbox }
    pub fn gearbox_config(&self) -> &GearboxConfig { &self.gearbox_cfg }
    pub fn engine(&self) -> &EngineConfig { &self.engine }
    pub fn slip_factor(&self) -> f32 { self.slip_factor }

    /// Mutable access for the tire solver, which owns slip evolution.
    pub fn slip_factor_mut(&mut self) -> &mut f32 {
        &mut self.slip_factor
    }

    /// Pedal actually fed to the engine.
    pub fn effective_pedal(&self, pedal: f32) -> f32 {
        let pedal = pedal.clamp(0.0, 1.0);
        if self.rpm <= self.engine.idle_rpm && pedal < self.tuning.idle_throttle {
            self.tuning.idle_throttle
        } else {
            pedal
        }
    }

    /// Torque request per driven wheel.
    pub fn wheel_torque(&self, pedal: f32) -> f32 {
        let pedal = self.effective_pedal(pedal);
        let gear = self.gearbox.effective_gear();

        let engine_brake = if self.rpm > self.engine.idle_rpm {
            self.engine.max_torque * self.tuning.engine_brake_fraction
        } else {
            0.0
        };
        let dir = if gear < 0 { -1.0 } else { 1.0 };

        let gear_torque = self.engine.torque_at(self.rpm)
            * self.gearbox_cfg.ratio(gear)
            * self.gearbox_cfg.main_ratio
            * pedal
            - engine_brake * (1.0 - pedal) * dir;

        gear_torque / self.driven_wheels as f32
    }

    /// Derive engine speed from the mean spin of the driven wheels (rad/s).
    pub fn update_rpm(&mut self, avg_wheel_spin: f32) {
        let gear = self.gearbox.effective_gear();
        let engine_speed = avg_wheel_spin * self.gearbox_cfg.ratio(gear) * self.gearbox_cfg.main_ratio;
        let floor = self.engine.idle_rpm * self.tuning.idle_rpm_floor;

        self.rpm = floor.max(engine_speed * 60.0 / (2.0 * PI));
    }

    pub fn update_gearbox(&mut self, direction: Direction, dt: f32) {
        self.gearbox.update(&self.gearbox_cfg, direction, self.rpm, dt);
    }

    #[cfg(test)]
    pub(crate) fn force_rpm(&mut self, rpm: f32) {
        self.rpm = rpm;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drivetrain() -> Drivetrain {
        Drivetrain::new(
            EngineConfig { max_torque: 200.0, pick_rpm_min: 2200.0, pick_rpm_max: 4600.0, idle_rpm: 1500.0 },
            GearboxConfig {
                ratios: vec![3.2, 0.0, 3.8, 2.4, 1.6, 1.0],
                main_ratio: 4.5,
                shift_time: 0.3,
                min_rpm: 1800.0,
                max_rpm: 4700.0,
            },
            PowertrainTuning::default(),
            2,
        )
    }

    #[test]
    fn test_starts_at_idle_in_neutral() {
        let d = drivetrain();
        assert_eq!(d.rpm(), 1500.0);
        assert_eq!(d.gearbox().current_gear(), 0);
        assert_eq!(d.slip_factor(), 0.0);
    }

    #[test]
    fn test_idle_throttle_floor() {
        let mut d = drivetrain();
        assert_eq!(d.effective_pedal(0.0), 0.2);
        assert_eq!(d.effective_pedal(0.7), 0.7);
        d.force_rpm(3000.0);
        assert_eq!(d.effective_pedal(0.0), 0.0);
    }

    #[test]
    fn test_first_gear_torque_at_idle() {
        let mut d = drivetrain();
        d.update_gearbox(Direction::Forward, 1.0 / 60.0);
        // T(1500) = 1500 * 200/2200, full pedal, no engine braking at idle
        let expected = 1500.0 * (200.0 / 2200.0) * 3.8 * 4.5 / 2.0;
        assert!((d.wheel_torque(1.0) - expected).abs() < 1e-2);
    }

    #[test]
    fn test_engine_braking_off_throttle() {
        let mut d = drivetrain();
        d.update_gearbox(Direction::Forward, 1.0 / 60.0);
        d.force_rpm(3000.0);
        // pedal 0 above idle: only the braking term
        assert!((d.wheel_torque(0.0) + 200.0 * 0.05 / 2.0).abs() < 1e-4);
    }

    #[test]
    fn test_reverse_pushes_backwards() {
        let mut d = drivetrain();
        d.update_gearbox(Direction::Reverse, 1.0 / 60.0);
        assert!(d.wheel_torque(1.0) < 0.0);
    }

    #[test]
    fn test_neutral_transmits_nothing_at_idle() {
        let d = drivetrain();
        assert_eq!(d.wheel_torque(1.0), 0.0);
    }

    #[test]
    fn test_rpm_from_wheel_spin_and_floor() {
        let mut d = drivetrain();
        d.update_gearbox(Direction::Forward, 1.0 / 60.0);

        d.update_rpm(0.0);
        assert!((d.rpm() - 1050.0).abs() < 1e-3);

        // 20 rad/s * 3.8 * 4.5 = 342 rad/s
        d.update_rpm(20.0);
        assert!((d.rpm() - 342.0 * 60.0 / (2.0 * PI)).abs() < 1e-1);
    }

    #[test]
    fn test_reverse_rpm_is_positive() {
        let mut d = drivetrain();
        d.update_gearbox(Direction::Reverse, 1.0 / 60.0);
        d.update_rpm(-20.0);
        assert!(d.rpm() > 2000.0);
    }

    #[test]
    fn test_shift_cuts_output() {
        let mut d = drivetrain();
        d.update_gearbox(Direction::Forward, 1.0 / 60.0);
        d.force_rpm(5000.0);
        d.update_gearbox(Direction::Forward, 1.0 / 60.0);
        assert!(d.gearbox().is_shifting());
        // neutral ratio: only engine braking survives
        assert!(d.wheel_torque(1.0).abs() < 1e-4);
    }
}
