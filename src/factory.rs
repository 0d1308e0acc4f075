// ==============================================================================
// factory.rs — VEHICLE DESCRIPTIONS -> VALIDATED CHASSIS
// ------------------------------------------------------------------------------
// A VehicleOptions is the flat, human-editable description of a car (JSON or a
// named preset). build() expands it into a ChassisConfig:
//   - every wheel carries mass / wheel_count, the shared friction and radius
//   - max_steer_angle is given in degrees and stored in radians
//   - the result is validated before it is handed out
// ==============================================================================

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::drivetrain::{EngineConfig, GearboxConfig};
use crate::error::FactoryError;
use crate::tire::WheelState;
use crate::vehicle::{AxleState, ChassisConfig, Tuning};

pub const PRESET_NAMES: [&str; 2] = ["test-car", "truck"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxleOptions {
    pub axle_position: f32,   // m along +Z
    pub axle_width: f32,      // m
    #[serde(default)]
    pub is_driving: bool,
    #[serde(default)]
    pub is_steering: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleOptions {
    pub engine: EngineConfig,
    pub gearbox: GearboxConfig,
    pub axles: Vec<AxleOptions>,

    pub mass: f32,                  // kg
    pub inertia: f32,               // kg*m²
    #[serde(default)]
    pub center_of_mass: [f32; 3],
    pub brake_torque: f32,
    pub max_steer_angle: f32,       // degrees
    pub wheel_radius: f32,          // m
    pub wheels_friction: f32,
    pub suspension_hardness: f32,
    #[serde(default)]
    pub air_friction: f32,

    #[serde(default)]
    pub tuning: Tuning,
}

impl VehicleOptions {
    pub fn from_json_str(json: &str) -> Result<Self, FactoryError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, FactoryError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn wheel_count(&self) -> usize {
        self.axles.len() * 2
    }

    pub fn build(&self) -> Result<ChassisConfig, FactoryError> {
        let count = self.wheel_count().max(1) as f32;
        let wheel = || WheelState::new(self.wheel_radius, self.wheels_friction, self.mass / count);

        let axles = self
            .axles
            .iter()
            .map(|a| AxleState {
                left_wheel: wheel(),
                right_wheel: wheel(),
                axle_width: a.axle_width,
                axle_position: a.axle_position,
                is_driving: a.is_driving,
                is_steering: a.is_steering,
            })
            .collect();

        let chassis = ChassisConfig {
            mass: self.mass,
            inertia: self.inertia,
            center_of_mass: self.center_of_mass,
            axles,
            engine: self.engine,
            gearbox: self.gearbox.clone(),
            suspension_hardness: self.suspension_hardness,
            brake_torque: self.brake_torque,
            max_steer_angle: self.max_steer_angle.to_radians(),
            air_friction: self.air_friction,
            tuning: self.tuning,
        };

        chassis.validate()?;
        Ok(chassis)
    }
}

// ============================================
// Presets
// ============================================

/// Light rear-driven hatchback.
pub fn test_car() -> VehicleOptions {
    VehicleOptions {
        engine: EngineConfig {
            max_torque: 200.0,
            pick_rpm_min: 2200.0,
            pick_rpm_max: 4600.0,
            idle_rpm: 1500.0,
        },
        gearbox: GearboxConfig {
            ratios: vec![3.2, 0.0, 3.8, 2.4, 1.6, 1.0],  // R, N, 1..4
            main_ratio: 4.5,
            shift_time: 0.3,
            min_rpm: 1800.0,
            max_rpm: 4700.0,
        },
        axles: vec![
            AxleOptions { axle_position: 1.3, axle_width: 1.6, is_driving: false, is_steering: true },
            AxleOptions { axle_position: -1.3, axle_width: 1.6, is_driving: true, is_steering: false },
        ],
        mass: 1000.0,
        inertia: 950.0,
        center_of_mass: [0.0, 0.0, 0.0],
        brake_torque: 1200.0,
        max_steer_angle: 35.0,
        wheel_radius: 0.3,
        wheels_friction: 0.8,
        suspension_hardness: 2.2,
        air_friction: 0.4,
        tuning: Tuning::default(),
    }
}

/// Heavy all-wheel-drive truck: long gearing, slow steering, stiff springs.
pub fn truck() -> VehicleOptions {
    VehicleOptions {
        engine: EngineConfig {
            max_torque: 900.0,
            pick_rpm_min: 1200.0,
            pick_rpm_max: 2600.0,
            idle_rpm: 800.0,
        },
        gearbox: GearboxConfig {
            ratios: vec![5.5, 0.0, 6.0, 4.2, 2.9, 2.0, 1.4, 1.0],
            main_ratio: 5.2,
            shift_time: 0.6,
            min_rpm: 1000.0,
            max_rpm: 2800.0,
        },
        axles: vec![
            AxleOptions { axle_position: 2.1, axle_width: 2.0, is_driving: true, is_steering: true },
            AxleOptions { axle_position: -2.1, axle_width: 2.0, is_driving: true, is_steering: false },
        ],
        mass: 4500.0,
        inertia: 9000.0,
        center_of_mass: [0.0, -0.2, 0.3],
        brake_torque: 5200.0,
        max_steer_angle: 30.0,
        wheel_radius: 0.5,
        wheels_friction: 0.9,
        suspension_hardness: 4.0,
        air_friction: 1.1,
        tuning: Tuning::default(),
    }
}

pub fn preset(name: &str) -> Result<VehicleOptions, FactoryError> {
    match name {
        "test-car" => Ok(test_car()),
        "truck" => Ok(truck()),
        other => Err(FactoryError::UnknownPreset(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConfigError;

    #[test]
    fn test_presets_build() {
        for name in PRESET_NAMES {
            let chassis = preset(name).and_then(|o| o.build());
            assert!(chassis.is_ok(), "{name}: {chassis:?}");
        }
    }

    #[test]
    fn test_car_expansion() {
        let c = test_car().build().unwrap();
        assert_eq!(c.axles.len(), 2);
        assert_eq!(c.driven_wheel_count(), 2);
        assert!((c.max_steer_angle - 35.0_f32.to_radians()).abs() < 1e-6);

        let w = &c.axles[0].left_wheel;
        assert_eq!(w.mass, 250.0);
        assert_eq!(w.radius, 0.3);
        assert_eq!(w.friction, 0.8);
        assert!(c.axles[0].is_steering && !c.axles[0].is_driving);
        assert!(c.axles[1].is_driving && !c.axles[1].is_steering);
    }

    #[test]
    fn test_unknown_preset() {
        assert!(matches!(preset("hovercraft"), Err(FactoryError::UnknownPreset(n)) if n == "hovercraft"));
    }

    #[test]
    fn test_json_round_trip_with_defaults() {
        let json = r#"{
            "engine": { "max_torque": 150, "pick_rpm_min": 2000, "pick_rpm_max": 4000, "idle_rpm": 1000 },
            "gearbox": { "ratios": [3.0, 0.0, 3.5, 2.0], "main_ratio": 4.0, "shift_time": 0.2,
                         "min_rpm": 1500, "max_rpm": 4500 },
            "axles": [
                { "axle_position": 1.2, "axle_width": 1.5, "is_steering": true },
                { "axle_position": -1.2, "axle_width": 1.5, "is_driving": true }
            ],
            "mass": 800, "inertia": 700, "brake_torque": 900, "max_steer_angle": 30,
            "wheel_radius": 0.28, "wheels_friction": 0.7, "suspension_hardness": 2.0,
            "tuning": { "tire": { "slide_grip": 0.3 } }
        }"#;

        let opts = VehicleOptions::from_json_str(json).unwrap();
        assert_eq!(opts.air_friction, 0.0);
        assert_eq!(opts.tuning.tire.slide_grip, 0.3);
        assert_eq!(opts.tuning.tire.grip_point, 2.5);
        assert_eq!(opts.center_of_mass, [0.0; 3]);
        assert!(!opts.axles[0].is_driving);

        let c = opts.build().unwrap();
        assert_eq!(c.axles[1].right_wheel.mass, 200.0);
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(VehicleOptions::from_json_str("{ nope"), Err(FactoryError::Parse(_))));
    }

    #[test]
    fn test_missing_file() {
        let err = VehicleOptions::from_path("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, FactoryError::Io(_)));
    }

    #[test]
    fn test_invalid_description_is_rejected() {
        let mut opts = test_car();
        opts.wheel_radius = -0.1;
        assert!(matches!(
            opts.build(),
            Err(FactoryError::Config(ConfigError::NonPositiveWheelRadius { axle: 0, .. }))
        ));

        let mut opts = test_car();
        opts.axles.clear();
        assert!(matches!(opts.build(), Err(FactoryError::Config(ConfigError::NoAxles))));
    }
}
