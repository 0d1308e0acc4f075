//! Construction-time errors. The step function itself never fails.

use thiserror::Error;

use crate::tire::WheelSide;

/// A chassis description that cannot be simulated.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("chassis mass must be positive, got {0}")]
    NonPositiveMass(f32),

    #[error("chassis inertia must be positive, got {0}")]
    NonPositiveInertia(f32),

    #[error("chassis has no axles")]
    NoAxles,

    #[error("chassis has no driven axle")]
    NoDrivenAxle,

    #[error("axle {axle} {side} wheel: radius must be positive, got {radius}")]
    NonPositiveWheelRadius { axle: usize, side: WheelSide, radius: f32 },

    #[error("axle {axle} {side} wheel: mass must be positive, got {mass}")]
    NonPositiveWheelMass { axle: usize, side: WheelSide, mass: f32 },

    #[error("axle {axle} {side} wheel: friction must not be negative, got {friction}")]
    NegativeFriction { axle: usize, side: WheelSide, friction: f32 },

    #[error("gear table needs reverse, neutral and at least one forward ratio, got {0} entries")]
    GearTableTooShort(usize),

    #[error("main ratio must be positive, got {0}")]
    NonPositiveMainRatio(f32),

    #[error("torque plateau {min}..{max} rpm is invalid")]
    InvalidTorquePlateau { min: f32, max: f32 },

    #[error("shift rpm window {min}..{max} is invalid")]
    InvalidShiftWindow { min: f32, max: f32 },

    #[error("{field} must not be negative, got {value}")]
    Negative { field: &'static str, value: f32 },

    #[error("{field} must be positive, got {value}")]
    NonPositive { field: &'static str, value: f32 },

    #[error("suspension hardness must be positive, got {0}")]
    NonPositiveSuspensionHardness(f32),
}

/// Failure to assemble a chassis from a named preset or a description file.
#[derive(Debug, Error)]
pub enum FactoryError {
    #[error("unknown vehicle preset `{0}`")]
    UnknownPreset(String),

    #[error("failed to read vehicle description")]
    Io(#[from] std::io::Error),

    #[error("malformed vehicle description")]
    Parse(#[from] serde_json::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),
}
