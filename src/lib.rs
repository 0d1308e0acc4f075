//! Single-body vehicle dynamics: chassis rigid body, per-wheel tire forces,
//! engine / gearbox drivetrain and cosmetic body tilt, stepped once per frame
//! by an external clock. The `settings` / `state` / `net` modules host many
//! vehicles behind a websocket room server.

pub mod body_tilt;
pub mod drivetrain;
pub mod error;
pub mod factory;
pub mod net;
pub mod physics;
pub mod settings;
pub mod state;
pub mod telemetry;
pub mod tire;
pub mod vehicle;

pub use body_tilt::{BodyTilt, TiltConfig};
pub use drivetrain::{Direction, Drivetrain, EngineConfig, GearboxConfig, PowertrainTuning};
pub use error::{ConfigError, FactoryError};
pub use factory::{preset, VehicleOptions};
pub use physics::{Force, RigidBody};
pub use telemetry::{StepObserver, StepReport, Telemetry, TracingObserver, VehicleSnapshot};
pub use tire::{TireConfig, WheelSide, WheelState};
pub use vehicle::{AxleState, ChassisConfig, Tuning, VehicleDynamics};
