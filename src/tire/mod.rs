//! tire - per-wheel force model (pure functions over wheel state + chassis body)

pub mod types;
pub mod kinematics;
pub mod longitudinal;
pub mod lateral;
pub mod spin;
pub mod steering;
pub mod solve;

pub use types::*;
pub use solve::solve_wheel;
