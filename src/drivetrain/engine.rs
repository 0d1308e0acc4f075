// ==============================================================================
// engine.rs — PIECEWISE-LINEAR TORQUE CURVE
// ------------------------------------------------------------------------------
//            max ┤     ┌───────────┐
//                │    /             \
//                │   /               \
//              0 ┼──┴─────┴─────────┴──\── rpm
//                0  pick_min    pick_max
//
// Rise and fall share the slope max_torque / pick_rpm_min. Past the fall-off
// the curve is floored at zero.
// ==============================================================================

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    pub max_torque: f32,     // N*m
    pub pick_rpm_min: f32,   // start of the torque plateau
    pub pick_rpm_max: f32,   // end of the torque plateau
    pub idle_rpm: f32,
}

impl EngineConfig {
    #[inline]
    fn slope(&self) -> f32 {
        self.max_torque / self.pick_rpm_min
    }

    pub fn torque_at(&self, rpm: f32) -> f32 {
        let torque = if rpm <= self.pick_rpm_min {
            rpm * self.slope()
        } else if rpm >= self.pick_rpm_max {
            self.max_torque - (rpm - self.pick_rpm_max) * self.slope()
        } else {
            self.max_torque
        };
        torque.max(0.0)
    }
}
