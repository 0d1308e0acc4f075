// ==============================================================================
// body_tilt.rs — COSMETIC PITCH / ROLL FILTER
// ------------------------------------------------------------------------------
// Lean is driven by body-frame acceleration and pulled back by a term that
// grows with the square of the current lean:
//
//   pitch -= a_fwd  / reference_accel / hardness * dt
//   roll  += a_side / reference_accel / hardness * dt
//   x     -= sign(x) * (x * hardness * recovery_gain)² * dt     (x = pitch, roll)
//
// Each stage is clamped to ±max_tilt. Output is presentation-only and never
// feeds back into the rigid body.
// ==============================================================================

use serde::{Deserialize, Serialize};

use crate::physics::sign;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TiltConfig {
    pub max_tilt: f32,          // rad
    pub reference_accel: f32,   // m/s²
    pub recovery_gain: f32,
}

impl Default for TiltConfig {
    fn default() -> Self {
        Self {
            max_tilt: 0.2,
            reference_accel: 3.0,
            recovery_gain: 5.0,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct BodyTilt {
    pub pitch: f32,   // rad, nose down positive under braking
    pub roll: f32,    // rad
}

impl BodyTilt {
    /// `accel_forward` / `accel_side` are the chassis acceleration projected
    /// on the body's +Z / +X axes.
    pub fn update(
        &mut self,
        cfg: &TiltConfig,
        accel_forward: f32,
        accel_side: f32,
        hardness: f32,
        dt: f32,
    ) {
        let max = cfg.max_tilt;

        self.pitch = (self.pitch - accel_forward / cfg.reference_accel / hardness * dt).clamp(-max, max);
        self.roll = (self.roll + accel_side / cfg.reference_accel / hardness * dt).clamp(-max, max);

        self.pitch = Self::recover(cfg, self.pitch, hardness, dt);
        self.roll = Self::recover(cfg, self.roll, hardness, dt);
    }

    fn recover(cfg: &TiltConfig, x: f32, hardness: f32, dt: f32) -> f32 {
        let pull = (x * hardness * cfg.recovery_gain).powi(2);
        (x - sign(x) * pull * dt).clamp(-cfg.max_tilt, cfg.max_tilt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_at_rest_stays_level() {
        let cfg = TiltConfig::default();
        let mut t = BodyTilt::default();
        for _ in 0..60 {
            t.update(&cfg, 0.0, 0.0, 2.2, 1.0 / 60.0);
        }
        assert_eq!(t, BodyTilt::default());
    }

    #[test]
    fn test_acceleration_pitches_back_and_clamps() {
        let cfg = TiltConfig::default();
        let mut t = BodyTilt::default();
        t.update(&cfg, 6.0, 0.0, 2.2, 1.0 / 60.0);
        assert!(t.pitch < 0.0);

        for _ in 0..1000 {
            t.update(&cfg, 500.0, -500.0, 0.5, 1.0 / 60.0);
            assert!(t.pitch.abs() <= cfg.max_tilt);
            assert!(t.roll.abs() <= cfg.max_tilt);
        }
    }

    #[test]
    fn test_settles_back_towards_zero() {
        let cfg = TiltConfig::default();
        let mut t = BodyTilt { pitch: 0.15, roll: -0.1 };
        for _ in 0..600 {
            t.update(&cfg, 0.0, 0.0, 2.2, 1.0 / 60.0);
        }
        assert!(t.pitch.abs() < 0.05);
        assert!(t.roll.abs() < 0.05);
    }
}
