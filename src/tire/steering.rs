// ==============================================================================
// steering.rs — SPEED-SENSITIVE STEERING RATE LIMITER
// ==============================================================================
// The steering angle chases `input * max_steer_angle`:
//
//   heaviness = min(max_heaviness, (speed / reference_speed)²)
//   rate      = base_rate / (1 + heaviness)
//   angle    += (target - angle) * min(1, rate * dt)
//   angle     = clamp(angle, -max, max)
//
// Heaviness grows quadratically with speed and saturates, so the wheel turns
// fastest (base_rate) at standstill and is progressively heavier at speed.
// ==============================================================================

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SteeringConfig {
    pub base_rate: f32,        // 1/s at standstill
    pub reference_speed: f32,  // m/s where heaviness reaches 1
    pub max_heaviness: f32,
}

impl Default for SteeringConfig {
    fn default() -> Self {
        Self {
            base_rate: 5.0,
            reference_speed: 10.0,
            max_heaviness: 4.0,
        }
    }
}

/// Blend rate (1/s) at a given vehicle speed.
pub fn steering_rate(cfg: &SteeringConfig, speed: f32) -> f32 {
    let heaviness = (speed / cfg.reference_speed).powi(2).min(cfg.max_heaviness);
    cfg.base_rate / (1.0 + heaviness)
}

/// One step of the rate limiter. Returns the new steering angle (radians).
pub fn update_steering_angle(
    cfg: &SteeringConfig,
    current: f32,
    input: f32,          // -1..1
    max_angle: f32,      // rad
    speed: f32,          // m/s
    dt: f32,
) -> f32 {
    let target = input.clamp(-1.0, 1.0) * max_angle;
    let blend = (steering_rate(cfg, speed) * dt.max(0.0)).min(1.0);

    (current + (target - current) * blend).clamp(-max_angle, max_angle)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MAX: f32 = 0.61;

    #[test]
    fn test_rate_drops_with_speed_and_saturates() {
        let cfg = SteeringConfig::default();
        let r0 = steering_rate(&cfg, 0.0);
        let r10 = steering_rate(&cfg, 10.0);
        let r40 = steering_rate(&cfg, 40.0);
        let r80 = steering_rate(&cfg, 80.0);
        assert_eq!(r0, cfg.base_rate);
        assert!(r10 < r0);
        assert!(r40 < r10);
        assert_eq!(r40, r80);
    }

    #[test]
    fn test_never_exceeds_max_angle() {
        let cfg = SteeringConfig::default();
        let mut angle = 0.0;
        for i in 0..500 {
            let input = if i % 50 < 25 { 3.0 } else { -3.0 };
            angle = update_steering_angle(&cfg, angle, input, MAX, 0.0, 0.5);
            assert!(angle.abs() <= MAX);
        }
    }

    #[test]
    fn test_slower_at_speed() {
        let cfg = SteeringConfig::default();
        let mut still = 0.0;
        let mut fast = 0.0;
        for _ in 0..10 {
            still = update_steering_angle(&cfg, still, 1.0, MAX, 0.0, 1.0 / 60.0);
            fast = update_steering_angle(&cfg, fast, 1.0, MAX, 15.0, 1.0 / 60.0);
        }
        assert!(fast < still);
        assert!(still <= MAX);
    }

    #[test]
    fn test_zero_dt_holds_angle() {
        let cfg = SteeringConfig::default();
        assert_eq!(update_steering_angle(&cfg, 0.2, -1.0, MAX, 5.0, 0.0), 0.2);
    }
}
