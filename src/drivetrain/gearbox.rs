// ==============================================================================
// gearbox.rs — GEAR TABLE + TIMED SHIFT STATE MACHINE
// ==============================================================================
// Gear indices: -1 reverse, 0 neutral, 1.. forward. The ratio table is indexed
// by gear + 1, so `ratios[0]` is reverse and `ratios[1]` neutral.
//
// States:
//   Neutral   direction = neutral, gear forced to 0
//   Reverse   direction = reverse, gear forced to -1
//   Engaged   forward gear, watching RPM
//   Shifting  timed transition to `pending_gear`; output cut to neutral
//
// Transitions:
//   forward while gear <= 0            -> gear 1, no delay
//   Engaged, rpm > max_rpm, not top    -> Shifting(gear + 1)
//   Engaged, rpm < min_rpm, gear > 1   -> Shifting(gear - 1)
//   Shifting, elapsed >= shift_time    -> Engaged(pending)
//
// Only one shift can be pending; RPM is ignored until it commits.
// ==============================================================================

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GearboxConfig {
    pub ratios: Vec<f32>,   // [reverse, neutral, 1st, 2nd, ...]
    pub main_ratio: f32,    // final drive
    pub shift_time: f32,    // s
    pub min_rpm: f32,       // downshift below
    pub max_rpm: f32,       // upshift above
}

impl GearboxConfig {
    pub fn top_gear(&self) -> i32 {
        self.ratios.len() as i32 - 2
    }

    /// Signed ratio of a gear; reverse is always negative.
    pub fn ratio(&self, gear: i32) -> f32 {
        let idx = (gear.clamp(-1, self.top_gear()) + 1) as usize;
        let r = self.ratios.get(idx).copied().unwrap_or(0.0);
        if gear < 0 { -r.abs() } else { r }
    }
}

// ============================================
// Direction selector
// ============================================

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Reverse,
    #[default]
    Neutral,
    Forward,
}

impl Direction {
    /// Maps any integer onto the selector by sign.
    pub fn from_sign(v: i32) -> Self {
        match v.signum() {
            -1 => Direction::Reverse,
            1 => Direction::Forward,
            _ => Direction::Neutral,
        }
    }

    pub fn as_sign(&self) -> i32 {
        match self {
            Direction::Reverse => -1,
            Direction::Neutral => 0,
            Direction::Forward => 1,
        }
    }
}

// ============================================
// Shift state machine
// ============================================

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GearboxPhase {
    Neutral,
    Reverse,
    Shifting,
    Engaged,
}

impl fmt::Display for GearboxPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            GearboxPhase::Neutral => "neutral",
            GearboxPhase::Reverse => "reverse",
            GearboxPhase::Shifting => "shifting",
            GearboxPhase::Engaged => "engaged",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Gearbox {
    current_gear: i32,
    pending_gear: i32,
    shift_elapsed: f32,
    is_shifting: bool,
}

impl Default for Gearbox {
    fn default() -> Self {
        Self {
            current_gear: 0,
            pending_gear: 0,
            shift_elapsed: 0.0,
            is_shifting: false,
        }
    }
}

impl Gearbox {
    pub fn current_gear(&self) -> i32 { self.current_gear }
    pub fn pending_gear(&self) -> i32 { self.pending_gear }
    pub fn shift_elapsed(&self) -> f32 { self.shift_elapsed }
    pub fn is_shifting(&self) -> bool { self.is_shifting }

    /// Gear the engine is actually coupled to: neutral while a shift runs.
    pub fn effective_gear(&self) -> i32 {
        if self.is_shifting { 0 } else { self.current_gear }
    }

    pub fn phase(&self) -> GearboxPhase {
        match self.current_gear {
            _ if self.is_shifting => GearboxPhase::Shifting,
            g if g < 0 => GearboxPhase::Reverse,
            0 => GearboxPhase::Neutral,
            _ => GearboxPhase::Engaged,
        }
    }

    fn hold(&mut self, gear: i32) {
        self.current_gear = gear;
        self.pending_gear = gear;
        self.shift_elapsed = 0.0;
        self.is_shifting = false;
    }

    fn begin_shift(&mut self, to: i32) {
        self.pending_gear = to;
        self.shift_elapsed = 0.0;
        self.is_shifting = true;
    }

    pub fn update(&mut self, cfg: &GearboxConfig, direction: Direction, rpm: f32, dt: f32) {
        match direction {
            Direction::Neutral => return self.hold(0),
            Direction::Reverse => return self.hold(-1),
            Direction::Forward => {}
        }

        if self.current_gear <= 0 {
            self.hold(1);
        }

        if self.is_shifting {
            self.shift_elapsed += dt.max(0.0);
            if self.shift_elapsed >= cfg.shift_time {
                self.current_gear = self.pending_gear;
                self.shift_elapsed = 0.0;
                self.is_shifting = false;
            }
            return;
        }

        if rpm > cfg.max_rpm && self.current_gear < cfg.top_gear() {
            self.begin_shift(self.current_gear + 1);
        } else if rpm < cfg.min_rpm && self.current_gear > 1 {
            self.begin_shift(self.current_gear - 1);
        }
    }
}
