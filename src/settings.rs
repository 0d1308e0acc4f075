// ==============================================================================
// settings.rs — HOST CONFIGURATION (CLI FLAGS + RALLY_* ENVIRONMENT)
// ==============================================================================

use std::path::PathBuf;

use clap::Parser;

use crate::error::FactoryError;
use crate::factory::{self, VehicleOptions};
use crate::vehicle::ChassisConfig;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about = "Authoritative vehicle dynamics room server")]
pub struct ServerSettings {
    /// Websocket listen address.
    #[arg(long, env = "RALLY_BIND", default_value = "0.0.0.0:9001")]
    pub bind: String,

    /// Simulation steps per second.
    #[arg(long, env = "RALLY_TICK_HZ", default_value_t = 60, value_parser = clap::value_parser!(u32).range(1..))]
    pub tick_hz: u32,

    /// Snapshot broadcasts per second (at most tick_hz).
    #[arg(long, env = "RALLY_BROADCAST_HZ", default_value_t = 20, value_parser = clap::value_parser!(u32).range(1..))]
    pub broadcast_hz: u32,

    /// Built-in vehicle used for every player.
    #[arg(long, env = "RALLY_PRESET", default_value = "test-car")]
    pub preset: String,

    /// JSON vehicle description; overrides --preset.
    #[arg(long, env = "RALLY_VEHICLE_FILE")]
    pub vehicle_file: Option<PathBuf>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:9001".into(),
            tick_hz: 60,
            broadcast_hz: 20,
            preset: "test-car".into(),
            vehicle_file: None,
        }
    }
}

impl ServerSettings {
    pub fn dt(&self) -> f32 {
        1.0 / self.tick_hz.max(1) as f32
    }

    /// Simulation ticks between two broadcasts.
    pub fn broadcast_every(&self) -> u64 {
        let hz = self.broadcast_hz.clamp(1, self.tick_hz.max(1));
        (self.tick_hz.max(1) / hz).max(1) as u64
    }

    pub fn vehicle_options(&self) -> Result<VehicleOptions, FactoryError> {
        match &self.vehicle_file {
            Some(path) => VehicleOptions::from_path(path),
            None => factory::preset(&self.preset),
        }
    }

    /// Template chassis every player vehicle is cloned from.
    pub fn chassis(&self) -> Result<ChassisConfig, FactoryError> {
        self.vehicle_options()?.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_parser() {
        let parsed = ServerSettings::try_parse_from(["rally-server"]).unwrap();
        let d = ServerSettings::default();
        assert_eq!(parsed.tick_hz, d.tick_hz);
        assert_eq!(parsed.broadcast_hz, d.broadcast_hz);
        assert_eq!(parsed.preset, d.preset);
    }

    #[test]
    fn test_flags() {
        let s = ServerSettings::try_parse_from([
            "rally-server", "--bind", "127.0.0.1:7000", "--tick-hz", "120", "--broadcast-hz", "30", "--preset", "truck",
        ])
        .unwrap();
        assert_eq!(s.bind, "127.0.0.1:7000");
        assert_eq!(s.broadcast_every(), 4);
        assert!((s.dt() - 1.0 / 120.0).abs() < 1e-9);
        assert!(s.chassis().is_ok());
    }

    #[test]
    fn test_zero_rate_rejected() {
        assert!(ServerSettings::try_parse_from(["rally-server", "--tick-hz", "0"]).is_err());
    }

    #[test]
    fn test_broadcast_never_faster_than_tick() {
        let s = ServerSettings { tick_hz: 30, broadcast_hz: 90, ..Default::default() };
        assert_eq!(s.broadcast_every(), 1);
    }

    #[test]
    fn test_unknown_preset() {
        let s = ServerSettings { preset: "blimp".into(), ..Default::default() };
        assert!(matches!(s.chassis(), Err(FactoryError::UnknownPreset(_))));
    }
}
