// ==============================================================================
// state.rs — ROOM STATE SHARED BETWEEN THE TICK LOOP AND THE SOCKET TASKS
// ------------------------------------------------------------------------------
// Players own one VehicleDynamics each, cloned from a validated template.
// Structural changes (join / leave) are queued as `create` / `delete` updates;
// broadcast() appends an `update` per live player, ships the batch to every
// client and clears the queue.
// ==============================================================================

use nalgebra::Point3;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::UnboundedSender;
use uuid::Uuid;

use crate::drivetrain::Direction;
use crate::error::ConfigError;
use crate::net::ServerMessage;
use crate::telemetry::TracingObserver;
use crate::vehicle::{ChassisConfig, VehicleDynamics};

/// Spacing between consecutive spawn slots along world X (m).
pub const SPAWN_SPACING: f32 = 3.0;

pub type Vector2 = [f32; 2]; // X, Z

#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct PlayerInput {
    pub accel: f32,
    pub brake: f32,
    pub steering: f32,
    pub direction: i32,   // -1 reverse, 0 neutral, 1 forward
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UpdateAction {
    Create,
    Update,
    Delete,
}

/// Flattened, network-facing view of a player vehicle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PlayerFrame {
    pub position: Vector2,
    pub velocity: Vector2,
    pub accel: Vector2,
    pub rotation: f32,         // yaw, rad
    pub rotation_speed: f32,   // rad/s
    pub steering: f32,         // rad
    pub rpm: f32,
    pub gear: i32,
    pub speed: f32,            // km/h
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Update {
    pub action: UpdateAction,
    pub id: String,
    #[serde(flatten)]
    pub frame: Option<PlayerFrame>,
}

pub struct Player {
    pub id: String,
    pub vehicle: VehicleDynamics,
}

impl Player {
    pub fn frame(&self) -> PlayerFrame {
        let body = self.vehicle.body();
        let (p, v, a) = (body.position(), body.velocity(), body.acceleration());
        let t = self.vehicle.telemetry();

        PlayerFrame {
            position: [p.x, p.z],
            velocity: [v.x, v.z],
            accel: [a.x, a.z],
            rotation: body.yaw(),
            rotation_speed: body.angular_velocity(),
            steering: self.vehicle.steer_angle(),
            rpm: t.rpm,
            gear: t.gear,
            speed: t.speed,
        }
    }

    pub fn apply_input(&mut self, input: &PlayerInput) {
        self.vehicle.set_accel(input.accel);
        self.vehicle.set_brake(input.brake);
        self.vehicle.set_steering(input.steering);
        self.vehicle.set_direction(Direction::from_sign(input.direction));
    }
}

pub struct SharedGameState {
    pub tick: u64,
    pub clients: Vec<UnboundedSender<String>>,
    template: ChassisConfig,
    spawn_point: Vector2,
    players: Vec<Player>,
    updates: Vec<Update>,
}

impl SharedGameState {
    pub fn new(template: ChassisConfig) -> Self {
        Self {
            tick: 0,
            clients: Vec::new(),
            template,
            spawn_point: [0.0, 0.0],
            players: Vec::new(),
            updates: Vec::new(),
        }
    }

    pub fn register_client(&mut self, tx: UnboundedSender<String>) {
        self.clients.push(tx);
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn player(&self, id: &str) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    pub fn pending_updates(&self) -> &[Update] {
        &self.updates
    }

    // ---------------------------------------------------------
    // Join / leave
    // ---------------------------------------------------------
    pub fn add_player(&mut self) -> Result<String, ConfigError> {
        let id = Uuid::new_v4().to_string();
        let slot = self.players.len() as f32;
        let spawn = Point3::new(self.spawn_point[0] + SPAWN_SPACING * slot, 0.0, self.spawn_point[1]);

        let mut vehicle = VehicleDynamics::new(self.template.clone())?.with_spawn(spawn, 0.0);
        vehicle.set_observer(Box::new(TracingObserver::new(id.clone())));

        let player = Player { id: id.clone(), vehicle };
        self.updates.push(Update {
            action: UpdateAction::Create,
            id: id.clone(),
            frame: Some(player.frame()),
        });
        self.players.push(player);

        tracing::debug!(player = %id, slot, "player spawned");
        Ok(id)
    }

    pub fn remove_player(&mut self, id: &str) -> bool {
        let before = self.players.len();
        self.players.retain(|p| p.id != id);
        if self.players.len() == before {
            return false;
        }
        self.updates.push(Update { action: UpdateAction::Delete, id: id.to_string(), frame: None });
        true
    }

    pub fn apply_input(&mut self, id: &str, input: &PlayerInput) -> bool {
        match self.players.iter_mut().find(|p| p.id == id) {
            Some(p) => {
                p.apply_input(input);
                true
            }
            None => false,
        }
    }

    // ---------------------------------------------------------
    // Tick
    // ---------------------------------------------------------
    pub fn step(&mut self, dt: f32) {
        self.tick += 1;
        for p in self.players.iter_mut() {
            p.vehicle.update(dt);
        }
    }

    /// Queue an `update` for every live player and hand the batch out.
    pub fn flush_updates(&mut self) -> Vec<Update> {
        for p in &self.players {
            self.updates.push(Update {
                action: UpdateAction::Update,
                id: p.id.clone(),
                frame: Some(p.frame()),
            });
        }
        std::mem::take(&mut self.updates)
    }

    /// Send the pending batch to every client; closed channels are dropped.
    pub fn broadcast(&mut self) {
        let updates = self.flush_updates();
        let msg = ServerMessage::Updates { tick: self.tick, updates: &updates };

        let json = match serde_json::to_string(&msg) {
            Ok(json) => json,
            Err(err) => {
                tracing::error!(%err, "failed to encode update batch");
                return;
            }
        };

        let before = self.clients.len();
        self.clients.retain(|tx| tx.send(json.clone()).is_ok());
        let dropped = before - self.clients.len();
        if dropped > 0 {
            tracing::debug!(dropped, remaining = self.clients.len(), "dropped closed clients");
        }
    }
}
