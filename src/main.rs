use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use tokio::time::{interval, Duration};

use rally_physics::net::start_websocket_server;
use rally_physics::settings::ServerSettings;
use rally_physics::state::SharedGameState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rally_physics=info,rally_server=info".into()),
        )
        .init();

    let settings = ServerSettings::parse();

    // Every player vehicle is cloned from this; reject a bad description up front.
    let template = settings.chassis().context("invalid vehicle description")?;
    tracing::info!(
        preset = %settings.preset,
        file = ?settings.vehicle_file,
        axles = template.axles.len(),
        driven_wheels = template.driven_wheel_count(),
        "vehicle template loaded"
    );

    let state = Arc::new(Mutex::new(SharedGameState::new(template)));

    let listener = TcpListener::bind(&settings.bind)
        .await
        .with_context(|| format!("failed to bind {}", settings.bind))?;
    tracing::info!(addr = %settings.bind, "websocket listening");

    tokio::spawn(start_websocket_server(listener, Arc::clone(&state)));

    // Fixed timestep
    let dt = settings.dt();
    let broadcast_every = settings.broadcast_every();
    let mut ticker = interval(Duration::from_secs_f32(dt));
    tracing::info!(tick_hz = settings.tick_hz, broadcast_every, "simulation running");

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let mut game = state.lock().await;
                game.step(dt);
                if game.tick % broadcast_every == 0 {
                    game.broadcast();
                }
            }
            res = tokio::signal::ctrl_c() => {
                res.context("failed to listen for shutdown signal")?;
                tracing::info!("shutting down");
                return Ok(());
            }
        }
    }
}
