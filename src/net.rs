// ==============================================================================
// net.rs — WEBSOCKET FRONT DOOR
// ------------------------------------------------------------------------------
// One task per connection:
//   1) register an outgoing channel with the room (send loop in its own task)
//   2) spawn a player vehicle, greet the client with its id
//   3) route `input` messages through the clamping setters, answer `ping`
//   4) on disconnect remove the player
// ==============================================================================

use std::net::SocketAddr;
use std::sync::Arc;

use futures::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, Mutex};
use tokio_tungstenite::{accept_async, tungstenite::Message};

use crate::state::{PlayerInput, SharedGameState, Update};

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ClientMessage {
    Input(PlayerInput),
    Ping,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ServerMessage<'a> {
    Welcome { player_id: &'a str },
    Pong,
    Updates { tick: u64, updates: &'a [Update] },
}

impl ServerMessage<'_> {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

pub async fn start_websocket_server(listener: TcpListener, state: Arc<Mutex<SharedGameState>>) {
    loop {
        let (raw, peer) = match listener.accept().await {
            Ok(conn) => conn,
            Err(err) => {
                tracing::warn!(%err, "accept failed");
                continue;
            }
        };

        let state = Arc::clone(&state);
        tokio::spawn(async move {
            if let Err(err) = handle_connection(raw, peer, state).await {
                tracing::warn!(%peer, error = %err, "connection closed with error");
            }
        });
    }
}

async fn handle_connection(
    raw: TcpStream,
    peer: SocketAddr,
    state: Arc<Mutex<SharedGameState>>,
) -> anyhow::Result<()> {
    let ws = accept_async(raw).await?;
    let (mut write, mut read) = ws.split();

    // -------------------------------
    // 1) Outgoing channel + send loop
    // -------------------------------
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();
    state.lock().await.register_client(tx.clone());

    tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if write.send(Message::Text(msg)).await.is_err() {
                break;
            }
        }
    });

    // -------------------------------
    // 2) Player vehicle
    // -------------------------------
    let player_id = state.lock().await.add_player()?;
    tracing::info!(%peer, player = %player_id, "player connected");

    let _ = tx.send(ServerMessage::Welcome { player_id: &player_id }.to_json()?);

    // -------------------------------
    // 3) Receive loop
    // -------------------------------
    while let Some(msg) = read.next().await {
        let msg = match msg {
            Ok(m) => m,
            Err(err) => {
                tracing::debug!(player = %player_id, %err, "read failed");
                break;
            }
        };

        let text = match msg {
            Message::Text(text) => text,
            Message::Close(_) => break,
            _ => continue,
        };

        match serde_json::from_str::<ClientMessage>(&text) {
            Ok(ClientMessage::Input(input)) => {
                state.lock().await.apply_input(&player_id, &input);
            }
            Ok(ClientMessage::Ping) => {
                let _ = tx.send(ServerMessage::Pong.to_json()?);
            }
            Err(err) => {
                tracing::debug!(player = %player_id, %err, "ignoring malformed message");
            }
        }
    }

    // -------------------------------
    // 4) Cleanup
    // -------------------------------
    state.lock().await.remove_player(&player_id);
    tracing::info!(%peer, player = %player_id, "player disconnected");
    Ok(())
}
