//! `WebSocket` tick stream.
//!
//! Clients connect to `GET /ws/ticks`. A client that joins mid-session
//! first receives the current plant, then one [`TickBroadcast`] per tick.
//! The stream closes after the message that carries the session outcome.
//! Lagging clients skip ahead to the newest tick.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, warn};

use crate::state::{AppState, TickBroadcast};

/// Upgrade to a `WebSocket` and stream ticks.
pub async fn ws_ticks(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| stream_ticks(socket, state))
}

/// What to do after a frame was offered to the client.
enum Delivery {
    Continue,
    Finished,
    Disconnected,
}

async fn deliver(socket: &mut WebSocket, tick: &TickBroadcast) -> Delivery {
    match serde_json::to_string(tick) {
        Ok(json) => {
            if socket.send(Message::Text(json.into())).await.is_err() {
                return Delivery::Disconnected;
            }
        }
        Err(e) => warn!(tick = tick.tick, "Failed to serialize tick broadcast: {e}"),
    }
    if tick.outcome.is_some() {
        Delivery::Finished
    } else {
        Delivery::Continue
    }
}

/// The latest committed plant, if a session has started.
async fn current_tick(state: &AppState) -> Option<TickBroadcast> {
    let snapshot = state.snapshot.read().await;
    let session_id = snapshot.session_id?;
    let plant = snapshot.state.as_ref()?;
    Some(TickBroadcast::from_state(
        session_id,
        plant,
        snapshot.outcome.clone(),
    ))
}

async fn stream_ticks(mut socket: WebSocket, state: Arc<AppState>) {
    // Subscribe before reading the snapshot so no tick falls in between.
    let mut rx = state.subscribe();
    debug!("WebSocket client connected");

    if let Some(tick) = current_tick(&state).await {
        match deliver(&mut socket, &tick).await {
            Delivery::Continue => {}
            Delivery::Finished => return close(&mut socket).await,
            Delivery::Disconnected => return,
        }
    }

    loop {
        tokio::select! {
            result = rx.recv() => match result {
                Ok(tick) => match deliver(&mut socket, &tick).await {
                    Delivery::Continue => {}
                    Delivery::Finished => return close(&mut socket).await,
                    Delivery::Disconnected => {
                        debug!("WebSocket client disconnected (send failed)");
                        return;
                    }
                },
                Err(RecvError::Lagged(n)) => {
                    debug!(skipped = n, "WebSocket client lagged, skipping ahead");
                }
                Err(RecvError::Closed) => return close(&mut socket).await,
            },
            msg = socket.recv() => match msg {
                Some(Ok(Message::Close(_)) | Err(_)) | None => {
                    debug!("WebSocket client disconnected");
                    return;
                }
                Some(Ok(Message::Ping(data))) => {
                    if socket.send(Message::Pong(data)).await.is_err() {
                        return;
                    }
                }
                // Clients only listen.
                Some(Ok(_)) => {}
            },
        }
    }
}

async fn close(socket: &mut WebSocket) {
    debug!("Tick stream finished, closing WebSocket");
    if let Err(e) = socket.send(Message::Close(None)).await {
        debug!("WebSocket close failed: {e}");
    }
}
