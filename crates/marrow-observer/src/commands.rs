//! Player command endpoints.
//!
//! Commands are queued on the session's [`SessionControl`] and applied by
//! the runner before the next tick. Nothing here touches the plant
//! directly.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `POST` | `/api/session/fix-lights` | Turn failed lights back on |
//! | `POST` | `/api/session/light/{source}` | Install `candle`, `grow`, or `quantum` |
//! | `POST` | `/api/session/stop` | Abandon the session |
//! | `POST` | `/api/session/search-seeds` | Search the harvested plant for a seed |
//!
//! [`SessionControl`]: marrow_core::SessionControl

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use marrow_core::{PlayerCommand, SessionControl};
use marrow_types::{LightSource, SessionOutcome};
use tracing::info;

use crate::error::ObserverError;
use crate::state::AppState;

/// Generic success response.
#[derive(Debug, serde::Serialize)]
struct CommandResponse {
    /// Whether the command was accepted.
    ok: bool,
    /// Human-readable message.
    message: String,
}

async fn live_control(state: &AppState) -> Result<Arc<SessionControl>, ObserverError> {
    let control = state
        .control
        .clone()
        .ok_or_else(|| ObserverError::NotFound(String::from("no session is running")))?;
    if state.snapshot.read().await.outcome.is_some() || control.is_stop_requested() {
        return Err(ObserverError::Conflict(String::from(
            "the session has already ended",
        )));
    }
    Ok(control)
}

/// Queue a lights fix.
pub async fn fix_lights(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ObserverError> {
    let control = live_control(&state).await?;
    control.push_command(PlayerCommand::FixLights).await;
    Ok(Json(CommandResponse {
        ok: true,
        message: String::from("Lights fix queued for next tick"),
    }))
}

/// Queue a light source change.
pub async fn switch_light(
    State(state): State<Arc<AppState>>,
    Path(source): Path<String>,
) -> Result<impl IntoResponse, ObserverError> {
    let light = LightSource::from_slug(&source)
        .ok_or_else(|| ObserverError::BadRequest(format!("unknown light source: {source}")))?;

    let control = live_control(&state).await?;
    control.push_command(PlayerCommand::SwitchLight(light)).await;
    Ok(Json(CommandResponse {
        ok: true,
        message: format!("Switch to {} queued for next tick", light.label()),
    }))
}

/// Ask the runner to stop before its next tick.
pub async fn stop(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, ObserverError> {
    let control = live_control(&state).await?;
    control.request_stop();
    info!("Stop requested through observer");
    Ok(Json(CommandResponse {
        ok: true,
        message: String::from("Stop requested -- session will end before the next tick"),
    }))
}

/// Queue the one-time seed search. Only a harvested session can be searched,
/// and only while the engine holds the post-harvest window open.
pub async fn search_seeds(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ObserverError> {
    let control = state
        .control
        .clone()
        .ok_or_else(|| ObserverError::NotFound(String::from("no session is running")))?;
    if !matches!(
        state.snapshot.read().await.outcome,
        Some(SessionOutcome::Harvested { .. })
    ) {
        return Err(ObserverError::Conflict(String::from(
            "only a harvested plant can be searched for seeds",
        )));
    }
    control.push_command(PlayerCommand::SearchSeeds).await;
    info!("Seed search requested through observer");
    Ok(Json(CommandResponse {
        ok: true,
        message: String::from("Seed search queued"),
    }))
}
