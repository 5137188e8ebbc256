//! Read-only REST endpoint handlers for the Observer server.
//!
//! All handlers read from the in-memory [`GameSnapshot`] via the shared
//! [`AppState`].
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/` | Minimal HTML status page |
//! | `GET` | `/api/session` | Latest plant snapshot |
//! | `GET` | `/api/outcome` | Harvest or death, once resolved |
//! | `GET` | `/api/profile` | Lives and spin availability |
//!
//! [`GameSnapshot`]: crate::state::GameSnapshot

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::response::{Html, IntoResponse};

use crate::error::ObserverError;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// GET / -- minimal HTML status page
// ---------------------------------------------------------------------------

/// Serve a minimal HTML page showing the plant and API links.
pub async fn index(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let snapshot = state.snapshot.read().await;
    let (plant, stage, tick, health, progress) = snapshot.state.as_ref().map_or_else(
        || (String::from("none"), String::from("-"), 0, 0.0, 0.0),
        |s| {
            (
                s.plant_name.clone(),
                s.stage.to_string(),
                s.tick,
                s.health,
                s.growth_progress,
            )
        },
    );
    let status = match &snapshot.outcome {
        Some(outcome) if outcome.harvest().is_some() => "HARVESTED",
        Some(_) => "DIED",
        None if snapshot.state.is_some() => "GROWING",
        None => "IDLE",
    };
    let lives = snapshot
        .profile
        .as_ref()
        .map_or_else(|| String::from("-"), |p| p.lives.to_string());

    Html(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <title>Marrow Grow Observer</title>
    <style>
        body {{
            background: #0b0f0a;
            color: #d4e4c8;
            font-family: 'Fira Code', 'Consolas', monospace;
            padding: 2rem;
            max-width: 800px;
            margin: 0 auto;
        }}
        h1 {{ color: #8fd16a; margin-bottom: 0.25rem; }}
        .metric {{
            display: inline-block;
            background: #141a12;
            border: 1px solid #2c3a27;
            border-radius: 6px;
            padding: 1rem 1.5rem;
            margin: 0.5rem 0.5rem 0.5rem 0;
            min-width: 120px;
        }}
        .metric .label {{ color: #8a9a80; font-size: 0.85rem; }}
        .metric .value {{ color: #8fd16a; font-size: 1.5rem; font-weight: bold; }}
        a {{ color: #8fd16a; text-decoration: none; }}
        ul {{ list-style: none; padding: 0; }}
        li {{ padding: 0.3rem 0; }}
    </style>
</head>
<body>
    <h1>Marrow Grow Observer</h1>
    <p>Status: <strong>{status}</strong></p>
    <div>
        <div class="metric"><div class="label">Plant</div><div class="value">{plant}</div></div>
        <div class="metric"><div class="label">Stage</div><div class="value">{stage}</div></div>
        <div class="metric"><div class="label">Tick</div><div class="value">{tick}</div></div>
        <div class="metric"><div class="label">Health</div><div class="value">{health:.0}</div></div>
        <div class="metric"><div class="label">Growth</div><div class="value">{progress:.0}%</div></div>
        <div class="metric"><div class="label">Lives</div><div class="value">{lives}</div></div>
    </div>
    <ul>
        <li>GET <a href="/api/session">/api/session</a></li>
        <li>GET <a href="/api/outcome">/api/outcome</a></li>
        <li>GET <a href="/api/profile">/api/profile</a></li>
        <li>WS /ws/ticks</li>
    </ul>
</body>
</html>"#
    ))
}

// ---------------------------------------------------------------------------
// GET /api/session
// ---------------------------------------------------------------------------

/// Return the latest plant snapshot.
pub async fn get_session(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ObserverError> {
    let snapshot = state.snapshot.read().await;
    let plant = snapshot
        .state
        .as_ref()
        .ok_or_else(|| ObserverError::NotFound(String::from("no session has started")))?;

    Ok(Json(serde_json::json!({
        "session_id": snapshot.session_id,
        "state": plant,
        "finished": snapshot.outcome.is_some(),
    })))
}

// ---------------------------------------------------------------------------
// GET /api/outcome
// ---------------------------------------------------------------------------

/// Return how the session ended.
pub async fn get_outcome(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ObserverError> {
    let snapshot = state.snapshot.read().await;
    let outcome = snapshot
        .outcome
        .clone()
        .ok_or_else(|| ObserverError::NotFound(String::from("session has not ended")))?;
    Ok(Json(outcome))
}

// ---------------------------------------------------------------------------
// GET /api/profile
// ---------------------------------------------------------------------------

/// Return the player's lives and spin availability.
pub async fn get_profile(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ObserverError> {
    let snapshot = state.snapshot.read().await;
    let profile = snapshot
        .profile
        .clone()
        .ok_or_else(|| ObserverError::NotFound(String::from("profile not loaded")))?;
    Ok(Json(profile))
}
