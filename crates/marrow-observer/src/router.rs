//! Axum router construction for the Observer API.
//!
//! Assembles all routes (REST + `WebSocket`) into a single [`Router`]
//! with CORS middleware enabled for the game client.

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::commands;
use crate::handlers;
use crate::state::AppState;
use crate::ws;

/// Build the complete Axum router for the Observer server.
///
/// The router includes:
/// - `GET /` -- minimal HTML status page
/// - `GET /ws/ticks` -- `WebSocket` tick stream
/// - `GET /api/session` -- latest plant snapshot
/// - `GET /api/outcome` -- harvest or death
/// - `GET /api/profile` -- lives and spin availability
/// - `POST /api/session/fix-lights` -- queue a lights fix
/// - `POST /api/session/light/{source}` -- queue a light change
/// - `POST /api/session/stop` -- abandon the session
/// - `POST /api/session/search-seeds` -- one-time seed search after harvest
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Status page
        .route("/", get(handlers::index))
        // WebSocket
        .route("/ws/ticks", get(ws::ws_ticks))
        // Read API
        .route("/api/session", get(handlers::get_session))
        .route("/api/outcome", get(handlers::get_outcome))
        .route("/api/profile", get(handlers::get_profile))
        // Player commands
        .route("/api/session/fix-lights", post(commands::fix_lights))
        .route("/api/session/light/{source}", post(commands::switch_light))
        .route("/api/session/stop", post(commands::stop))
        .route("/api/session/search-seeds", post(commands::search_seeds))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
