//! Shared application state for the Observer API server.
//!
//! [`AppState`] holds the broadcast channel for tick messages and the
//! latest [`GameSnapshot`]. The engine replaces the snapshot after every
//! tick; handlers only ever read whole snapshots.

use std::sync::Arc;

use marrow_core::SessionControl;
use marrow_types::{
    LiveGameState, PlantEvent, ProfileSnapshot, SessionId, SessionOutcome, Stage,
};
use tokio::sync::{RwLock, broadcast};

/// Capacity of the broadcast channel for tick messages.
///
/// A subscriber that falls further behind receives
/// [`broadcast::error::RecvError::Lagged`] and skips to the newest message.
const BROADCAST_CAPACITY: usize = 256;

/// JSON-serializable tick message pushed over the `WebSocket`.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TickBroadcast {
    /// Session the tick belongs to.
    pub session_id: SessionId,
    /// Tick number.
    pub tick: u64,
    /// Stage after the tick.
    pub stage: Stage,
    /// Health after the tick.
    pub health: f64,
    /// Growth progress after the tick.
    pub growth_progress: f64,
    /// Whether the lights are out.
    pub lights_out: bool,
    /// Newest event on the feed.
    pub latest_event: Option<PlantEvent>,
    /// Set on the tick that ended the session.
    pub outcome: Option<SessionOutcome>,
}

impl TickBroadcast {
    /// Project a plant into a tick message.
    pub fn from_state(
        session_id: SessionId,
        state: &LiveGameState,
        outcome: Option<SessionOutcome>,
    ) -> Self {
        Self {
            session_id,
            tick: state.tick,
            stage: state.stage,
            health: state.health,
            growth_progress: state.growth_progress,
            lights_out: state.lights_out,
            latest_event: state.events.first().cloned(),
            outcome,
        }
    }
}

/// The latest view of the game served by the REST endpoints.
#[derive(Debug, Clone, Default)]
pub struct GameSnapshot {
    /// Session currently shown, if one was started.
    pub session_id: Option<SessionId>,
    /// Latest committed plant.
    pub state: Option<LiveGameState>,
    /// How the session ended, once it has.
    pub outcome: Option<SessionOutcome>,
    /// Player's lives and spin availability.
    pub profile: Option<ProfileSnapshot>,
}

/// Shared state for the Axum application.
///
/// Wrapped in [`Arc`] and injected via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    /// Broadcast sender for tick messages.
    pub tx: broadcast::Sender<TickBroadcast>,
    /// The latest game snapshot.
    pub snapshot: Arc<RwLock<GameSnapshot>>,
    /// Control handle of the running session, when there is one.
    pub control: Option<Arc<SessionControl>>,
}

impl AppState {
    /// Create a new application state with an empty snapshot.
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(BROADCAST_CAPACITY);
        Self {
            tx,
            snapshot: Arc::new(RwLock::new(GameSnapshot::default())),
            control: None,
        }
    }

    /// Create a new application state wired to a session's control handle.
    pub fn with_control(control: Arc<SessionControl>) -> Self {
        Self {
            control: Some(control),
            ..Self::new()
        }
    }

    /// Subscribe to the tick broadcast channel.
    pub fn subscribe(&self) -> broadcast::Receiver<TickBroadcast> {
        self.tx.subscribe()
    }

    /// Publish a tick message to all connected clients.
    ///
    /// Returns the number of receivers. Zero is normal when no client is
    /// connected.
    pub fn broadcast(&self, message: &TickBroadcast) -> usize {
        self.tx.send(message.clone()).unwrap_or(0)
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
