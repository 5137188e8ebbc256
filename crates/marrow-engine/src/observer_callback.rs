//! Tick callback that feeds the Observer API.
//!
//! After each tick this callback broadcasts a [`TickBroadcast`] to every
//! connected `WebSocket` client and replaces the plant in the shared
//! [`GameSnapshot`]. When a handler holds the snapshot lock the write is
//! handed to a spawned task instead of being dropped.

use std::sync::Arc;

use marrow_core::{TickCallback, TickSummary};
use marrow_observer::{AppState, GameSnapshot, TickBroadcast};
use marrow_types::{LiveGameState, SessionId, SessionOutcome};
use tokio::runtime::Handle;
use tracing::{debug, warn};

/// Callback that bridges the session loop to the Observer API.
pub struct ObserverCallback {
    state: Arc<AppState>,
    session_id: SessionId,
}

impl ObserverCallback {
    /// Create a callback publishing ticks of `session_id` into `state`.
    pub const fn new(state: Arc<AppState>, session_id: SessionId) -> Self {
        Self { state, session_id }
    }

    fn publish(&self, plant: &LiveGameState, outcome: Option<&SessionOutcome>) {
        if let Ok(mut snap) = self.state.snapshot.try_write() {
            apply(&mut snap, self.session_id, plant.clone(), outcome.cloned());
            return;
        }

        let Ok(handle) = Handle::try_current() else {
            warn!(tick = plant.tick, "Snapshot busy and no runtime to defer the write");
            return;
        };
        debug!(tick = plant.tick, "Snapshot busy, deferring write");
        let shared = Arc::clone(&self.state);
        let session_id = self.session_id;
        let plant = plant.clone();
        let outcome = outcome.cloned();
        handle.spawn(async move {
            let mut snap = shared.snapshot.write().await;
            apply(&mut snap, session_id, plant, outcome);
        });
    }
}

/// Write a plant into the snapshot unless a newer one is already there.
///
/// A write for the same tick only lands when it carries the first outcome,
/// so a late tick write never replaces the engine's final snapshot.
fn apply(
    snap: &mut GameSnapshot,
    session_id: SessionId,
    plant: LiveGameState,
    outcome: Option<SessionOutcome>,
) {
    let newer = snap.state.as_ref().is_none_or(|current| {
        current.tick < plant.tick
            || (current.tick == plant.tick && snap.outcome.is_none() && outcome.is_some())
    });
    if !newer {
        debug!(tick = plant.tick, "Stale snapshot write dropped");
        return;
    }
    snap.session_id = Some(session_id);
    snap.state = Some(plant);
    if outcome.is_some() {
        snap.outcome = outcome;
    }
}

impl TickCallback for ObserverCallback {
    fn on_tick(&mut self, summary: &TickSummary, state: &LiveGameState) {
        let message = TickBroadcast::from_state(self.session_id, state, summary.outcome.clone());
        let receivers = self.state.broadcast(&message);
        debug!(tick = summary.tick, receivers, "Tick broadcast sent");
        self.publish(state, None);
    }

    fn on_end(&mut self, outcome: &SessionOutcome, state: &LiveGameState) {
        self.publish(state, Some(outcome));
    }
}
