//! Shared control handle for a running session.
//!
//! The tick loop and the observer API hold the same [`SessionControl`]
//! behind an [`Arc`](std::sync::Arc). The stop flag is atomic so the hot
//! path stays lock-free; player commands queue behind a tokio mutex and are
//! drained by the runner before each tick.

use std::sync::atomic::{AtomicBool, Ordering};

use marrow_types::LightSource;
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, Notify};

/// Why a session run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionEndReason {
    /// The plant reached harvest.
    Harvested,
    /// The plant died.
    Died,
    /// A stop was requested before the plant finished.
    Abandoned,
}

/// A player action queued for the next tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", content = "light", rename_all = "snake_case")]
pub enum PlayerCommand {
    /// Turn failed lights back on.
    FixLights,
    /// Install a different light.
    SwitchLight(LightSource),
    /// Search the harvested plant for a seed.
    SearchSeeds,
}

/// Shared session control state.
#[derive(Debug)]
pub struct SessionControl {
    /// Whether a stop has been requested.
    stop_requested: AtomicBool,

    /// Milliseconds between ticks.
    tick_interval_ms: u64,

    /// Player commands awaiting the next tick.
    commands: Mutex<Vec<PlayerCommand>>,

    /// Woken when a command is queued or a stop is requested.
    wake: Notify,

    /// Reason the session ended, if it has.
    end_reason: Mutex<Option<SessionEndReason>>,
}

impl SessionControl {
    /// Create a control handle ticking every `tick_interval_ms`.
    pub fn new(tick_interval_ms: u64) -> Self {
        Self {
            stop_requested: AtomicBool::new(false),
            tick_interval_ms,
            commands: Mutex::new(Vec::new()),
            wake: Notify::new(),
            end_reason: Mutex::new(None),
        }
    }

    /// Ask the runner to stop before its next tick.
    pub fn request_stop(&self) {
        self.stop_requested.store(true, Ordering::Release);
        self.wake.notify_one();
    }

    /// Whether a stop has been requested.
    pub fn is_stop_requested(&self) -> bool {
        self.stop_requested.load(Ordering::Acquire)
    }

    /// Milliseconds between ticks.
    pub const fn tick_interval_ms(&self) -> u64 {
        self.tick_interval_ms
    }

    /// Queue a player command for the next tick.
    pub async fn push_command(&self, command: PlayerCommand) {
        self.commands.lock().await.push(command);
        self.wake.notify_one();
    }

    /// Wait until a command is queued or a stop is requested.
    ///
    /// Completes at once if either happened since the last wait.
    pub async fn changed(&self) {
        self.wake.notified().await;
    }

    /// Take every queued command, oldest first.
    pub async fn drain_commands(&self) -> Vec<PlayerCommand> {
        std::mem::take(&mut *self.commands.lock().await)
    }

    /// Record why the session ended.
    pub async fn set_end_reason(&self, reason: SessionEndReason) {
        *self.end_reason.lock().await = Some(reason);
    }

    /// Why the session ended, if it has.
    pub async fn end_reason(&self) -> Option<SessionEndReason> {
        *self.end_reason.lock().await
    }
}
