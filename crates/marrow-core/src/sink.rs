//! Harvest sink trait and in-process implementations.
//!
//! When a plant is harvested the runner hands the result to a
//! [`HarvestSink`] exactly once. The sink is where the leaderboard lives;
//! the core never reads anything back. A failing sink does not undo the
//! harvest: the local result is authoritative.

use std::sync::{Mutex, PoisonError};

use marrow_types::{HarvestResult, PlayerId};
use tracing::debug;

/// Errors a sink may report.
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    /// The sink could not accept the result.
    #[error("harvest sink unavailable: {reason}")]
    Unavailable {
        /// Description of the failure.
        reason: String,
    },
}

/// Receives completed harvests.
pub trait HarvestSink: Send + Sync {
    /// Record one harvest for `user_id`.
    ///
    /// # Errors
    ///
    /// Returns [`SinkError`] if the result could not be handed off.
    fn record_harvest(&self, user_id: PlayerId, result: &HarvestResult) -> Result<(), SinkError>;
}

/// A sink that drops every result. Used when no backend is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl HarvestSink for NullSink {
    fn record_harvest(&self, user_id: PlayerId, result: &HarvestResult) -> Result<(), SinkError> {
        debug!(%user_id, weight = result.weight, "No harvest sink configured");
        Ok(())
    }
}

/// A sink that keeps results in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Mutex<Vec<(PlayerId, HarvestResult)>>,
}

impl MemorySink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every recorded harvest, oldest first.
    pub fn records(&self) -> Vec<(PlayerId, HarvestResult)> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl HarvestSink for MemorySink {
    fn record_harvest(&self, user_id: PlayerId, result: &HarvestResult) -> Result<(), SinkError> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((user_id, result.clone()));
        Ok(())
    }
}
