//! Session loop runner with player controls.
//!
//! [`run_session`] drives one session to completion:
//!
//! - **Single flight**: each tick is awaited before the next is scheduled,
//!   so ticks never overlap and a slow tick delays the next instead of
//!   bursting.
//! - **Player commands**: queued commands and the input source are applied
//!   before every tick.
//! - **Clean stop**: a stop request ends the loop before the next tick,
//!   without resolving harvest or death.
//! - **Harvest hand-off**: a harvested result goes to the [`HarvestSink`]
//!   exactly once. A sink failure leaves a notice on the feed.
//! - **Seed search window**: [`await_seed_search`] gives the player a short
//!   window after harvest to ask for the one-time seed search.

use std::sync::Arc;
use std::time::Duration;

use marrow_types::{LiveGameState, SessionId, SessionOutcome};
use rand::Rng;
use tracing::{info, warn};

use crate::control::{PlayerCommand, SessionControl, SessionEndReason};
use crate::input::PlayerInput;
use crate::lives::LivesAccount;
use crate::session::{Session, SessionError};
use crate::sink::HarvestSink;
use crate::tick::{TickError, TickSummary};

/// Errors that can occur during the session run.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// A tick execution failed.
    #[error("tick error: {source}")]
    Tick {
        /// The underlying tick error.
        #[from]
        source: TickError,
    },
}

/// Result of a session run.
#[derive(Debug)]
pub struct SessionReport {
    /// The session that ran.
    pub session_id: SessionId,
    /// Why the run ended.
    pub end_reason: SessionEndReason,
    /// Harvest or death. `None` when the run was abandoned.
    pub outcome: Option<SessionOutcome>,
    /// The last tick summary, if any tick completed.
    pub final_summary: Option<TickSummary>,
    /// Total number of ticks executed.
    pub total_ticks: u64,
}

/// Callback invoked after each tick completes.
///
/// Implementations use this to publish snapshots to the observer.
pub trait TickCallback: Send {
    /// Called after a tick completes successfully.
    fn on_tick(&mut self, summary: &TickSummary, state: &LiveGameState);

    /// Called once after the outcome is resolved and handed off.
    fn on_end(&mut self, _outcome: &SessionOutcome, _state: &LiveGameState) {}
}

/// A no-op tick callback for testing.
pub struct NoOpCallback;

impl TickCallback for NoOpCallback {
    fn on_tick(&mut self, _summary: &TickSummary, _state: &LiveGameState) {}
}

/// Apply one player command, logging rejections.
fn apply_command<R: Rng>(
    session: &mut Session<R>,
    lives: &mut dyn LivesAccount,
    command: PlayerCommand,
) {
    let applied = match command {
        PlayerCommand::FixLights => session.fix_lights().map(|_| ()),
        PlayerCommand::SwitchLight(light) => session.switch_light(light),
        PlayerCommand::SearchSeeds => session.search_for_seeds(lives).map(|_| ()),
    };
    if let Err(err) = applied {
        warn!(session_id = %session.id(), ?command, error = %err, "Player command rejected");
    }
}

/// Run the session loop until harvest, death, or a stop request.
///
/// # Errors
///
/// Returns [`RunnerError`] if a tick fails. The session keeps its last
/// valid plant.
pub async fn run_session<R: Rng>(
    session: &mut Session<R>,
    lives: &mut dyn LivesAccount,
    control: &Arc<SessionControl>,
    input: &mut dyn PlayerInput,
    sink: &dyn HarvestSink,
    callback: &mut dyn TickCallback,
) -> Result<SessionReport, RunnerError> {
    let mut last_summary: Option<TickSummary> = None;
    let mut total_ticks: u64 = 0;

    info!(
        session_id = %session.id(),
        tick_interval_ms = control.tick_interval_ms(),
        "Session loop starting"
    );

    loop {
        // --- Check stop request (before tick) ---
        if control.is_stop_requested() {
            info!(session_id = %session.id(), "Stop requested");
            let reason = SessionEndReason::Abandoned;
            control.set_end_reason(reason).await;
            return Ok(SessionReport {
                session_id: session.id(),
                end_reason: reason,
                outcome: None,
                final_summary: last_summary,
                total_ticks,
            });
        }

        // --- Apply player commands ---
        let mut commands = control.drain_commands().await;
        commands.extend(input.commands(session.state().tick, session.state()));
        for command in commands {
            apply_command(session, lives, command);
        }

        // --- Execute tick ---
        let summary = session.tick(lives)?;
        total_ticks = total_ticks.saturating_add(1);

        // --- Notify callback ---
        callback.on_tick(&summary, session.state());

        // --- Check termination ---
        if let Some(outcome) = summary.outcome.clone() {
            let reason = match &outcome {
                SessionOutcome::Harvested { result } => {
                    if let Err(err) = sink.record_harvest(session.user_id(), result) {
                        session.note_sync_failure(&err.to_string());
                    }
                    SessionEndReason::Harvested
                }
                SessionOutcome::Died => SessionEndReason::Died,
            };
            callback.on_end(&outcome, session.state());
            control.set_end_reason(reason).await;
            return Ok(SessionReport {
                session_id: session.id(),
                end_reason: reason,
                outcome: Some(outcome),
                final_summary: Some(summary),
                total_ticks,
            });
        }

        last_summary = Some(summary);

        // --- Sleep for tick interval ---
        let interval_ms = control.tick_interval_ms();
        if interval_ms > 0 {
            tokio::time::sleep(tokio::time::Duration::from_millis(interval_ms)).await;
        }
    }
}

/// Wait up to `window` for a queued [`PlayerCommand::SearchSeeds`] on a
/// harvested session and run the search. Other commands are dropped.
///
/// Returns `Ok(None)` when the window closes, or a stop is requested,
/// without a search.
///
/// # Errors
///
/// Returns [`SessionError`] if the search itself is refused or its award
/// cannot be stored.
pub async fn await_seed_search<R: Rng>(
    session: &mut Session<R>,
    lives: &mut dyn LivesAccount,
    control: &SessionControl,
    window: Duration,
) -> Result<Option<bool>, SessionError> {
    let requested = tokio::time::timeout(window, async {
        loop {
            let commands = control.drain_commands().await;
            if commands.contains(&PlayerCommand::SearchSeeds) {
                return true;
            }
            if control.is_stop_requested() {
                return false;
            }
            control.changed().await;
        }
    })
    .await
    .unwrap_or(false);

    if !requested {
        info!(session_id = %session.id(), "Seed search window closed");
        return Ok(None);
    }
    session.search_for_seeds(lives).map(Some)
}

/// Log the end of a session run.
pub fn log_session_end(report: &SessionReport) {
    info!(
        session_id = %report.session_id,
        reason = ?report.end_reason,
        total_ticks = report.total_ticks,
        final_tick = report.final_summary.as_ref().map(|s| s.tick),
        "Session ended"
    );

    match report.outcome.as_ref().and_then(SessionOutcome::harvest) {
        Some(result) => info!(
            strain = %result.strain_name,
            weight = result.weight,
            potency = result.potency,
            "Final harvest"
        ),
        None if report.final_summary.is_none() => warn!("Session ended with no ticks executed"),
        None => {}
    }
}
