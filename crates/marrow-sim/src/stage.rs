//! Growth stage progression.
//!
//! `Sprout (30s) -> Vegetative (45s) -> Flowering (60s) -> Harvest`.
//! Every tick adds one second to the current stage. Once the stage's
//! duration is reached the plant advances and the stage clock restarts.
//! Reaching `Harvest` pins progress at 100 and ends growth.

use marrow_types::{LiveGameState, PlantEvent, Stage};
use tracing::debug;

/// A stage change that happened during a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageAdvance {
    /// Stage the plant left.
    pub from: Stage,
    /// Stage the plant entered.
    pub to: Stage,
}

/// Percentage of the whole grow completed at `stage_time` seconds into
/// `stage`, clamped to `[0, 100]`.
pub fn growth_progress(stage: Stage, stage_time: f64, total_growth_time: f64) -> f64 {
    if total_growth_time <= 0.0 {
        return 0.0;
    }
    let elapsed = f64::from(stage.elapsed_before()) + stage_time;
    (elapsed / total_growth_time * 100.0).clamp(0.0, 100.0)
}

/// Advance the stage clock by one second and move to the next stage when
/// the current one is complete.
///
/// Does nothing once the plant is in `Harvest`.
pub fn advance_stage(state: &mut LiveGameState) -> Option<StageAdvance> {
    if state.stage.is_terminal() {
        state.growth_progress = 100.0;
        return None;
    }

    state.stage_time += 1.0;
    state.growth_progress = growth_progress(state.stage, state.stage_time, state.total_growth_time)
        .max(state.growth_progress);

    let from = state.stage;
    if state.stage_time < f64::from(from.duration_secs()) {
        return None;
    }
    let to = from.next()?;

    state.stage = to;
    state.stage_index = to.index();
    state.stage_time = 0.0;
    state.push_event(PlantEvent::info(format!("Entered {to} stage.")));
    debug!(%from, %to, tick = state.tick, "Stage advanced");

    if to.is_terminal() {
        state.growth_progress = 100.0;
    }

    Some(StageAdvance { from, to })
}
