//! The per-tick pipeline for a single plant.
//!
//! Each call to [`Session::tick`] runs these phases on a copy of the plant:
//!
//! 1. **Lights** -- roll for a failure; a failure takes the headline slot.
//! 2. **Resources** -- drain, light dimming, health loss, stress.
//! 3. **Events** -- pest, raider, or nutrient surge (at most one), then the
//!    session's Act of God.
//! 4. **Stage** -- advance the stage clock.
//! 5. **Commit** -- round gauges, validate against the previous state, swap.
//! 6. **Termination** -- death wins over harvest when both hold. Harvest
//!    resolves the crop and runs corporate theft exactly once.
//!
//! A tick that fails validation leaves the previous plant untouched.

use marrow_sim::error::SimError;
use marrow_sim::events::check_lights_failure;
use marrow_sim::harvest::{announce_death, announce_harvest};
use marrow_sim::{
    ResourceTick, StageAdvance, TheftOutcome, TickEvent, advance_stage, apply_resource_tick,
    calculate_harvest, check_corporate_theft, roll_tick_events, round_state, validate_transition,
};
use marrow_types::{SessionOutcome, Stage};
use rand::Rng;
use tracing::{debug, info, warn};

use crate::lives::LivesAccount;
use crate::session::Session;

/// Errors that can occur during tick execution.
#[derive(Debug, thiserror::Error)]
pub enum TickError {
    /// The session already reached harvest or death.
    #[error("session already ended")]
    Finished,

    /// The computed plant broke an invariant and was discarded.
    #[error("simulation error: {source}")]
    Sim {
        /// The underlying simulation error.
        #[from]
        source: SimError,
    },
}

/// What happened during one tick.
#[derive(Debug, Clone, PartialEq)]
pub struct TickSummary {
    /// Tick number that just ran.
    pub tick: u64,
    /// Stage after the tick.
    pub stage: Stage,
    /// Health after the tick.
    pub health: f64,
    /// Growth progress after the tick.
    pub growth_progress: f64,
    /// Random events that fired, in roll order.
    pub events: Vec<TickEvent>,
    /// Stage change, if any.
    pub stage_advance: Option<StageAdvance>,
    /// Resource model effects.
    pub resource: ResourceTick,
    /// Corporate theft result on the harvest tick.
    pub theft: Option<TheftOutcome>,
    /// Set on the tick that ended the session.
    pub outcome: Option<SessionOutcome>,
}

impl<R: Rng> Session<R> {
    /// Run one tick.
    ///
    /// `lives` is only touched on the harvest tick, when corporate theft may
    /// take one life. A lives store failure there is logged and does not
    /// fail the tick.
    ///
    /// # Errors
    ///
    /// Returns [`TickError::Finished`] once the session has ended, or
    /// [`TickError::Sim`] if the computed plant is invalid. In both cases
    /// the plant is unchanged.
    pub fn tick(&mut self, lives: &mut dyn LivesAccount) -> Result<TickSummary, TickError> {
        if self.outcome.is_some() {
            return Err(TickError::Finished);
        }

        let mut next = self.state.clone();
        next.tick = next.tick.saturating_add(1);

        // --- Phase 1: Lights ---
        let mut events: Vec<TickEvent> =
            check_lights_failure(&mut next, &self.chances, &mut self.rng)
                .into_iter()
                .collect();
        let headline_taken = !events.is_empty();

        // --- Phase 2: Resources ---
        let resource = apply_resource_tick(&mut next);

        // --- Phase 3: Events ---
        events.extend(roll_tick_events(
            &mut next,
            self.defense,
            &self.chances,
            &mut self.rng,
            headline_taken,
        ));

        // --- Phase 4: Stage ---
        let stage_advance = advance_stage(&mut next);

        // --- Phase 5: Commit ---
        round_state(&mut next);
        validate_transition(&self.state, &next)?;
        self.state = next;

        debug!(
            session_id = %self.id,
            tick = self.state.tick,
            stage = %self.state.stage,
            health = self.state.health,
            water = self.state.resources.water,
            nutrients = self.state.resources.nutrients,
            light = self.state.resources.light,
            stress = self.state.resources.stress,
            events = events.len(),
            "Tick complete"
        );

        // --- Phase 6: Termination ---
        let mut theft = None;
        if self.state.is_dead() {
            announce_death(&mut self.state);
            info!(session_id = %self.id, tick = self.state.tick, "Plant died");
            self.outcome = Some(SessionOutcome::Died);
        } else if self.state.stage.is_terminal() {
            let result = calculate_harvest(&self.state, &self.chances, &mut self.rng);
            announce_harvest(&mut self.state);
            theft = Some(self.resolve_theft(lives));
            info!(
                session_id = %self.id,
                tick = self.state.tick,
                weight = result.weight,
                potency = result.potency,
                "Plant harvested"
            );
            self.outcome = Some(SessionOutcome::Harvested { result });
        }

        Ok(TickSummary {
            tick: self.state.tick,
            stage: self.state.stage,
            health: self.state.health,
            growth_progress: self.state.growth_progress,
            events,
            stage_advance,
            resource,
            theft,
            outcome: self.outcome.clone(),
        })
    }

    fn resolve_theft(&mut self, lives: &mut dyn LivesAccount) -> TheftOutcome {
        let current = lives.lives().unwrap_or_else(|err| {
            warn!(session_id = %self.id, error = %err, "Could not read lives for theft check");
            0
        });
        let outcome = check_corporate_theft(
            &mut self.state,
            self.defense,
            current,
            &self.chances,
            &mut self.rng,
        );
        if outcome == TheftOutcome::Stolen {
            let remaining = current.saturating_sub(1);
            if let Err(err) = lives.set_lives(remaining) {
                warn!(session_id = %self.id, error = %err, "Could not deduct stolen life");
            } else {
                info!(session_id = %self.id, lives_left = remaining, "Corporate theft took a life");
            }
        }
        outcome
    }
}
