//! Harvest resolution and the post-harvest rolls.
//!
//! The crop is computed exactly once, from the plant's average health, its
//! penalty and boost multipliers, and the installed light:
//!
//! - Potency: uniform in `[20, 30)`, or `[30, 70)` on a lucky roll, times
//!   the potency boost and pest penalty, clamped to `[0, 70]`
//! - Weight: uniform in `[1, 200)`, times average health, raider penalty,
//!   and light bonus, clamped to `[1, 200]`
//!
//! Corporate theft and the seed search run after the crop is resolved and
//! only report what happened; the caller moves the lives.

use marrow_types::{DefenseKind, EventColor, EventKind, HarvestResult, LiveGameState, PlantEvent};
use rand::Rng;

use crate::config::{EventChances, roll};

/// Highest potency a crop can score.
pub const MAX_POTENCY: f64 = 70.0;
/// Lightest possible crop in grams.
pub const MIN_WEIGHT: f64 = 1.0;
/// Heaviest possible crop in grams.
pub const MAX_WEIGHT: f64 = 200.0;

/// Average health across all ticks, normalized to `[0, 1]`.
#[allow(clippy::cast_precision_loss)]
pub fn average_health(state: &LiveGameState) -> f64 {
    if state.health_ticks == 0 {
        return 0.0;
    }
    state.health_sum / state.health_ticks as f64 / 100.0
}

/// Compute the final crop for a plant that reached harvest.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn calculate_harvest<R: Rng>(
    state: &LiveGameState,
    chances: &EventChances,
    rng: &mut R,
) -> HarvestResult {
    let base_potency = if roll(rng, chances.lucky_potency) {
        rng.random_range(30.0..70.0)
    } else {
        rng.random_range(20.0..30.0)
    };
    let base_yield: f64 = rng.random_range(MIN_WEIGHT..MAX_WEIGHT);

    let potency = (base_potency * state.potency_boost.max(0.1) * state.pest_penalty.max(0.1))
        .clamp(0.0, MAX_POTENCY)
        .round();
    let weight = (base_yield
        * average_health(state).max(0.0)
        * state.raider_penalty.max(0.1)
        * state.light_source.yield_bonus())
    .clamp(MIN_WEIGHT, MAX_WEIGHT)
    .round();

    HarvestResult {
        strain_name: state.plant_name.clone(),
        weight: weight as u32,
        potency: potency as u32,
    }
}

/// Log the harvest on the plant's event feed.
pub fn announce_harvest(state: &mut LiveGameState) {
    state.push_event(
        PlantEvent::info(format!("{} ready.", state.plant_name))
            .titled("Harvest Ready!")
            .colored(EventColor::Green),
    );
}

/// Log the plant's death on its event feed.
pub fn announce_death(state: &mut LiveGameState) {
    state.push_event(
        PlantEvent::new(EventKind::Danger, format!("{} withered!", state.plant_name))
            .titled("Plant Died!")
            .colored(EventColor::DeepRed),
    );
}

/// Result of the harvest-time corporate theft check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TheftOutcome {
    /// A vault kept the seeds safe.
    Blocked,
    /// MarrowCorp took one life; the caller must deduct it.
    Stolen,
    /// The roll missed or there was nothing to take.
    Spared,
}

/// Run the corporate theft check once, right after harvest.
///
/// The vault check happens before any roll, so a vault holder is never
/// robbed.
pub fn check_corporate_theft<R: Rng>(
    state: &mut LiveGameState,
    defense: DefenseKind,
    current_lives: u32,
    chances: &EventChances,
    rng: &mut R,
) -> TheftOutcome {
    if defense == DefenseKind::Vault {
        state.push_event(PlantEvent::info("Vault protected seeds!").titled("Secure Vault"));
        return TheftOutcome::Blocked;
    }
    if current_lives >= 1 && roll(rng, chances.corporate_theft) {
        state.push_event(
            PlantEvent::new(EventKind::Danger, "MarrowCorp stole 1 seed!")
                .titled("Corporate Theft!")
                .colored(EventColor::DeepRed),
        );
        return TheftOutcome::Stolen;
    }
    TheftOutcome::Spared
}

/// Roll the post-harvest seed search. `true` means one life was found.
pub fn roll_seed_search<R: Rng>(chances: &EventChances, rng: &mut R) -> bool {
    roll(rng, chances.seed_search)
}
