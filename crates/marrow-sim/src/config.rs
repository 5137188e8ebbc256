//! Tunable probabilities for the random event engine.
//!
//! [`EventChances`] bundles every roll threshold so the session runtime and
//! tests can override the defaults. The runtime builds it from the `events`
//! section of `marrow-config.yaml`.

use serde::{Deserialize, Serialize};

use crate::error::SimError;

/// Probabilities used by the per-tick and harvest-time rolls.
///
/// Each value is the chance, in `[0, 1]`, that the roll succeeds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventChances {
    /// Chance per tick that working lights fail (default: 0.03).
    pub lights_failure: f64,
    /// Chance per tick of a pest attack outside Sprout/Harvest (default: 0.05).
    pub pest_attack: f64,
    /// Chance per tick of a raid during Vegetative/Flowering (default: 0.04).
    pub raider_attack: f64,
    /// Chance per tick of a nutrient surge during Flowering (default: 0.03).
    pub nutrient_boost: f64,
    /// Chance a nutrient surge actually lands (default: 0.5).
    pub nutrient_boost_success: f64,
    /// Chance per tick of the session's single Act of God (default: 0.005).
    pub act_of_god: f64,
    /// Chance MarrowCorp steals a life at harvest (default: 0.25).
    pub corporate_theft: f64,
    /// Chance the harvest rolls from the high potency band (default: 0.2).
    pub lucky_potency: f64,
    /// Chance a post-harvest seed search finds a life (default: 0.95).
    pub seed_search: f64,
}

impl Default for EventChances {
    fn default() -> Self {
        Self {
            lights_failure: 0.03,
            pest_attack: 0.05,
            raider_attack: 0.04,
            nutrient_boost: 0.03,
            nutrient_boost_success: 0.5,
            act_of_god: 0.005,
            corporate_theft: 0.25,
            lucky_potency: 0.2,
            seed_search: 0.95,
        }
    }
}

impl EventChances {
    /// Every chance set to zero. Useful as a base for scenario tests.
    pub const fn none() -> Self {
        Self {
            lights_failure: 0.0,
            pest_attack: 0.0,
            raider_attack: 0.0,
            nutrient_boost: 0.0,
            nutrient_boost_success: 0.0,
            act_of_god: 0.0,
            corporate_theft: 0.0,
            lucky_potency: 0.0,
            seed_search: 0.0,
        }
    }

    /// Reject any chance outside `[0, 1]` or not finite.
    pub fn validate(&self) -> Result<(), SimError> {
        let named = [
            ("lights_failure", self.lights_failure),
            ("pest_attack", self.pest_attack),
            ("raider_attack", self.raider_attack),
            ("nutrient_boost", self.nutrient_boost),
            ("nutrient_boost_success", self.nutrient_boost_success),
            ("act_of_god", self.act_of_god),
            ("corporate_theft", self.corporate_theft),
            ("lucky_potency", self.lucky_potency),
            ("seed_search", self.seed_search),
        ];
        for (name, value) in named {
            if !(0.0..=1.0).contains(&value) {
                return Err(SimError::InvalidChance { name, value });
            }
        }
        Ok(())
    }
}

/// Roll a uniform number and report whether it fell under `chance`.
///
/// Never panics: a chance at or below zero never hits, at or above one
/// always hits.
pub fn roll<R: rand::Rng>(rng: &mut R, chance: f64) -> bool {
    rng.random::<f64>() < chance
}
