//! Random event engine.
//!
//! Rolls run in a fixed order each tick:
//!
//! 1. Lights failure (before the resource step, so darkness bites at once)
//! 2. Pest attack
//! 3. Raider attack
//! 4. Nutrient surge
//! 5. Act of God
//!
//! Steps 1 to 4 share a single "headline" slot: once one of them fires, the
//! rest are skipped for the tick. The Act of God ignores the headline slot
//! and instead fires at most once per session.

use marrow_types::{DefenseKind, EventColor, EventKind, LiveGameState, PlantEvent, Stage};
use rand::Rng;
use rand::seq::IndexedRandom;
use tracing::debug;

use crate::config::{EventChances, roll};

/// A pest or raider species with its damage profile.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Threat {
    /// Display name.
    pub name: &'static str,
    /// Inclusive damage range, in percent of the targeted multiplier.
    pub damage: (u32, u32),
    /// Chance an undefended attack lands.
    pub success_rate: f64,
}

/// Pests that erode potency.
pub const PEST_TYPES: [Threat; 2] = [
    Threat {
        name: "Space Slugs",
        damage: (4, 7),
        success_rate: 0.5,
    },
    Threat {
        name: "Crypt Mites",
        damage: (3, 6),
        success_rate: 0.6,
    },
];

/// Raiders that erode yield.
pub const RAID_TYPES: [Threat; 2] = [
    Threat {
        name: "Crypt Bandits",
        damage: (5, 10),
        success_rate: 0.3,
    },
    Threat {
        name: "Mutant Chickens",
        damage: (3, 8),
        success_rate: 0.35,
    },
];

/// Floor for the pest and raider multipliers.
pub const PENALTY_FLOOR: f64 = 0.1;

/// Range of the potency boost a successful nutrient surge adds.
pub const NUTRIENT_BOOST_RANGE: core::ops::Range<f64> = 0.05..0.15;

/// The severe, once-per-session catastrophes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActOfGod {
    /// Water drops by 30, not below 10.
    Drought,
    /// Light drops by 40, not below 10, unless it is already dark.
    SolarEclipse,
    /// Nutrients drop by 30, not below 10.
    SoilMites,
    /// Stress jumps by 20, not above 100.
    StrangeEnergy,
}

impl ActOfGod {
    /// All catastrophes, equally likely.
    pub const ALL: [Self; 4] = [
        Self::Drought,
        Self::SolarEclipse,
        Self::SoilMites,
        Self::StrangeEnergy,
    ];

    /// Log message.
    pub const fn message(self) -> &'static str {
        match self {
            Self::Drought => "Drought!",
            Self::SolarEclipse => "Solar eclipse!",
            Self::SoilMites => "Soil mites!",
            Self::StrangeEnergy => "Strange energy!",
        }
    }

    /// Apply the effect to the plant.
    pub fn apply(self, state: &mut LiveGameState) {
        let res = &mut state.resources;
        match self {
            Self::Drought => res.water = (res.water - 30.0).max(10.0),
            Self::SolarEclipse => {
                if !state.lights_out {
                    res.light = (res.light - 40.0).max(10.0);
                }
            }
            Self::SoilMites => res.nutrients = (res.nutrients - 30.0).max(10.0),
            Self::StrangeEnergy => res.stress = (res.stress + 20.0).min(100.0),
        }
    }
}

/// Something the event engine did this tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TickEvent {
    /// The lights failed.
    LightsFailed,
    /// A defense turned the attack away before any roll.
    Deflected {
        /// Species that attacked.
        threat: &'static str,
        /// Defense that stopped it.
        defense: DefenseKind,
    },
    /// An undefended attack failed its success roll.
    Repelled {
        /// Species that attacked.
        threat: &'static str,
    },
    /// Pests reduced the potency multiplier.
    PestDamage {
        /// Species that attacked.
        threat: &'static str,
        /// Percent removed from the multiplier.
        percent: u32,
    },
    /// Raiders reduced the yield multiplier.
    RaidDamage {
        /// Species that attacked.
        threat: &'static str,
        /// Percent removed from the multiplier.
        percent: u32,
    },
    /// A nutrient surge raised potency.
    NutrientBoost {
        /// Amount added to the potency multiplier.
        amount: f64,
    },
    /// A nutrient surge missed.
    NutrientMiss,
    /// The session's Act of God.
    ActOfGod(ActOfGod),
}

/// Reduce a penalty multiplier by `percent`, never below [`PENALTY_FLOOR`].
pub fn apply_penalty(current: f64, percent: u32) -> f64 {
    (current * (1.0 - f64::from(percent) / 100.0)).max(PENALTY_FLOOR)
}

/// Roll for a lights failure. Only working lights can fail.
pub fn check_lights_failure<R: Rng>(
    state: &mut LiveGameState,
    chances: &EventChances,
    rng: &mut R,
) -> Option<TickEvent> {
    if state.lights_out || !roll(rng, chances.lights_failure) {
        return None;
    }
    state.lights_out = true;
    state.push_event(PlantEvent::new(EventKind::Warning, "Lights failed!").titled("Lights Out!"));
    Some(TickEvent::LightsFailed)
}

/// Roll for a pest attack. Pests ignore sprouts and finished plants.
pub fn check_pest_attack<R: Rng>(
    state: &mut LiveGameState,
    defense: DefenseKind,
    chances: &EventChances,
    rng: &mut R,
) -> Option<TickEvent> {
    if matches!(state.stage, Stage::Sprout | Stage::Harvest) || !roll(rng, chances.pest_attack) {
        return None;
    }
    let pest = PEST_TYPES.choose(rng)?;

    let (event, outcome) = if defense == DefenseKind::PestDefense {
        (
            PlantEvent::info(format!("Grower protected vs {}!", pest.name)),
            TickEvent::Deflected {
                threat: pest.name,
                defense,
            },
        )
    } else if roll(rng, pest.success_rate) {
        let percent = rng.random_range(pest.damage.0..=pest.damage.1);
        state.pest_penalty = apply_penalty(state.pest_penalty, percent);
        (
            PlantEvent::new(
                EventKind::Danger,
                format!("{} reduced potency by {percent}%.", pest.name),
            ),
            TickEvent::PestDamage {
                threat: pest.name,
                percent,
            },
        )
    } else {
        (
            PlantEvent::info(format!("{} repelled!", pest.name)),
            TickEvent::Repelled { threat: pest.name },
        )
    };
    state.push_event(event.titled("Pest Attack!"));
    Some(outcome)
}

/// Roll for a raid. Raiders only come for vegetative or flowering plants.
pub fn check_raider_attack<R: Rng>(
    state: &mut LiveGameState,
    defense: DefenseKind,
    chances: &EventChances,
    rng: &mut R,
) -> Option<TickEvent> {
    if !matches!(state.stage, Stage::Vegetative | Stage::Flowering)
        || !roll(rng, chances.raider_attack)
    {
        return None;
    }
    let raider = RAID_TYPES.choose(rng)?;

    let (event, outcome) = if defense == DefenseKind::RaiderDefense {
        (
            PlantEvent::info(format!("Hound chased off {}!", raider.name)),
            TickEvent::Deflected {
                threat: raider.name,
                defense,
            },
        )
    } else if roll(rng, raider.success_rate) {
        let percent = rng.random_range(raider.damage.0..=raider.damage.1);
        state.raider_penalty = apply_penalty(state.raider_penalty, percent);
        (
            PlantEvent::new(
                EventKind::Danger,
                format!("{} reduced yield by {percent}%.", raider.name),
            ),
            TickEvent::RaidDamage {
                threat: raider.name,
                percent,
            },
        )
    } else {
        (
            PlantEvent::info(format!("{} repelled!", raider.name)),
            TickEvent::Repelled {
                threat: raider.name,
            },
        )
    };
    state.push_event(event.titled("Raid!"));
    Some(outcome)
}

/// Roll for a nutrient surge during flowering.
pub fn check_nutrient_boost<R: Rng>(
    state: &mut LiveGameState,
    chances: &EventChances,
    rng: &mut R,
) -> Option<TickEvent> {
    if state.stage != Stage::Flowering || !roll(rng, chances.nutrient_boost) {
        return None;
    }
    let (event, outcome) = if roll(rng, chances.nutrient_boost_success) {
        let amount = rng.random_range(NUTRIENT_BOOST_RANGE);
        state.potency_boost += amount;
        (
            PlantEvent::info(format!("Potency boosted by {:.0}%!", amount * 100.0)),
            TickEvent::NutrientBoost { amount },
        )
    } else {
        (
            PlantEvent::new(EventKind::Warning, "Nutrient boost missed."),
            TickEvent::NutrientMiss,
        )
    };
    state.push_event(event.titled("Nutrient Surge!"));
    Some(outcome)
}

/// Roll for the session's single Act of God.
pub fn check_act_of_god<R: Rng>(
    state: &mut LiveGameState,
    chances: &EventChances,
    rng: &mut R,
) -> Option<TickEvent> {
    if state.act_of_god_occurred || !roll(rng, chances.act_of_god) {
        return None;
    }
    let act = *ActOfGod::ALL.choose(rng)?;
    act.apply(state);
    state.act_of_god_occurred = true;
    debug!(?act, tick = state.tick, "Act of God");
    state.push_event(
        PlantEvent::new(EventKind::ActOfGod, act.message())
            .titled("Act of God!")
            .colored(EventColor::Purple),
    );
    Some(TickEvent::ActOfGod(act))
}

/// Run the post-resource rolls in order, honoring the headline slot.
///
/// `headline_taken` is true when the lights already failed this tick.
pub fn roll_tick_events<R: Rng>(
    state: &mut LiveGameState,
    defense: DefenseKind,
    chances: &EventChances,
    rng: &mut R,
    headline_taken: bool,
) -> Vec<TickEvent> {
    let mut fired = Vec::new();

    if !headline_taken {
        let headline = check_pest_attack(state, defense, chances, rng)
            .or_else(|| check_raider_attack(state, defense, chances, rng))
            .or_else(|| check_nutrient_boost(state, chances, rng));
        fired.extend(headline);
    }

    fired.extend(check_act_of_god(state, chances, rng));
    fired
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::arithmetic_side_effects, clippy::panic)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;

    fn plant_in(stage: Stage) -> LiveGameState {
        let mut state = LiveGameState::new("Test", 0.5, 0.5);
        state.stage = stage;
        state.stage_index = stage.index();
        state
    }

    fn always(f: impl FnOnce(&mut EventChances)) -> EventChances {
        let mut chances = EventChances::none();
        f(&mut chances);
        chances
    }

    #[test]
    fn lights_only_fail_when_on() {
        let mut rng = SmallRng::seed_from_u64(42);
        let chances = always(|c| c.lights_failure = 1.0);
        let mut state = plant_in(Stage::Sprout);
        assert_eq!(
            check_lights_failure(&mut state, &chances, &mut rng),
            Some(TickEvent::LightsFailed)
        );
        assert!(state.lights_out);
        assert_eq!(state.events.first().unwrap().title.as_deref(), Some("Lights Out!"));
        assert!(check_lights_failure(&mut state, &chances, &mut rng).is_none());
    }

    #[test]
    fn pests_skip_sprouts() {
        let mut rng = SmallRng::seed_from_u64(42);
        let chances = always(|c| c.pest_attack = 1.0);
        let mut state = plant_in(Stage::Sprout);
        assert!(check_pest_attack(&mut state, DefenseKind::Vault, &chances, &mut rng).is_none());
    }

    #[test]
    fn grower_deflects_every_pest() {
        let mut rng = SmallRng::seed_from_u64(42);
        let chances = always(|c| c.pest_attack = 1.0);
        let mut state = plant_in(Stage::Vegetative);
        for _ in 0..200 {
            let event =
                check_pest_attack(&mut state, DefenseKind::PestDefense, &chances, &mut rng);
            assert!(matches!(event, Some(TickEvent::Deflected { .. })));
        }
        assert!((state.pest_penalty - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn undefended_pests_ratchet_penalty_down_to_floor() {
        let mut rng = SmallRng::seed_from_u64(42);
        let chances = always(|c| c.pest_attack = 1.0);
        let mut state = plant_in(Stage::Flowering);
        let mut last = state.pest_penalty;
        let mut hits = 0;
        for _ in 0..2000 {
            if let Some(TickEvent::PestDamage { percent, .. }) =
                check_pest_attack(&mut state, DefenseKind::Vault, &chances, &mut rng)
            {
                assert!((3..=7).contains(&percent));
                hits += 1;
            }
            assert!(state.pest_penalty <= last);
            assert!(state.pest_penalty >= PENALTY_FLOOR);
            last = state.pest_penalty;
        }
        assert!(hits > 0);
        assert!((state.pest_penalty - PENALTY_FLOOR).abs() < 1e-9);
    }

    #[test]
    fn raiders_only_hit_vegetative_and_flowering() {
        let mut rng = SmallRng::seed_from_u64(42);
        let chances = always(|c| c.raider_attack = 1.0);
        for stage in [Stage::Sprout, Stage::Harvest] {
            let mut state = plant_in(stage);
            assert!(
                check_raider_attack(&mut state, DefenseKind::Vault, &chances, &mut rng).is_none()
            );
        }
        let mut state = plant_in(Stage::Vegetative);
        assert!(
            check_raider_attack(&mut state, DefenseKind::Vault, &chances, &mut rng).is_some()
        );
    }

    #[test]
    fn hound_deflects_raids() {
        let mut rng = SmallRng::seed_from_u64(3);
        let chances = always(|c| c.raider_attack = 1.0);
        let mut state = plant_in(Stage::Flowering);
        for _ in 0..200 {
            let event =
                check_raider_attack(&mut state, DefenseKind::RaiderDefense, &chances, &mut rng);
            assert!(matches!(event, Some(TickEvent::Deflected { .. })));
        }
        assert!((state.raider_penalty - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn raid_success_rate_is_honored() {
        let mut rng = SmallRng::seed_from_u64(11);
        let chances = always(|c| c.raider_attack = 1.0);
        let trials = 20_000;
        let mut landed = 0_u32;
        for _ in 0..trials {
            let mut state = plant_in(Stage::Flowering);
            if let Some(TickEvent::RaidDamage { percent, .. }) =
                check_raider_attack(&mut state, DefenseKind::PestDefense, &chances, &mut rng)
            {
                assert!((3..=10).contains(&percent));
                landed += 1;
            }
        }
        // Species are equally likely: (0.3 + 0.35) / 2.
        let rate = f64::from(landed) / f64::from(trials);
        assert!((rate - 0.325).abs() < 0.02, "rate was {rate}");
    }

    #[test]
    fn nutrient_boost_adds_five_to_fifteen_percent() {
        let mut rng = SmallRng::seed_from_u64(9);
        let chances = always(|c| {
            c.nutrient_boost = 1.0;
            c.nutrient_boost_success = 1.0;
        });
        for _ in 0..500 {
            let mut state = plant_in(Stage::Flowering);
            let event = check_nutrient_boost(&mut state, &chances, &mut rng).unwrap();
            let TickEvent::NutrientBoost { amount } = event else {
                panic!("expected a boost");
            };
            assert!((0.05..0.15).contains(&amount));
            assert!((state.potency_boost - (1.0 + amount)).abs() < 1e-12);
        }
    }

    #[test]
    fn nutrient_boost_only_while_flowering() {
        let mut rng = SmallRng::seed_from_u64(9);
        let chances = always(|c| c.nutrient_boost = 1.0);
        let mut state = plant_in(Stage::Vegetative);
        assert!(check_nutrient_boost(&mut state, &chances, &mut rng).is_none());
        let mut state = plant_in(Stage::Flowering);
        assert_eq!(
            check_nutrient_boost(&mut state, &chances, &mut rng),
            Some(TickEvent::NutrientMiss)
        );
    }

    #[test]
    fn act_of_god_fires_once() {
        let mut rng = SmallRng::seed_from_u64(5);
        let chances = always(|c| c.act_of_god = 1.0);
        let mut state = plant_in(Stage::Vegetative);
        assert!(check_act_of_god(&mut state, &chances, &mut rng).is_some());
        assert!(state.act_of_god_occurred);
        for _ in 0..100 {
            assert!(check_act_of_god(&mut state, &chances, &mut rng).is_none());
        }
        assert_eq!(state.events.first().unwrap().kind, EventKind::ActOfGod);
    }

    #[test]
    fn act_of_god_effects_respect_floors() {
        let mut state = plant_in(Stage::Vegetative);
        state.resources.water = 20.0;
        ActOfGod::Drought.apply(&mut state);
        assert!((state.resources.water - 10.0).abs() < f64::EPSILON);

        state.resources.stress = 95.0;
        ActOfGod::StrangeEnergy.apply(&mut state);
        assert!((state.resources.stress - 100.0).abs() < f64::EPSILON);

        state.lights_out = true;
        state.resources.light = 50.0;
        ActOfGod::SolarEclipse.apply(&mut state);
        assert!((state.resources.light - 50.0).abs() < f64::EPSILON);

        state.lights_out = false;
        ActOfGod::SolarEclipse.apply(&mut state);
        assert!((state.resources.light - 10.0).abs() < f64::EPSILON);
    }

    #[test]
    fn headline_slot_admits_one_event() {
        let mut rng = SmallRng::seed_from_u64(1);
        let chances = always(|c| {
            c.pest_attack = 1.0;
            c.raider_attack = 1.0;
            c.nutrient_boost = 1.0;
        });
        let mut state = plant_in(Stage::Flowering);
        let fired = roll_tick_events(&mut state, DefenseKind::Vault, &chances, &mut rng, false);
        assert_eq!(fired.len(), 1);
        assert!(matches!(
            fired.first(),
            Some(TickEvent::PestDamage { .. } | TickEvent::Repelled { .. })
        ));

        let fired = roll_tick_events(&mut state, DefenseKind::Vault, &chances, &mut rng, true);
        assert!(fired.is_empty());
    }

    #[test]
    fn act_of_god_ignores_headline_slot() {
        let mut rng = SmallRng::seed_from_u64(1);
        let chances = always(|c| c.act_of_god = 1.0);
        let mut state = plant_in(Stage::Sprout);
        let fired = roll_tick_events(&mut state, DefenseKind::Vault, &chances, &mut rng, true);
        assert!(matches!(fired.as_slice(), [TickEvent::ActOfGod(_)]));
    }

    #[test]
    fn pest_trigger_frequency_is_five_percent() {
        let mut rng = SmallRng::seed_from_u64(2024);
        let chances = EventChances::default();
        let trials = 100_000;
        let mut fired = 0_u32;
        for _ in 0..trials {
            let mut state = plant_in(Stage::Vegetative);
            if check_pest_attack(&mut state, DefenseKind::PestDefense, &chances, &mut rng).is_some()
            {
                fired += 1;
            }
        }
        let rate = f64::from(fired) / f64::from(trials);
        assert!((rate - 0.05).abs() < 0.005, "rate was {rate}");
    }

    /// Fraction of `trials` fresh plants in `stage` for which `check` fires.
    fn trigger_rate(
        stage: Stage,
        trials: u32,
        rng: &mut SmallRng,
        mut check: impl FnMut(&mut LiveGameState, &mut SmallRng) -> Option<TickEvent>,
    ) -> f64 {
        let mut fired = 0_u32;
        for _ in 0..trials {
            let mut state = plant_in(stage);
            if check(&mut state, rng).is_some() {
                fired += 1;
            }
        }
        f64::from(fired) / f64::from(trials)
    }

    #[test]
    fn raider_trigger_frequency_is_four_percent() {
        let mut rng = SmallRng::seed_from_u64(404);
        let chances = EventChances::default();
        for stage in [Stage::Vegetative, Stage::Flowering] {
            let rate = trigger_rate(stage, 100_000, &mut rng, |state, rng| {
                check_raider_attack(state, DefenseKind::RaiderDefense, &chances, rng)
            });
            assert!((rate - 0.04).abs() < 0.004, "{stage:?} rate was {rate}");
        }
        let rate = trigger_rate(Stage::Sprout, 100_000, &mut rng, |state, rng| {
            check_raider_attack(state, DefenseKind::Vault, &chances, rng)
        });
        assert!(rate.abs() < f64::EPSILON);
    }

    #[test]
    fn nutrient_boost_triggers_three_percent_and_splits_evenly() {
        let mut rng = SmallRng::seed_from_u64(303);
        let chances = EventChances::default();
        let trials = 100_000_u32;
        let mut triggered = 0_u32;
        let mut boosted = 0_u32;
        for _ in 0..trials {
            let mut state = plant_in(Stage::Flowering);
            match check_nutrient_boost(&mut state, &chances, &mut rng) {
                Some(TickEvent::NutrientBoost { .. }) => {
                    triggered += 1;
                    boosted += 1;
                }
                Some(TickEvent::NutrientMiss) => triggered += 1,
                Some(other) => panic!("unexpected event {other:?}"),
                None => {}
            }
        }
        let rate = f64::from(triggered) / f64::from(trials);
        assert!((rate - 0.03).abs() < 0.004, "trigger rate was {rate}");
        let split = f64::from(boosted) / f64::from(triggered);
        assert!((split - 0.5).abs() < 0.04, "success share was {split}");
    }

    #[test]
    fn act_of_god_frequency_is_half_a_percent() {
        let mut rng = SmallRng::seed_from_u64(505);
        let chances = EventChances::default();
        let rate = trigger_rate(Stage::Vegetative, 100_000, &mut rng, |state, rng| {
            check_act_of_god(state, &chances, rng)
        });
        assert!((rate - 0.005).abs() < 0.0015, "rate was {rate}");
    }

    #[test]
    fn lights_failure_frequency_is_three_percent() {
        let mut rng = SmallRng::seed_from_u64(606);
        let chances = EventChances::default();
        let rate = trigger_rate(Stage::Sprout, 100_000, &mut rng, |state, rng| {
            check_lights_failure(state, &chances, rng)
        });
        assert!((rate - 0.03).abs() < 0.004, "rate was {rate}");
    }
}
