//! One grow session, from planting to harvest or death.
//!
//! A [`Session`] owns the live plant, the chosen defense, and the RNG that
//! drives every roll. It is created by [`Session::start`], which checks the
//! player's selections, takes a per-player lease from the
//! [`SessionRegistry`], and spends one life. The per-tick pipeline lives in
//! [`crate::tick`].

use std::collections::BTreeSet;
use std::sync::{Arc, Mutex, PoisonError};

use marrow_sim::EventChances;
use marrow_sim::error::SimError;
use marrow_sim::{fix_lights, resolve_drain_rates, roll_seed_search, switch_light_source};
use marrow_types::{
    DefenseKind, EventKind, FeedingSchedule, LightSource, LiveGameState, PlantEvent, PlayerId,
    SessionId, SessionInput, SessionOutcome,
};
use rand::Rng;
use tracing::{info, warn};

use crate::lives::{LivesAccount, LivesError};

/// Errors raised when starting or acting on a session.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Seed, soil, or defense was not chosen.
    #[error("missing selection: {field}")]
    MissingSelection {
        /// Which selection is missing.
        field: &'static str,
    },

    /// A feeding slot holds an amount above the allowed maximum.
    #[error("feeding schedule month {month} amount {amount} exceeds {max}")]
    InvalidFeedingSchedule {
        /// One-based month of the bad slot.
        month: usize,
        /// The rejected amount.
        amount: u8,
        /// Largest accepted amount.
        max: u8,
    },

    /// The player already has a plant growing.
    #[error("player {user_id} already has an active session")]
    AlreadyActive {
        /// The player.
        user_id: PlayerId,
    },

    /// The player has no lives to spend.
    #[error("no seed lives left")]
    NoLives,

    /// Reading or writing lives failed.
    #[error("lives error: {source}")]
    Lives {
        /// The underlying lives error.
        #[from]
        source: LivesError,
    },

    /// A simulation rule rejected the action.
    #[error("simulation error: {source}")]
    Sim {
        /// The underlying simulation error.
        #[from]
        source: SimError,
    },

    /// The action needs a harvested plant.
    #[error("the plant has not been harvested")]
    NotHarvested,

    /// The post-harvest seed search was already used.
    #[error("the seed search was already used this session")]
    SeedSearchUsed,

    /// The session already ended.
    #[error("the session has already ended")]
    Finished,
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Tracks which players have a session running.
///
/// Clones share the same set. A [`SessionLease`] removes its player when
/// dropped, so a finished or abandoned session frees the slot.
#[derive(Debug, Clone, Default)]
pub struct SessionRegistry {
    active: Arc<Mutex<BTreeSet<PlayerId>>>,
}

impl SessionRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the slot for `user_id`, or `None` if it is taken.
    pub fn acquire(&self, user_id: PlayerId) -> Option<SessionLease> {
        let mut active = self.active.lock().unwrap_or_else(PoisonError::into_inner);
        if !active.insert(user_id) {
            return None;
        }
        Some(SessionLease {
            user_id,
            active: Arc::clone(&self.active),
        })
    }

    /// Whether `user_id` has a session running.
    pub fn is_active(&self, user_id: PlayerId) -> bool {
        self.active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&user_id)
    }
}

/// A held slot in a [`SessionRegistry`].
#[derive(Debug)]
pub struct SessionLease {
    user_id: PlayerId,
    active: Arc<Mutex<BTreeSet<PlayerId>>>,
}

impl Drop for SessionLease {
    fn drop(&mut self) {
        self.active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.user_id);
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// A running grow session.
#[derive(Debug)]
pub struct Session<R> {
    pub(crate) id: SessionId,
    pub(crate) user_id: PlayerId,
    pub(crate) state: LiveGameState,
    pub(crate) defense: DefenseKind,
    pub(crate) feeding_schedule: Option<FeedingSchedule>,
    pub(crate) chances: EventChances,
    pub(crate) rng: R,
    pub(crate) outcome: Option<SessionOutcome>,
    pub(crate) total_yield: u64,
    seed_search_used: bool,
    _lease: SessionLease,
}

impl<R: Rng> Session<R> {
    /// Plant a new seed.
    ///
    /// Checks run in order: selections present, feeding schedule in range,
    /// no other session for the player, at least one life. Only when all
    /// pass is one life spent and the plant created. On any error nothing
    /// is mutated.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::MissingSelection`],
    /// [`SessionError::InvalidFeedingSchedule`],
    /// [`SessionError::AlreadyActive`], [`SessionError::NoLives`], or
    /// [`SessionError::Lives`] if the lives store fails.
    pub fn start(
        input: SessionInput,
        lives: &mut dyn LivesAccount,
        registry: &SessionRegistry,
        chances: EventChances,
        rng: R,
    ) -> Result<Self, SessionError> {
        let seed = input
            .seed
            .ok_or(SessionError::MissingSelection { field: "seed" })?;
        let soil = input
            .soil
            .ok_or(SessionError::MissingSelection { field: "soil" })?;
        let defense = input
            .defense
            .ok_or(SessionError::MissingSelection { field: "defense" })?;
        if let Some(schedule) = &input.feeding_schedule {
            validate_feeding_schedule(schedule)?;
        }

        let lease = registry
            .acquire(input.user_id)
            .ok_or(SessionError::AlreadyActive {
                user_id: input.user_id,
            })?;

        let current = lives.lives()?;
        let remaining = current.checked_sub(1).ok_or(SessionError::NoLives)?;
        lives.set_lives(remaining)?;

        let (water_rate, nutrient_rate) = resolve_drain_rates(&seed, &soil);
        let state = LiveGameState::new(seed.name, water_rate, nutrient_rate);
        let id = SessionId::new();

        info!(
            session_id = %id,
            user_id = %input.user_id,
            plant = %state.plant_name,
            soil = %soil.name,
            defense = ?defense.kind,
            water_rate,
            nutrient_rate,
            lives_left = remaining,
            "Session started"
        );

        Ok(Self {
            id,
            user_id: input.user_id,
            state,
            defense: defense.kind,
            feeding_schedule: input.feeding_schedule,
            chances,
            rng,
            outcome: None,
            total_yield: 0,
            seed_search_used: false,
            _lease: lease,
        })
    }

    /// Record the player's lifetime yield so better lights can unlock.
    #[must_use]
    pub const fn with_total_yield(mut self, total_yield: u64) -> Self {
        self.total_yield = total_yield;
        self
    }

    /// Session identifier.
    pub const fn id(&self) -> SessionId {
        self.id
    }

    /// Player growing this plant.
    pub const fn user_id(&self) -> PlayerId {
        self.user_id
    }

    /// The current plant.
    pub const fn state(&self) -> &LiveGameState {
        &self.state
    }

    /// The chosen defense.
    pub const fn defense(&self) -> DefenseKind {
        self.defense
    }

    /// The feeding plan chosen at start, if any.
    pub const fn feeding_schedule(&self) -> Option<&FeedingSchedule> {
        self.feeding_schedule.as_ref()
    }

    /// How the session ended, once it has.
    pub const fn outcome(&self) -> Option<&SessionOutcome> {
        self.outcome.as_ref()
    }

    /// Whether harvest or death has been resolved.
    pub const fn is_finished(&self) -> bool {
        self.outcome.is_some()
    }

    /// Turn failed lights back on. Returns `false` if they were on.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Finished`] once the session has ended.
    pub fn fix_lights(&mut self) -> Result<bool, SessionError> {
        if self.is_finished() {
            return Err(SessionError::Finished);
        }
        Ok(fix_lights(&mut self.state))
    }

    /// Install a different light.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Finished`] once the session has ended, or
    /// [`SessionError::Sim`] if the light is still locked.
    pub fn switch_light(&mut self, light: LightSource) -> Result<(), SessionError> {
        if self.is_finished() {
            return Err(SessionError::Finished);
        }
        switch_light_source(&mut self.state, light, self.total_yield)?;
        Ok(())
    }

    /// Search the spent plant for a seed. Allowed once, after harvest.
    /// Returns whether a life was found.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::NotHarvested`] unless the plant was
    /// harvested, [`SessionError::SeedSearchUsed`] on a second attempt, or
    /// [`SessionError::Lives`] if the award cannot be stored.
    pub fn search_for_seeds(&mut self, lives: &mut dyn LivesAccount) -> Result<bool, SessionError> {
        if !matches!(self.outcome, Some(SessionOutcome::Harvested { .. })) {
            return Err(SessionError::NotHarvested);
        }
        if self.seed_search_used {
            return Err(SessionError::SeedSearchUsed);
        }
        self.seed_search_used = true;

        let found = roll_seed_search(&self.chances, &mut self.rng);
        if found {
            let total = lives.lives()?.saturating_add(1);
            lives.set_lives(total)?;
            self.state.push_event(
                PlantEvent::info(format!("Cosmic winds blessed you! +1 Marrow Seed! Total: {total}"))
                    .titled("Seed Found!"),
            );
            info!(session_id = %self.id, lives = total, "Seed search found a life");
        } else {
            self.state
                .push_event(PlantEvent::new(EventKind::Warning, "The void offers no seeds..."));
        }
        Ok(found)
    }

    /// Put a notice on the event feed without touching the simulation.
    pub fn push_notice(&mut self, event: PlantEvent) {
        self.state.push_event(event);
    }

    /// Record a harvest sync failure on the feed. The local result stands.
    pub fn note_sync_failure(&mut self, reason: &str) {
        warn!(session_id = %self.id, reason, "Harvest sync failed");
        self.push_notice(
            PlantEvent::new(EventKind::Warning, "Harvest saved locally; sync failed.")
                .titled("Sync Failed"),
        );
    }
}

fn validate_feeding_schedule(schedule: &FeedingSchedule) -> Result<(), SessionError> {
    for (i, slot) in schedule.slots().iter().enumerate() {
        if slot.amount > FeedingSchedule::MAX_AMOUNT {
            return Err(SessionError::InvalidFeedingSchedule {
                month: i.saturating_add(1),
                amount: slot.amount,
                max: FeedingSchedule::MAX_AMOUNT,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::arithmetic_side_effects)]
mod tests {
    use marrow_types::{
        DefenseProfile, FeedingSlot, HarvestResult, NutrientMix, SeedProfile, Stage, catalog,
    };
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;

    #[derive(Debug, Default)]
    struct Counter(u32);

    impl LivesAccount for Counter {
        fn lives(&self) -> Result<u32, LivesError> {
            Ok(self.0)
        }

        fn set_lives(&mut self, lives: u32) -> Result<(), LivesError> {
            self.0 = lives;
            Ok(())
        }
    }

    fn input(user_id: PlayerId) -> SessionInput {
        SessionInput {
            user_id,
            seed: Some(SeedProfile {
                name: String::from("Bone Kush"),
                water_drain_rate: Some(0.7),
                nutrient_drain_rate: Some(0.3),
                image_ref: None,
            }),
            soil: catalog::soil("magic-moss").map(catalog::SoilEntry::to_profile),
            defense: Some(DefenseProfile {
                kind: DefenseKind::Vault,
                name: String::from("Vault"),
            }),
            feeding_schedule: None,
        }
    }

    fn start(
        input: SessionInput,
        lives: &mut Counter,
        registry: &SessionRegistry,
    ) -> Result<Session<SmallRng>, SessionError> {
        Session::start(
            input,
            lives,
            registry,
            EventChances::default(),
            SmallRng::seed_from_u64(7),
        )
    }

    #[test]
    fn start_spends_exactly_one_life() {
        let mut lives = Counter(3);
        let registry = SessionRegistry::new();
        let session = start(input(PlayerId::new()), &mut lives, &registry).unwrap();
        assert_eq!(lives.0, 2);

        let state = session.state();
        assert_eq!(state.plant_name, "Bone Kush");
        assert_eq!(state.stage, Stage::Sprout);
        assert_eq!(state.stage_index, 0);
        assert!(state.stage_time.abs() < f64::EPSILON);
        assert!((state.health - 100.0).abs() < f64::EPSILON);
        // Soil water rate wins over the seed's; nutrients come from the seed.
        assert!((state.water_drain_rate - 0.6).abs() < 1e-12);
        assert!((state.nutrient_drain_rate - 0.3).abs() < 1e-12);
    }

    #[test]
    fn zero_lives_rejects_without_mutation() {
        let mut lives = Counter(0);
        let registry = SessionRegistry::new();
        let user = PlayerId::new();
        let err = start(input(user), &mut lives, &registry).unwrap_err();
        assert!(matches!(err, SessionError::NoLives));
        assert_eq!(lives.0, 0);
        assert!(!registry.is_active(user));
    }

    #[test]
    fn missing_selections_are_reported_in_order() {
        let mut lives = Counter(3);
        let registry = SessionRegistry::new();

        let mut no_seed = input(PlayerId::new());
        no_seed.seed = None;
        no_seed.soil = None;
        assert!(matches!(
            start(no_seed, &mut lives, &registry),
            Err(SessionError::MissingSelection { field: "seed" })
        ));

        let mut no_defense = input(PlayerId::new());
        no_defense.defense = None;
        assert!(matches!(
            start(no_defense, &mut lives, &registry),
            Err(SessionError::MissingSelection { field: "defense" })
        ));
        assert_eq!(lives.0, 3);
    }

    #[test]
    fn overfed_schedule_is_rejected() {
        let mut lives = Counter(3);
        let registry = SessionRegistry::new();
        let mut overfed = input(PlayerId::new());
        overfed.feeding_schedule = Some(FeedingSchedule {
            month2: FeedingSlot {
                amount: 11,
                nutrient: NutrientMix::Cosmic,
            },
            ..FeedingSchedule::default()
        });
        assert!(matches!(
            start(overfed, &mut lives, &registry),
            Err(SessionError::InvalidFeedingSchedule { month: 2, amount: 11, .. })
        ));
        assert_eq!(lives.0, 3);
    }

    #[test]
    fn second_start_for_same_player_is_rejected_until_first_ends() {
        let mut lives = Counter(3);
        let registry = SessionRegistry::new();
        let user = PlayerId::new();

        let first = start(input(user), &mut lives, &registry).unwrap();
        assert!(matches!(
            start(input(user), &mut lives, &registry),
            Err(SessionError::AlreadyActive { .. })
        ));
        assert_eq!(lives.0, 2);

        drop(first);
        assert!(!registry.is_active(user));
        let _second = start(input(user), &mut lives, &registry).unwrap();
        assert_eq!(lives.0, 1);
    }

    #[test]
    fn locked_light_is_refused() {
        let mut lives = Counter(3);
        let registry = SessionRegistry::new();
        let mut session = start(input(PlayerId::new()), &mut lives, &registry).unwrap();
        assert!(matches!(
            session.switch_light(LightSource::Grow),
            Err(SessionError::Sim {
                source: SimError::LightLocked { .. }
            })
        ));

        let mut session = start(input(PlayerId::new()), &mut lives, &registry)
            .unwrap()
            .with_total_yield(600);
        session.switch_light(LightSource::Grow).unwrap();
        assert_eq!(session.state().light_source, LightSource::Grow);
    }

    #[test]
    fn seed_search_needs_a_harvest_and_runs_once() {
        let mut lives = Counter(3);
        let registry = SessionRegistry::new();
        let mut session = start(input(PlayerId::new()), &mut lives, &registry).unwrap();
        assert!(matches!(
            session.search_for_seeds(&mut lives),
            Err(SessionError::NotHarvested)
        ));

        session.outcome = Some(SessionOutcome::Harvested {
            result: HarvestResult {
                strain_name: String::from("Bone Kush"),
                weight: 50,
                potency: 25,
            },
        });
        let before = lives.0;
        let found = session.search_for_seeds(&mut lives).unwrap();
        assert_eq!(lives.0, before + u32::from(found));
        assert!(matches!(
            session.search_for_seeds(&mut lives),
            Err(SessionError::SeedSearchUsed)
        ));
    }

    #[test]
    fn actions_refused_after_the_end() {
        let mut lives = Counter(3);
        let registry = SessionRegistry::new();
        let mut session = start(input(PlayerId::new()), &mut lives, &registry).unwrap();
        session.outcome = Some(SessionOutcome::Died);
        assert!(matches!(session.fix_lights(), Err(SessionError::Finished)));
        assert!(matches!(
            session.switch_light(LightSource::Candle),
            Err(SessionError::Finished)
        ));
        assert!(matches!(
            session.search_for_seeds(&mut lives),
            Err(SessionError::NotHarvested)
        ));
    }

    #[test]
    fn sync_failure_leaves_a_notice() {
        let mut lives = Counter(1);
        let registry = SessionRegistry::new();
        let mut session = start(input(PlayerId::new()), &mut lives, &registry).unwrap();
        session.note_sync_failure("timeout");
        assert_eq!(
            session.state().events.first().unwrap().title.as_deref(),
            Some("Sync Failed")
        );
    }
}
