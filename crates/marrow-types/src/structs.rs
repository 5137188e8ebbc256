//! Core data structs for the Marrow Grow simulation.
//!
//! Covers the live plant state that every tick rewrites, the player's
//! pre-session selections, and the terminal outcomes a session can emit.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{
    DefenseKind, EventColor, EventKind, LightSource, NutrientMix, SpinSymbol, Stage,
};
use crate::ids::{PlayerId, SessionId};

/// Maximum number of entries kept in [`LiveGameState::events`].
pub const EVENT_LOG_CAPACITY: usize = 5;

/// Lives a player is reset to once per calendar day.
pub const MAX_SEED_LIVES: u32 = 3;

// ---------------------------------------------------------------------------
// Resources
// ---------------------------------------------------------------------------

/// The four gauges the player has to keep in range. Each lies in `[0, 100]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Resources {
    /// Soil moisture.
    pub water: f64,
    /// Light intensity reaching the plant.
    pub light: f64,
    /// Nutrients remaining in the soil.
    pub nutrients: f64,
    /// Accumulated plant stress.
    pub stress: f64,
}

impl Default for Resources {
    fn default() -> Self {
        Self {
            water: 80.0,
            light: 100.0,
            nutrients: 80.0,
            stress: 0.0,
        }
    }
}

// ---------------------------------------------------------------------------
// Event log
// ---------------------------------------------------------------------------

/// One human-readable entry in the session's event log.
///
/// Events are observational only; the simulation never reads them back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct PlantEvent {
    /// Severity category.
    pub kind: EventKind,
    /// Optional bold headline ("Pest Attack!", "Raid!").
    pub title: Option<String>,
    /// Body text.
    pub message: String,
    /// Display color.
    pub color: EventColor,
}

impl PlantEvent {
    /// Build an event using the default color for `kind`.
    pub fn new(kind: EventKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            title: None,
            message: message.into(),
            color: kind.default_color(),
        }
    }

    /// Informational event without a title.
    pub fn info(message: impl Into<String>) -> Self {
        Self::new(EventKind::Info, message)
    }

    /// Attach a headline.
    #[must_use]
    pub fn titled(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Override the display color.
    #[must_use]
    pub const fn colored(mut self, color: EventColor) -> Self {
        self.color = color;
        self
    }
}

// ---------------------------------------------------------------------------
// Session selections
// ---------------------------------------------------------------------------

/// The seed strain the player plants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct SeedProfile {
    /// Strain name; becomes the plant's display name.
    pub name: String,
    /// Water lost per second (scaled by 0.1 per tick). Used when the soil
    /// does not specify one.
    pub water_drain_rate: Option<f64>,
    /// Nutrients lost per second (scaled by 0.1 per tick).
    pub nutrient_drain_rate: Option<f64>,
    /// Image path for the client.
    pub image_ref: Option<String>,
}

/// The soil the seed is planted in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct SoilProfile {
    /// Display name.
    pub name: String,
    /// Water lost per second; overrides the seed's rate when present.
    pub water_drain_rate: Option<f64>,
    /// Nutrient drain the soil advertises. The seed's rate governs the
    /// simulation.
    pub nutrient_drain_rate: Option<f64>,
    /// Image path for the client.
    pub image_ref: Option<String>,
}

/// The defense the player picked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct DefenseProfile {
    /// Which threat this defense neutralizes.
    pub kind: DefenseKind,
    /// Display name ("Grower", "Hound", "Vault").
    pub name: String,
}

/// One month of the feeding plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct FeedingSlot {
    /// Feed amount on a 0 to 10 scale.
    pub amount: u8,
    /// Mix fed this month.
    pub nutrient: NutrientMix,
}

/// The three-month feeding plan chosen before planting.
///
/// Carried with the session for display; it does not change the growth
/// model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct FeedingSchedule {
    /// First month.
    pub month1: FeedingSlot,
    /// Second month.
    pub month2: FeedingSlot,
    /// Third month.
    pub month3: FeedingSlot,
}

impl FeedingSchedule {
    /// Highest feed amount a slot accepts.
    pub const MAX_AMOUNT: u8 = 10;

    /// The three slots in month order.
    pub const fn slots(&self) -> [FeedingSlot; 3] {
        [self.month1, self.month2, self.month3]
    }
}

/// Everything a player chooses before a session may start.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct SessionInput {
    /// Player starting the session.
    pub user_id: PlayerId,
    /// Chosen seed. Required.
    pub seed: Option<SeedProfile>,
    /// Chosen soil. Required.
    pub soil: Option<SoilProfile>,
    /// Chosen defense. Required.
    pub defense: Option<DefenseProfile>,
    /// Optional feeding plan.
    pub feeding_schedule: Option<FeedingSchedule>,
}

// ---------------------------------------------------------------------------
// Live state
// ---------------------------------------------------------------------------

/// The complete state of a growing plant.
///
/// One instance per active session. Every tick computes a full replacement
/// from the previous value; observers only ever see whole snapshots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct LiveGameState {
    /// Display label taken from the seed.
    pub plant_name: String,
    /// Current growth stage.
    pub stage: Stage,
    /// Index of [`Self::stage`]; never decreases.
    pub stage_index: u32,
    /// Seconds spent in the current stage.
    pub stage_time: f64,
    /// Seconds from sprout to harvest.
    pub total_growth_time: f64,
    /// Percentage of the whole grow completed, `[0, 100]`; never decreases.
    pub growth_progress: f64,
    /// Plant health, `[0, 100]`. Zero is death.
    pub health: f64,
    /// Sum of health after every tick, for the harvest average.
    pub health_sum: f64,
    /// Number of ticks summed into [`Self::health_sum`].
    pub health_ticks: u64,
    /// Water, light, nutrient, and stress gauges.
    pub resources: Resources,
    /// Whether the light has failed and awaits a fix.
    pub lights_out: bool,
    /// Consecutive ticks spent in the dark.
    pub lights_off_timer: u32,
    /// Potency multiplier eroded by pests, `[0.1, 1]`.
    pub pest_penalty: f64,
    /// Yield multiplier eroded by raiders, `[0.1, 1]`.
    pub raider_penalty: f64,
    /// Potency multiplier raised by nutrient surges, at least 0.1.
    pub potency_boost: f64,
    /// Water drained per second for this session.
    pub water_drain_rate: f64,
    /// Nutrients drained per second for this session.
    pub nutrient_drain_rate: f64,
    /// Installed light.
    pub light_source: LightSource,
    /// Most recent events, newest first, at most [`EVENT_LOG_CAPACITY`].
    pub events: Vec<PlantEvent>,
    /// Set once the session's single Act of God has happened.
    pub act_of_god_occurred: bool,
    /// Ticks applied so far.
    pub tick: u64,
}

impl LiveGameState {
    /// Fresh sprout at full health with the default gauges.
    pub fn new(plant_name: impl Into<String>, water_drain_rate: f64, nutrient_drain_rate: f64) -> Self {
        let plant_name = plant_name.into();
        let opening = PlantEvent::info(format!("Your \"{plant_name}\" journey begins!"));
        Self {
            plant_name,
            stage: Stage::Sprout,
            stage_index: Stage::Sprout.index(),
            stage_time: 0.0,
            total_growth_time: f64::from(Stage::total_growth_secs()),
            growth_progress: 0.0,
            health: 100.0,
            health_sum: 0.0,
            health_ticks: 0,
            resources: Resources::default(),
            lights_out: false,
            lights_off_timer: 0,
            pest_penalty: 1.0,
            raider_penalty: 1.0,
            potency_boost: 1.0,
            water_drain_rate,
            nutrient_drain_rate,
            light_source: LightSource::default(),
            events: vec![opening],
            act_of_god_occurred: false,
            tick: 0,
        }
    }

    /// Prepend an event, dropping the oldest beyond [`EVENT_LOG_CAPACITY`].
    pub fn push_event(&mut self, event: PlantEvent) {
        self.events.insert(0, event);
        self.events.truncate(EVENT_LOG_CAPACITY);
    }

    /// Whether the plant has died.
    pub const fn is_dead(&self) -> bool {
        self.health <= 0.0
    }
}

// ---------------------------------------------------------------------------
// Outcomes
// ---------------------------------------------------------------------------

/// The resolved crop. Computed once per session and never changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct HarvestResult {
    /// Strain that was grown.
    pub strain_name: String,
    /// Grams harvested, `[1, 200]`.
    pub weight: u32,
    /// Potency score, `[0, 70]`.
    pub potency: u32,
}

/// How a session ended. Exactly one is produced per session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SessionOutcome {
    /// The plant reached harvest.
    Harvested {
        /// The resolved crop.
        result: HarvestResult,
    },
    /// Health reached zero first.
    Died,
}

impl SessionOutcome {
    /// The harvest result, if the plant survived.
    pub const fn harvest(&self) -> Option<&HarvestResult> {
        match self {
            Self::Harvested { result } => Some(result),
            Self::Died => None,
        }
    }
}

/// Result of one daily spin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct SpinOutcome {
    /// Whether the spin paid out.
    pub won: bool,
    /// Lives added to the player's balance.
    pub lives_awarded: u32,
    /// Reel symbols to display.
    pub reels: [SpinSymbol; 3],
}

/// Read-only view of a player's persistent bookkeeping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ProfileSnapshot {
    /// Seed lives remaining today.
    pub lives: u32,
    /// When the player last spun, if ever.
    pub last_spin_at: Option<DateTime<Utc>>,
    /// Whether a spin is available right now.
    pub spin_available: bool,
    /// Session currently growing, if any.
    pub active_session: Option<SessionId>,
}
