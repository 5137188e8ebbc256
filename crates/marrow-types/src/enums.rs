//! Enumeration types for the Marrow Grow simulation.
//!
//! Growth stages, event categories, defenses, light sources, nutrient mixes,
//! and the daily spin reel symbols.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ---------------------------------------------------------------------------
// Growth stages
// ---------------------------------------------------------------------------

/// A growth phase of the plant.
///
/// Stages advance strictly in declaration order. `Harvest` is terminal: it
/// has no duration and reaching it ends the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum Stage {
    /// First 30 seconds. Pests cannot reach a sprout.
    Sprout,
    /// 45 seconds of leafy growth. Pests and raiders are active.
    Vegetative,
    /// 60 seconds of bud growth. Nutrient surges only happen here.
    Flowering,
    /// Terminal stage; the crop is resolved.
    Harvest,
}

impl Stage {
    /// All stages in progression order.
    pub const ALL: [Self; 4] = [Self::Sprout, Self::Vegetative, Self::Flowering, Self::Harvest];

    /// Seconds (ticks) the plant must spend in this stage before advancing.
    pub const fn duration_secs(self) -> u32 {
        match self {
            Self::Sprout => 30,
            Self::Vegetative => 45,
            Self::Flowering => 60,
            Self::Harvest => 0,
        }
    }

    /// Zero-based position of this stage in the progression.
    pub const fn index(self) -> u32 {
        match self {
            Self::Sprout => 0,
            Self::Vegetative => 1,
            Self::Flowering => 2,
            Self::Harvest => 3,
        }
    }

    /// The stage that follows this one, or `None` for `Harvest`.
    pub const fn next(self) -> Option<Self> {
        match self {
            Self::Sprout => Some(Self::Vegetative),
            Self::Vegetative => Some(Self::Flowering),
            Self::Flowering => Some(Self::Harvest),
            Self::Harvest => None,
        }
    }

    /// Whether reaching this stage ends the session.
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Harvest)
    }

    /// Sum of the durations of every stage before `self`.
    pub const fn elapsed_before(self) -> u32 {
        match self {
            Self::Sprout => 0,
            Self::Vegetative => 30,
            Self::Flowering => 75,
            Self::Harvest => 135,
        }
    }

    /// Total seconds from sprout to harvest.
    pub const fn total_growth_secs() -> u32 {
        Self::Harvest.elapsed_before()
    }
}

impl core::fmt::Display for Stage {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let name = match self {
            Self::Sprout => "Sprout",
            Self::Vegetative => "Vegetative",
            Self::Flowering => "Flowering",
            Self::Harvest => "Harvest",
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// Event log
// ---------------------------------------------------------------------------

/// Severity category of a plant event log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "kebab-case")]
pub enum EventKind {
    /// Neutral or good news.
    Info,
    /// Something went wrong but no lasting harm yet.
    Warning,
    /// Lasting harm (penalty applied, life stolen, plant died).
    Danger,
    /// The once-per-session catastrophe.
    ActOfGod,
}

/// Display color tag attached to an event log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "kebab-case")]
pub enum EventColor {
    /// Informational blue.
    Blue,
    /// Harvest green.
    Green,
    /// Warning yellow.
    Yellow,
    /// Damage red.
    Red,
    /// Loss of something persistent (death, theft).
    DeepRed,
    /// Act of God purple.
    Purple,
}

impl EventKind {
    /// The color the client normally pairs with this kind.
    pub const fn default_color(self) -> EventColor {
        match self {
            Self::Info => EventColor::Blue,
            Self::Warning => EventColor::Yellow,
            Self::Danger => EventColor::Red,
            Self::ActOfGod => EventColor::Purple,
        }
    }
}

// ---------------------------------------------------------------------------
// Defenses
// ---------------------------------------------------------------------------

/// The protection a player picks before planting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "kebab-case")]
pub enum DefenseKind {
    /// Deflects every pest attack.
    PestDefense,
    /// Deflects every raid.
    RaiderDefense,
    /// Blocks corporate seed theft at harvest.
    Vault,
}

// ---------------------------------------------------------------------------
// Light sources
// ---------------------------------------------------------------------------

/// Grow light installed over the plant. Better lights multiply final yield.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "lowercase")]
pub enum LightSource {
    /// Free starter light.
    #[default]
    Candle,
    /// Unlocked at 500 lifetime yield.
    Grow,
    /// Unlocked at 5000 lifetime yield.
    Quantum,
}

impl LightSource {
    /// All light sources from cheapest to best.
    pub const ALL: [Self; 3] = [Self::Candle, Self::Grow, Self::Quantum];

    /// Multiplier applied to final harvest weight.
    pub const fn yield_bonus(self) -> f64 {
        match self {
            Self::Candle => 1.0,
            Self::Grow => 1.2,
            Self::Quantum => 1.5,
        }
    }

    /// Lifetime yield a player needs before this light may be installed.
    pub const fn unlock_yield(self) -> u64 {
        match self {
            Self::Candle => 0,
            Self::Grow => 500,
            Self::Quantum => 5000,
        }
    }

    /// Whether a player with `total_yield` lifetime grams may use this light.
    pub const fn is_unlocked(self, total_yield: u64) -> bool {
        total_yield >= self.unlock_yield()
    }

    /// Display name.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Candle => "Candle",
            Self::Grow => "Grow Light",
            Self::Quantum => "Quantum Board",
        }
    }

    /// Wire name, as used in URLs and JSON.
    pub const fn slug(self) -> &'static str {
        match self {
            Self::Candle => "candle",
            Self::Grow => "grow",
            Self::Quantum => "quantum",
        }
    }

    /// Look up a light by its wire name.
    pub fn from_slug(slug: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|light| light.slug() == slug)
    }
}

// ---------------------------------------------------------------------------
// Nutrient mixes
// ---------------------------------------------------------------------------

/// A nutrient mix selectable in the feeding schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "lowercase")]
pub enum NutrientMix {
    /// Standard, reliable feed.
    #[default]
    Basic,
    /// Bigger yields, less potency.
    Growth,
    /// More potent, less yield.
    Potent,
    /// Slight boost to both.
    Balanced,
    /// Risk of mold, big yields.
    Fungal,
    /// Super potent, stunts growth.
    Bonebroth,
    /// Ghostly, high yield, low flavor.
    Phantom,
    /// Smells bad, drains everything.
    Rotjuice,
    /// Unpredictable, sometimes amazing.
    Cosmic,
    /// Dangerous, huge yields if you survive.
    Doomdust,
}

// ---------------------------------------------------------------------------
// Daily spin
// ---------------------------------------------------------------------------

/// A symbol shown on one reel of the daily spin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "lowercase")]
pub enum SpinSymbol {
    /// Leaf.
    Leaf,
    /// Bone.
    Bone,
    /// Skull; any skull on the reels means the spin lost.
    Skull,
}
