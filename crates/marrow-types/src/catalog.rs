//! Static selection catalogs: soils, defenses, and nutrient mixes.
//!
//! Seeds are managed by the backend and arrive as [`SeedProfile`] values;
//! everything else the player picks from is fixed data that ships with the
//! game.
//!
//! [`SeedProfile`]: crate::structs::SeedProfile

use serde::Serialize;
use ts_rs::TS;

use crate::enums::{DefenseKind, NutrientMix};
use crate::structs::{DefenseProfile, SoilProfile};

/// A catalog soil entry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct SoilEntry {
    /// Stable identifier used by the selection screen.
    pub id: &'static str,
    /// Display name.
    pub name: &'static str,
    /// Short flavor text.
    pub description: &'static str,
    /// Water drained per second.
    pub water_drain_rate: f64,
    /// Nutrients drained per second.
    pub nutrient_drain_rate: f64,
    /// Image path.
    pub image_ref: &'static str,
}

impl SoilEntry {
    /// Convert into the session input shape.
    pub fn to_profile(&self) -> SoilProfile {
        SoilProfile {
            name: self.name.to_owned(),
            water_drain_rate: Some(self.water_drain_rate),
            nutrient_drain_rate: Some(self.nutrient_drain_rate),
            image_ref: Some(self.image_ref.to_owned()),
        }
    }
}

/// All selectable soils.
pub const SOILS: [SoilEntry; 3] = [
    SoilEntry {
        id: "bone-dust",
        name: "Bone Dust",
        description: "Favors nutrient retention.",
        water_drain_rate: 0.5,
        nutrient_drain_rate: 0.6,
        image_ref: "/soil/bone_dust.png",
    },
    SoilEntry {
        id: "magic-moss",
        name: "Magic Moss",
        description: "Favors water retention.",
        water_drain_rate: 0.6,
        nutrient_drain_rate: 0.4,
        image_ref: "/soil/magic_moss.png",
    },
    SoilEntry {
        id: "eh-not-sure",
        name: "Eh.. Not sure",
        description: "A balanced, mysterious mix.",
        water_drain_rate: 0.5,
        nutrient_drain_rate: 0.5,
        image_ref: "/soil/marrow_moss.png",
    },
];

/// A catalog defense entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct DefenseEntry {
    /// Stable identifier used by the selection screen.
    pub id: &'static str,
    /// Display name.
    pub name: &'static str,
    /// What the defense protects against.
    pub description: &'static str,
    /// Behavior class.
    pub kind: DefenseKind,
}

impl DefenseEntry {
    /// Convert into the session input shape.
    pub fn to_profile(&self) -> DefenseProfile {
        DefenseProfile {
            kind: self.kind,
            name: self.name.to_owned(),
        }
    }
}

/// All selectable defenses.
pub const DEFENSES: [DefenseEntry; 3] = [
    DefenseEntry {
        id: "grower",
        name: "Grower",
        description: "Defends against pests",
        kind: DefenseKind::PestDefense,
    },
    DefenseEntry {
        id: "hound",
        name: "Hound",
        description: "Defends against raiders",
        kind: DefenseKind::RaiderDefense,
    },
    DefenseEntry {
        id: "vault",
        name: "Vault",
        description: "Protects your seeds",
        kind: DefenseKind::Vault,
    },
];

/// Display data for a nutrient mix.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct NutrientMixInfo {
    /// Which mix.
    pub mix: NutrientMix,
    /// Display name.
    pub name: &'static str,
    /// Flavor text.
    pub description: &'static str,
    /// Advertised potency multiplier.
    pub potency: f64,
    /// Advertised yield multiplier.
    pub yield_multiplier: f64,
    /// Advertised feed strength.
    pub nutrient_feed: u32,
}

/// Look up a soil by its selection id.
pub fn soil(id: &str) -> Option<&'static SoilEntry> {
    SOILS.iter().find(|s| s.id == id)
}

/// Look up a defense by its selection id.
pub fn defense(id: &str) -> Option<&'static DefenseEntry> {
    DEFENSES.iter().find(|d| d.id == id)
}

/// Display data for `mix`.
pub const fn nutrient_mix(mix: NutrientMix) -> NutrientMixInfo {
    let (name, description, potency, yield_multiplier, nutrient_feed) = match mix {
        NutrientMix::Basic => ("Basic Mix", "Standard, reliable feed.", 1.0, 1.0, 10),
        NutrientMix::Growth => ("Growth Boost", "Bigger yields, less potency.", 0.9, 1.2, 25),
        NutrientMix::Potent => ("Potency Plus", "More potent, less yield.", 1.2, 0.9, 15),
        NutrientMix::Balanced => ("Balanced Blend", "Slight boost to both.", 1.1, 1.1, 18),
        NutrientMix::Fungal => ("Fungal Fizz", "Risk of mold, big yields!", 0.8, 1.3, 30),
        NutrientMix::Bonebroth => ("Bone Broth", "Super potent, stunts growth.", 1.3, 0.8, 12),
        NutrientMix::Phantom => ("Phantom Dew", "Ghostly, high yield, low flavor.", 1.0, 1.3, 22),
        NutrientMix::Rotjuice => ("Rot Juice", "Smells bad, drains everything.", 0.7, 0.7, 8),
        NutrientMix::Cosmic => ("Cosmic Compost", "Unpredictable, sometimes amazing.", 1.4, 1.0, 20),
        NutrientMix::Doomdust => ("Doom Dust", "Dangerous, huge yields if you survive.", 0.6, 1.4, 28),
    };
    NutrientMixInfo {
        mix,
        name,
        description,
        potency,
        yield_multiplier,
        nutrient_feed,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn soils_resolve_by_id() {
        let moss = soil("magic-moss").unwrap();
        assert_eq!(moss.name, "Magic Moss");
        let profile = moss.to_profile();
        assert_eq!(profile.water_drain_rate, Some(0.6));
        assert!(soil("sand").is_none());
    }

    #[test]
    fn each_defense_kind_appears_once() {
        for kind in [
            DefenseKind::PestDefense,
            DefenseKind::RaiderDefense,
            DefenseKind::Vault,
        ] {
            assert_eq!(DEFENSES.iter().filter(|d| d.kind == kind).count(), 1);
        }
        assert_eq!(defense("vault").unwrap().kind, DefenseKind::Vault);
    }

    #[test]
    fn nutrient_mix_lookup_matches_variant() {
        let info = nutrient_mix(NutrientMix::Doomdust);
        assert_eq!(info.mix, NutrientMix::Doomdust);
        assert_eq!(info.name, "Doom Dust");
        assert_eq!(info.nutrient_feed, 28);
    }
}
