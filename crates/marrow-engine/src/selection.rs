//! Turn the configured selection into a session start request.

use marrow_core::config::SelectionConfig;
use marrow_types::catalog::{self, DefenseEntry, SoilEntry};
use marrow_types::{PlayerId, SeedProfile, SessionInput};

use crate::error::EngineError;

/// Build the [`SessionInput`] for `user_id` from the config selection.
///
/// The soil id must name a catalog soil. The defense is looked up by kind.
pub fn session_input(
    user_id: PlayerId,
    selection: &SelectionConfig,
) -> Result<SessionInput, EngineError> {
    let soil = catalog::soil(&selection.soil)
        .map(SoilEntry::to_profile)
        .ok_or_else(|| EngineError::Selection {
            message: format!(
                "unknown soil `{}` (expected one of: {})",
                selection.soil,
                catalog::SOILS.map(|s| s.id).join(", ")
            ),
        })?;
    let defense = catalog::DEFENSES
        .iter()
        .find(|d| d.kind == selection.defense)
        .map(DefenseEntry::to_profile);

    Ok(SessionInput {
        user_id,
        seed: Some(SeedProfile {
            name: selection.seed_name.clone(),
            water_drain_rate: selection.seed_water_drain_rate,
            nutrient_drain_rate: selection.seed_nutrient_drain_rate,
            image_ref: None,
        }),
        soil: Some(soil),
        defense,
        feeding_schedule: None,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use marrow_types::DefenseKind;

    use super::*;

    #[test]
    fn default_selection_is_complete() {
        let input = session_input(PlayerId::new(), &SelectionConfig::default()).unwrap();
        assert_eq!(input.soil.unwrap().name, "Bone Dust");
        assert_eq!(input.defense.unwrap().kind, DefenseKind::PestDefense);
        assert_eq!(input.seed.unwrap().name, "Marrow Kush");
    }

    #[test]
    fn vault_defense_is_found_by_kind() {
        let selection = SelectionConfig {
            defense: DefenseKind::Vault,
            ..SelectionConfig::default()
        };
        let input = session_input(PlayerId::new(), &selection).unwrap();
        assert_eq!(input.defense.unwrap().name, "Vault");
    }

    #[test]
    fn unknown_soil_lists_the_choices() {
        let selection = SelectionConfig {
            soil: String::from("peat"),
            ..SelectionConfig::default()
        };
        let err = session_input(PlayerId::new(), &selection).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("peat"));
        assert!(message.contains("magic-moss"));
    }
}
