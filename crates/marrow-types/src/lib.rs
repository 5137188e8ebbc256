//! Shared type definitions for the Marrow Grow simulation.
//!
//! This crate is the single source of truth for the data that flows between
//! the simulation, the session runtime, and the observer feed. Types are
//! exported to `TypeScript` via `ts-rs` for the game client.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrappers for sessions and players
//! - [`enums`] -- Stages, event categories, defenses, light sources, mixes
//! - [`structs`] -- Live plant state, session inputs, and outcomes
//! - [`catalog`] -- Fixed soil, defense, and nutrient mix data

pub mod catalog;
pub mod enums;
pub mod ids;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::{DefenseKind, EventColor, EventKind, LightSource, NutrientMix, SpinSymbol, Stage};
pub use ids::{PlayerId, SessionId};
pub use structs::{
    DefenseProfile, EVENT_LOG_CAPACITY, FeedingSchedule, FeedingSlot, HarvestResult,
    LiveGameState, MAX_SEED_LIVES, PlantEvent, ProfileSnapshot, Resources, SeedProfile,
    SessionInput, SessionOutcome, SoilProfile, SpinOutcome,
};

#[cfg(test)]
mod tests {
    //! `TypeScript` binding generation.

    #[test]
    fn export_bindings() {
        // Calling export_all writes every #[ts(export)] type into the
        // crate-relative `bindings/` directory.
        use ts_rs::TS;

        // IDs
        let _ = crate::ids::SessionId::export_all();
        let _ = crate::ids::PlayerId::export_all();

        // Enums
        let _ = crate::enums::Stage::export_all();
        let _ = crate::enums::EventKind::export_all();
        let _ = crate::enums::EventColor::export_all();
        let _ = crate::enums::DefenseKind::export_all();
        let _ = crate::enums::LightSource::export_all();
        let _ = crate::enums::NutrientMix::export_all();
        let _ = crate::enums::SpinSymbol::export_all();

        // Structs
        let _ = crate::structs::Resources::export_all();
        let _ = crate::structs::PlantEvent::export_all();
        let _ = crate::structs::SeedProfile::export_all();
        let _ = crate::structs::SoilProfile::export_all();
        let _ = crate::structs::DefenseProfile::export_all();
        let _ = crate::structs::FeedingSlot::export_all();
        let _ = crate::structs::FeedingSchedule::export_all();
        let _ = crate::structs::SessionInput::export_all();
        let _ = crate::structs::LiveGameState::export_all();
        let _ = crate::structs::HarvestResult::export_all();
        let _ = crate::structs::SessionOutcome::export_all();
        let _ = crate::structs::SpinOutcome::export_all();
        let _ = crate::structs::ProfileSnapshot::export_all();

        // Catalog
        let _ = crate::catalog::SoilEntry::export_all();
        let _ = crate::catalog::DefenseEntry::export_all();
        let _ = crate::catalog::NutrientMixInfo::export_all();
    }
}
