//! Plant growth, random events, and harvest resolution for Marrow Grow.
//!
//! This crate is the logic layer for a single plant: everything that
//! operates on [`LiveGameState`](marrow_types::LiveGameState) without
//! touching storage, clocks, or the network. Randomness is always injected
//! as a generic [`rand::Rng`] so every roll is reproducible under a seed.
//!
//! # Modules
//!
//! - [`actions`] -- Player actions between ticks (fix lights, switch light)
//! - [`config`] -- Tunable event probabilities ([`EventChances`])
//! - [`error`] -- Error types for simulation logic ([`SimError`])
//! - [`events`] -- Lights failure, pests, raiders, nutrient surges, Acts of God
//! - [`harvest`] -- Crop resolution, corporate theft, seed search
//! - [`resources`] -- Per-tick drain, light, health, and stress model
//! - [`stage`] -- Stage clock and growth progress
//! - [`validation`] -- Range and monotonicity checks before a tick commits

pub mod actions;
pub mod config;
pub mod error;
pub mod events;
pub mod harvest;
pub mod resources;
pub mod stage;
pub mod validation;

// Re-export primary types at crate root for convenience.
pub use actions::{fix_lights, switch_light_source};
pub use config::EventChances;
pub use error::SimError;
pub use events::{ActOfGod, TickEvent, roll_tick_events};
pub use harvest::{TheftOutcome, calculate_harvest, check_corporate_theft, roll_seed_search};
pub use resources::{ResourceTick, apply_resource_tick, resolve_drain_rates, round_state};
pub use stage::{StageAdvance, advance_stage};
pub use validation::{validate_state, validate_transition};
