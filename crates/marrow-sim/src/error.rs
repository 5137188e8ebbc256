//! Error types for the marrow-sim crate.
//!
//! Simulation steps never panic. A step that would leave the plant in an
//! impossible state reports it here so the caller can discard the step.

/// Errors raised by simulation logic.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SimError {
    /// A computed value left its allowed range or stopped being finite.
    #[error("invariant violated: {field} = {value} ({reason})")]
    InvariantViolated {
        /// Name of the offending field.
        field: &'static str,
        /// The value that was produced.
        value: f64,
        /// Which rule it broke.
        reason: &'static str,
    },

    /// A configured probability is not in `[0, 1]`.
    #[error("chance `{name}` must be within [0, 1], got {value}")]
    InvalidChance {
        /// Name of the chance.
        name: &'static str,
        /// The rejected value.
        value: f64,
    },

    /// The light source is still locked for this player.
    #[error("{light} unlocks at {required} lifetime yield, player has {total_yield}")]
    LightLocked {
        /// Display name of the light.
        light: &'static str,
        /// Lifetime yield needed.
        required: u64,
        /// The player's lifetime yield.
        total_yield: u64,
    },
}
