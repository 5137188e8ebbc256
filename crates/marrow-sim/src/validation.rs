//! State validation run before a computed tick is committed.
//!
//! A tick is computed on a copy of the plant. [`validate_transition`] checks
//! the copy against the previous state; on error the copy is discarded and
//! the previous state stays in place.

use marrow_types::LiveGameState;

use crate::error::SimError;
use crate::events::PENALTY_FLOOR;

/// Slack allowed for floating-point noise.
const EPSILON: f64 = 1e-9;

fn in_range(field: &'static str, value: f64, min: f64, max: f64) -> Result<(), SimError> {
    if !value.is_finite() {
        return Err(SimError::InvariantViolated {
            field,
            value,
            reason: "not finite",
        });
    }
    if value < min - EPSILON || value > max + EPSILON {
        return Err(SimError::InvariantViolated {
            field,
            value,
            reason: "out of range",
        });
    }
    Ok(())
}

/// Check the value ranges of a single state.
pub fn validate_state(state: &LiveGameState) -> Result<(), SimError> {
    in_range("health", state.health, 0.0, 100.0)?;
    in_range("water", state.resources.water, 0.0, 100.0)?;
    in_range("light", state.resources.light, 0.0, 100.0)?;
    in_range("nutrients", state.resources.nutrients, 0.0, 100.0)?;
    in_range("stress", state.resources.stress, 0.0, 100.0)?;
    in_range("growth_progress", state.growth_progress, 0.0, 100.0)?;
    in_range("pest_penalty", state.pest_penalty, PENALTY_FLOOR, 1.0)?;
    in_range("raider_penalty", state.raider_penalty, PENALTY_FLOOR, 1.0)?;
    in_range("potency_boost", state.potency_boost, 0.1, f64::MAX)?;
    in_range("health_sum", state.health_sum, 0.0, f64::MAX)?;
    Ok(())
}

/// Check `next` on its own and against the state it replaces.
pub fn validate_transition(prev: &LiveGameState, next: &LiveGameState) -> Result<(), SimError> {
    validate_state(next)?;
    if next.stage_index < prev.stage_index {
        return Err(SimError::InvariantViolated {
            field: "stage_index",
            value: f64::from(next.stage_index),
            reason: "moved backwards",
        });
    }
    let monotonic = [
        (
            "growth_progress",
            next.growth_progress < prev.growth_progress - EPSILON,
            next.growth_progress,
        ),
        (
            "pest_penalty",
            next.pest_penalty > prev.pest_penalty + EPSILON,
            next.pest_penalty,
        ),
        (
            "raider_penalty",
            next.raider_penalty > prev.raider_penalty + EPSILON,
            next.raider_penalty,
        ),
    ];
    for (field, broken, value) in monotonic {
        if broken {
            return Err(SimError::InvariantViolated {
                field,
                value,
                reason: "moved the wrong way",
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_state_is_valid() {
        let state = LiveGameState::new("Test", 0.5, 0.5);
        assert!(validate_state(&state).is_ok());
        assert!(validate_transition(&state, &state).is_ok());
    }

    #[test]
    fn nan_health_is_rejected() {
        let mut state = LiveGameState::new("Test", 0.5, 0.5);
        state.health = f64::NAN;
        assert!(matches!(
            validate_state(&state),
            Err(SimError::InvariantViolated { field: "health", .. })
        ));
    }

    #[test]
    fn rising_penalty_is_rejected() {
        let mut prev = LiveGameState::new("Test", 0.5, 0.5);
        prev.pest_penalty = 0.5;
        let mut next = prev.clone();
        next.pest_penalty = 0.6;
        assert!(matches!(
            validate_transition(&prev, &next),
            Err(SimError::InvariantViolated { field: "pest_penalty", .. })
        ));
    }

    #[test]
    fn regressing_progress_is_rejected() {
        let mut prev = LiveGameState::new("Test", 0.5, 0.5);
        prev.growth_progress = 40.0;
        let mut next = prev.clone();
        next.growth_progress = 39.0;
        assert!(validate_transition(&prev, &next).is_err());
    }
}
