//! Player actions that change the live plant between ticks.

use marrow_types::{LightSource, LiveGameState, PlantEvent};

use crate::error::SimError;

/// Restore failed lights. Returns `false` when the lights were already on.
pub fn fix_lights(state: &mut LiveGameState) -> bool {
    if !state.lights_out {
        return false;
    }
    state.lights_out = false;
    state.lights_off_timer = 0;
    state.resources.light = 100.0;
    state.push_event(PlantEvent::info("Lights back on!"));
    true
}

/// Install a different light, provided the player has unlocked it.
pub fn switch_light_source(
    state: &mut LiveGameState,
    light: LightSource,
    total_yield: u64,
) -> Result<(), SimError> {
    if !light.is_unlocked(total_yield) {
        return Err(SimError::LightLocked {
            light: light.label(),
            required: light.unlock_yield(),
            total_yield,
        });
    }
    if state.light_source != light {
        state.light_source = light;
        state.push_event(PlantEvent::info(format!("Switched to {}.", light.label())));
    }
    Ok(())
}
