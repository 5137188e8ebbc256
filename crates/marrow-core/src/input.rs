//! Player input sources.
//!
//! Before each tick the runner asks a [`PlayerInput`] what the player does
//! this tick, in addition to whatever was queued on the control handle.
//! A real UI queues commands through the observer; headless runs use
//! [`AutoTender`], and tests use [`IdleInput`].

use marrow_types::LiveGameState;

use crate::control::PlayerCommand;

/// A source of player commands.
pub trait PlayerInput: Send {
    /// Commands to apply before tick `tick`, given the current plant.
    fn commands(&mut self, tick: u64, state: &LiveGameState) -> Vec<PlayerCommand>;
}

/// A player who never does anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdleInput;

impl PlayerInput for IdleInput {
    fn commands(&mut self, _tick: u64, _state: &LiveGameState) -> Vec<PlayerCommand> {
        Vec::new()
    }
}

/// A player who fixes the lights as soon as they fail.
#[derive(Debug, Clone, Copy, Default)]
pub struct AutoTender {
    fixes: u64,
}

impl AutoTender {
    /// Create a tender with no fixes made.
    pub const fn new() -> Self {
        Self { fixes: 0 }
    }

    /// How many fixes this tender has issued.
    pub const fn fixes(&self) -> u64 {
        self.fixes
    }
}

impl PlayerInput for AutoTender {
    fn commands(&mut self, _tick: u64, state: &LiveGameState) -> Vec<PlayerCommand> {
        if state.lights_out {
            self.fixes = self.fixes.saturating_add(1);
            vec![PlayerCommand::FixLights]
        } else {
            Vec::new()
        }
    }
}
