//! Engine configuration

use crate::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Tunable rules parameters
///
/// Every field has a default, so a JSON config file only needs to name the
/// fields it overrides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub starting_life: i32,
    /// Poison counters at which a player loses
    pub poison_threshold: u32,
    pub max_hand_size: usize,
    pub max_lands_per_turn: u8,
    /// Upper bound on state-based action passes in one fixpoint
    pub sba_iteration_limit: usize,
    /// Panic on invariant violations instead of logging them
    pub strict_invariants: bool,
    /// The starting player skips the draw of the first turn
    pub skip_first_draw: bool,
    /// Turn limit used by the game driver
    pub max_turns: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            starting_life: 20,
            poison_threshold: 10,
            max_hand_size: 7,
            max_lands_per_turn: 1,
            sba_iteration_limit: 64,
            strict_invariants: cfg!(debug_assertions),
            skip_first_draw: true,
            max_turns: 200,
        }
    }
}

impl EngineConfig {
    /// Load from a JSON file
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn with_starting_life(mut self, life: i32) -> Self {
        self.starting_life = life;
        self
    }

    pub fn with_poison_threshold(mut self, threshold: u32) -> Self {
        self.poison_threshold = threshold;
        self
    }

    pub fn with_max_hand_size(mut self, size: usize) -> Self {
        self.max_hand_size = size;
        self
    }

    pub fn with_sba_iteration_limit(mut self, limit: usize) -> Self {
        self.sba_iteration_limit = limit;
        self
    }

    pub fn with_strict_invariants(mut self, strict: bool) -> Self {
        self.strict_invariants = strict;
        self
    }

    pub fn with_skip_first_draw(mut self, skip: bool) -> Self {
        self.skip_first_draw = skip;
        self
    }

    pub fn with_max_turns(mut self, turns: u32) -> Self {
        self.max_turns = turns;
        self
    }
}
