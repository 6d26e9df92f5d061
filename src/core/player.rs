//! Players and how they lose

use crate::core::{GameEntity, ManaPool, PlayerId, PlayerName};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Why a player lost the game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LossReason {
    /// Life total was 0 or less
    ZeroLife,
    /// Poison counters reached the threshold
    Poison,
    /// Attempted to draw from an empty library
    DrewFromEmptyLibrary,
}

impl fmt::Display for LossReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LossReason::ZeroLife => write!(f, "life total reached 0"),
            LossReason::Poison => write!(f, "too many poison counters"),
            LossReason::DrewFromEmptyLibrary => write!(f, "drew from an empty library"),
        }
    }
}

/// A seat at the table
///
/// Losing is never applied inline: life and poison only change here, and the
/// state-based action check decides when a player has lost.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: PlayerName,
    pub life: i32,
    pub poison: u32,
    pub mana_pool: ManaPool,

    /// Set once the player has lost; they then leave the game
    pub lost: Option<LossReason>,

    /// A draw was attempted with an empty library since the last check
    pub drew_from_empty_library: bool,

    pub lands_played_this_turn: u8,
    pub max_lands_per_turn: u8,
}

impl Player {
    pub fn new(id: PlayerId, name: impl Into<PlayerName>, starting_life: i32) -> Self {
        Player {
            id,
            name: name.into(),
            life: starting_life,
            poison: 0,
            mana_pool: ManaPool::new(),
            lost: None,
            drew_from_empty_library: false,
            lands_played_this_turn: 0,
            max_lands_per_turn: 1,
        }
    }

    pub fn has_lost(&self) -> bool {
        self.lost.is_some()
    }

    /// Apply a life gain (positive) or loss (negative); returns the new total
    pub fn adjust_life(&mut self, delta: i32) -> i32 {
        self.life += delta;
        self.life
    }

    /// Returns the new poison total
    pub fn add_poison(&mut self, amount: u32) -> u32 {
        self.poison = self.poison.saturating_add(amount);
        self.poison
    }

    pub fn can_play_land(&self) -> bool {
        self.lands_played_this_turn < self.max_lands_per_turn
    }

    pub fn play_land(&mut self) {
        self.lands_played_this_turn += 1;
    }

    pub fn reset_lands_played(&mut self) {
        self.lands_played_this_turn = 0;
    }

    pub fn empty_mana_pool(&mut self) {
        self.mana_pool.clear();
    }
}

impl GameEntity<Player> for Player {
    fn id(&self) -> PlayerId {
        self.id
    }

    fn name(&self) -> &str {
        self.name.as_str()
    }
}
