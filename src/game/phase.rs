//! Turn phases, steps, and the static turn sequence

use crate::core::PlayerId;
use serde::{Deserialize, Serialize};

/// Major phases of a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    Beginning,
    PreCombatMain,
    Combat,
    PostCombatMain,
    Ending,
}

/// Specific steps within phases
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Step {
    // Beginning Phase
    Untap,
    Upkeep,
    Draw,

    // Pre-Combat Main Phase
    Main1,

    // Combat Phase
    BeginCombat,
    DeclareAttackers,
    DeclareBlockers,
    CombatDamage,
    EndCombat,

    // Post-Combat Main Phase
    Main2,

    // Ending Phase
    End,
    Cleanup,
}

impl Step {
    /// Get the phase this step belongs to
    pub fn phase(&self) -> Phase {
        match self {
            Step::Untap | Step::Upkeep | Step::Draw => Phase::Beginning,
            Step::Main1 => Phase::PreCombatMain,
            Step::BeginCombat
            | Step::DeclareAttackers
            | Step::DeclareBlockers
            | Step::CombatDamage
            | Step::EndCombat => Phase::Combat,
            Step::Main2 => Phase::PostCombatMain,
            Step::End | Step::Cleanup => Phase::Ending,
        }
    }

    /// Get the next step in turn order
    pub fn next(&self) -> Option<Step> {
        let idx = TURN_SEQUENCE.iter().position(|s| s.step == *self)?;
        TURN_SEQUENCE.get(idx + 1).map(|s| s.step)
    }

    /// Sorcery-speed actions are only possible in main phases
    pub fn is_main(&self) -> bool {
        matches!(self, Step::Main1 | Step::Main2)
    }

    /// Static description of this step
    pub fn spec(&self) -> &'static StepSpec {
        // TURN_SEQUENCE is indexed by declaration order
        &TURN_SEQUENCE[*self as usize]
    }

    pub fn grants_priority(&self) -> bool {
        self.spec().grants_priority
    }
}

/// Turn-based actions performed when a step begins, in list order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StepEntryAction {
    EmptyManaPools,
    ResetLandDrops,
    ClearSummoningSickness,
    UntapPermanents,
    DrawCard,
    DeclareAttackers,
    DeclareBlockers,
    CombatDamage,
    DiscardToHandSize,
    RemoveMarkedDamage,
    EndTurnEffects,
}

/// One entry of the turn sequence
#[derive(Debug)]
pub struct StepSpec {
    pub step: Step,
    pub grants_priority: bool,
    pub entry_actions: &'static [StepEntryAction],
}

use StepEntryAction::*;

/// The fixed order of steps in every turn
pub static TURN_SEQUENCE: [StepSpec; 12] = [
    StepSpec {
        step: Step::Untap,
        grants_priority: false,
        entry_actions: &[
            EmptyManaPools,
            ResetLandDrops,
            ClearSummoningSickness,
            UntapPermanents,
        ],
    },
    StepSpec {
        step: Step::Upkeep,
        grants_priority: true,
        entry_actions: &[EmptyManaPools],
    },
    StepSpec {
        step: Step::Draw,
        grants_priority: true,
        entry_actions: &[EmptyManaPools, DrawCard],
    },
    StepSpec {
        step: Step::Main1,
        grants_priority: true,
        entry_actions: &[EmptyManaPools],
    },
    StepSpec {
        step: Step::BeginCombat,
        grants_priority: true,
        entry_actions: &[EmptyManaPools],
    },
    StepSpec {
        step: Step::DeclareAttackers,
        grants_priority: true,
        entry_actions: &[EmptyManaPools, DeclareAttackers],
    },
    StepSpec {
        step: Step::DeclareBlockers,
        grants_priority: true,
        entry_actions: &[EmptyManaPools, DeclareBlockers],
    },
    StepSpec {
        step: Step::CombatDamage,
        grants_priority: true,
        entry_actions: &[EmptyManaPools, CombatDamage],
    },
    StepSpec {
        step: Step::EndCombat,
        grants_priority: true,
        entry_actions: &[EmptyManaPools],
    },
    StepSpec {
        step: Step::Main2,
        grants_priority: true,
        entry_actions: &[EmptyManaPools],
    },
    StepSpec {
        step: Step::End,
        grants_priority: true,
        entry_actions: &[EmptyManaPools],
    },
    StepSpec {
        step: Step::Cleanup,
        grants_priority: false,
        entry_actions: &[
            EmptyManaPools,
            DiscardToHandSize,
            RemoveMarkedDamage,
            EndTurnEffects,
        ],
    },
];

/// Sequencer cursor: where in the turn sequence the game currently is
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnStructure {
    /// Current turn number (starts at 1)
    pub turn_number: u32,

    pub current_step: Step,

    /// Active player (whose turn it is)
    pub active_player: PlayerId,

    /// Active player's index in GameState::players (seating order)
    pub active_player_idx: usize,

    /// Next step-entry action to run; entry actions pause on turn-based
    /// decisions and resume from here
    pub entry_cursor: usize,

    /// Set when something happened during cleanup, so another cleanup step
    /// follows instead of the next turn
    pub cleanup_again: bool,
}

impl TurnStructure {
    pub fn new(starting_player: PlayerId, starting_idx: usize) -> Self {
        TurnStructure {
            turn_number: 1,
            current_step: Step::Untap,
            active_player: starting_player,
            active_player_idx: starting_idx,
            entry_cursor: 0,
            cleanup_again: false,
        }
    }

    pub fn current_phase(&self) -> Phase {
        self.current_step.phase()
    }

    /// Start a new turn
    pub fn next_turn(&mut self, next_player: PlayerId, next_idx: usize) {
        self.turn_number += 1;
        self.current_step = Step::Untap;
        self.active_player = next_player;
        self.active_player_idx = next_idx;
        self.entry_cursor = 0;
        self.cleanup_again = false;
    }
}
