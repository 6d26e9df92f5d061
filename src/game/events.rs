//! Structured game events
//!
//! Every observable change the engine makes is recorded as a `GameEvent` in
//! `GameState::event_log` and mirrored to the logger. An action's outcome is
//! the slice of events it produced.

use crate::core::{CardId, CardName, Color, CounterType, LossReason, PlayerId, StackItemId, TargetRef};
use crate::game::{StateBasedAction, Step, VerbosityLevel};
use crate::zones::Zone;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    GameStarted {
        players: Vec<PlayerId>,
    },
    TurnBegan {
        turn: u32,
        active: PlayerId,
    },
    StepBegan {
        turn: u32,
        step: Step,
    },
    StepSkipped {
        step: Step,
    },
    PriorityGranted {
        player: PlayerId,
    },
    PriorityPassed {
        player: PlayerId,
    },
    ManaPoolEmptied {
        player: PlayerId,
    },
    PermanentsUntapped {
        player: PlayerId,
        count: usize,
    },
    CardDrawn {
        player: PlayerId,
        card: CardId,
    },
    DrewFromEmptyLibrary {
        player: PlayerId,
    },
    LandPlayed {
        player: PlayerId,
        card: CardId,
        name: CardName,
    },
    SpellCast {
        player: PlayerId,
        card: CardId,
        name: CardName,
        item: StackItemId,
    },
    AbilityActivated {
        player: PlayerId,
        source: CardId,
        name: CardName,
        item: StackItemId,
    },
    ManaAbilityActivated {
        player: PlayerId,
        source: CardId,
        name: CardName,
    },
    TriggerPlaced {
        controller: PlayerId,
        source: CardId,
        name: CardName,
        item: StackItemId,
    },
    /// A triggered ability with no legal target never reaches the stack
    TriggerRemoved {
        controller: PlayerId,
        source: CardId,
        name: CardName,
    },
    StackItemResolved {
        item: StackItemId,
        source: CardId,
        name: CardName,
    },
    StackItemFizzled {
        item: StackItemId,
        source: CardId,
        name: CardName,
    },
    SpellCountered {
        item: StackItemId,
        card: CardId,
        name: CardName,
    },
    ManaAdded {
        player: PlayerId,
        color: Color,
        amount: u8,
    },
    DamageDealt {
        source: CardId,
        target: TargetRef,
        amount: i32,
    },
    LifeChanged {
        player: PlayerId,
        delta: i32,
        life: i32,
    },
    PoisonAdded {
        player: PlayerId,
        amount: u32,
        total: u32,
    },
    CountersChanged {
        card: CardId,
        counter: CounterType,
        delta: i32,
    },
    PermanentTapped {
        card: CardId,
    },
    PermanentUntapped {
        card: CardId,
    },
    CardMoved {
        card: CardId,
        from: Zone,
        to: Zone,
    },
    EnteredBattlefield {
        card: CardId,
        controller: PlayerId,
        name: CardName,
    },
    /// Put into a graveyard from the battlefield
    Died {
        card: CardId,
        controller: PlayerId,
        name: CardName,
        was_creature: bool,
    },
    TokenCreated {
        card: CardId,
        controller: PlayerId,
        name: CardName,
    },
    TokenCeasedToExist {
        card: CardId,
    },
    Attached {
        card: CardId,
        to: CardId,
    },
    Unattached {
        card: CardId,
    },
    /// One simultaneous batch of state-based actions
    StateBasedActions {
        actions: Vec<StateBasedAction>,
    },
    AttackersDeclared {
        player: PlayerId,
        attackers: Vec<(CardId, PlayerId)>,
    },
    BlockersDeclared {
        player: PlayerId,
        blocks: Vec<(CardId, CardId)>,
    },
    CardsDiscarded {
        player: PlayerId,
        cards: Vec<CardId>,
    },
    PlayerLost {
        player: PlayerId,
        reason: LossReason,
    },
    GameEnded {
        winner: Option<PlayerId>,
    },
    InvariantViolated {
        message: String,
    },
}

impl GameEvent {
    /// Logger level at which this event is shown
    pub fn verbosity(&self) -> VerbosityLevel {
        match self {
            GameEvent::GameEnded { .. } | GameEvent::PlayerLost { .. } => VerbosityLevel::Minimal,
            GameEvent::TurnBegan { .. }
            | GameEvent::StepBegan { .. }
            | GameEvent::LandPlayed { .. }
            | GameEvent::SpellCast { .. }
            | GameEvent::AbilityActivated { .. }
            | GameEvent::TriggerPlaced { .. }
            | GameEvent::StackItemResolved { .. }
            | GameEvent::StackItemFizzled { .. }
            | GameEvent::SpellCountered { .. }
            | GameEvent::DamageDealt { .. }
            | GameEvent::Died { .. }
            | GameEvent::StateBasedActions { .. }
            | GameEvent::AttackersDeclared { .. }
            | GameEvent::BlockersDeclared { .. }
            | GameEvent::InvariantViolated { .. } => VerbosityLevel::Normal,
            _ => VerbosityLevel::Verbose,
        }
    }

    /// Short category tag for captured log entries
    pub fn category(&self) -> &'static str {
        match self {
            GameEvent::GameStarted { .. }
            | GameEvent::TurnBegan { .. }
            | GameEvent::StepBegan { .. }
            | GameEvent::StepSkipped { .. } => "sequencer",
            GameEvent::PriorityGranted { .. } | GameEvent::PriorityPassed { .. } => "priority",
            GameEvent::SpellCast { .. }
            | GameEvent::AbilityActivated { .. }
            | GameEvent::TriggerPlaced { .. }
            | GameEvent::TriggerRemoved { .. }
            | GameEvent::StackItemResolved { .. }
            | GameEvent::StackItemFizzled { .. }
            | GameEvent::SpellCountered { .. } => "stack",
            GameEvent::StateBasedActions { .. } | GameEvent::PlayerLost { .. } => "sba",
            GameEvent::InvariantViolated { .. } => "invariant",
            _ => "game_event",
        }
    }
}

impl fmt::Display for GameEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameEvent::GameStarted { players } => write!(f, "Game started with {} players", players.len()),
            GameEvent::TurnBegan { turn, active } => write!(f, "=== Turn {turn} (player {active}) ==="),
            GameEvent::StepBegan { step, .. } => write!(f, "--- {step:?} ---"),
            GameEvent::StepSkipped { step } => write!(f, "{step:?} skipped"),
            GameEvent::PriorityGranted { player } => write!(f, "Priority to player {player}"),
            GameEvent::PriorityPassed { player } => write!(f, "Player {player} passes"),
            GameEvent::ManaPoolEmptied { player } => write!(f, "Player {player}'s mana pool empties"),
            GameEvent::PermanentsUntapped { player, count } => {
                write!(f, "Player {player} untaps {count} permanent(s)")
            }
            GameEvent::CardDrawn { player, card } => write!(f, "Player {player} draws card {card}"),
            GameEvent::DrewFromEmptyLibrary { player } => {
                write!(f, "Player {player} tries to draw from an empty library")
            }
            GameEvent::LandPlayed { player, name, .. } => write!(f, "Player {player} plays {name}"),
            GameEvent::SpellCast { player, name, item, .. } => {
                write!(f, "Player {player} casts {name} (stack item {item})")
            }
            GameEvent::AbilityActivated { player, name, item, .. } => {
                write!(f, "Player {player} activates {name} (stack item {item})")
            }
            GameEvent::ManaAbilityActivated { player, name, .. } => {
                write!(f, "Player {player} taps {name} for mana")
            }
            GameEvent::TriggerPlaced { controller, name, item, .. } => {
                write!(f, "{name} triggers for player {controller} (stack item {item})")
            }
            GameEvent::TriggerRemoved { name, .. } => write!(f, "{name} trigger has no legal target"),
            GameEvent::StackItemResolved { name, item, .. } => write!(f, "{name} resolves (stack item {item})"),
            GameEvent::StackItemFizzled { name, item, .. } => {
                write!(f, "{name} fizzles: all targets illegal or gone (stack item {item})")
            }
            GameEvent::SpellCountered { name, .. } => write!(f, "{name} is countered"),
            GameEvent::ManaAdded { player, color, amount } => {
                write!(f, "Player {player} adds {amount}{color}")
            }
            GameEvent::DamageDealt { source, target, amount } => {
                write!(f, "Card {source} deals {amount} damage to {target}")
            }
            GameEvent::LifeChanged { player, delta, life } => {
                write!(f, "Player {player} life {delta:+} -> {life}")
            }
            GameEvent::PoisonAdded { player, amount, total } => {
                write!(f, "Player {player} gets {amount} poison counter(s) ({total} total)")
            }
            GameEvent::CountersChanged { card, counter, delta } => {
                write!(f, "Card {card}: {delta:+} {counter} counter(s)")
            }
            GameEvent::PermanentTapped { card } => write!(f, "Card {card} taps"),
            GameEvent::PermanentUntapped { card } => write!(f, "Card {card} untaps"),
            GameEvent::CardMoved { card, from, to } => write!(f, "Card {card}: {from:?} -> {to:?}"),
            GameEvent::EnteredBattlefield { name, controller, .. } => {
                write!(f, "{name} enters the battlefield under player {controller}")
            }
            GameEvent::Died { name, .. } => write!(f, "{name} is put into the graveyard"),
            GameEvent::TokenCreated { name, controller, .. } => {
                write!(f, "Player {controller} creates a {name} token")
            }
            GameEvent::TokenCeasedToExist { card } => write!(f, "Token {card} ceases to exist"),
            GameEvent::Attached { card, to } => write!(f, "Card {card} attached to card {to}"),
            GameEvent::Unattached { card } => write!(f, "Card {card} becomes unattached"),
            GameEvent::StateBasedActions { actions } => {
                write!(f, "State-based actions:")?;
                for action in actions {
                    write!(f, " [{action}]")?;
                }
                Ok(())
            }
            GameEvent::AttackersDeclared { player, attackers } => {
                write!(f, "Player {player} attacks with {} creature(s)", attackers.len())
            }
            GameEvent::BlockersDeclared { player, blocks } => {
                write!(f, "Player {player} declares {} block(s)", blocks.len())
            }
            GameEvent::CardsDiscarded { player, cards } => {
                write!(f, "Player {player} discards {} card(s)", cards.len())
            }
            GameEvent::PlayerLost { player, reason } => write!(f, "Player {player} loses: {reason}"),
            GameEvent::GameEnded { winner: Some(winner) } => write!(f, "Game over: player {winner} wins"),
            GameEvent::GameEnded { winner: None } => write!(f, "Game over: draw"),
            GameEvent::InvariantViolated { message } => write!(f, "INVARIANT VIOLATED: {message}"),
        }
    }
}
