//! Error types for the rules kernel
//!
//! `ActionError` is the actor-facing rejection taxonomy: every variant is
//! recoverable and guarantees the game state was left untouched. `MtgError`
//! covers everything else the crate can fail with.

use crate::core::{CardId, CounterType, ManaCost, ManaPool, PlayerId, TargetKind};
use crate::game::{DecisionKind, Step};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Which timing rule a sorcery-speed request broke
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimingViolation {
    #[error("sorcery-speed action outside a main phase (current step: {step:?})")]
    NotMainPhase { step: Step },

    #[error("sorcery-speed action with {depth} object(s) on the stack")]
    StackNotEmpty { depth: usize },

    #[error("sorcery-speed action by a non-active player (active player: {active})")]
    NotActivePlayer { active: PlayerId },
}

/// Why a chosen target is not legal
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TargetViolation {
    #[error("target does not exist")]
    NotFound,

    #[error("target is not a legal {expected:?}")]
    WrongKind { expected: TargetKind },

    #[error("target has hexproof")]
    Hexproof,

    #[error("target has shroud")]
    Shroud,

    #[error("target player has left the game")]
    PlayerGone,

    #[error("expected {expected} target(s), got {got}")]
    Count { expected: usize, got: usize },

    #[error("the same object was chosen twice")]
    Duplicate,
}

/// Which part of a cost could not be paid
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CostShortfall {
    #[error("insufficient mana for {required} (available: {available})")]
    Mana { required: ManaCost, available: ManaPool },

    #[error("source {card} is already tapped")]
    SourceTapped { card: CardId },

    #[error("source {card} has summoning sickness")]
    SummoningSick { card: CardId },

    #[error("cannot pay {required} life with {available}")]
    Life { required: i32, available: i32 },

    #[error("need {required} {counter} counter(s), have {available}")]
    Counters {
        counter: CounterType,
        required: u8,
        available: u8,
    },

    #[error("{card} cannot be used as a mana source: {reason}")]
    InvalidManaSource { card: CardId, reason: String },

    #[error("{card} cannot be sacrificed")]
    CannotSacrifice { card: CardId },
}

/// Rejection of a submitted action
///
/// Returned by every validator and by `submit_action`. A rejection never
/// changes the game state.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionError {
    #[error("not your priority: {actor} acted while priority is held by {holder:?}")]
    NotPriorityHolder {
        actor: PlayerId,
        holder: Option<PlayerId>,
    },

    #[error("wrong timing: {0}")]
    WrongTiming(TimingViolation),

    #[error("illegal target #{index}: {reason}")]
    IllegalTarget { index: usize, reason: TargetViolation },

    #[error("cannot pay cost: {0}")]
    CannotPayCost(CostShortfall),

    #[error("invalid source {card}: {reason}")]
    InvalidSource { card: CardId, reason: String },

    #[error("land drop already used this turn ({played}/{allowed})")]
    LandDropUsed { played: u8, allowed: u8 },

    #[error("waiting for {player} to make a {kind:?} decision")]
    AwaitingDecision { player: PlayerId, kind: DecisionKind },

    #[error("no decision of that kind is pending for {player}")]
    NoPendingDecision { player: PlayerId },

    #[error("invalid declaration: {0}")]
    InvalidDeclaration(String),

    #[error("the game is over")]
    GameOver,
}

#[derive(Error, Debug)]
pub enum MtgError {
    #[error("Action rejected: {0}")]
    Rejected(#[from] ActionError),

    #[error("Entity not found: {0}")]
    EntityNotFound(u32),

    #[error("Invalid game action: {0}")]
    InvalidAction(String),

    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    #[error("Unknown card: {0}")]
    UnknownCard(String),

    #[error("Invalid deck format: {0}")]
    InvalidDeckFormat(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl MtgError {
    /// The actor-facing rejection, if this error is one
    pub fn as_rejection(&self) -> Option<&ActionError> {
        match self {
            MtgError::Rejected(err) => Some(err),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, MtgError>;
