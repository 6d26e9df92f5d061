//! Card effects, keywords, and target references
//!
//! Effects are structured data. Anything the closed set cannot express goes
//! through `Effect::Custom`, resolved by name against the game's registry.

use crate::core::{CardId, Color, CounterType, PlayerId, StackItemId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A chosen target: a player, a card, or an object on the stack
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TargetRef {
    Player(PlayerId),
    Card(CardId),
    StackItem(StackItemId),
}

impl fmt::Display for TargetRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetRef::Player(id) => write!(f, "player {id}"),
            TargetRef::Card(id) => write!(f, "card {id}"),
            TargetRef::StackItem(id) => write!(f, "stack item {id}"),
        }
    }
}

/// What a target slot accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TargetKind {
    /// Creature, player, or planeswalker ("any target")
    Any,
    Creature,
    Player,
    Permanent,
    Planeswalker,
    /// A spell on the stack
    Spell,
}

/// Who or what an effect applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EffectTarget {
    /// The object chosen for target slot N
    Target(usize),
    /// The controller of the spell or ability
    Controller,
    /// The source permanent itself
    Source,
    EachOpponent,
    EachPlayer,
    EachCreature,
}

/// Keyword abilities the engine understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Keyword {
    Flying,
    Deathtouch,
    Haste,
    Hexproof,
    Indestructible,
    Lifelink,
    Menace,
    Reach,
    Trample,
    Vigilance,
    Defender,
    Shroud,
}

/// A token to create
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenSpec {
    pub name: String,
    pub power: i32,
    pub toughness: i32,
    pub colors: Vec<Color>,
    pub subtypes: Vec<String>,
    pub keywords: Vec<Keyword>,
}

impl TokenSpec {
    pub fn creature(name: impl Into<String>, power: i32, toughness: i32) -> Self {
        TokenSpec {
            name: name.into(),
            power,
            toughness,
            colors: Vec::new(),
            subtypes: Vec::new(),
            keywords: Vec::new(),
        }
    }
}

/// Effects a spell or ability can have when it resolves
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Effect {
    /// Example: "Lightning Bolt deals 3 damage to any target"
    DealDamage { to: EffectTarget, amount: i32 },

    DrawCards { player: EffectTarget, count: u8 },

    GainLife { player: EffectTarget, amount: i32 },

    LoseLife { player: EffectTarget, amount: i32 },

    AddPoison { player: EffectTarget, amount: u32 },

    /// Example: "Destroy target creature"
    Destroy { target: EffectTarget },

    /// Return a permanent to its owner's hand
    ReturnToHand { target: EffectTarget },

    Tap { target: EffectTarget },

    Untap { target: EffectTarget },

    /// Power/toughness change until end of turn
    /// Example: "Target creature gets +3/+3 until end of turn"
    Pump {
        target: EffectTarget,
        power: i32,
        toughness: i32,
    },

    /// Keyword gained until end of turn
    GrantKeyword { target: EffectTarget, keyword: Keyword },

    PutCounters {
        target: EffectTarget,
        counter: CounterType,
        amount: u8,
    },

    /// Example: "Target player mills 3 cards"
    Mill { player: EffectTarget, count: u8 },

    /// The player discards from the front of their hand
    Discard { player: EffectTarget, count: u8 },

    /// Counter target spell
    CounterSpell { target: EffectTarget },

    /// Add mana to the controller's pool
    AddMana { color: Color, amount: u8 },

    CreateTokens { token: TokenSpec, count: u8 },

    /// Attach the source (an Equipment) to a creature
    AttachSource { target: EffectTarget },

    /// Resolved through the game's custom effect registry
    Custom { name: String },
}

impl Effect {
    /// Shorthand for the common "deal N damage to target slot 0"
    pub fn damage_target(amount: i32) -> Self {
        Effect::DealDamage {
            to: EffectTarget::Target(0),
            amount,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effect_creation() {
        match Effect::damage_target(3) {
            Effect::DealDamage { to, amount } => {
                assert_eq!(amount, 3);
                assert_eq!(to, EffectTarget::Target(0));
            }
            _ => panic!("Wrong effect type"),
        }
    }

    #[test]
    fn test_target_display() {
        let target = TargetRef::Player(PlayerId::new(3));
        assert_eq!(target.to_string(), "player 3");
    }

    #[test]
    fn test_effects_serialize() {
        let effect = Effect::CreateTokens {
            token: TokenSpec::creature("Soldier", 1, 1),
            count: 2,
        };
        let json = serde_json::to_string(&effect).unwrap();
        let back: Effect = serde_json::from_str(&json).unwrap();
        assert_eq!(back, effect);
    }
}
