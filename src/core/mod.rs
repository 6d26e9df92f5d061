//! Core game types and entities

pub mod abilities;
pub mod card;
pub mod costs;
pub mod effects;
pub mod entity;
pub mod mana;
pub mod player;
pub mod types;

pub use abilities::{
    ActivatedAbility, SpellDescriptor, StaticAbility, StaticScope, Timing, TriggerCondition,
    TriggeredAbility,
};
pub use card::{Card, CardType};
pub use costs::Cost;
pub use effects::{Effect, EffectTarget, Keyword, TargetKind, TargetRef, TokenSpec};
pub use entity::{EntityId, EntityStore, GameEntity};
pub use mana::{Color, ManaCost, ManaPool};
pub use player::{LossReason, Player};
pub use types::{CardName, CounterType, PlayerName, Subtype};

pub type CardId = EntityId<Card>;
pub type PlayerId = EntityId<Player>;
pub type StackItemId = EntityId<crate::game::StackItem>;
