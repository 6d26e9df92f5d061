//! Pre-parsed ability descriptors
//!
//! Card text is turned into these structures before it reaches the engine.
//! A card carries at most one spell descriptor (what happens when it is cast)
//! plus any number of activated, triggered, and static abilities.

use crate::core::{Cost, Effect, Keyword, TargetKind};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// When a spell or ability may be cast or activated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Timing {
    /// Main phase of its controller's turn, with an empty stack
    SorcerySpeed,
    /// Any time its controller holds priority
    InstantSpeed,
}

/// What casting a card does
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpellDescriptor {
    pub timing: Timing,
    pub targets: SmallVec<[TargetKind; 2]>,
    /// Effects applied on resolution. Permanent spells usually have none and
    /// simply enter the battlefield.
    pub effects: Vec<Effect>,
}

impl SpellDescriptor {
    pub fn new(timing: Timing) -> Self {
        SpellDescriptor {
            timing,
            targets: SmallVec::new(),
            effects: Vec::new(),
        }
    }

    pub fn with_target(mut self, kind: TargetKind) -> Self {
        self.targets.push(kind);
        self
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }
}

/// "[Cost]: [Effect]" ability of a permanent
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivatedAbility {
    pub cost: Cost,
    pub timing: Timing,
    pub targets: SmallVec<[TargetKind; 2]>,
    pub effects: Vec<Effect>,
    /// Mana abilities resolve immediately and never use the stack
    pub is_mana_ability: bool,
    pub description: String,
}

impl ActivatedAbility {
    pub fn new(cost: Cost, description: impl Into<String>) -> Self {
        ActivatedAbility {
            cost,
            timing: Timing::InstantSpeed,
            targets: SmallVec::new(),
            effects: Vec::new(),
            is_mana_ability: false,
            description: description.into(),
        }
    }

    /// "{T}: Add {C}" style ability
    pub fn mana(cost: Cost, effect: Effect, description: impl Into<String>) -> Self {
        ActivatedAbility {
            is_mana_ability: true,
            effects: vec![effect],
            ..ActivatedAbility::new(cost, description)
        }
    }

    pub fn sorcery_speed(mut self) -> Self {
        self.timing = Timing::SorcerySpeed;
        self
    }

    pub fn with_target(mut self, kind: TargetKind) -> Self {
        self.targets.push(kind);
        self
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }
}

/// Game events a triggered ability can watch for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TriggerCondition {
    /// This permanent enters the battlefield
    EntersBattlefield,
    /// Another creature enters the battlefield
    AnotherCreatureEnters,
    /// This permanent is put into a graveyard from the battlefield
    Dies,
    /// Any creature is put into a graveyard from the battlefield
    CreatureDies,
    /// Beginning of its controller's upkeep
    YourUpkeep,
    /// Beginning of each end step
    EachEndStep,
    /// Its controller casts a spell
    YouCastSpell,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggeredAbility {
    pub condition: TriggerCondition,
    pub targets: SmallVec<[TargetKind; 2]>,
    pub effects: Vec<Effect>,
    pub description: String,
}

impl TriggeredAbility {
    pub fn new(condition: TriggerCondition, description: impl Into<String>) -> Self {
        TriggeredAbility {
            condition,
            targets: SmallVec::new(),
            effects: Vec::new(),
            description: description.into(),
        }
    }

    pub fn with_target(mut self, kind: TargetKind) -> Self {
        self.targets.push(kind);
        self
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }
}

/// Which permanents a static ability affects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StaticScope {
    CreaturesYouControl,
    OtherCreaturesYouControl,
    /// The creature this Aura or Equipment is attached to
    AttachedCreature,
}

/// Continuous effects generated by a permanent on the battlefield
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StaticAbility {
    /// "Creatures you control get +1/+1"
    ModifyPowerToughness {
        scope: StaticScope,
        power: i32,
        toughness: i32,
    },
    /// "Creatures you control have flying"
    GrantKeyword { scope: StaticScope, keyword: Keyword },
}

impl StaticAbility {
    pub fn scope(&self) -> StaticScope {
        match self {
            StaticAbility::ModifyPowerToughness { scope, .. } => *scope,
            StaticAbility::GrantKeyword { scope, .. } => *scope,
        }
    }
}
