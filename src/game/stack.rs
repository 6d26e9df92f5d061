//! The stack of pending spells and abilities
//!
//! Strict LIFO. Items carry a snapshot of their source taken when they were
//! put on the stack, so an ability still knows its source after the source
//! has left the battlefield.

use crate::core::{
    Card, CardId, CardName, CardType, Color, Effect, Keyword, PlayerId, StackItemId, TargetKind,
    TargetRef,
};
use crate::game::{EffectContext, GameEvent, GameState};
use crate::zones::Zone;
use crate::{MtgError, Result};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StackItemKind {
    Spell,
    ActivatedAbility,
    TriggeredAbility,
}

/// Characteristics of the source at the time the item was created
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceSnapshot {
    pub name: CardName,
    pub types: SmallVec<[CardType; 2]>,
    pub colors: SmallVec<[Color; 2]>,
    pub power: Option<i32>,
    pub toughness: Option<i32>,
    pub keywords: SmallVec<[Keyword; 4]>,
}

impl SourceSnapshot {
    pub fn of(card: &Card) -> Self {
        SourceSnapshot {
            name: card.name.clone(),
            types: card.types.clone(),
            colors: card.colors.clone(),
            power: card.power,
            toughness: card.toughness,
            keywords: card.keywords.clone(),
        }
    }
}

/// A target chosen when the item was put on the stack
///
/// `timestamp` identifies the exact object: if a card changed zones since,
/// it is a new object and the target is gone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChosenTarget {
    pub kind: TargetKind,
    pub target: TargetRef,
    pub timestamp: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StackItem {
    pub id: StackItemId,
    pub kind: StackItemKind,
    pub source: CardId,
    pub snapshot: SourceSnapshot,
    pub controller: PlayerId,
    pub targets: SmallVec<[ChosenTarget; 2]>,
    pub effects: Vec<Effect>,
    /// Order in which items were put on the stack
    pub timestamp: u64,
}

impl StackItem {
    pub fn is_spell(&self) -> bool {
        self.kind == StackItemKind::Spell
    }
}

/// Pending spells and abilities, bottom first
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Stack {
    items: Vec<StackItem>,
}

impl Stack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Put an item on top
    pub fn push(&mut self, item: StackItem) {
        self.items.push(item);
    }

    /// Remove and return the top item
    pub fn pop(&mut self) -> Option<StackItem> {
        self.items.pop()
    }

    pub fn top(&self) -> Option<&StackItem> {
        self.items.last()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Items from bottom to top
    pub fn items(&self) -> &[StackItem] {
        &self.items
    }

    pub fn get(&self, id: StackItemId) -> Option<&StackItem> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn contains(&self, id: StackItemId) -> bool {
        self.get(id).is_some()
    }

    /// Remove an item from anywhere in the stack (countering)
    pub fn remove(&mut self, id: StackItemId) -> Option<StackItem> {
        let pos = self.items.iter().position(|item| item.id == id)?;
        Some(self.items.remove(pos))
    }
}

impl GameState {
    /// Build a stack item with fresh id and timestamp
    pub fn new_stack_item(
        &mut self,
        kind: StackItemKind,
        source: CardId,
        controller: PlayerId,
        targets: SmallVec<[ChosenTarget; 2]>,
        effects: Vec<Effect>,
    ) -> Result<StackItem> {
        let snapshot = self.snapshot_source(source)?;
        Ok(StackItem {
            id: self.next_id(),
            kind,
            source,
            snapshot,
            controller,
            targets,
            effects,
            timestamp: self.next_timestamp(),
        })
    }

    /// Source snapshot with characteristics as currently modified
    pub fn snapshot_source(&self, source: CardId) -> Result<SourceSnapshot> {
        let card = self.cards.get(source)?;
        let mut snapshot = SourceSnapshot::of(card);
        if card.zone == Zone::Battlefield && card.is_creature() {
            let chars = self.characteristics(source)?;
            snapshot.power = Some(chars.power);
            snapshot.toughness = Some(chars.toughness);
            snapshot.keywords = chars.keywords;
        }
        Ok(snapshot)
    }

    /// Put an item on the stack and reopen priority
    pub fn push_to_stack(&mut self, item: StackItem) -> Result<()> {
        self.stack.push(item);
        self.notify_stack_changed()
    }

    /// Resolve the top item of the stack
    ///
    /// Only legal once every player has passed in succession. Targets are
    /// checked again; if any is no longer legal the item fizzles and none of
    /// its effects happen.
    pub fn resolve_top(&mut self) -> Result<()> {
        let apnap = self.apnap_order();
        if !self.priority.is_round_complete(&apnap) {
            return Err(MtgError::InvalidAction(
                "the stack only resolves after all players pass in succession".to_string(),
            ));
        }
        let item = self
            .stack
            .pop()
            .ok_or_else(|| MtgError::InvalidAction("the stack is empty".to_string()))?;

        let all_legal = item.targets.iter().all(|chosen| {
            self.check_target(chosen.kind, chosen.target, item.controller, Some(chosen.timestamp))
                .is_ok()
        });

        if !all_legal {
            self.emit(GameEvent::StackItemFizzled {
                item: item.id,
                source: item.source,
                name: item.snapshot.name.clone(),
            });
            if item.is_spell() {
                self.finish_spell_card(item.source, item.controller, None, false)?;
            }
        } else {
            let ctx = EffectContext::for_item(&item);
            for effect in &item.effects {
                // Everything one effect moves leaves at once
                self.lookback = Some(self.battlefield.cards.clone());
                let result = self.execute_effect(effect, &ctx);
                self.lookback = None;
                result?;
            }
            if item.is_spell() {
                let attach_to = item.targets.first().and_then(|t| match t.target {
                    TargetRef::Card(card) => Some(card),
                    _ => None,
                });
                self.finish_spell_card(item.source, item.controller, attach_to, true)?;
            }
            self.emit(GameEvent::StackItemResolved {
                item: item.id,
                source: item.source,
                name: item.snapshot.name.clone(),
            });
        }

        self.notify_stack_changed()
    }

    /// Move a spell card off the stack after it resolved or fizzled
    fn finish_spell_card(
        &mut self,
        card_id: CardId,
        controller: PlayerId,
        attach_to: Option<CardId>,
        resolved: bool,
    ) -> Result<()> {
        let card = self.cards.get(card_id)?;
        if card.zone != Zone::Stack {
            return Ok(());
        }
        if resolved && card.is_permanent_card() {
            let is_aura = card.is_aura();
            self.move_card_under(card_id, Zone::Battlefield, Some(controller))?;
            if is_aura {
                if let Some(target) = attach_to {
                    self.attach(card_id, target)?;
                }
            }
        } else {
            self.move_card(card_id, Zone::Graveyard)?;
        }
        Ok(())
    }
}
