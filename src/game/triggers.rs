//! Triggered abilities
//!
//! Events are matched against trigger conditions as they are emitted, which
//! only queues the trigger. Queued triggers reach the stack after the next
//! state-based action fixpoint, in APNAP order of their controllers and then
//! in the order they triggered.

use crate::core::{CardId, PlayerId, TargetRef, TriggerCondition, TriggeredAbility};
use crate::game::{ChosenTarget, GameEvent, GameState, SourceSnapshot, StackItem, StackItemKind, Step};
use crate::Result;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// A trigger waiting to be put on the stack
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingTrigger {
    pub source: CardId,
    pub controller: PlayerId,
    /// Source as it was when the ability triggered
    pub snapshot: SourceSnapshot,
    pub ability: TriggeredAbility,
    /// Trigger order
    pub order: u64,
}

impl GameState {
    /// Queue the abilities of `card_id` with `condition`
    fn queue_triggers(&mut self, card_id: CardId, condition: TriggerCondition, controller: PlayerId) {
        let Ok(card) = self.cards.get(card_id) else {
            return;
        };
        let abilities: Vec<TriggeredAbility> = card
            .triggered
            .iter()
            .filter(|ability| ability.condition == condition)
            .cloned()
            .collect();
        if abilities.is_empty() {
            return;
        }
        let Ok(snapshot) = self.snapshot_source(card_id) else {
            return;
        };
        for ability in abilities {
            let order = self.next_timestamp();
            self.pending_triggers.push(PendingTrigger {
                source: card_id,
                controller,
                snapshot: snapshot.clone(),
                ability,
                order,
            });
        }
    }

    /// Queue triggers of every permanent matching `filter` for `condition`
    fn queue_observers(
        &mut self,
        observers: &[CardId],
        condition: TriggerCondition,
        filter: impl Fn(&GameState, CardId) -> bool,
    ) {
        for &observer in observers {
            if !filter(self, observer) {
                continue;
            }
            if let Ok(controller) = self.cards.get(observer).map(|c| c.controller) {
                self.queue_triggers(observer, condition, controller);
            }
        }
    }

    /// Queue every trigger an event sets off
    pub(crate) fn match_triggers(&mut self, event: &GameEvent) {
        match event {
            GameEvent::EnteredBattlefield { card, controller, .. } => {
                let entering = *card;
                self.queue_triggers(entering, TriggerCondition::EntersBattlefield, *controller);
                if self.cards.get(entering).is_ok_and(|c| c.is_creature()) {
                    let observers = self.battlefield.cards.clone();
                    self.queue_observers(&observers, TriggerCondition::AnotherCreatureEnters, |_, id| id != entering);
                }
            }
            GameEvent::Died {
                card,
                controller,
                was_creature,
                ..
            } => {
                let dying = *card;
                self.queue_triggers(dying, TriggerCondition::Dies, *controller);
                if *was_creature {
                    let observers = match &self.lookback {
                        Some(lookback) => lookback.clone(),
                        None => {
                            let mut observers = self.battlefield.cards.clone();
                            observers.push(dying);
                            observers
                        }
                    };
                    self.queue_observers(&observers, TriggerCondition::CreatureDies, |_, _| true);
                }
            }
            GameEvent::StepBegan { step: Step::Upkeep, .. } => {
                let active = self.turn.active_player;
                let observers = self.battlefield.cards.clone();
                self.queue_observers(&observers, TriggerCondition::YourUpkeep, |game, id| {
                    game.cards.get(id).is_ok_and(|c| c.controller == active)
                });
            }
            GameEvent::StepBegan { step: Step::End, .. } => {
                let observers = self.battlefield.cards.clone();
                self.queue_observers(&observers, TriggerCondition::EachEndStep, |_, _| true);
            }
            GameEvent::SpellCast { player, .. } => {
                let caster = *player;
                let observers = self.battlefield.cards.clone();
                self.queue_observers(&observers, TriggerCondition::YouCastSpell, |game, id| {
                    game.cards.get(id).is_ok_and(|c| c.controller == caster)
                });
            }
            _ => {}
        }
    }

    /// Choose targets for a trigger: the first legal object for each
    /// requirement, preferring opponents and what they control
    fn choose_trigger_targets(&self, trigger: &PendingTrigger) -> Option<SmallVec<[ChosenTarget; 2]>> {
        let mut chosen: SmallVec<[ChosenTarget; 2]> = SmallVec::new();
        for &kind in &trigger.ability.targets {
            let candidates = self.legal_targets(kind, trigger.controller);
            let is_opponents = |target: &TargetRef| match target {
                TargetRef::Player(p) => *p != trigger.controller,
                TargetRef::Card(c) => self.cards.get(*c).is_ok_and(|c| c.controller != trigger.controller),
                TargetRef::StackItem(id) => self.stack.get(*id).is_some_and(|i| i.controller != trigger.controller),
            };
            let unused = |target: &TargetRef| !chosen.iter().any(|c| c.target == *target);
            let pick = candidates
                .iter()
                .find(|t| is_opponents(t) && unused(t))
                .or_else(|| candidates.iter().find(|t| unused(t)))
                .copied()?;
            chosen.push(ChosenTarget {
                kind,
                target: pick,
                timestamp: self.target_timestamp(pick).unwrap_or(0),
            });
        }
        Some(chosen)
    }

    /// Put every queued trigger on the stack
    ///
    /// Returns whether anything was placed or removed.
    pub fn place_pending_triggers(&mut self) -> Result<bool> {
        if self.pending_triggers.is_empty() {
            return Ok(false);
        }
        let mut pending = std::mem::take(&mut self.pending_triggers);
        let apnap = self.apnap_order();
        pending.sort_by_key(|t| {
            let seat = apnap.iter().position(|p| *p == t.controller).unwrap_or(usize::MAX);
            (seat, t.order)
        });

        for trigger in pending {
            if !apnap.contains(&trigger.controller) {
                continue;
            }
            let Some(targets) = self.choose_trigger_targets(&trigger) else {
                self.record(GameEvent::TriggerRemoved {
                    controller: trigger.controller,
                    source: trigger.source,
                    name: trigger.snapshot.name.clone(),
                });
                continue;
            };
            let item = StackItem {
                id: self.next_id(),
                kind: StackItemKind::TriggeredAbility,
                source: trigger.source,
                snapshot: trigger.snapshot,
                controller: trigger.controller,
                targets,
                effects: trigger.ability.effects,
                timestamp: self.next_timestamp(),
            };
            let event = GameEvent::TriggerPlaced {
                controller: item.controller,
                source: item.source,
                name: item.snapshot.name.clone(),
                item: item.id,
            };
            self.stack.push(item);
            self.record(event);
        }
        Ok(true)
    }
}
