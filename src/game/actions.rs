//! Player actions
//!
//! Everything an actor can ask the engine to do goes through
//! `submit_action`. Requests are fully validated before the first mutation,
//! so a rejected action leaves the game exactly as it was.

use crate::core::{CardId, Cost, PlayerId, TargetKind, TargetRef};
use crate::error::ActionError;
use crate::game::{DecisionKind, GameEvent, GameState, StackItemKind};
use crate::zones::Zone;
use crate::Result;
use serde::{Deserialize, Serialize};

/// Upper bound on target combinations offered per spell or ability
const MAX_TARGET_COMBINATIONS: usize = 16;

/// A request from an actor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    Pass,
    CastSpell {
        card: CardId,
        targets: Vec<TargetRef>,
        /// Permanents to tap for mana while paying
        mana_sources: Vec<CardId>,
    },
    ActivateAbility {
        source: CardId,
        index: usize,
        targets: Vec<TargetRef>,
        mana_sources: Vec<CardId>,
    },
    Special(SpecialAction),
}

/// Actions that never use the stack
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpecialAction {
    PlayLand { card: CardId },
    /// Attacking creature and the player it attacks
    DeclareAttackers { attackers: Vec<(CardId, PlayerId)> },
    /// Blocking creature and the attacker it blocks
    DeclareBlockers { blocks: Vec<(CardId, CardId)> },
    DiscardToHandSize { cards: Vec<CardId> },
}

impl SpecialAction {
    /// The turn-based decision this action answers, if it is one
    pub fn decision_kind(&self) -> Option<DecisionKind> {
        match self {
            SpecialAction::PlayLand { .. } => None,
            SpecialAction::DeclareAttackers { .. } => Some(DecisionKind::DeclareAttackers),
            SpecialAction::DeclareBlockers { .. } => Some(DecisionKind::DeclareBlockers),
            SpecialAction::DiscardToHandSize { .. } => Some(DecisionKind::DiscardToHandSize),
        }
    }
}

/// Observable result of an accepted action: the events it produced
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionOutcome {
    pub events: Vec<GameEvent>,
}

impl ActionOutcome {
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn contains(&self, pred: impl Fn(&GameEvent) -> bool) -> bool {
        self.events.iter().any(pred)
    }
}

impl GameState {
    /// Validate and apply an action
    pub fn submit_action(&mut self, actor: PlayerId, action: Action) -> Result<ActionOutcome> {
        let mark = self.event_log.len();
        match action {
            Action::Pass => return self.pass_priority(actor),
            Action::Special(SpecialAction::PlayLand { card }) => {
                self.ensure_actionable(actor)?;
                self.play_land(actor, card)?;
            }
            Action::Special(decision) => self.submit_decision(actor, decision)?,
            Action::CastSpell {
                card,
                targets,
                mana_sources,
            } => {
                self.ensure_actionable(actor)?;
                self.cast_spell(actor, card, &targets, &mana_sources)?;
            }
            Action::ActivateAbility {
                source,
                index,
                targets,
                mana_sources,
            } => {
                self.ensure_actionable(actor)?;
                self.activate_ability(actor, source, index, &targets, &mana_sources)?;
            }
        }
        Ok(self.outcome_since(mark))
    }

    fn submit_decision(&mut self, actor: PlayerId, special: SpecialAction) -> Result<()> {
        if self.is_game_over() {
            return Err(ActionError::GameOver.into());
        }
        let decision = match self.pending_decisions.front() {
            Some(d) if d.player == actor && special.decision_kind() == Some(d.kind) => *d,
            _ => return Err(ActionError::NoPendingDecision { player: actor }.into()),
        };
        match special {
            SpecialAction::DeclareAttackers { attackers } => self.declare_attackers(actor, &attackers)?,
            SpecialAction::DeclareBlockers { blocks } => self.declare_blockers(actor, &blocks)?,
            SpecialAction::DiscardToHandSize { cards } => {
                self.discard_to_hand_size(actor, &cards, decision.count)?
            }
            SpecialAction::PlayLand { .. } => return Err(ActionError::NoPendingDecision { player: actor }.into()),
        }
        self.complete_decision()
    }

    /// Play a land; the player keeps priority afterwards
    pub fn play_land(&mut self, actor: PlayerId, card: CardId) -> Result<()> {
        self.can_play_land(actor, card)?;
        let name = self.cards.get(card)?.name.clone();
        self.move_card_under(card, Zone::Battlefield, Some(actor))?;
        self.get_player_mut(actor)?.play_land();
        self.emit(GameEvent::LandPlayed {
            player: actor,
            card,
            name,
        });
        self.regrant_after_special(actor)
    }

    /// Cast a spell from hand
    ///
    /// Checked in order: source and timing, priority, targets, cost. The card
    /// moves to the stack only after all of them pass.
    pub fn cast_spell(
        &mut self,
        actor: PlayerId,
        card_id: CardId,
        targets: &[TargetRef],
        mana_sources: &[CardId],
    ) -> Result<()> {
        self.can_cast(actor, card_id)?;
        let (kinds, effects, cost, name) = {
            let card = self.cards.get(card_id)?;
            let (kinds, effects) = match &card.spell {
                Some(spell) => (spell.targets.to_vec(), spell.effects.clone()),
                None => (Vec::new(), Vec::new()),
            };
            (kinds, effects, card.mana_cost, card.name.clone())
        };
        let chosen = self.validate_targets(&kinds, targets, actor)?;
        let plan = self.plan_payment(actor, card_id, &Cost::Mana(cost), mana_sources)?;

        self.move_card(card_id, Zone::Stack)?;
        self.commit_payment(actor, card_id, &plan)?;
        let item = self.new_stack_item(StackItemKind::Spell, card_id, actor, chosen, effects)?;
        self.emit(GameEvent::SpellCast {
            player: actor,
            card: card_id,
            name,
            item: item.id,
        });
        self.push_to_stack(item)
    }

    /// Activate an ability of a permanent
    ///
    /// Mana abilities resolve on the spot and the actor keeps priority.
    pub fn activate_ability(
        &mut self,
        actor: PlayerId,
        source: CardId,
        index: usize,
        targets: &[TargetRef],
        mana_sources: &[CardId],
    ) -> Result<()> {
        let ability = self.can_activate(actor, source, index)?.clone();
        if ability.is_mana_ability {
            self.resolve_mana_ability(actor, source, index, true)?;
            return self.regrant_after_special(actor);
        }

        let chosen = self.validate_targets(&ability.targets, targets, actor)?;
        let plan = self.plan_payment(actor, source, &ability.cost, mana_sources)?;

        let item = self.new_stack_item(StackItemKind::ActivatedAbility, source, actor, chosen, ability.effects)?;
        self.commit_payment(actor, source, &plan)?;
        if ability.cost.is_loyalty() {
            self.cards.get_mut(source)?.loyalty_activated = true;
        }
        self.emit(GameEvent::AbilityActivated {
            player: actor,
            source,
            name: item.snapshot.name.clone(),
            item: item.id,
        });
        self.push_to_stack(item)
    }

    /// After an action that does not use the stack, settle and hand
    /// priority back to the actor
    fn regrant_after_special(&mut self, actor: PlayerId) -> Result<()> {
        self.settle()?;
        if !self.is_game_over() && self.pending_decisions.is_empty() {
            self.grant_priority(actor);
        }
        Ok(())
    }

    /// Target choices for a list of requirements, without repeats
    fn target_choices(&self, kinds: &[TargetKind], controller: PlayerId) -> Vec<Vec<TargetRef>> {
        let mut combos: Vec<Vec<TargetRef>> = vec![Vec::new()];
        for &kind in kinds {
            let options = self.legal_targets(kind, controller);
            let mut next = Vec::new();
            'fill: for combo in &combos {
                for &target in &options {
                    if combo.contains(&target) {
                        continue;
                    }
                    let mut extended = combo.clone();
                    extended.push(target);
                    next.push(extended);
                    if next.len() >= MAX_TARGET_COMBINATIONS {
                        break 'fill;
                    }
                }
            }
            combos = next;
        }
        combos
    }

    /// Priority actions `player` could take right now
    ///
    /// Mana sources are picked automatically. Mana abilities are left out:
    /// they are offered implicitly through `mana_sources`. Turn-based
    /// decisions are not listed; they are asked for separately.
    pub fn legal_actions(&self, player: PlayerId) -> Vec<Action> {
        if self.ensure_actionable(player).is_err() || self.priority.holder() != Some(player) {
            return Vec::new();
        }
        let mut actions = vec![Action::Pass];

        let hand = self
            .get_player_zones(player)
            .map(|z| z.hand.cards.clone())
            .unwrap_or_default();
        for &card_id in &hand {
            let Ok(card) = self.cards.get(card_id) else {
                continue;
            };
            if card.is_land() {
                if self.can_play_land(player, card_id).is_ok() {
                    actions.push(Action::Special(SpecialAction::PlayLand { card: card_id }));
                }
                continue;
            }
            if self.can_cast(player, card_id).is_err() {
                continue;
            }
            let Some(mana_sources) = self.plan_mana_sources(player, &card.mana_cost, None) else {
                continue;
            };
            let kinds: Vec<TargetKind> = card.spell.as_ref().map(|s| s.targets.to_vec()).unwrap_or_default();
            for targets in self.target_choices(&kinds, player) {
                actions.push(Action::CastSpell {
                    card: card_id,
                    targets,
                    mana_sources: mana_sources.clone(),
                });
            }
        }

        for &source in &self.battlefield.cards {
            let Ok(card) = self.cards.get(source) else {
                continue;
            };
            if card.controller != player {
                continue;
            }
            for (index, ability) in card.activated.iter().enumerate() {
                if ability.is_mana_ability || self.can_activate(player, source, index).is_err() {
                    continue;
                }
                let exclude = ability.cost.requires_tap().then_some(source);
                let Some(mana_sources) = self.plan_mana_sources(player, &ability.cost.mana(), exclude) else {
                    continue;
                };
                if self.plan_payment(player, source, &ability.cost, &mana_sources).is_err() {
                    continue;
                }
                for targets in self.target_choices(&ability.targets, player) {
                    actions.push(Action::ActivateAbility {
                        source,
                        index,
                        targets,
                        mana_sources: mana_sources.clone(),
                    });
                }
            }
        }
        actions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{
        ActivatedAbility, Card, CardType, Color, Effect, ManaCost, SpellDescriptor, Timing,
    };
    use crate::game::Step;

    fn started() -> GameState {
        let mut game = GameState::new_two_player("Alice".to_string(), "Bob".to_string(), 20);
        game.start_game().unwrap();
        game.begin_step(Step::Main1).unwrap();
        game
    }

    fn mountain(game: &mut GameState, owner: PlayerId, zone: Zone) -> CardId {
        let mut card = Card::new(game.next_card_id(), "Mountain", owner);
        card.types.push(CardType::Land);
        card.activated.push(ActivatedAbility::mana(
            Cost::Tap,
            Effect::AddMana {
                color: Color::Red,
                amount: 1,
            },
            "{T}: Add {R}",
        ));
        game.add_card(card, zone).unwrap()
    }

    fn shock(game: &mut GameState, owner: PlayerId) -> CardId {
        let mut card = Card::new(game.next_card_id(), "Shock", owner);
        card.types.push(CardType::Instant);
        card.mana_cost = ManaCost::from_string("R");
        card.spell = Some(
            SpellDescriptor::new(Timing::InstantSpeed)
                .with_target(TargetKind::Any)
                .with_effect(Effect::damage_target(2)),
        );
        game.add_card(card, Zone::Hand).unwrap()
    }

    #[test]
    fn test_play_land_keeps_priority() {
        let mut game = started();
        let p1 = game.players[0].id;
        let land = mountain(&mut game, p1, Zone::Hand);

        game.submit_action(p1, Action::Special(SpecialAction::PlayLand { card: land }))
            .unwrap();
        assert!(game.battlefield.contains(land));
        assert_eq!(game.priority.holder(), Some(p1));

        let second = mountain(&mut game, p1, Zone::Hand);
        let err = game
            .submit_action(p1, Action::Special(SpecialAction::PlayLand { card: second }))
            .unwrap_err();
        assert!(matches!(err.as_rejection(), Some(ActionError::LandDropUsed { .. })));
    }

    #[test]
    fn test_cast_taps_mana_sources_and_pushes_spell() {
        let mut game = started();
        let (p1, p2) = (game.players[0].id, game.players[1].id);
        let land = mountain(&mut game, p1, Zone::Battlefield);
        let spell = shock(&mut game, p1);

        let outcome = game
            .submit_action(
                p1,
                Action::CastSpell {
                    card: spell,
                    targets: vec![TargetRef::Player(p2)],
                    mana_sources: vec![land],
                },
            )
            .unwrap();
        assert!(outcome.contains(|e| matches!(e, GameEvent::SpellCast { .. })));
        assert!(game.cards.get(land).unwrap().tapped);
        assert_eq!(game.stack.len(), 1);
        assert_eq!(game.priority.holder(), Some(p1));
    }

    #[test]
    fn test_rejected_cast_changes_nothing() {
        let mut game = started();
        let (p1, p2) = (game.players[0].id, game.players[1].id);
        let spell = shock(&mut game, p1);
        let events_before = game.event_log.len();

        let err = game
            .submit_action(
                p1,
                Action::CastSpell {
                    card: spell,
                    targets: vec![TargetRef::Player(p2)],
                    mana_sources: vec![],
                },
            )
            .unwrap_err();
        assert!(matches!(err.as_rejection(), Some(ActionError::CannotPayCost(_))));
        assert_eq!(game.cards.get(spell).unwrap().zone, Zone::Hand);
        assert_eq!(game.event_log.len(), events_before);
    }

    #[test]
    fn test_decision_must_be_pending() {
        let mut game = started();
        let p1 = game.players[0].id;
        let err = game
            .submit_action(
                p1,
                Action::Special(SpecialAction::DeclareAttackers { attackers: vec![] }),
            )
            .unwrap_err();
        assert_eq!(
            err.as_rejection(),
            Some(&ActionError::NoPendingDecision { player: p1 })
        );
    }

    #[test]
    fn test_legal_actions_lists_affordable_spells() {
        let mut game = started();
        let (p1, p2) = (game.players[0].id, game.players[1].id);
        mountain(&mut game, p1, Zone::Battlefield);
        let spell = shock(&mut game, p1);

        let actions = game.legal_actions(p1);
        assert_eq!(actions[0], Action::Pass);
        let casts: Vec<&Action> = actions
            .iter()
            .filter(|a| matches!(a, Action::CastSpell { card, .. } if *card == spell))
            .collect();
        // Two players to target, no creatures or planeswalkers
        assert_eq!(casts.len(), 2);
        assert!(game.legal_actions(p2).is_empty());
    }
}
