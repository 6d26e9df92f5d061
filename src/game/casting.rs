//! Casting and activation legality
//!
//! Validators only read the game state. Each returns the first rule the
//! request breaks, in a fixed order: source, then timing, then priority,
//! then targets. Costs are checked last, by the payment planner.

use crate::core::{
    ActivatedAbility, Card, CardId, CardType, Keyword, PlayerId, TargetKind, TargetRef, Timing,
};
use crate::error::{ActionError, TargetViolation, TimingViolation};
use crate::game::{ChosenTarget, GameState, Step};
use crate::zones::Zone;
use smallvec::SmallVec;

type Check<T> = std::result::Result<T, ActionError>;

/// The parts of the game state timing rules depend on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimingContext {
    pub step: Step,
    pub active_player: PlayerId,
    pub priority_holder: Option<PlayerId>,
    pub stack_depth: usize,
}

impl TimingContext {
    pub fn of(game: &GameState) -> Self {
        TimingContext {
            step: game.turn.current_step,
            active_player: game.turn.active_player,
            priority_holder: game.priority.holder(),
            stack_depth: game.stack.len(),
        }
    }
}

/// Check timing, then priority
///
/// Sorcery-speed violations are reported as `WrongTiming` even when the
/// actor also lacks priority.
pub fn check_timing(actor: PlayerId, timing: Timing, ctx: &TimingContext) -> Check<()> {
    if timing == Timing::SorcerySpeed {
        if !ctx.step.is_main() {
            return Err(ActionError::WrongTiming(TimingViolation::NotMainPhase { step: ctx.step }));
        }
        if ctx.stack_depth > 0 {
            return Err(ActionError::WrongTiming(TimingViolation::StackNotEmpty {
                depth: ctx.stack_depth,
            }));
        }
        if actor != ctx.active_player {
            return Err(ActionError::WrongTiming(TimingViolation::NotActivePlayer {
                active: ctx.active_player,
            }));
        }
    }
    if ctx.priority_holder != Some(actor) {
        return Err(ActionError::NotPriorityHolder {
            actor,
            holder: ctx.priority_holder,
        });
    }
    Ok(())
}

/// Timing of casting a card as a spell
pub fn spell_timing(card: &Card) -> Timing {
    match &card.spell {
        Some(spell) => spell.timing,
        None if card.is_type(CardType::Instant) => Timing::InstantSpeed,
        None => Timing::SorcerySpeed,
    }
}

fn invalid_source(card: CardId, reason: &str) -> ActionError {
    ActionError::InvalidSource {
        card,
        reason: reason.to_string(),
    }
}

impl GameState {
    /// Whether `actor` may cast `card_id` right now, ignoring targets and costs
    pub fn can_cast(&self, actor: PlayerId, card_id: CardId) -> Check<()> {
        let card = self
            .cards
            .get(card_id)
            .map_err(|_| invalid_source(card_id, "no such card"))?;
        if card.zone != Zone::Hand || card.owner != actor {
            return Err(invalid_source(card_id, "not in your hand"));
        }
        if card.is_land() {
            return Err(invalid_source(card_id, "lands are played, not cast"));
        }
        check_timing(actor, spell_timing(card), &TimingContext::of(self))
    }

    /// Whether `actor` may activate ability `index` of `source` right now
    pub fn can_activate(&self, actor: PlayerId, source: CardId, index: usize) -> Check<&ActivatedAbility> {
        let card = self
            .cards
            .get(source)
            .map_err(|_| invalid_source(source, "no such card"))?;
        if card.zone != Zone::Battlefield {
            return Err(invalid_source(source, "not on the battlefield"));
        }
        if card.controller != actor {
            return Err(invalid_source(source, "you do not control it"));
        }
        let ability = card
            .activated
            .get(index)
            .ok_or_else(|| invalid_source(source, "no activated ability with that index"))?;
        let timing = if ability.is_mana_ability {
            Timing::InstantSpeed
        } else {
            ability.timing
        };
        check_timing(actor, timing, &TimingContext::of(self))?;
        if card.loyalty_activated && ability.cost.is_loyalty() {
            return Err(invalid_source(source, "a loyalty ability was already activated this turn"));
        }
        Ok(ability)
    }

    /// Whether `actor` may play `card_id` as their land for the turn
    pub fn can_play_land(&self, actor: PlayerId, card_id: CardId) -> Check<()> {
        let card = self
            .cards
            .get(card_id)
            .map_err(|_| invalid_source(card_id, "no such card"))?;
        if card.zone != Zone::Hand || card.owner != actor {
            return Err(invalid_source(card_id, "not in your hand"));
        }
        if !card.is_land() {
            return Err(invalid_source(card_id, "not a land"));
        }
        check_timing(actor, Timing::SorcerySpeed, &TimingContext::of(self))?;
        let player = self
            .get_player(actor)
            .map_err(|_| invalid_source(card_id, "unknown player"))?;
        if !player.can_play_land() {
            return Err(ActionError::LandDropUsed {
                played: player.lands_played_this_turn,
                allowed: player.max_lands_per_turn,
            });
        }
        Ok(())
    }

    /// Timestamp identifying the object a target refers to right now
    pub fn target_timestamp(&self, target: TargetRef) -> Option<u64> {
        match target {
            TargetRef::Player(_) => Some(0),
            TargetRef::Card(card) => self.cards.get(card).ok().map(|c| c.timestamp),
            TargetRef::StackItem(id) => self.stack.get(id).map(|item| item.timestamp),
        }
    }

    /// Whether `target` is a legal choice for a `kind` requirement of an
    /// object controlled by `controller`
    ///
    /// With `expected_timestamp`, the target must also still be the same
    /// object it was when chosen.
    pub fn check_target(
        &self,
        kind: TargetKind,
        target: TargetRef,
        controller: PlayerId,
        expected_timestamp: Option<u64>,
    ) -> std::result::Result<(), TargetViolation> {
        match target {
            TargetRef::Player(player) => {
                if !matches!(kind, TargetKind::Any | TargetKind::Player) {
                    return Err(TargetViolation::WrongKind { expected: kind });
                }
                let p = self.get_player(player).map_err(|_| TargetViolation::NotFound)?;
                if p.has_lost() {
                    return Err(TargetViolation::PlayerGone);
                }
                Ok(())
            }
            TargetRef::Card(card_id) => {
                let card = self.cards.get(card_id).map_err(|_| TargetViolation::NotFound)?;
                if card.zone != Zone::Battlefield {
                    return Err(TargetViolation::NotFound);
                }
                if expected_timestamp.is_some_and(|ts| ts != card.timestamp) {
                    return Err(TargetViolation::NotFound);
                }
                let kind_ok = match kind {
                    TargetKind::Any => card.is_creature() || card.is_planeswalker(),
                    TargetKind::Creature => card.is_creature(),
                    TargetKind::Permanent => true,
                    TargetKind::Planeswalker => card.is_planeswalker(),
                    TargetKind::Player | TargetKind::Spell => false,
                };
                if !kind_ok {
                    return Err(TargetViolation::WrongKind { expected: kind });
                }
                let chars = self.characteristics(card_id).map_err(|_| TargetViolation::NotFound)?;
                if chars.has_keyword(Keyword::Shroud) {
                    return Err(TargetViolation::Shroud);
                }
                if chars.has_keyword(Keyword::Hexproof) && card.controller != controller {
                    return Err(TargetViolation::Hexproof);
                }
                Ok(())
            }
            TargetRef::StackItem(id) => {
                if kind != TargetKind::Spell {
                    return Err(TargetViolation::WrongKind { expected: kind });
                }
                let item = self.stack.get(id).ok_or(TargetViolation::NotFound)?;
                if expected_timestamp.is_some_and(|ts| ts != item.timestamp) {
                    return Err(TargetViolation::NotFound);
                }
                if !item.is_spell() {
                    return Err(TargetViolation::WrongKind { expected: kind });
                }
                Ok(())
            }
        }
    }

    /// Validate a full target choice against a list of requirements
    pub fn validate_targets(
        &self,
        kinds: &[TargetKind],
        targets: &[TargetRef],
        controller: PlayerId,
    ) -> Check<SmallVec<[ChosenTarget; 2]>> {
        if kinds.len() != targets.len() {
            return Err(ActionError::IllegalTarget {
                index: kinds.len().min(targets.len()),
                reason: TargetViolation::Count {
                    expected: kinds.len(),
                    got: targets.len(),
                },
            });
        }
        let mut chosen = SmallVec::new();
        for (index, (&kind, &target)) in kinds.iter().zip(targets).enumerate() {
            if targets[..index].contains(&target) {
                return Err(ActionError::IllegalTarget {
                    index,
                    reason: TargetViolation::Duplicate,
                });
            }
            self.check_target(kind, target, controller, None)
                .map_err(|reason| ActionError::IllegalTarget { index, reason })?;
            chosen.push(ChosenTarget {
                kind,
                target,
                timestamp: self.target_timestamp(target).unwrap_or(0),
            });
        }
        Ok(chosen)
    }

    /// Every legal object for one target requirement, players first
    ///
    /// Stack items are listed top first, so a counterspell considers the most
    /// recent spell first.
    pub fn legal_targets(&self, kind: TargetKind, controller: PlayerId) -> Vec<TargetRef> {
        let mut out = Vec::new();
        for player in self.apnap_order() {
            let target = TargetRef::Player(player);
            if self.check_target(kind, target, controller, None).is_ok() {
                out.push(target);
            }
        }
        for &card in &self.battlefield.cards {
            let target = TargetRef::Card(card);
            if self.check_target(kind, target, controller, None).is_ok() {
                out.push(target);
            }
        }
        for item in self.stack.items().iter().rev() {
            let target = TargetRef::StackItem(item.id);
            if self.check_target(kind, target, controller, None).is_ok() {
                out.push(target);
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(step: Step, stack_depth: usize) -> TimingContext {
        TimingContext {
            step,
            active_player: PlayerId::new(0),
            priority_holder: Some(PlayerId::new(0)),
            stack_depth,
        }
    }

    #[test]
    fn test_sorcery_speed_in_main_with_empty_stack() {
        assert!(check_timing(PlayerId::new(0), Timing::SorcerySpeed, &ctx(Step::Main1, 0)).is_ok());
        assert!(check_timing(PlayerId::new(0), Timing::SorcerySpeed, &ctx(Step::Main2, 0)).is_ok());
    }

    #[test]
    fn test_sorcery_speed_violations() {
        let active = PlayerId::new(0);
        assert_eq!(
            check_timing(active, Timing::SorcerySpeed, &ctx(Step::CombatDamage, 0)),
            Err(ActionError::WrongTiming(TimingViolation::NotMainPhase {
                step: Step::CombatDamage
            }))
        );
        assert_eq!(
            check_timing(active, Timing::SorcerySpeed, &ctx(Step::Main1, 1)),
            Err(ActionError::WrongTiming(TimingViolation::StackNotEmpty { depth: 1 }))
        );
    }

    #[test]
    fn test_timing_reported_before_priority() {
        let other = PlayerId::new(1);
        // Not the active player and not the priority holder: timing wins
        assert_eq!(
            check_timing(other, Timing::SorcerySpeed, &ctx(Step::Main1, 0)),
            Err(ActionError::WrongTiming(TimingViolation::NotActivePlayer {
                active: PlayerId::new(0)
            }))
        );
        // Instant speed only needs priority
        assert_eq!(
            check_timing(other, Timing::InstantSpeed, &ctx(Step::Main1, 0)),
            Err(ActionError::NotPriorityHolder {
                actor: other,
                holder: Some(PlayerId::new(0)),
            })
        );
    }

    #[test]
    fn test_instant_speed_anywhere_with_priority() {
        for step in [Step::Upkeep, Step::DeclareBlockers, Step::End] {
            assert!(check_timing(PlayerId::new(0), Timing::InstantSpeed, &ctx(step, 3)).is_ok());
        }
    }

    #[test]
    fn test_hexproof_only_stops_opponents() {
        let mut game = GameState::new_two_player("Alice".to_string(), "Bob".to_string(), 20);
        let (p1, p2) = (game.players[0].id, game.players[1].id);
        let mut card = Card::new(game.next_card_id(), "Troll", p1);
        card.types.push(CardType::Creature);
        card.toughness = Some(2);
        card.keywords.push(Keyword::Hexproof);
        let id = game.add_card(card, Zone::Battlefield).unwrap();

        let target = TargetRef::Card(id);
        assert!(game.check_target(TargetKind::Creature, target, p1, None).is_ok());
        assert_eq!(
            game.check_target(TargetKind::Creature, target, p2, None),
            Err(TargetViolation::Hexproof)
        );
        assert_eq!(
            game.check_target(TargetKind::Player, target, p1, None),
            Err(TargetViolation::WrongKind {
                expected: TargetKind::Player
            })
        );
    }

    #[test]
    fn test_validate_targets_count_and_duplicates() {
        let game = GameState::new_two_player("Alice".to_string(), "Bob".to_string(), 20);
        let (p1, p2) = (game.players[0].id, game.players[1].id);

        let err = game.validate_targets(&[TargetKind::Player], &[], p1).unwrap_err();
        assert!(matches!(
            err,
            ActionError::IllegalTarget {
                reason: TargetViolation::Count { expected: 1, got: 0 },
                ..
            }
        ));

        let both = [TargetRef::Player(p2), TargetRef::Player(p2)];
        let err = game
            .validate_targets(&[TargetKind::Player, TargetKind::Player], &both, p1)
            .unwrap_err();
        assert_eq!(
            err,
            ActionError::IllegalTarget {
                index: 1,
                reason: TargetViolation::Duplicate
            }
        );
    }
}
