//! Turn sequencer
//!
//! Walks the static `TURN_SEQUENCE`. Entering a step runs its entry actions
//! in order, then the state-based action fixpoint and trigger placement, and
//! finally grants priority to the active player (or moves straight on for
//! steps without priority). Entry actions that need a player's choice push a
//! `PendingDecision` and pause; the cursor in `TurnStructure` resumes them
//! once the decision is submitted.

use crate::core::{CardId, PlayerId};
use crate::game::phase::StepEntryAction;
use crate::game::{ActionOutcome, GameEvent, GameOutcome, GameState, Step};
use crate::zones::Zone;
use crate::{MtgError, Result};
use serde::{Deserialize, Serialize};

/// Turn-based choices the engine asks a player for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DecisionKind {
    DeclareAttackers,
    DeclareBlockers,
    DiscardToHandSize,
}

/// A decision the engine is waiting for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingDecision {
    pub player: PlayerId,
    pub kind: DecisionKind,
    /// Cards to discard; unused for declarations
    pub count: usize,
}

impl GameState {
    /// Begin the first turn
    pub fn start_game(&mut self) -> Result<ActionOutcome> {
        if self.started {
            return Err(MtgError::InvalidAction("game already started".to_string()));
        }
        self.started = true;
        let mark = self.event_log.len();

        let players = self.players.iter().map(|p| p.id).collect();
        self.emit(GameEvent::GameStarted { players });
        self.emit(GameEvent::TurnBegan {
            turn: self.turn.turn_number,
            active: self.turn.active_player,
        });
        self.begin_step(Step::Untap)?;
        Ok(self.outcome_since(mark))
    }

    /// Enter a step
    ///
    /// Declare blockers and combat damage are skipped when no creature is
    /// attacking; the guard is checked here, the sequence itself never
    /// changes.
    pub fn begin_step(&mut self, step: Step) -> Result<()> {
        self.priority.revoke();
        self.turn.current_step = step;
        self.turn.entry_cursor = 0;

        if matches!(step, Step::DeclareBlockers | Step::CombatDamage) && !self.combat.has_attackers() {
            self.emit(GameEvent::StepSkipped { step });
            return self.advance();
        }

        self.emit(GameEvent::StepBegan {
            turn: self.turn.turn_number,
            step,
        });
        self.run_entry_actions()
    }

    /// Run entry actions from the cursor until one asks for a decision
    fn run_entry_actions(&mut self) -> Result<()> {
        let actions = self.turn.current_step.spec().entry_actions;
        while let Some(&action) = actions.get(self.turn.entry_cursor) {
            self.turn.entry_cursor += 1;
            self.perform_entry_action(action)?;
            if self.is_game_over() || !self.pending_decisions.is_empty() {
                return Ok(());
            }
        }
        self.finish_step_entry()
    }

    fn finish_step_entry(&mut self) -> Result<()> {
        let changed = self.settle()?;
        if self.is_game_over() {
            return Ok(());
        }
        let step = self.turn.current_step;
        if step == Step::Cleanup {
            if changed || !self.stack.is_empty() {
                self.turn.cleanup_again = true;
                self.grant_priority_to_active();
                return Ok(());
            }
            return self.advance();
        }
        if step.grants_priority() {
            self.grant_priority_to_active();
            Ok(())
        } else {
            self.advance()
        }
    }

    fn perform_entry_action(&mut self, action: StepEntryAction) -> Result<()> {
        let active = self.turn.active_player;
        let active_alive = self.get_player(active).is_ok_and(|p| !p.has_lost());
        match action {
            StepEntryAction::EmptyManaPools => {
                let emptied: Vec<PlayerId> = self
                    .players
                    .iter_mut()
                    .filter(|p| !p.mana_pool.is_empty())
                    .map(|p| {
                        p.empty_mana_pool();
                        p.id
                    })
                    .collect();
                for player in emptied {
                    self.emit(GameEvent::ManaPoolEmptied { player });
                }
            }
            StepEntryAction::ResetLandDrops => {
                for player in &mut self.players {
                    player.reset_lands_played();
                }
            }
            StepEntryAction::ClearSummoningSickness => {
                for &id in &self.battlefield.cards {
                    let card = self.cards.get_mut(id)?;
                    if card.controller == active {
                        card.summoning_sick = false;
                    }
                }
            }
            StepEntryAction::UntapPermanents => {
                let tapped: Vec<CardId> = self
                    .battlefield
                    .cards
                    .iter()
                    .copied()
                    .filter(|&id| self.cards.get(id).is_ok_and(|c| c.controller == active && c.tapped))
                    .collect();
                for &id in &tapped {
                    self.cards.get_mut(id)?.untap();
                }
                self.emit(GameEvent::PermanentsUntapped {
                    player: active,
                    count: tapped.len(),
                });
            }
            StepEntryAction::DrawCard => {
                let skip = self.turn.turn_number == 1 && self.config.skip_first_draw;
                if !skip && active_alive {
                    self.draw_card(active)?;
                }
            }
            StepEntryAction::DeclareAttackers => {
                if active_alive && !self.attack_candidates(active).is_empty() {
                    self.pending_decisions.push_back(PendingDecision {
                        player: active,
                        kind: DecisionKind::DeclareAttackers,
                        count: 0,
                    });
                }
            }
            StepEntryAction::DeclareBlockers => {
                let defenders = self.combat.defending_players();
                for defender in self.apnap_order() {
                    if defenders.contains(&defender) && !self.block_candidates(defender).is_empty() {
                        self.pending_decisions.push_back(PendingDecision {
                            player: defender,
                            kind: DecisionKind::DeclareBlockers,
                            count: 0,
                        });
                    }
                }
            }
            StepEntryAction::CombatDamage => self.deal_combat_damage()?,
            StepEntryAction::DiscardToHandSize => {
                let excess = self.hand_size(active).saturating_sub(self.config.max_hand_size);
                if excess > 0 && active_alive {
                    self.pending_decisions.push_back(PendingDecision {
                        player: active,
                        kind: DecisionKind::DiscardToHandSize,
                        count: excess,
                    });
                }
            }
            StepEntryAction::RemoveMarkedDamage => {
                for &id in &self.battlefield.cards {
                    let card = self.cards.get_mut(id)?;
                    card.damage = 0;
                    card.deathtouch_damage = false;
                }
            }
            StepEntryAction::EndTurnEffects => {
                for &id in &self.battlefield.cards {
                    self.cards.get_mut(id)?.end_turn_effects();
                }
            }
        }
        Ok(())
    }

    /// Pop the front decision; once none remain, the paused step continues
    pub(crate) fn complete_decision(&mut self) -> Result<()> {
        self.pending_decisions.pop_front();
        if self.pending_decisions.is_empty() && !self.is_game_over() {
            self.run_entry_actions()?;
        }
        Ok(())
    }

    /// Discard exactly the requested number of cards from hand
    pub fn discard_to_hand_size(&mut self, player: PlayerId, cards: &[CardId], count: usize) -> Result<()> {
        let hand = self
            .get_player_zones(player)
            .map(|z| z.hand.cards.clone())
            .unwrap_or_default();
        if cards.len() != count {
            return Err(crate::error::ActionError::InvalidDeclaration(format!(
                "must discard exactly {count} card(s), got {}",
                cards.len()
            ))
            .into());
        }
        for (i, card) in cards.iter().enumerate() {
            if !hand.contains(card) || cards[..i].contains(card) {
                return Err(crate::error::ActionError::InvalidDeclaration(format!(
                    "card {card} cannot be discarded"
                ))
                .into());
            }
        }
        for &card in cards {
            self.move_card(card, Zone::Graveyard)?;
        }
        self.emit(GameEvent::CardsDiscarded {
            player,
            cards: cards.to_vec(),
        });
        Ok(())
    }

    /// State-based actions to a fixpoint, the game-over check, and trigger
    /// placement, repeated until nothing changes
    ///
    /// Returns whether anything happened.
    pub fn settle(&mut self) -> Result<bool> {
        let mut changed = false;
        loop {
            changed |= self.run_state_based_actions()?;
            if self.check_game_over() {
                return Ok(true);
            }
            if !self.place_pending_triggers()? {
                return Ok(changed);
            }
            changed = true;
        }
    }

    /// End the game once at most one player remains
    fn check_game_over(&mut self) -> bool {
        if self.is_game_over() {
            return true;
        }
        let mut live = self.players.iter().filter(|p| !p.has_lost()).map(|p| p.id);
        let winner = live.next();
        if live.next().is_some() {
            return false;
        }
        self.outcome = Some(GameOutcome { winner });
        self.priority.revoke();
        self.pending_decisions.clear();
        self.pending_triggers.clear();
        self.record(GameEvent::GameEnded { winner });
        true
    }

    /// Move to the next step if every player passed with an empty stack
    pub fn try_advance(&mut self) -> Result<bool> {
        if self.is_game_over() || !self.stack.is_empty() || !self.pending_decisions.is_empty() {
            return Ok(false);
        }
        let apnap = self.apnap_order();
        if !self.priority.is_round_complete(&apnap) {
            return Ok(false);
        }
        self.advance()?;
        Ok(true)
    }

    fn advance(&mut self) -> Result<()> {
        let step = self.turn.current_step;
        if step == Step::EndCombat {
            self.combat.clear();
        }
        match step.next() {
            Some(next) => self.begin_step(next),
            None if self.turn.cleanup_again => {
                self.turn.cleanup_again = false;
                self.begin_step(Step::Cleanup)
            }
            None => self.begin_next_turn(),
        }
    }

    /// Rotate to the next live player in seating order
    fn begin_next_turn(&mut self) -> Result<()> {
        let n = self.players.len();
        let current = self.turn.active_player_idx;
        let next_idx = (1..=n)
            .map(|offset| (current + offset) % n)
            .find(|&idx| !self.players[idx].has_lost());
        let Some(next_idx) = next_idx else {
            return Ok(());
        };
        let next = self.players[next_idx].id;
        self.turn.next_turn(next, next_idx);
        self.emit(GameEvent::TurnBegan {
            turn: self.turn.turn_number,
            active: next,
        });
        self.begin_step(Step::Untap)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Card, CardType, Color, LossReason};

    fn game() -> GameState {
        GameState::new_two_player("Alice".to_string(), "Bob".to_string(), 20)
    }

    #[test]
    fn test_start_game_grants_priority_in_upkeep() {
        let mut game = game();
        let p1 = game.players[0].id;
        game.start_game().unwrap();

        assert_eq!(game.turn.current_step, Step::Upkeep);
        assert_eq!(game.priority.holder(), Some(p1));
        assert!(game.start_game().is_err());
    }

    #[test]
    fn test_begin_step_empties_mana_pools() {
        let mut game = game();
        game.start_game().unwrap();
        let p2 = game.players[1].id;
        game.get_player_mut(p2).unwrap().mana_pool.add(Color::Red, 2);

        game.begin_step(Step::Draw).unwrap();
        assert!(game.players.iter().all(|p| p.mana_pool.is_empty()));
    }

    #[test]
    fn test_combat_steps_skipped_without_attackers() {
        let mut game = game();
        game.start_game().unwrap();
        game.begin_step(Step::DeclareAttackers).unwrap();
        assert_eq!(game.turn.current_step, Step::DeclareAttackers);
        assert!(game.pending_decisions.is_empty());

        let p1 = game.players[0].id;
        let p2 = game.players[1].id;
        game.pass_priority(p1).unwrap();
        game.pass_priority(p2).unwrap();

        assert_eq!(game.turn.current_step, Step::EndCombat);
        assert!(game
            .event_log
            .iter()
            .any(|e| matches!(e, GameEvent::StepSkipped { step: Step::CombatDamage })));
    }

    #[test]
    fn test_try_advance_needs_complete_round() {
        let mut game = game();
        game.start_game().unwrap();
        assert!(!game.try_advance().unwrap());
        assert_eq!(game.turn.current_step, Step::Upkeep);
    }

    #[test]
    fn test_discard_decision_pauses_cleanup() {
        let mut game = game();
        let p1 = game.players[0].id;
        game.start_game().unwrap();
        let mut cards = Vec::new();
        for _ in 0..9 {
            let mut card = Card::new(game.next_card_id(), "Forest", p1);
            card.types.push(CardType::Land);
            cards.push(game.add_card(card, Zone::Hand).unwrap());
        }

        game.begin_step(Step::Cleanup).unwrap();
        let decision = *game.pending_decisions.front().unwrap();
        assert_eq!(decision.kind, DecisionKind::DiscardToHandSize);
        assert_eq!(decision.count, 2);
        assert_eq!(game.priority.holder(), None);

        assert!(game.discard_to_hand_size(p1, &cards[..1], 2).is_err());
        game.discard_to_hand_size(p1, &cards[..2], 2).unwrap();
        game.complete_decision().unwrap();
        assert_eq!(game.hand_size(p1), 7);
        // Discarding changed nothing else, so the next turn begins
        assert_eq!(game.turn.turn_number, 2);
    }

    #[test]
    fn test_game_over_when_one_player_remains() {
        let mut game = game();
        game.start_game().unwrap();
        let (p1, p2) = (game.players[0].id, game.players[1].id);
        game.get_player_mut(p2).unwrap().life = 0;

        game.settle().unwrap();
        assert!(game.is_game_over());
        assert_eq!(game.get_winner(), Some(p1));
        assert_eq!(game.priority.holder(), None);
        assert_eq!(game.get_player(p2).unwrap().lost, Some(LossReason::ZeroLife));
    }

    #[test]
    fn test_turn_rotation_skips_lost_players() {
        let mut game = GameState::new_multiplayer(&["A", "B", "C"], Default::default());
        game.start_game().unwrap();
        game.players[1].lost = Some(LossReason::ZeroLife);

        game.begin_step(Step::Cleanup).unwrap();
        assert_eq!(game.turn.turn_number, 2);
        assert_eq!(game.turn.active_player, game.players[2].id);
    }
}
