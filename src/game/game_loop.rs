//! Game driver
//!
//! Runs a game by repeatedly asking the right `ActionSource` for input: the
//! player owing a turn-based decision if there is one, otherwise the
//! priority holder. The engine itself never blocks; this loop is one
//! possible host for it.

use crate::core::{LossReason, PlayerId};
use crate::game::controller::{ActionSource, GameStateView};
use crate::game::{Action, DecisionKind, GameEvent, GameState, PendingDecision, SpecialAction};
use crate::{MtgError, Result};

/// Actions one turn may take before the driver gives up on it
const MAX_ACTIONS_PER_TURN: u32 = 10_000;

/// Result of running a game
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameResult {
    /// None for a draw or an unfinished game
    pub winner: Option<PlayerId>,
    pub turns_played: u32,
    pub end_reason: GameEndReason,
    /// Actions the engine rejected and the driver replaced
    pub rejected_actions: u32,
}

/// Why the game ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEndReason {
    /// The last opponent's life reached 0
    PlayerDeath(PlayerId),
    /// The last opponent drew from an empty library
    Decking(PlayerId),
    /// The last opponent got too many poison counters
    Poison(PlayerId),
    /// Every remaining player lost at once
    Draw,
    TurnLimit,
}

pub struct GameLoop<'a> {
    pub game: &'a mut GameState,
    max_turns: u32,
    rejected_actions: u32,
    check_invariants: bool,
}

impl<'a> GameLoop<'a> {
    pub fn new(game: &'a mut GameState) -> Self {
        let max_turns = game.config.max_turns;
        GameLoop {
            game,
            max_turns,
            rejected_actions: 0,
            check_invariants: false,
        }
    }

    /// Verify state invariants after every action
    pub fn with_invariant_checks(mut self, enabled: bool) -> Self {
        self.check_invariants = enabled;
        self
    }

    pub fn with_max_turns(mut self, max_turns: u32) -> Self {
        self.max_turns = max_turns;
        self
    }

    /// Run until the game ends or the turn limit is passed
    ///
    /// `sources` holds one action source per player, in any order.
    pub fn run_game(&mut self, sources: &mut [&mut dyn ActionSource]) -> Result<GameResult> {
        if !self.game.started {
            self.game.start_game()?;
        }

        let mut turn = self.game.turn.turn_number;
        let mut actions_this_turn = 0;
        loop {
            if let Some(result) = self.finished() {
                self.notify_game_end(sources, result.winner);
                return Ok(result);
            }

            if self.game.turn.turn_number != turn {
                turn = self.game.turn.turn_number;
                actions_this_turn = 0;
            }
            actions_this_turn += 1;
            if actions_this_turn > MAX_ACTIONS_PER_TURN {
                return Err(MtgError::InvariantViolation(format!(
                    "turn {turn} exceeded {MAX_ACTIONS_PER_TURN} actions"
                )));
            }

            if let Some(decision) = self.game.pending_decisions.front().copied() {
                self.run_decision(sources, decision)?;
            } else {
                self.run_priority(sources)?;
            }
            if self.check_invariants {
                self.game.check_invariants()?;
            }
        }
    }

    fn finished(&self) -> Option<GameResult> {
        let turns_played = self.game.turn.turn_number;
        if let Some(outcome) = self.game.outcome {
            let end_reason = match outcome.winner {
                Some(winner) => match self.last_loss_reason() {
                    Some(LossReason::DrewFromEmptyLibrary) => GameEndReason::Decking(winner),
                    Some(LossReason::Poison) => GameEndReason::Poison(winner),
                    _ => GameEndReason::PlayerDeath(winner),
                },
                None => GameEndReason::Draw,
            };
            return Some(GameResult {
                winner: outcome.winner,
                turns_played,
                end_reason,
                rejected_actions: self.rejected_actions,
            });
        }
        if turns_played > self.max_turns {
            return Some(GameResult {
                winner: None,
                turns_played: self.max_turns,
                end_reason: GameEndReason::TurnLimit,
                rejected_actions: self.rejected_actions,
            });
        }
        None
    }

    fn last_loss_reason(&self) -> Option<LossReason> {
        self.game.event_log.iter().rev().find_map(|e| match e {
            GameEvent::PlayerLost { reason, .. } => Some(*reason),
            _ => None,
        })
    }

    fn source_for<'s, 'b>(
        sources: &'s mut [&'b mut dyn ActionSource],
        player: PlayerId,
    ) -> Result<&'s mut (dyn ActionSource + 'b)> {
        sources
            .iter_mut()
            .find(|s| s.player_id() == player)
            .map(|s| &mut **s)
            .ok_or_else(|| MtgError::InvalidAction(format!("no action source for player {player}")))
    }

    fn run_decision(&mut self, sources: &mut [&mut dyn ActionSource], decision: PendingDecision) -> Result<()> {
        let source = Self::source_for(sources, decision.player)?;
        let special = {
            let view = GameStateView::new(self.game, decision.player);
            match decision.kind {
                DecisionKind::DeclareAttackers => SpecialAction::DeclareAttackers {
                    attackers: source.declare_attackers(&view),
                },
                DecisionKind::DeclareBlockers => SpecialAction::DeclareBlockers {
                    blocks: source.declare_blockers(&view),
                },
                DecisionKind::DiscardToHandSize => SpecialAction::DiscardToHandSize {
                    cards: source.choose_discard(&view, decision.count),
                },
            }
        };

        match self.game.submit_action(decision.player, Action::Special(special)) {
            Ok(_) => Ok(()),
            Err(err) if err.as_rejection().is_some() => {
                self.note_rejection(decision.player, &err);
                let fallback = match decision.kind {
                    DecisionKind::DeclareAttackers => SpecialAction::DeclareAttackers { attackers: Vec::new() },
                    DecisionKind::DeclareBlockers => SpecialAction::DeclareBlockers { blocks: Vec::new() },
                    DecisionKind::DiscardToHandSize => {
                        let view = GameStateView::new(self.game, decision.player);
                        SpecialAction::DiscardToHandSize {
                            cards: view.hand().iter().take(decision.count).copied().collect(),
                        }
                    }
                };
                self.game.submit_action(decision.player, Action::Special(fallback))?;
                Ok(())
            }
            Err(err) => Err(err),
        }
    }

    fn run_priority(&mut self, sources: &mut [&mut dyn ActionSource]) -> Result<()> {
        let holder = self
            .game
            .priority
            .holder()
            .ok_or_else(|| MtgError::InvariantViolation("nobody holds priority".to_string()))?;
        let source = Self::source_for(sources, holder)?;
        let action = {
            let legal = self.game.legal_actions(holder);
            let view = GameStateView::new(self.game, holder);
            source.choose_action(&view, &legal)
        };

        match self.game.submit_action(holder, action) {
            Ok(_) => Ok(()),
            Err(err) if err.as_rejection().is_some() => {
                self.note_rejection(holder, &err);
                self.game.submit_action(holder, Action::Pass)?;
                Ok(())
            }
            Err(err) => Err(err),
        }
    }

    fn note_rejection(&mut self, player: PlayerId, err: &MtgError) {
        self.rejected_actions += 1;
        self.game
            .logger
            .verbose(&format!("Player {player}: action rejected ({err}), falling back"));
    }

    fn notify_game_end(&self, sources: &mut [&mut dyn ActionSource], winner: Option<PlayerId>) {
        for source in sources.iter_mut() {
            let player = source.player_id();
            let view = GameStateView::new(self.game, player);
            source.on_game_end(&view, winner == Some(player));
        }
    }
}
