//! Priority passing
//!
//! `PriorityState` only knows who holds priority and who has passed since
//! priority was last granted. The APNAP order it cycles through is always
//! computed from the live `GameState`, never cached.

use crate::core::PlayerId;
use crate::error::ActionError;
use crate::game::{ActionOutcome, GameEvent, GameState};
use crate::Result;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Result of a legal pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassOutcome {
    /// Priority moved to the next player in APNAP order
    Passed { next: PlayerId },
    /// Every player has passed in succession
    RoundComplete,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PriorityState {
    holder: Option<PlayerId>,
    passed: SmallVec<[PlayerId; 4]>,
}

impl PriorityState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn holder(&self) -> Option<PlayerId> {
        self.holder
    }

    pub fn has_passed(&self, player: PlayerId) -> bool {
        self.passed.contains(&player)
    }

    pub fn passed(&self) -> &[PlayerId] {
        &self.passed
    }

    /// Give priority to `player` and start a new passing round
    pub fn grant(&mut self, player: PlayerId) {
        self.holder = Some(player);
        self.passed.clear();
    }

    /// Nobody holds priority (turn-based actions, game over)
    pub fn revoke(&mut self) {
        self.holder = None;
        self.passed.clear();
    }

    /// Record a pass by the holder and move priority along `apnap`
    pub fn pass(&mut self, player: PlayerId, apnap: &[PlayerId]) -> std::result::Result<PassOutcome, ActionError> {
        if self.holder != Some(player) {
            return Err(ActionError::NotPriorityHolder {
                actor: player,
                holder: self.holder,
            });
        }
        if !self.passed.contains(&player) {
            self.passed.push(player);
        }

        if self.is_round_complete(apnap) {
            self.holder = None;
            return Ok(PassOutcome::RoundComplete);
        }

        let start = apnap.iter().position(|&p| p == player).unwrap_or(0);
        let next = (1..=apnap.len())
            .map(|offset| apnap[(start + offset) % apnap.len()])
            .find(|p| !self.passed.contains(p));
        match next {
            Some(next) => {
                self.holder = Some(next);
                Ok(PassOutcome::Passed { next })
            }
            None => {
                self.holder = None;
                Ok(PassOutcome::RoundComplete)
            }
        }
    }

    /// Every live player has passed since the last grant
    pub fn is_round_complete(&self, apnap: &[PlayerId]) -> bool {
        !apnap.is_empty() && apnap.iter().all(|p| self.passed.contains(p))
    }
}

impl GameState {
    /// Live players in APNAP order: the active player, then seating order
    pub fn apnap_order(&self) -> SmallVec<[PlayerId; 4]> {
        let n = self.players.len();
        (0..n)
            .map(|offset| &self.players[(self.turn.active_player_idx + offset) % n])
            .filter(|p| !p.has_lost())
            .map(|p| p.id)
            .collect()
    }

    /// Grant priority to a player, starting a new passing round
    pub fn grant_priority(&mut self, player: PlayerId) {
        self.priority.grant(player);
        self.emit(GameEvent::PriorityGranted { player });
    }

    /// Grant priority to the first live player in APNAP order
    pub fn grant_priority_to_active(&mut self) {
        match self.apnap_order().first().copied() {
            Some(player) if !self.is_game_over() => self.grant_priority(player),
            _ => self.priority.revoke(),
        }
    }

    /// Called on every stack push or resolution
    ///
    /// Runs the state-based action fixpoint and trigger placement, then
    /// reopens priority with the active player.
    pub fn notify_stack_changed(&mut self) -> Result<()> {
        self.priority.revoke();
        self.settle()?;
        self.grant_priority_to_active();
        Ok(())
    }

    /// Pass priority
    ///
    /// When the round completes, the top of the stack resolves, or with an
    /// empty stack the game advances to the next step.
    pub fn pass_priority(&mut self, actor: PlayerId) -> Result<ActionOutcome> {
        self.ensure_actionable(actor)?;
        let mark = self.event_log.len();

        let apnap = self.apnap_order();
        let outcome = self.priority.pass(actor, &apnap)?;
        self.emit(GameEvent::PriorityPassed { player: actor });

        match outcome {
            PassOutcome::Passed { next } => {
                self.emit(GameEvent::PriorityGranted { player: next });
            }
            PassOutcome::RoundComplete => {
                if self.stack.is_empty() {
                    self.try_advance()?;
                } else {
                    self.resolve_top()?;
                }
            }
        }

        Ok(self.outcome_since(mark))
    }
}
