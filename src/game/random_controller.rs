//! Random action source
//!
//! Picks uniformly among the legal actions and makes coin-flip combat
//! declarations. A baseline opponent and the workhorse of soak testing.

use crate::core::{CardId, PlayerId};
use crate::game::controller::{ActionSource, GameStateView};
use crate::game::Action;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha12Rng;

pub struct RandomController {
    player_id: PlayerId,
    rng: ChaCha12Rng,
}

impl RandomController {
    /// Seeded, so a game between random controllers replays exactly
    pub fn with_seed(player_id: PlayerId, seed: u64) -> Self {
        RandomController {
            player_id,
            rng: ChaCha12Rng::seed_from_u64(seed),
        }
    }
}

impl ActionSource for RandomController {
    fn player_id(&self) -> PlayerId {
        self.player_id
    }

    fn choose_action(&mut self, _view: &GameStateView, legal: &[Action]) -> Action {
        legal.choose(&mut self.rng).cloned().unwrap_or(Action::Pass)
    }

    fn declare_attackers(&mut self, view: &GameStateView) -> Vec<(CardId, PlayerId)> {
        let opponents = view.opponents();
        if opponents.is_empty() {
            return Vec::new();
        }
        let mut attackers = Vec::new();
        for attacker in view.attack_candidates() {
            if self.rng.gen_bool(0.5) {
                let defender = opponents[self.rng.gen_range(0..opponents.len())];
                attackers.push((attacker, defender));
            }
        }
        attackers
    }

    fn declare_blockers(&mut self, view: &GameStateView) -> Vec<(CardId, CardId)> {
        let incoming = view.incoming_attackers();
        if incoming.is_empty() {
            return Vec::new();
        }
        let mut blocks: Vec<(CardId, CardId)> = Vec::new();
        for blocker in view.block_candidates() {
            if self.rng.gen_bool(0.5) {
                let attacker = incoming[self.rng.gen_range(0..incoming.len())];
                blocks.push((blocker, attacker));
            }
        }
        // Drop blocks until the assignment is legal; no blocks always is
        while !view.blocks_are_legal(&blocks) {
            blocks.pop();
        }
        blocks
    }

    fn choose_discard(&mut self, view: &GameStateView, count: usize) -> Vec<CardId> {
        view.hand().choose_multiple(&mut self.rng, count).copied().collect()
    }
}
