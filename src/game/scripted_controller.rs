//! Scripted action source
//!
//! Replays a fixed list of actions and combat declarations, then passes.
//! The next scripted action is returned whether or not it is legal, so
//! scripts can also exercise rejections.

use crate::core::{CardId, PlayerId};
use crate::game::controller::{ActionSource, GameStateView};
use crate::game::Action;
use std::collections::VecDeque;

pub struct ScriptedController {
    player_id: PlayerId,
    actions: VecDeque<Action>,
    attacks: VecDeque<Vec<(CardId, PlayerId)>>,
    blocks: VecDeque<Vec<(CardId, CardId)>>,
}

impl ScriptedController {
    pub fn new(player_id: PlayerId, actions: Vec<Action>) -> Self {
        ScriptedController {
            player_id,
            actions: actions.into(),
            attacks: VecDeque::new(),
            blocks: VecDeque::new(),
        }
    }

    /// Attack declarations, one per declare attackers step
    pub fn with_attacks(mut self, attacks: Vec<Vec<(CardId, PlayerId)>>) -> Self {
        self.attacks = attacks.into();
        self
    }

    /// Block declarations, one per declare blockers step
    pub fn with_blocks(mut self, blocks: Vec<Vec<(CardId, CardId)>>) -> Self {
        self.blocks = blocks.into();
        self
    }

    pub fn remaining(&self) -> usize {
        self.actions.len()
    }
}

impl ActionSource for ScriptedController {
    fn player_id(&self) -> PlayerId {
        self.player_id
    }

    fn choose_action(&mut self, _view: &GameStateView, _legal: &[Action]) -> Action {
        self.actions.pop_front().unwrap_or(Action::Pass)
    }

    fn declare_attackers(&mut self, _view: &GameStateView) -> Vec<(CardId, PlayerId)> {
        self.attacks.pop_front().unwrap_or_default()
    }

    fn declare_blockers(&mut self, _view: &GameStateView) -> Vec<(CardId, CardId)> {
        self.blocks.pop_front().unwrap_or_default()
    }

    fn choose_discard(&mut self, view: &GameStateView, count: usize) -> Vec<CardId> {
        view.hand().iter().take(count).copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{GameState, SpecialAction};

    #[test]
    fn test_script_then_pass() {
        let game = GameState::new_two_player("Alice".to_string(), "Bob".to_string(), 20);
        let player_id = game.players[0].id;
        let land = Action::Special(SpecialAction::PlayLand { card: CardId::new(10) });
        let mut controller = ScriptedController::new(player_id, vec![land.clone()]);
        let view = GameStateView::new(&game, player_id);

        assert_eq!(controller.choose_action(&view, &[Action::Pass]), land);
        assert_eq!(controller.remaining(), 0);
        assert_eq!(controller.choose_action(&view, &[Action::Pass]), Action::Pass);
        assert!(controller.declare_attackers(&view).is_empty());
    }

    #[test]
    fn test_declarations_replay_one_per_step() {
        let game = GameState::new_two_player("Alice".to_string(), "Bob".to_string(), 20);
        let (p1, p2) = (game.players[0].id, game.players[1].id);
        let (attacker, blocker) = (CardId::new(20), CardId::new(21));
        let mut controller = ScriptedController::new(p1, vec![])
            .with_attacks(vec![vec![(attacker, p2)], vec![]])
            .with_blocks(vec![vec![(blocker, attacker)]]);
        let view = GameStateView::new(&game, p1);

        assert_eq!(controller.declare_attackers(&view), vec![(attacker, p2)]);
        assert!(controller.declare_attackers(&view).is_empty());
        assert_eq!(controller.declare_blockers(&view), vec![(blocker, attacker)]);
        assert!(controller.declare_blockers(&view).is_empty());
        assert_eq!(controller.choose_discard(&view, 2), Vec::<CardId>::new());
    }
}
