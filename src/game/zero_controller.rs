//! First-choice action source
//!
//! Always takes the first legal action other than passing, attacks with
//! everything it can and never blocks. Games between two of these are fully
//! deterministic without any RNG.

use crate::core::{CardId, PlayerId};
use crate::game::controller::{ActionSource, GameStateView};
use crate::game::Action;

pub struct ZeroController {
    player_id: PlayerId,
}

impl ZeroController {
    pub fn new(player_id: PlayerId) -> Self {
        ZeroController { player_id }
    }
}

impl ActionSource for ZeroController {
    fn player_id(&self) -> PlayerId {
        self.player_id
    }

    fn choose_action(&mut self, _view: &GameStateView, legal: &[Action]) -> Action {
        legal
            .iter()
            .find(|a| !matches!(a, Action::Pass))
            .cloned()
            .unwrap_or(Action::Pass)
    }

    fn declare_attackers(&mut self, view: &GameStateView) -> Vec<(CardId, PlayerId)> {
        let Some(&defender) = view.opponents().first() else {
            return Vec::new();
        };
        view.attack_candidates().into_iter().map(|a| (a, defender)).collect()
    }

    fn declare_blockers(&mut self, _view: &GameStateView) -> Vec<(CardId, CardId)> {
        Vec::new()
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
    fn test_prefers_first_non_pass() {
        let game = GameState::new_two_player("Alice".to_string(), "Bob".to_string(), 20);
        let player_id = game.players[0].id;
        let mut controller = ZeroController::new(player_id);
        let view = GameStateView::new(&game, player_id);

        let land = Action::Special(SpecialAction::PlayLand { card: CardId::new(10) });
        assert_eq!(controller.choose_action(&view, &[Action::Pass, land.clone()]), land);
        assert_eq!(controller.choose_action(&view, &[Action::Pass]), Action::Pass);
    }
}
