//! Action sources and the read-only game view
//!
//! An `ActionSource` is whatever picks actions for one player: an AI, a
//! script, a human front end or a network relay. The driver hands it a
//! `GameStateView` and the engine's list of legal actions; turn-based
//! decisions (attackers, blockers, discards) have their own callbacks.

use crate::core::{CardId, ManaPool, PlayerId};
use crate::game::{Action, GameState, PendingDecision, Phase, StackItem, Step};
use crate::zones::Zone;

/// Public facts about one player
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerSnapshot {
    pub id: PlayerId,
    pub name: String,
    pub life: i32,
    pub poison: u32,
    pub mana_pool: ManaPool,
    pub hand_size: usize,
    pub library_size: usize,
    pub has_lost: bool,
    /// Permanents this player controls
    pub battlefield: Vec<CardId>,
}

/// Read-only view of the game from one player's seat
pub struct GameStateView<'a> {
    game: &'a GameState,
    player_id: PlayerId,
}

impl<'a> GameStateView<'a> {
    pub fn new(game: &'a GameState, player_id: PlayerId) -> Self {
        GameStateView { game, player_id }
    }

    pub fn player_id(&self) -> PlayerId {
        self.player_id
    }

    pub fn turn_number(&self) -> u32 {
        self.game.turn.turn_number
    }

    pub fn current_step(&self) -> Step {
        self.game.turn.current_step
    }

    pub fn current_phase(&self) -> Phase {
        self.game.turn.current_phase()
    }

    pub fn active_player(&self) -> PlayerId {
        self.game.turn.active_player
    }

    pub fn priority_holder(&self) -> Option<PlayerId> {
        self.game.priority.holder()
    }

    /// Stack from bottom to top; the top is the last item
    pub fn stack(&self) -> &[StackItem] {
        self.game.stack.items()
    }

    pub fn pending_decision(&self) -> Option<&PendingDecision> {
        self.game.pending_decisions.front()
    }

    /// Cards in this player's own hand
    pub fn hand(&self) -> &[CardId] {
        self.game
            .get_player_zones(self.player_id)
            .map(|zones| zones.hand.cards.as_slice())
            .unwrap_or(&[])
    }

    pub fn battlefield(&self) -> &[CardId] {
        &self.game.battlefield.cards
    }

    pub fn is_card_in_zone(&self, card_id: CardId, zone: Zone) -> bool {
        self.game.cards.get(card_id).is_ok_and(|c| c.zone == zone)
    }

    pub fn card_name(&self, card_id: CardId) -> Option<String> {
        self.game.cards.get(card_id).ok().map(|c| c.name.to_string())
    }

    pub fn is_land(&self, card_id: CardId) -> bool {
        self.game.cards.get(card_id).is_ok_and(|c| c.is_land())
    }

    pub fn is_creature(&self, card_id: CardId) -> bool {
        self.game.cards.get(card_id).is_ok_and(|c| c.is_creature())
    }

    pub fn is_tapped(&self, card_id: CardId) -> bool {
        self.game.cards.get(card_id).is_ok_and(|c| c.tapped)
    }

    pub fn controller(&self, card_id: CardId) -> Option<PlayerId> {
        self.game.cards.get(card_id).ok().map(|c| c.controller)
    }

    pub fn power(&self, card_id: CardId) -> i32 {
        self.game.power(card_id)
    }

    pub fn toughness(&self, card_id: CardId) -> i32 {
        self.game.toughness(card_id)
    }

    pub fn life(&self) -> i32 {
        self.game.get_player(self.player_id).map(|p| p.life).unwrap_or(0)
    }

    pub fn opponents(&self) -> Vec<PlayerId> {
        self.game.opponents(self.player_id)
    }

    pub fn player(&self, id: PlayerId) -> Option<PlayerSnapshot> {
        let player = self.game.get_player(id).ok()?;
        let zones = self.game.get_player_zones(id)?;
        Some(PlayerSnapshot {
            id,
            name: player.name.to_string(),
            life: player.life,
            poison: player.poison,
            mana_pool: player.mana_pool,
            hand_size: zones.hand.len(),
            library_size: zones.library.len(),
            has_lost: player.has_lost(),
            battlefield: self
                .game
                .battlefield
                .cards
                .iter()
                .copied()
                .filter(|&c| self.controller(c) == Some(id))
                .collect(),
        })
    }

    pub fn players(&self) -> Vec<PlayerSnapshot> {
        self.game.players.iter().filter_map(|p| self.player(p.id)).collect()
    }

    /// Creatures this player could attack with
    pub fn attack_candidates(&self) -> Vec<CardId> {
        self.game.attack_candidates(self.player_id)
    }

    /// Creatures this player could block with
    pub fn block_candidates(&self) -> Vec<CardId> {
        self.game.block_candidates(self.player_id)
    }

    /// Attackers coming at this player
    pub fn incoming_attackers(&self) -> Vec<CardId> {
        self.game
            .combat
            .attackers
            .iter()
            .filter(|(_, defender)| **defender == self.player_id)
            .map(|(attacker, _)| *attacker)
            .collect()
    }

    pub fn legal_actions(&self) -> Vec<Action> {
        self.game.legal_actions(self.player_id)
    }

    /// Check a blocking assignment without submitting it
    pub fn blocks_are_legal(&self, blocks: &[(CardId, CardId)]) -> bool {
        self.game.validate_blocks(self.player_id, blocks).is_ok()
    }
}

/// Something that chooses actions for one player
pub trait ActionSource {
    fn player_id(&self) -> PlayerId;

    /// Pick one of `legal` while holding priority. `legal` always contains
    /// `Action::Pass`.
    fn choose_action(&mut self, view: &GameStateView, legal: &[Action]) -> Action;

    /// Attacking creatures and the players they attack
    fn declare_attackers(&mut self, view: &GameStateView) -> Vec<(CardId, PlayerId)>;

    /// Blocking creatures and the attackers they block
    fn declare_blockers(&mut self, view: &GameStateView) -> Vec<(CardId, CardId)>;

    /// Exactly `count` cards from hand
    fn choose_discard(&mut self, view: &GameStateView, count: usize) -> Vec<CardId>;

    fn on_game_end(&mut self, _view: &GameStateView, _won: bool) {}
}
