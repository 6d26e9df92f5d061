//! Shared fixtures for integration tests

#![allow(dead_code)]

use mtg_rules_kernel::core::{CardId, PlayerId};
use mtg_rules_kernel::game::{Action, EngineConfig, GameState, Step, VerbosityLevel};
use mtg_rules_kernel::loader::{sample_pool, CardDatabase};
use mtg_rules_kernel::zones::Zone;

/// A game plus the sample pool to create cards from
pub struct Table {
    pub game: GameState,
    pub db: CardDatabase,
}

impl Table {
    pub fn new(players: usize) -> Self {
        Self::with_config(players, EngineConfig::default())
    }

    pub fn with_config(players: usize, config: EngineConfig) -> Self {
        let names: Vec<String> = ["Alice", "Bob", "Carol", "Dave"]
            .iter()
            .take(players)
            .map(|s| s.to_string())
            .collect();
        let name_refs: Vec<&str> = names.iter().map(String::as_str).collect();
        let mut game = GameState::new_multiplayer(&name_refs, config);
        game.logger.set_verbosity(VerbosityLevel::Silent);
        Table {
            game,
            db: sample_pool(),
        }
    }

    /// Two players, started, in the active player's first main phase with
    /// priority
    pub fn in_main_phase() -> Self {
        let mut table = Self::new(2);
        table.game.start_game().unwrap();
        table.game.begin_step(Step::Main1).unwrap();
        table
    }

    pub fn player(&self, seat: usize) -> PlayerId {
        self.game.players[seat].id
    }

    /// Create a sample-pool card for `owner` directly in `zone`
    pub fn put(&mut self, name: &str, owner: PlayerId, zone: Zone) -> CardId {
        let id = self.game.next_card_id();
        let card = self.db.get(name).unwrap_or_else(|| panic!("no card {name}")).instantiate(id, owner);
        self.game.add_card(card, zone).unwrap()
    }

    pub fn lands(&mut self, name: &str, owner: PlayerId, count: usize) -> Vec<CardId> {
        (0..count).map(|_| self.put(name, owner, Zone::Battlefield)).collect()
    }

    pub fn holder(&self) -> PlayerId {
        self.game.priority.holder().expect("someone holds priority")
    }

    /// Every live player passes once, starting with the holder
    pub fn pass_round(&mut self) {
        let players = self.game.apnap_order().len();
        for _ in 0..players {
            let holder = self.holder();
            self.game.submit_action(holder, Action::Pass).unwrap();
        }
    }

    /// Pass until the stack is empty
    pub fn resolve_stack(&mut self) {
        while !self.game.stack.is_empty() {
            self.pass_round();
        }
    }

    pub fn zone_of(&self, card: CardId) -> Zone {
        self.game.cards.get(card).unwrap().zone
    }

    pub fn life(&self, player: PlayerId) -> i32 {
        self.game.get_player(player).unwrap().life
    }

    pub fn is_tapped(&self, card: CardId) -> bool {
        self.game.cards.get(card).unwrap().tapped
    }
}
