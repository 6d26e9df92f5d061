//! Game initialization from decks
//!
//! Builds a ready-to-start game: players seated in order, libraries filled
//! from deck lists, shuffled with the game's seeded RNG and opening hands
//! drawn.

use crate::core::PlayerId;
use crate::zones::Zone;
use crate::game::{EngineConfig, GameState};
use crate::loader::{CardDatabase, DeckList};
use crate::{MtgError, Result};

pub const OPENING_HAND_SIZE: usize = 7;

pub struct GameInitializer<'a> {
    card_db: &'a CardDatabase,
    opening_hand_size: usize,
}

impl<'a> GameInitializer<'a> {
    pub fn new(card_db: &'a CardDatabase) -> Self {
        GameInitializer {
            card_db,
            opening_hand_size: OPENING_HAND_SIZE,
        }
    }

    pub fn with_opening_hand_size(mut self, size: usize) -> Self {
        self.opening_hand_size = size;
        self
    }

    /// Initialize a two-player game from two decks
    pub fn init_game(
        &self,
        player1_name: &str,
        player1_deck: &DeckList,
        player2_name: &str,
        player2_deck: &DeckList,
        config: EngineConfig,
        seed: u64,
    ) -> Result<GameState> {
        self.init_multiplayer(
            &[(player1_name, player1_deck), (player2_name, player2_deck)],
            config,
            seed,
        )
    }

    /// Initialize a game with one (name, deck) pair per seat
    ///
    /// The game is not started; call `start_game` or hand it to a `GameLoop`.
    pub fn init_multiplayer(&self, seats: &[(&str, &DeckList)], config: EngineConfig, seed: u64) -> Result<GameState> {
        if seats.len() < 2 {
            return Err(MtgError::InvalidAction(format!(
                "a game needs at least 2 players, got {}",
                seats.len()
            )));
        }
        for (_, deck) in seats {
            deck.validate(self.card_db)?;
        }

        let names: Vec<&str> = seats.iter().map(|(name, _)| *name).collect();
        let mut game = GameState::new_multiplayer(&names, config);
        game.seed_rng(seed);

        let player_ids: Vec<PlayerId> = game.players.iter().map(|p| p.id).collect();
        for (&player_id, (_, deck)) in player_ids.iter().zip(seats) {
            self.load_deck_into_game(&mut game, player_id, deck)?;
            game.shuffle_library(player_id);
        }
        for &player_id in &player_ids {
            for _ in 0..self.opening_hand_size {
                game.draw_card(player_id)?;
            }
        }

        game.logger.verbose(&format!(
            "Initialized {} player game with seed {seed}",
            player_ids.len()
        ));
        Ok(game)
    }

    fn load_deck_into_game(&self, game: &mut GameState, player_id: PlayerId, deck: &DeckList) -> Result<()> {
        for entry in &deck.main_deck {
            let card_def = self.card_db.get_or_err(&entry.card_name)?;
            for _ in 0..entry.count {
                let card_id = game.next_card_id();
                game.add_card(card_def.instantiate(card_id, player_id), Zone::Library)?;
            }
        }
        Ok(())
    }
}
