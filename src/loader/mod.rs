//! Card definitions, deck lists and game setup
//!
//! Card definitions are JSON; deck lists are plain text. A built-in sample
//! pool covers what the engine supports.

pub mod card;
pub mod deck;
pub mod game_init;
pub mod pool;

pub use card::{CardDatabase, CardDefinition};
pub use deck::{DeckEntry, DeckList, DeckLoader};
pub use game_init::{GameInitializer, OPENING_HAND_SIZE};
pub use pool::{sample_cards, sample_deck, sample_pool, SAMPLE_DECKS};
