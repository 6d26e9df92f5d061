//! MTG rules kernel
//!
//! A deterministic rules engine for multiplayer Magic: The Gathering games:
//! turn/step sequencing, priority passing, the stack, state-based actions,
//! casting and activation legality, and mana pools. The engine is a pure
//! reactive core driven by [`game::GameState::submit_action`].

pub mod core;
pub mod error;
pub mod game;
pub mod loader;
pub mod soak;
pub mod zones;

pub use error::{ActionError, MtgError, Result};
