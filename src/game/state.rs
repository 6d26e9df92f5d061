//! Main game state structure

use crate::core::{Card, CardId, EntityId, EntityStore, Player, PlayerId};
use crate::error::ActionError;
use crate::game::{
    ActionOutcome, CombatState, EffectRegistry, EngineConfig, GameEvent, GameLogger, PendingDecision,
    PendingTrigger, PriorityState, Stack, TurnStructure,
};
use crate::zones::{CardZone, PlayerZones, Zone};
use crate::{MtgError, Result};
use rand::SeedableRng;
use rand_chacha::ChaCha12Rng;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::VecDeque;

/// How a finished game ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameOutcome {
    /// `None` when every player lost at once
    pub winner: Option<PlayerId>,
}

/// Complete game state
///
/// The single aggregate every rules operation works on. Everything except the
/// custom-effect registry and the logger's captured lines survives a serde
/// round trip, so a snapshot can be restored mid-turn.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    /// All cards in the game
    pub cards: EntityStore<Card>,

    /// All players in seating order
    pub players: Vec<Player>,

    /// Zones for each player
    pub player_zones: Vec<(PlayerId, PlayerZones)>,

    /// Shared battlefield (all players)
    pub battlefield: CardZone,

    pub stack: Stack,

    /// Sequencer cursor
    pub turn: TurnStructure,

    pub priority: PriorityState,

    pub combat: CombatState,

    /// Turn-based decisions the engine is waiting for, in order
    pub pending_decisions: VecDeque<PendingDecision>,

    /// Triggered abilities waiting to be put on the stack
    pub pending_triggers: Vec<PendingTrigger>,

    pub config: EngineConfig,

    /// Every event the engine produced, in order
    pub event_log: Vec<GameEvent>,

    /// Random number generator for gameplay (serializable for deterministic replay)
    ///
    /// Wrapped in RefCell so controllers can draw from it through a shared
    /// `GameStateView`.
    pub rng: RefCell<ChaCha12Rng>,

    /// Unified entity ID generator (shared across all entity types)
    next_entity_id: u32,

    /// Object timestamps: zone changes, stack items
    next_timestamp: u64,

    pub outcome: Option<GameOutcome>,

    pub started: bool,

    /// Battlefield as it was before the current state-based action batch
    /// or resolving effect, so leave-the-battlefield triggers look back in time
    #[serde(skip)]
    pub(crate) lookback: Option<Vec<CardId>>,

    #[serde(skip)]
    pub custom_effects: EffectRegistry,

    /// Centralized logger for game events
    pub logger: GameLogger,
}

impl GameState {
    /// Create a new game with two players
    pub fn new_two_player(player1_name: String, player2_name: String, starting_life: i32) -> Self {
        let config = EngineConfig::default().with_starting_life(starting_life);
        Self::new_multiplayer(&[player1_name.as_str(), player2_name.as_str()], config)
    }

    /// Create a game with players seated in the given order
    ///
    /// The first player is the starting player.
    pub fn new_multiplayer(names: &[&str], config: EngineConfig) -> Self {
        let mut next_id = 0;
        let mut players = Vec::with_capacity(names.len());
        let mut player_zones = Vec::with_capacity(names.len());
        for name in names {
            let id = PlayerId::new(next_id);
            next_id += 1;
            let mut player = Player::new(id, *name, config.starting_life);
            player.max_lands_per_turn = config.max_lands_per_turn;
            players.push(player);
            player_zones.push((id, PlayerZones::new(id)));
        }

        let first = players.first().map(|p| p.id).unwrap_or(PlayerId::new(0));

        GameState {
            cards: EntityStore::new(),
            players,
            player_zones,
            battlefield: CardZone::new(Zone::Battlefield, None),
            stack: Stack::new(),
            turn: TurnStructure::new(first, 0),
            priority: PriorityState::new(),
            combat: CombatState::new(),
            pending_decisions: VecDeque::new(),
            pending_triggers: Vec::new(),
            config,
            event_log: Vec::new(),
            rng: RefCell::new(ChaCha12Rng::seed_from_u64(0)), // Reseeded by game initialization
            next_entity_id: next_id,
            next_timestamp: 1,
            outcome: None,
            started: false,
            lookback: None,
            custom_effects: EffectRegistry::default(),
            logger: GameLogger::new(),
        }
    }

    /// Set the RNG seed for deterministic gameplay
    pub fn seed_rng(&mut self, seed: u64) {
        *self.rng.borrow_mut() = ChaCha12Rng::seed_from_u64(seed);
    }

    /// Shuffle a player's library using the game's RNG
    pub fn shuffle_library(&mut self, player_id: PlayerId) {
        let rng = &self.rng;
        if let Some((_, zones)) = self.player_zones.iter_mut().find(|(id, _)| *id == player_id) {
            zones.library.shuffle(&mut *rng.borrow_mut());
        }
    }

    /// Get next entity ID (unified across all entity types)
    pub fn next_id<T>(&mut self) -> EntityId<T> {
        let id = EntityId::new(self.next_entity_id);
        self.next_entity_id += 1;
        id
    }

    pub fn next_card_id(&mut self) -> CardId {
        self.next_id()
    }

    pub fn next_timestamp(&mut self) -> u64 {
        let ts = self.next_timestamp;
        self.next_timestamp += 1;
        ts
    }

    pub fn get_player_zones(&self, player_id: PlayerId) -> Option<&PlayerZones> {
        self.player_zones
            .iter()
            .find(|(id, _)| *id == player_id)
            .map(|(_, zones)| zones)
    }

    pub fn get_player_zones_mut(&mut self, player_id: PlayerId) -> Option<&mut PlayerZones> {
        self.player_zones
            .iter_mut()
            .find(|(id, _)| *id == player_id)
            .map(|(_, zones)| zones)
    }

    pub fn get_player(&self, id: PlayerId) -> Result<&Player> {
        self.players
            .iter()
            .find(|p| p.id == id)
            .ok_or(MtgError::EntityNotFound(id.as_u32()))
    }

    pub fn get_player_mut(&mut self, id: PlayerId) -> Result<&mut Player> {
        self.players
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(MtgError::EntityNotFound(id.as_u32()))
    }

    /// Live players other than `player`, in seating order
    pub fn opponents(&self, player: PlayerId) -> Vec<PlayerId> {
        self.players
            .iter()
            .filter(|p| p.id != player && !p.has_lost())
            .map(|p| p.id)
            .collect()
    }

    pub fn active_player(&self) -> PlayerId {
        self.turn.active_player
    }

    pub fn hand_size(&self, player: PlayerId) -> usize {
        self.get_player_zones(player).map(|z| z.hand.len()).unwrap_or(0)
    }

    /// Add a card to the game in its owner's zone
    ///
    /// Cards put directly onto the battlefield this way are not summoning
    /// sick and do not trigger enter-the-battlefield abilities; use it to set
    /// up games, not to play them.
    pub fn add_card(&mut self, mut card: Card, zone: Zone) -> Result<CardId> {
        let id = card.id;
        let owner = card.owner;
        card.zone = zone;
        card.timestamp = self.next_timestamp();
        if zone == Zone::Battlefield {
            if let Some(loyalty) = card.loyalty {
                card.add_counter(crate::core::CounterType::Loyalty, loyalty);
            }
        }
        match zone {
            Zone::Battlefield => self.battlefield.add(id),
            Zone::Stack => {
                return Err(MtgError::InvalidAction(
                    "cards reach the stack by being cast".to_string(),
                ))
            }
            _ => {
                let zones = self
                    .get_player_zones_mut(owner)
                    .ok_or(MtgError::EntityNotFound(owner.as_u32()))?;
                if let Some(z) = zones.get_zone_mut(zone) {
                    z.add(id);
                }
            }
        }
        self.cards.insert(id, card);
        Ok(id)
    }

    /// Move a card to another zone
    ///
    /// A card that changes zones becomes a new object: its game-time state is
    /// reset and it gets a fresh timestamp, so targets chosen for the old
    /// object no longer match.
    pub fn move_card(&mut self, card_id: CardId, to: Zone) -> Result<()> {
        self.move_card_under(card_id, to, None)
    }

    /// Move a card, entering the battlefield under `controller` if given
    pub fn move_card_under(&mut self, card_id: CardId, to: Zone, controller: Option<PlayerId>) -> Result<()> {
        let (from, owner, old_controller, was_creature) = {
            let card = self.cards.get(card_id)?;
            (card.zone, card.owner, card.controller, card.is_creature())
        };

        let removed = match from {
            Zone::Battlefield => self.battlefield.remove(card_id),
            Zone::Stack => true,
            _ => self
                .get_player_zones_mut(owner)
                .and_then(|zones| zones.get_zone_mut(from))
                .is_some_and(|zone| zone.remove(card_id)),
        };
        if !removed {
            return Err(MtgError::InvalidAction(format!(
                "Card {card_id} not found in {from:?}"
            )));
        }

        match to {
            Zone::Battlefield => self.battlefield.add(card_id),
            Zone::Stack => {}
            _ => {
                if let Some(zone) = self.get_player_zones_mut(owner).and_then(|z| z.get_zone_mut(to)) {
                    zone.add(card_id);
                }
            }
        }

        if from == Zone::Battlefield {
            self.combat.remove_card(card_id);
        }

        let timestamp = self.next_timestamp();
        let (name, new_controller) = {
            let card = self.cards.get_mut(card_id)?;
            card.reset_for_zone_change();
            card.zone = to;
            card.timestamp = timestamp;
            if to == Zone::Battlefield {
                if let Some(controller) = controller {
                    card.controller = controller;
                }
                card.summoning_sick = card.is_creature();
                if let Some(loyalty) = card.loyalty {
                    card.add_counter(crate::core::CounterType::Loyalty, loyalty);
                }
            }
            (card.name.clone(), card.controller)
        };

        self.emit(GameEvent::CardMoved { card: card_id, from, to });
        if to == Zone::Battlefield {
            self.emit(GameEvent::EnteredBattlefield {
                card: card_id,
                controller: new_controller,
                name,
            });
        } else if from == Zone::Battlefield && to == Zone::Graveyard {
            self.emit(GameEvent::Died {
                card: card_id,
                controller: old_controller,
                name,
                was_creature,
            });
        }
        Ok(())
    }

    /// Draw a card for a player
    ///
    /// Drawing from an empty library is not an error: it is remembered and
    /// the player loses at the next state-based action check.
    pub fn draw_card(&mut self, player_id: PlayerId) -> Result<Option<CardId>> {
        let top = self
            .get_player_zones(player_id)
            .ok_or(MtgError::EntityNotFound(player_id.as_u32()))?
            .library
            .peek_top();
        match top {
            Some(card_id) => {
                self.move_card(card_id, Zone::Hand)?;
                self.emit(GameEvent::CardDrawn {
                    player: player_id,
                    card: card_id,
                });
                Ok(Some(card_id))
            }
            None => {
                self.get_player_mut(player_id)?.drew_from_empty_library = true;
                self.emit(GameEvent::DrewFromEmptyLibrary { player: player_id });
                Ok(None)
            }
        }
    }

    /// Check if the game is over
    pub fn is_game_over(&self) -> bool {
        self.outcome.is_some()
    }

    /// Get the winner (if game is over)
    pub fn get_winner(&self) -> Option<PlayerId> {
        self.outcome.and_then(|o| o.winner)
    }

    /// Record an event and run trigger matching against it
    pub fn emit(&mut self, event: GameEvent) {
        self.match_triggers(&event);
        self.record(event);
    }

    /// Record an event without trigger matching
    pub(crate) fn record(&mut self, event: GameEvent) {
        #[cfg(feature = "verbose-logging")]
        self.logger.log_event(&event);
        self.event_log.push(event);
    }

    /// Events recorded since `mark`, as the observable outcome of an action
    pub fn outcome_since(&self, mark: usize) -> ActionOutcome {
        ActionOutcome {
            events: self.event_log.get(mark..).unwrap_or(&[]).to_vec(),
        }
    }

    /// Reject actions while the game is over or a turn-based decision is
    /// outstanding
    pub fn ensure_actionable(&self, _actor: PlayerId) -> std::result::Result<(), ActionError> {
        if self.is_game_over() {
            return Err(ActionError::GameOver);
        }
        if let Some(decision) = self.pending_decisions.front() {
            return Err(ActionError::AwaitingDecision {
                player: decision.player,
                kind: decision.kind,
            });
        }
        Ok(())
    }

    /// Check structural invariants of the state
    ///
    /// Every card is in exactly the zone it claims, priority is never held
    /// while a decision is pending, and the holder is a live player.
    pub fn check_invariants(&self) -> Result<()> {
        for &card_id in &self.battlefield.cards {
            let card = self.cards.get(card_id)?;
            if card.zone != Zone::Battlefield {
                return Err(MtgError::InvariantViolation(format!(
                    "card {card_id} is on the battlefield but claims {:?}",
                    card.zone
                )));
            }
        }
        for (owner, zones) in &self.player_zones {
            for zone in [Zone::Library, Zone::Hand, Zone::Graveyard, Zone::Exile] {
                let Some(cards) = zones.get_zone(zone) else {
                    continue;
                };
                for &card_id in &cards.cards {
                    let card = self.cards.get(card_id)?;
                    if card.zone != zone || card.owner != *owner {
                        return Err(MtgError::InvariantViolation(format!(
                            "card {card_id} listed in {zone:?} of player {owner} but claims {:?} of player {}",
                            card.zone, card.owner
                        )));
                    }
                }
            }
        }
        for item in self.stack.items() {
            if item.is_spell() {
                let card = self.cards.get(item.source)?;
                if card.zone != Zone::Stack {
                    return Err(MtgError::InvariantViolation(format!(
                        "spell {} is on the stack but its card is in {:?}",
                        item.id, card.zone
                    )));
                }
            }
        }
        if let Some(holder) = self.priority.holder() {
            if !self.pending_decisions.is_empty() {
                return Err(MtgError::InvariantViolation(
                    "priority granted while a turn-based decision is pending".to_string(),
                ));
            }
            if self.get_player(holder)?.has_lost() {
                return Err(MtgError::InvariantViolation(format!(
                    "player {holder} holds priority after losing"
                )));
            }
        }
        if self.is_game_over() && self.priority.holder().is_some() {
            return Err(MtgError::InvariantViolation(
                "priority granted after the game ended".to_string(),
            ));
        }
        Ok(())
    }
}
