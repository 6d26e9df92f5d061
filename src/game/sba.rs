//! State-based actions
//!
//! One check collects every violation in the current state, then applies
//! them as a single batch. The batch is sorted into a canonical order before
//! anything changes, and every action in it was decided from the same
//! pre-batch state, so the order actions were found in is unobservable.
//! Checks repeat until a pass finds nothing, up to the configured limit.

use crate::core::{CardId, CounterType, Keyword, LossReason, PlayerId};
use crate::game::{GameEvent, GameState};
use crate::zones::Zone;
use crate::{MtgError, Result};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum GraveyardReason {
    ZeroToughness,
    ZeroLoyalty,
    LegendRule,
    UnattachedAura,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DestroyReason {
    LethalDamage,
    Deathtouch,
}

/// A single corrective action
///
/// Variant order is the canonical application order of a batch.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum StateBasedAction {
    AnnihilateCounters { card: CardId, amount: u8 },
    PlayerLoses { player: PlayerId, reason: LossReason },
    PutInGraveyard { card: CardId, reason: GraveyardReason },
    Destroy { card: CardId, reason: DestroyReason },
    Unattach { card: CardId },
    TokenCeasesToExist { card: CardId },
}

impl fmt::Display for StateBasedAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StateBasedAction::AnnihilateCounters { card, amount } => {
                write!(f, "card {card}: {amount} +1/+1 and -1/-1 counter pair(s) removed")
            }
            StateBasedAction::PlayerLoses { player, reason } => write!(f, "player {player} loses ({reason})"),
            StateBasedAction::PutInGraveyard { card, reason } => {
                write!(f, "card {card} put into graveyard ({reason:?})")
            }
            StateBasedAction::Destroy { card, reason } => write!(f, "card {card} destroyed ({reason:?})"),
            StateBasedAction::Unattach { card } => write!(f, "card {card} unattached"),
            StateBasedAction::TokenCeasesToExist { card } => write!(f, "token {card} ceases to exist"),
        }
    }
}

impl GameState {
    /// Every state-based action the current state calls for
    pub fn collect_state_based_actions(&self) -> Vec<StateBasedAction> {
        let mut actions = Vec::new();

        for player in self.players.iter().filter(|p| !p.has_lost()) {
            let reason = if player.life <= 0 {
                Some(LossReason::ZeroLife)
            } else if player.poison >= self.config.poison_threshold {
                Some(LossReason::Poison)
            } else if player.drew_from_empty_library {
                Some(LossReason::DrewFromEmptyLibrary)
            } else {
                None
            };
            if let Some(reason) = reason {
                actions.push(StateBasedAction::PlayerLoses {
                    player: player.id,
                    reason,
                });
            }
        }

        let mut legends: FxHashMap<(PlayerId, &str), Vec<(u64, CardId)>> = FxHashMap::default();

        for &card_id in &self.battlefield.cards {
            let Ok(card) = self.cards.get(card_id) else {
                continue;
            };

            let plus = card.get_counter(&CounterType::PlusOne);
            let minus = card.get_counter(&CounterType::MinusOne);
            if plus > 0 && minus > 0 {
                actions.push(StateBasedAction::AnnihilateCounters {
                    card: card_id,
                    amount: plus.min(minus),
                });
            }

            if card.is_creature() {
                let Ok(chars) = self.characteristics(card_id) else {
                    continue;
                };
                let indestructible = chars.has_keyword(Keyword::Indestructible);
                if chars.toughness <= 0 {
                    actions.push(StateBasedAction::PutInGraveyard {
                        card: card_id,
                        reason: GraveyardReason::ZeroToughness,
                    });
                } else if card.damage >= chars.toughness && !indestructible {
                    actions.push(StateBasedAction::Destroy {
                        card: card_id,
                        reason: DestroyReason::LethalDamage,
                    });
                } else if card.deathtouch_damage && card.damage > 0 && !indestructible {
                    actions.push(StateBasedAction::Destroy {
                        card: card_id,
                        reason: DestroyReason::Deathtouch,
                    });
                }
            }

            if card.is_planeswalker() && card.get_counter(&CounterType::Loyalty) == 0 {
                actions.push(StateBasedAction::PutInGraveyard {
                    card: card_id,
                    reason: GraveyardReason::ZeroLoyalty,
                });
            }

            let attached_creature = card.attached_to.filter(|&host| {
                self.battlefield.contains(host) && self.cards.get(host).is_ok_and(|h| h.is_creature())
            });
            if card.is_aura() && attached_creature.is_none() {
                actions.push(StateBasedAction::PutInGraveyard {
                    card: card_id,
                    reason: GraveyardReason::UnattachedAura,
                });
            }
            if card.is_equipment() && card.attached_to.is_some() && attached_creature.is_none() {
                actions.push(StateBasedAction::Unattach { card: card_id });
            }

            if card.legendary {
                legends
                    .entry((card.controller, card.name.as_str()))
                    .or_default()
                    .push((card.timestamp, card_id));
            }
        }

        for (_, mut group) in legends {
            if group.len() < 2 {
                continue;
            }
            group.sort();
            group.pop(); // newest stays
            for (_, card) in group {
                actions.push(StateBasedAction::PutInGraveyard {
                    card,
                    reason: GraveyardReason::LegendRule,
                });
            }
        }

        for (_, zones) in &self.player_zones {
            for zone in [&zones.hand, &zones.graveyard, &zones.exile, &zones.library] {
                for &card_id in &zone.cards {
                    if self.cards.get(card_id).is_ok_and(|c| c.is_token) {
                        actions.push(StateBasedAction::TokenCeasesToExist { card: card_id });
                    }
                }
            }
        }

        actions
    }

    /// Apply one batch of state-based actions as a single event
    pub fn perform_state_based_actions(&mut self, mut actions: Vec<StateBasedAction>) -> Result<()> {
        actions.sort();
        actions.dedup();
        if actions.is_empty() {
            return Ok(());
        }

        self.record(GameEvent::StateBasedActions {
            actions: actions.clone(),
        });
        self.lookback = Some(self.battlefield.cards.clone());

        let result = self.apply_batch(&actions);
        self.lookback = None;
        result
    }

    pub(crate) fn apply_batch(&mut self, actions: &[StateBasedAction]) -> Result<()> {
        let mut leaving: Vec<PlayerId> = Vec::new();
        let mut moved: Vec<CardId> = Vec::new();

        for action in actions {
            match action {
                StateBasedAction::AnnihilateCounters { card, amount } => {
                    self.remove_counters(*card, CounterType::PlusOne, *amount)?;
                    self.remove_counters(*card, CounterType::MinusOne, *amount)?;
                }
                StateBasedAction::PlayerLoses { player, reason } => {
                    self.get_player_mut(*player)?.lost = Some(*reason);
                    self.emit(GameEvent::PlayerLost {
                        player: *player,
                        reason: *reason,
                    });
                    leaving.push(*player);
                }
                StateBasedAction::PutInGraveyard { card, .. } | StateBasedAction::Destroy { card, .. } => {
                    if !moved.contains(card) && self.battlefield.contains(*card) {
                        moved.push(*card);
                        self.move_card(*card, Zone::Graveyard)?;
                    }
                }
                StateBasedAction::Unattach { card } => {
                    if self.battlefield.contains(*card) {
                        self.cards.get_mut(*card)?.attached_to = None;
                        self.emit(GameEvent::Unattached { card: *card });
                    }
                }
                StateBasedAction::TokenCeasesToExist { card } => {
                    self.remove_token(*card)?;
                }
            }
        }

        let remaining = self.players.iter().filter(|p| !p.has_lost()).count();
        if remaining > 1 {
            for player in leaving {
                self.remove_player_objects(player)?;
            }
        }
        Ok(())
    }

    fn remove_token(&mut self, card_id: CardId) -> Result<()> {
        let (zone, owner) = {
            let card = self.cards.get(card_id)?;
            (card.zone, card.owner)
        };
        match zone {
            Zone::Battlefield => {
                self.battlefield.remove(card_id);
            }
            Zone::Stack => {}
            _ => {
                if let Some(z) = self.get_player_zones_mut(owner).and_then(|z| z.get_zone_mut(zone)) {
                    z.remove(card_id);
                }
            }
        }
        self.cards.remove(card_id);
        self.emit(GameEvent::TokenCeasedToExist { card: card_id });
        Ok(())
    }

    /// A player who lost leaves a multiplayer game along with what they own
    /// and control
    fn remove_player_objects(&mut self, player: PlayerId) -> Result<()> {
        let permanents: Vec<CardId> = self
            .battlefield
            .cards
            .iter()
            .copied()
            .filter(|&id| self.cards.get(id).is_ok_and(|c| c.owner == player || c.controller == player))
            .collect();
        for card in permanents {
            self.move_card(card, Zone::Exile)?;
        }

        let items: Vec<_> = self
            .stack
            .items()
            .iter()
            .filter(|item| item.controller == player)
            .map(|item| item.id)
            .collect();
        for id in items {
            if let Some(item) = self.stack.remove(id) {
                if item.is_spell() && self.cards.get(item.source)?.zone == Zone::Stack {
                    self.move_card(item.source, Zone::Exile)?;
                }
            }
        }

        self.pending_decisions.retain(|d| d.player != player);
        self.pending_triggers.retain(|t| t.controller != player);
        self.combat.remove_player(player);
        Ok(())
    }

    /// One pass: collect, then apply simultaneously
    ///
    /// Returns whether anything was done.
    pub fn check_and_perform(&mut self) -> Result<bool> {
        let actions = self.collect_state_based_actions();
        if actions.is_empty() {
            return Ok(false);
        }
        self.perform_state_based_actions(actions)?;
        Ok(true)
    }

    /// Repeat state-based action passes until one finds nothing
    ///
    /// Returns whether any pass did something. Exceeding
    /// `sba_iteration_limit` panics with `strict_invariants`, and otherwise
    /// logs the violation and returns it as an error.
    pub fn run_state_based_actions(&mut self) -> Result<bool> {
        let limit = self.config.sba_iteration_limit;
        let mut any = false;
        for _ in 0..limit {
            if !self.check_and_perform()? {
                return Ok(any);
            }
            any = true;
        }
        if self.collect_state_based_actions().is_empty() {
            return Ok(any);
        }

        let message = format!("state-based actions did not reach a fixpoint after {limit} passes");
        if self.config.strict_invariants {
            panic!("{message}");
        }
        self.record(GameEvent::InvariantViolated {
            message: message.clone(),
        });
        Err(MtgError::InvariantViolation(message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Card, CardType, Subtype};

    fn creature(game: &mut GameState, owner: PlayerId, power: i32, toughness: i32) -> CardId {
        let mut card = Card::new(game.next_card_id(), "Creature", owner);
        card.types.push(CardType::Creature);
        card.power = Some(power);
        card.toughness = Some(toughness);
        game.add_card(card, Zone::Battlefield).unwrap()
    }

    #[test]
    fn test_lethal_damage_and_zero_toughness_in_one_batch() {
        let mut game = GameState::new_two_player("Alice".to_string(), "Bob".to_string(), 20);
        let p1 = game.players[0].id;
        let damaged = creature(&mut game, p1, 2, 3);
        let shrunk = creature(&mut game, p1, 0, 0);
        game.cards.get_mut(damaged).unwrap().damage = 3;

        let actions = game.collect_state_based_actions();
        assert_eq!(actions.len(), 2);

        assert!(game.check_and_perform().unwrap());
        assert!(!game.battlefield.contains(damaged));
        assert!(!game.battlefield.contains(shrunk));

        let batches = game
            .event_log
            .iter()
            .filter(|e| matches!(e, GameEvent::StateBasedActions { .. }))
            .count();
        assert_eq!(batches, 1);
        assert!(!game.check_and_perform().unwrap());
    }

    #[test]
    fn test_indestructible_ignores_damage_but_not_zero_toughness() {
        let mut game = GameState::new_two_player("Alice".to_string(), "Bob".to_string(), 20);
        let p1 = game.players[0].id;
        let id = creature(&mut game, p1, 2, 2);
        {
            let card = game.cards.get_mut(id).unwrap();
            card.keywords.push(Keyword::Indestructible);
            card.damage = 5;
        }
        assert!(game.collect_state_based_actions().is_empty());

        game.cards.get_mut(id).unwrap().eot_toughness = -2;
        assert_eq!(
            game.collect_state_based_actions(),
            vec![StateBasedAction::PutInGraveyard {
                card: id,
                reason: GraveyardReason::ZeroToughness
            }]
        );
    }

    #[test]
    fn test_player_losses() {
        let mut game = GameState::new_multiplayer(&["A", "B", "C"], Default::default());
        game.players[0].life = 0;
        game.players[1].poison = 10;
        game.players[2].drew_from_empty_library = true;

        let mut reasons: Vec<LossReason> = game
            .collect_state_based_actions()
            .into_iter()
            .filter_map(|a| match a {
                StateBasedAction::PlayerLoses { reason, .. } => Some(reason),
                _ => None,
            })
            .collect();
        reasons.sort();
        assert_eq!(
            reasons,
            vec![LossReason::ZeroLife, LossReason::Poison, LossReason::DrewFromEmptyLibrary]
        );
    }

    #[test]
    fn test_legend_rule_keeps_newest() {
        let mut game = GameState::new_two_player("Alice".to_string(), "Bob".to_string(), 20);
        let p1 = game.players[0].id;
        let mut ids = Vec::new();
        for _ in 0..2 {
            let mut card = Card::new(game.next_card_id(), "Isamaru", p1);
            card.types.push(CardType::Creature);
            card.legendary = true;
            card.power = Some(2);
            card.toughness = Some(2);
            ids.push(game.add_card(card, Zone::Battlefield).unwrap());
        }

        game.run_state_based_actions().unwrap();
        assert!(!game.battlefield.contains(ids[0]));
        assert!(game.battlefield.contains(ids[1]));
    }

    #[test]
    fn test_counters_annihilate() {
        let mut game = GameState::new_two_player("Alice".to_string(), "Bob".to_string(), 20);
        let p1 = game.players[0].id;
        let id = creature(&mut game, p1, 2, 2);
        {
            let card = game.cards.get_mut(id).unwrap();
            card.add_counter(CounterType::PlusOne, 3);
            card.add_counter(CounterType::MinusOne, 2);
        }

        game.run_state_based_actions().unwrap();
        let card = game.cards.get(id).unwrap();
        assert_eq!(card.get_counter(&CounterType::PlusOne), 1);
        assert_eq!(card.get_counter(&CounterType::MinusOne), 0);
        assert_eq!(game.power(id), 3);
    }

    #[test]
    fn test_unattached_aura_goes_to_graveyard() {
        let mut game = GameState::new_two_player("Alice".to_string(), "Bob".to_string(), 20);
        let p1 = game.players[0].id;
        let host = creature(&mut game, p1, 1, 1);
        let mut aura = Card::new(game.next_card_id(), "Holy Strength", p1);
        aura.types.push(CardType::Enchantment);
        aura.subtypes.push(Subtype::new("Aura"));
        let aura = game.add_card(aura, Zone::Battlefield).unwrap();
        game.cards.get_mut(aura).unwrap().attached_to = Some(host);
        assert!(game.collect_state_based_actions().is_empty());

        game.move_card(host, Zone::Graveyard).unwrap();
        game.run_state_based_actions().unwrap();
        assert_eq!(game.cards.get(aura).unwrap().zone, Zone::Graveyard);
    }

    #[test]
    fn test_token_leaving_battlefield_ceases_to_exist() {
        let mut game = GameState::new_two_player("Alice".to_string(), "Bob".to_string(), 20);
        let p1 = game.players[0].id;
        let token = game
            .create_token(&crate::core::TokenSpec::creature("Soldier", 1, 1), p1)
            .unwrap();
        game.move_card(token, Zone::Hand).unwrap();

        game.run_state_based_actions().unwrap();
        assert!(!game.cards.contains(token));
        assert_eq!(game.hand_size(p1), 0);
    }

    #[test]
    fn test_non_converging_loop_reports_violation() {
        let config = crate::game::EngineConfig::default()
            .with_strict_invariants(false)
            .with_sba_iteration_limit(0);
        let mut game = GameState::new_multiplayer(&["A", "B"], config);
        game.players[0].life = 0;

        let err = game.run_state_based_actions().unwrap_err();
        assert!(matches!(err, MtgError::InvariantViolation(_)));
        assert!(game
            .event_log
            .iter()
            .any(|e| matches!(e, GameEvent::InvariantViolated { .. })));
    }
    fn apply_unsorted(game: &mut GameState, actions: &[StateBasedAction]) {
        game.lookback = Some(game.battlefield.cards.clone());
        game.apply_batch(actions).unwrap();
        game.lookback = None;
    }

    fn trigger_sources(game: &GameState) -> Vec<CardId> {
        game.pending_triggers.iter().map(|t| t.source).collect()
    }

    #[test]
    fn test_shuffled_batches_reach_the_same_state() {
        use crate::loader::sample_pool;
        use rand::seq::SliceRandom;
        use rand::SeedableRng;
        use rand_chacha::ChaCha12Rng;

        let db = sample_pool();
        let mut game = GameState::new_multiplayer(&["A", "B", "C"], Default::default());
        let (p1, p2) = (game.players[0].id, game.players[1].id);
        let put = |game: &mut GameState, name: &str, owner: PlayerId| {
            let id = game.next_card_id();
            let card = db.get(name).unwrap().instantiate(id, owner);
            game.add_card(card, Zone::Battlefield).unwrap()
        };
        let goblin_a = put(&mut game, "Festering Goblin", p1);
        let goblin_b = put(&mut game, "Festering Goblin", p2);
        let giant = put(&mut game, "Hill Giant", p1);
        game.cards.get_mut(goblin_a).unwrap().damage = 1;
        game.cards.get_mut(goblin_b).unwrap().damage = 1;
        {
            let card = game.cards.get_mut(giant).unwrap();
            card.add_counter(CounterType::PlusOne, 2);
            card.add_counter(CounterType::MinusOne, 1);
        }
        game.players[2].life = 0;

        let mut canonical = game.collect_state_based_actions();
        canonical.sort();
        assert_eq!(canonical.len(), 4);

        let mut reference = game.clone();
        apply_unsorted(&mut reference, &canonical);
        assert_eq!(trigger_sources(&reference), vec![goblin_a, goblin_b]);

        let mut rng = ChaCha12Rng::seed_from_u64(7);
        let mut saw_other_trigger_order = false;
        for _ in 0..16 {
            let mut shuffled = canonical.clone();
            shuffled.shuffle(&mut rng);

            let mut unsorted = game.clone();
            apply_unsorted(&mut unsorted, &shuffled);
            for id in [goblin_a, goblin_b, giant] {
                let (a, b) = (reference.cards.get(id).unwrap(), unsorted.cards.get(id).unwrap());
                assert_eq!(a.zone, b.zone);
                assert_eq!(a.counters, b.counters);
            }
            for (a, b) in reference.players.iter().zip(&unsorted.players) {
                assert_eq!((a.life, a.lost), (b.life, b.lost));
            }
            let mut sources = trigger_sources(&unsorted);
            saw_other_trigger_order |= sources != trigger_sources(&reference);
            sources.sort();
            assert_eq!(sources, vec![goblin_a, goblin_b]);

            // Sorting the batch is what fixes the trigger order
            let mut performed = game.clone();
            performed.perform_state_based_actions(shuffled).unwrap();
            assert_eq!(trigger_sources(&performed), trigger_sources(&reference));
        }
        assert!(saw_other_trigger_order);
    }
}
