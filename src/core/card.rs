//! Card objects

use crate::core::{
    ActivatedAbility, CardId, CardName, Color, CounterType, GameEntity, Keyword, ManaCost, PlayerId,
    SpellDescriptor, StaticAbility, Subtype, TriggeredAbility,
};
use crate::zones::Zone;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Card types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CardType {
    Creature,
    Instant,
    Sorcery,
    Enchantment,
    Artifact,
    Land,
    Planeswalker,
}

/// A card (or token) during gameplay
///
/// Base characteristics come from the card's definition. Game-time state
/// (tapped, damage, counters, until-end-of-turn modifiers) lives alongside
/// them and is reset whenever the card changes zones, since it becomes a new
/// object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Card {
    pub id: CardId,
    pub name: CardName,
    pub mana_cost: ManaCost,
    pub types: SmallVec<[CardType; 2]>,
    pub subtypes: SmallVec<[Subtype; 2]>,
    pub legendary: bool,
    pub colors: SmallVec<[Color; 2]>,
    pub power: Option<i32>,
    pub toughness: Option<i32>,
    /// Starting loyalty for planeswalkers
    pub loyalty: Option<u8>,
    pub keywords: SmallVec<[Keyword; 4]>,

    pub spell: Option<SpellDescriptor>,
    pub activated: Vec<ActivatedAbility>,
    pub triggered: Vec<TriggeredAbility>,
    pub statics: Vec<StaticAbility>,

    pub owner: PlayerId,
    pub controller: PlayerId,
    pub zone: Zone,
    pub is_token: bool,

    /// Set on every zone change; identifies the object a target refers to
    pub timestamp: u64,

    pub tapped: bool,
    pub summoning_sick: bool,
    /// Marked damage, removed during cleanup
    pub damage: i32,
    /// Dealt damage by a source with deathtouch since the last cleanup
    pub deathtouch_damage: bool,
    pub counters: SmallVec<[(CounterType, u8); 2]>,
    pub attached_to: Option<CardId>,

    /// Until-end-of-turn modifiers
    pub eot_power: i32,
    pub eot_toughness: i32,
    pub eot_keywords: SmallVec<[Keyword; 2]>,
    /// A loyalty ability of this permanent was activated this turn
    pub loyalty_activated: bool,
}

impl Card {
    pub fn new(id: CardId, name: impl Into<CardName>, owner: PlayerId) -> Self {
        Card {
            id,
            name: name.into(),
            mana_cost: ManaCost::new(),
            types: SmallVec::new(),
            subtypes: SmallVec::new(),
            legendary: false,
            colors: SmallVec::new(),
            power: None,
            toughness: None,
            loyalty: None,
            keywords: SmallVec::new(),
            spell: None,
            activated: Vec::new(),
            triggered: Vec::new(),
            statics: Vec::new(),
            owner,
            controller: owner,
            zone: Zone::Library,
            is_token: false,
            timestamp: 0,
            tapped: false,
            summoning_sick: false,
            damage: 0,
            deathtouch_damage: false,
            counters: SmallVec::new(),
            attached_to: None,
            eot_power: 0,
            eot_toughness: 0,
            eot_keywords: SmallVec::new(),
            loyalty_activated: false,
        }
    }

    pub fn is_type(&self, card_type: CardType) -> bool {
        self.types.contains(&card_type)
    }

    pub fn is_creature(&self) -> bool {
        self.is_type(CardType::Creature)
    }

    pub fn is_land(&self) -> bool {
        self.is_type(CardType::Land)
    }

    pub fn is_planeswalker(&self) -> bool {
        self.is_type(CardType::Planeswalker)
    }

    /// Instants and sorceries never become permanents
    pub fn is_permanent_card(&self) -> bool {
        !self.is_type(CardType::Instant) && !self.is_type(CardType::Sorcery)
    }

    pub fn has_subtype(&self, subtype: &str) -> bool {
        self.subtypes.iter().any(|s| s.as_str() == subtype)
    }

    pub fn is_aura(&self) -> bool {
        self.is_type(CardType::Enchantment) && self.has_subtype("Aura")
    }

    pub fn is_equipment(&self) -> bool {
        self.is_type(CardType::Artifact) && self.has_subtype("Equipment")
    }

    /// Printed keyword (continuous effects are applied by the layer system)
    pub fn has_printed_keyword(&self, keyword: Keyword) -> bool {
        self.keywords.contains(&keyword)
    }

    pub fn tap(&mut self) {
        self.tapped = true;
    }

    pub fn untap(&mut self) {
        self.tapped = false;
    }

    pub fn add_counter(&mut self, counter_type: CounterType, amount: u8) {
        if amount == 0 {
            return;
        }
        if let Some((_, count)) = self.counters.iter_mut().find(|(t, _)| *t == counter_type) {
            *count = count.saturating_add(amount);
        } else {
            self.counters.push((counter_type, amount));
        }
    }

    /// Remove up to `amount` counters, returning how many were removed
    pub fn remove_counter(&mut self, counter_type: &CounterType, amount: u8) -> u8 {
        let mut removed = 0;
        if let Some((_, count)) = self.counters.iter_mut().find(|(t, _)| t == counter_type) {
            removed = amount.min(*count);
            *count -= removed;
        }
        self.counters.retain(|(_, count)| *count > 0);
        removed
    }

    pub fn get_counter(&self, counter_type: &CounterType) -> u8 {
        self.counters
            .iter()
            .find(|(t, _)| t == counter_type)
            .map(|(_, count)| *count)
            .unwrap_or(0)
    }

    /// Clear until-end-of-turn modifiers (cleanup step)
    pub fn end_turn_effects(&mut self) {
        self.eot_power = 0;
        self.eot_toughness = 0;
        self.eot_keywords.clear();
        self.loyalty_activated = false;
    }

    /// Forget all game-time state; the card becomes a new object
    pub fn reset_for_zone_change(&mut self) {
        self.tapped = false;
        self.summoning_sick = false;
        self.damage = 0;
        self.deathtouch_damage = false;
        self.counters.clear();
        self.attached_to = None;
        self.controller = self.owner;
        self.end_turn_effects();
    }
}

impl GameEntity<Card> for Card {
    fn id(&self) -> CardId {
        self.id
    }

    fn name(&self) -> &str {
        self.name.as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_card_creation() {
        let id = CardId::new(1);
        let owner = PlayerId::new(100);
        let card = Card::new(id, "Lightning Bolt", owner);

        assert_eq!(card.id, id);
        assert_eq!(card.name.as_str(), "Lightning Bolt");
        assert_eq!(card.owner, owner);
        assert_eq!(card.controller, owner);
        assert!(!card.tapped);
    }

    #[test]
    fn test_card_counters() {
        let mut card = Card::new(CardId::new(1), "Test Creature", PlayerId::new(100));

        card.add_counter(CounterType::PlusOne, 2);
        card.add_counter(CounterType::PlusOne, 1);
        assert_eq!(card.get_counter(&CounterType::PlusOne), 3);

        assert_eq!(card.remove_counter(&CounterType::PlusOne, 5), 3);
        assert_eq!(card.get_counter(&CounterType::PlusOne), 0);
        assert!(card.counters.is_empty());
    }

    #[test]
    fn test_zone_change_resets_state() {
        let mut card = Card::new(CardId::new(1), "Bear", PlayerId::new(100));
        card.controller = PlayerId::new(101);
        card.tap();
        card.damage = 2;
        card.eot_power = 3;
        card.add_counter(CounterType::MinusOne, 1);

        card.reset_for_zone_change();
        assert!(!card.tapped);
        assert_eq!(card.damage, 0);
        assert_eq!(card.eot_power, 0);
        assert!(card.counters.is_empty());
        assert_eq!(card.controller, card.owner);
    }

    #[test]
    fn test_permanent_classification() {
        let mut aura = Card::new(CardId::new(2), "Holy Strength", PlayerId::new(100));
        aura.types.push(CardType::Enchantment);
        aura.subtypes.push(Subtype::new("Aura"));
        assert!(aura.is_aura());
        assert!(aura.is_permanent_card());

        let mut bolt = Card::new(CardId::new(3), "Lightning Bolt", PlayerId::new(100));
        bolt.types.push(CardType::Instant);
        assert!(!bolt.is_permanent_card());
    }
}
