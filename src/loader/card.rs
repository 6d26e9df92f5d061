//! Card definitions and the card database
//!
//! A `CardDefinition` is a card as printed, already parsed into ability
//! descriptors. Definitions are stored as JSON and instantiated into game
//! objects by the game initializer.

use crate::core::{
    ActivatedAbility, Card, CardId, CardName, CardType, Color, Keyword, ManaCost, PlayerId,
    SpellDescriptor, StaticAbility, Subtype, TriggeredAbility,
};
use crate::{MtgError, Result};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::path::Path;

/// Card definition (not yet instantiated in a game)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CardDefinition {
    pub name: CardName,
    pub mana_cost: ManaCost,
    pub types: Vec<CardType>,
    pub subtypes: Vec<Subtype>,
    pub legendary: bool,
    /// Empty means: the colors of the mana cost
    pub colors: Vec<Color>,
    pub power: Option<i32>,
    pub toughness: Option<i32>,
    pub loyalty: Option<u8>,
    pub keywords: Vec<Keyword>,
    pub spell: Option<SpellDescriptor>,
    pub activated: Vec<ActivatedAbility>,
    pub triggered: Vec<TriggeredAbility>,
    pub statics: Vec<StaticAbility>,
}

impl Default for CardDefinition {
    fn default() -> Self {
        CardDefinition {
            name: CardName::new(""),
            mana_cost: ManaCost::new(),
            types: Vec::new(),
            subtypes: Vec::new(),
            legendary: false,
            colors: Vec::new(),
            power: None,
            toughness: None,
            loyalty: None,
            keywords: Vec::new(),
            spell: None,
            activated: Vec::new(),
            triggered: Vec::new(),
            statics: Vec::new(),
        }
    }
}

impl CardDefinition {
    pub fn new(name: &str, mana_cost: &str, types: &[CardType]) -> Self {
        CardDefinition {
            name: CardName::new(name),
            mana_cost: ManaCost::from_string(mana_cost),
            types: types.to_vec(),
            ..Default::default()
        }
    }

    pub fn creature(name: &str, mana_cost: &str, power: i32, toughness: i32) -> Self {
        CardDefinition {
            power: Some(power),
            toughness: Some(toughness),
            ..Self::new(name, mana_cost, &[CardType::Creature])
        }
    }

    pub fn with_subtype(mut self, subtype: &str) -> Self {
        self.subtypes.push(Subtype::new(subtype));
        self
    }

    pub fn legendary(mut self) -> Self {
        self.legendary = true;
        self
    }

    pub fn with_loyalty(mut self, loyalty: u8) -> Self {
        self.loyalty = Some(loyalty);
        self
    }

    pub fn with_keyword(mut self, keyword: Keyword) -> Self {
        self.keywords.push(keyword);
        self
    }

    pub fn with_spell(mut self, spell: SpellDescriptor) -> Self {
        self.spell = Some(spell);
        self
    }

    pub fn with_activated(mut self, ability: ActivatedAbility) -> Self {
        self.activated.push(ability);
        self
    }

    pub fn with_trigger(mut self, ability: TriggeredAbility) -> Self {
        self.triggered.push(ability);
        self
    }

    pub fn with_static(mut self, ability: StaticAbility) -> Self {
        self.statics.push(ability);
        self
    }

    /// Colors of the card: explicit, or else those in its mana cost
    pub fn colors(&self) -> Vec<Color> {
        if !self.colors.is_empty() {
            return self.colors.clone();
        }
        Color::ALL
            .into_iter()
            .filter(|&c| c != Color::Colorless && self.mana_cost.colored(c) > 0)
            .collect()
    }

    /// Create a Card instance from this definition
    pub fn instantiate(&self, id: CardId, owner: PlayerId) -> Card {
        let mut card = Card::new(id, self.name.clone(), owner);
        card.mana_cost = self.mana_cost;
        card.types = SmallVec::from_slice(&self.types);
        card.subtypes = self.subtypes.iter().cloned().collect();
        card.legendary = self.legendary;
        card.colors = SmallVec::from_vec(self.colors());
        card.power = self.power;
        card.toughness = self.toughness;
        card.loyalty = self.loyalty;
        card.keywords = SmallVec::from_slice(&self.keywords);
        card.spell = self.spell.clone();
        card.activated = self.activated.clone();
        card.triggered = self.triggered.clone();
        card.statics = self.statics.clone();
        card
    }
}

/// Card definitions by name
#[derive(Debug, Clone, Default)]
pub struct CardDatabase {
    cards: FxHashMap<String, CardDefinition>,
}

impl CardDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    fn key(name: &str) -> String {
        name.trim().to_lowercase()
    }

    pub fn insert(&mut self, def: CardDefinition) {
        self.cards.insert(Self::key(def.name.as_str()), def);
    }

    /// Look a card up by name, ignoring case
    pub fn get(&self, name: &str) -> Option<&CardDefinition> {
        self.cards.get(&Self::key(name))
    }

    pub fn get_or_err(&self, name: &str) -> Result<&CardDefinition> {
        self.get(name).ok_or_else(|| MtgError::UnknownCard(name.to_string()))
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Card names in sorted order
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.cards.values().map(|d| d.name.as_str()).collect();
        names.sort_unstable();
        names
    }

    /// Parse a JSON array of definitions
    pub fn from_json(text: &str) -> Result<Self> {
        let defs: Vec<CardDefinition> = serde_json::from_str(text)?;
        let mut db = CardDatabase::new();
        for def in defs {
            db.insert(def);
        }
        Ok(db)
    }

    pub fn load_from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// All definitions as a JSON array, sorted by name
    pub fn to_json(&self) -> Result<String> {
        let mut defs: Vec<&CardDefinition> = self.cards.values().collect();
        defs.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(serde_json::to_string_pretty(&defs)?)
    }

    /// Add every definition of `other`, replacing same-named ones
    pub fn extend(&mut self, other: CardDatabase) {
        self.cards.extend(other.cards);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Effect, TargetKind, Timing};

    #[test]
    fn test_instantiate_creature() {
        let def = CardDefinition::creature("Serra Angel", "3WW", 4, 4)
            .with_keyword(Keyword::Flying)
            .with_keyword(Keyword::Vigilance);
        let card = def.instantiate(CardId::new(5), PlayerId::new(0));

        assert_eq!(card.name.as_str(), "Serra Angel");
        assert!(card.is_creature());
        assert_eq!(card.power, Some(4));
        assert_eq!(card.colors.as_slice(), &[Color::White]);
        assert!(card.has_printed_keyword(Keyword::Flying));
        assert_eq!(card.controller, PlayerId::new(0));
    }

    #[test]
    fn test_database_lookup_ignores_case() {
        let mut db = CardDatabase::new();
        db.insert(CardDefinition::new("Lightning Bolt", "R", &[CardType::Instant]));
        assert!(db.get("lightning bolt").is_some());
        assert!(db.get("Shock").is_none());
        assert!(matches!(db.get_or_err("Shock"), Err(MtgError::UnknownCard(_))));
    }

    #[test]
    fn test_json_keeps_abilities() {
        let mut db = CardDatabase::new();
        db.insert(
            CardDefinition::new("Shock", "R", &[CardType::Instant]).with_spell(
                SpellDescriptor::new(Timing::InstantSpeed)
                    .with_target(TargetKind::Any)
                    .with_effect(Effect::damage_target(2)),
            ),
        );

        let restored = CardDatabase::from_json(&db.to_json().unwrap()).unwrap();
        assert_eq!(restored.get("Shock"), db.get("Shock"));
    }

    #[test]
    fn test_missing_fields_default() {
        let db = CardDatabase::from_json(r#"[{ "name": "Wastes", "types": ["Land"] }]"#).unwrap();
        let wastes = db.get("Wastes").unwrap();
        assert!(wastes.mana_cost.is_free());
        assert!(wastes.activated.is_empty());
    }
}
