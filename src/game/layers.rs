//! Continuous characteristics of permanents
//!
//! A simplified layer system. Power, toughness and keywords are recomputed
//! on every query from, in order: the printed values, static abilities of
//! permanents on the battlefield, until-end-of-turn modifiers, and +1/+1 and
//! -1/-1 counters. Nothing is cached, so a characteristic can never go stale.

use crate::core::{CardId, CounterType, Keyword, StaticAbility, StaticScope};
use crate::game::GameState;
use crate::zones::Zone;
use crate::Result;
use smallvec::SmallVec;

/// Computed characteristics of a permanent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Characteristics {
    pub power: i32,
    pub toughness: i32,
    pub keywords: SmallVec<[Keyword; 4]>,
}

impl Characteristics {
    pub fn has_keyword(&self, keyword: Keyword) -> bool {
        self.keywords.contains(&keyword)
    }
}

impl GameState {
    /// Current power, toughness and keywords of a card
    pub fn characteristics(&self, card_id: CardId) -> Result<Characteristics> {
        let card = self.cards.get(card_id)?;
        let mut chars = Characteristics {
            power: card.power.unwrap_or(0),
            toughness: card.toughness.unwrap_or(0),
            keywords: card.keywords.clone(),
        };
        if card.zone != Zone::Battlefield {
            return Ok(chars);
        }

        if card.is_creature() {
            for &source_id in &self.battlefield.cards {
                let source = self.cards.get(source_id)?;
                for ability in &source.statics {
                    let applies = match ability.scope() {
                        StaticScope::CreaturesYouControl => source.controller == card.controller,
                        StaticScope::OtherCreaturesYouControl => {
                            source.controller == card.controller && source_id != card_id
                        }
                        StaticScope::AttachedCreature => source.attached_to == Some(card_id),
                    };
                    if !applies {
                        continue;
                    }
                    match ability {
                        StaticAbility::ModifyPowerToughness { power, toughness, .. } => {
                            chars.power += power;
                            chars.toughness += toughness;
                        }
                        StaticAbility::GrantKeyword { keyword, .. } => {
                            if !chars.keywords.contains(keyword) {
                                chars.keywords.push(*keyword);
                            }
                        }
                    }
                }
            }
        }

        chars.power += card.eot_power;
        chars.toughness += card.eot_toughness;
        for keyword in &card.eot_keywords {
            if !chars.keywords.contains(keyword) {
                chars.keywords.push(*keyword);
            }
        }

        let plus = i32::from(card.get_counter(&CounterType::PlusOne));
        let minus = i32::from(card.get_counter(&CounterType::MinusOne));
        chars.power += plus - minus;
        chars.toughness += plus - minus;

        chars.keywords.sort();
        Ok(chars)
    }

    /// Whether a card currently has a keyword
    pub fn has_keyword(&self, card_id: CardId, keyword: Keyword) -> bool {
        self.characteristics(card_id)
            .map(|c| c.has_keyword(keyword))
            .unwrap_or(false)
    }

    pub fn power(&self, card_id: CardId) -> i32 {
        self.characteristics(card_id).map(|c| c.power).unwrap_or(0)
    }

    pub fn toughness(&self, card_id: CardId) -> i32 {
        self.characteristics(card_id).map(|c| c.toughness).unwrap_or(0)
    }
}
