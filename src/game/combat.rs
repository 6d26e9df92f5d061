//! Combat: declaring attackers and blockers, and combat damage
//!
//! Declarations are turn-based decisions made at the start of the declare
//! attackers and declare blockers steps, before anyone gets priority. Combat
//! damage is assigned from one snapshot and then dealt all at once.

use crate::core::{CardId, Keyword, PlayerId, TargetRef};
use crate::error::ActionError;
use crate::game::{EffectContext, GameEvent, GameState};
use crate::Result;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::{BTreeMap, BTreeSet};

type Check<T> = std::result::Result<T, ActionError>;

/// Combat state for the current combat phase
///
/// Uses BTreeMap for deterministic iteration order. Cleared at end of combat.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct CombatState {
    /// Attacking creature -> player it attacks
    pub attackers: BTreeMap<CardId, PlayerId>,

    /// Blocking creature -> attacker it blocks
    pub blockers: BTreeMap<CardId, CardId>,

    /// Attacker -> blockers in damage assignment order
    pub attacker_blockers: BTreeMap<CardId, SmallVec<[CardId; 4]>>,

    /// Attackers that were blocked; they stay blocked when their blockers
    /// leave combat
    pub blocked: BTreeSet<CardId>,
}

impl CombatState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn declare_attacker(&mut self, attacker: CardId, defending_player: PlayerId) {
        self.attackers.insert(attacker, defending_player);
    }

    pub fn declare_blocker(&mut self, blocker: CardId, attacker: CardId) {
        self.blockers.insert(blocker, attacker);
        self.attacker_blockers.entry(attacker).or_default().push(blocker);
        self.blocked.insert(attacker);
    }

    pub fn is_attacking(&self, card_id: CardId) -> bool {
        self.attackers.contains_key(&card_id)
    }

    pub fn is_blocking(&self, card_id: CardId) -> bool {
        self.blockers.contains_key(&card_id)
    }

    pub fn is_blocked(&self, attacker: CardId) -> bool {
        self.blocked.contains(&attacker)
    }

    pub fn has_attackers(&self) -> bool {
        !self.attackers.is_empty()
    }

    /// Blockers of an attacker, in damage assignment order
    pub fn get_blockers(&self, attacker: CardId) -> SmallVec<[CardId; 4]> {
        self.attacker_blockers.get(&attacker).cloned().unwrap_or_default()
    }

    pub fn get_defending_player(&self, attacker: CardId) -> Option<PlayerId> {
        self.attackers.get(&attacker).copied()
    }

    pub fn get_attackers(&self) -> Vec<CardId> {
        self.attackers.keys().copied().collect()
    }

    /// Players being attacked, without repeats
    pub fn defending_players(&self) -> Vec<PlayerId> {
        let set: BTreeSet<PlayerId> = self.attackers.values().copied().collect();
        set.into_iter().collect()
    }

    /// Remove a creature that left the battlefield
    pub fn remove_card(&mut self, card_id: CardId) {
        self.attackers.remove(&card_id);
        self.attacker_blockers.remove(&card_id);
        self.blocked.remove(&card_id);
        if let Some(attacker) = self.blockers.remove(&card_id) {
            if let Some(list) = self.attacker_blockers.get_mut(&attacker) {
                list.retain(|b| *b != card_id);
            }
        }
    }

    /// Remove attacks on a player who left the game
    pub fn remove_player(&mut self, player: PlayerId) {
        let gone: Vec<CardId> = self
            .attackers
            .iter()
            .filter(|(_, defender)| **defender == player)
            .map(|(attacker, _)| *attacker)
            .collect();
        for attacker in gone {
            self.remove_card(attacker);
        }
    }

    pub fn clear(&mut self) {
        self.attackers.clear();
        self.blockers.clear();
        self.attacker_blockers.clear();
        self.blocked.clear();
    }
}

impl GameState {
    /// Creatures `player` could attack with
    pub fn attack_candidates(&self, player: PlayerId) -> Vec<CardId> {
        self.battlefield
            .cards
            .iter()
            .copied()
            .filter(|&id| {
                let Ok(card) = self.cards.get(id) else {
                    return false;
                };
                card.controller == player
                    && card.is_creature()
                    && !card.tapped
                    && (!card.summoning_sick || self.has_keyword(id, Keyword::Haste))
                    && !self.has_keyword(id, Keyword::Defender)
            })
            .collect()
    }

    /// Creatures `player` could block with
    pub fn block_candidates(&self, player: PlayerId) -> Vec<CardId> {
        self.battlefield
            .cards
            .iter()
            .copied()
            .filter(|&id| {
                self.cards
                    .get(id)
                    .is_ok_and(|c| c.controller == player && c.is_creature() && !c.tapped)
            })
            .collect()
    }

    pub fn validate_attackers(&self, player: PlayerId, attackers: &[(CardId, PlayerId)]) -> Check<()> {
        let candidates = self.attack_candidates(player);
        let opponents = self.opponents(player);
        for (i, &(attacker, defender)) in attackers.iter().enumerate() {
            if attackers[..i].iter().any(|(a, _)| *a == attacker) {
                return Err(ActionError::InvalidDeclaration(format!("card {attacker} declared twice")));
            }
            if !candidates.contains(&attacker) {
                return Err(ActionError::InvalidDeclaration(format!("card {attacker} cannot attack")));
            }
            if !opponents.contains(&defender) {
                return Err(ActionError::InvalidDeclaration(format!(
                    "player {defender} is not an opponent in the game"
                )));
            }
        }
        Ok(())
    }

    /// Tap and record attackers
    pub fn declare_attackers(&mut self, player: PlayerId, attackers: &[(CardId, PlayerId)]) -> Result<()> {
        self.validate_attackers(player, attackers)?;
        for &(attacker, defender) in attackers {
            if !self.has_keyword(attacker, Keyword::Vigilance) {
                self.tap_permanent(attacker)?;
            }
            self.combat.declare_attacker(attacker, defender);
        }
        self.emit(GameEvent::AttackersDeclared {
            player,
            attackers: attackers.to_vec(),
        });
        Ok(())
    }

    pub fn validate_blocks(&self, player: PlayerId, blocks: &[(CardId, CardId)]) -> Check<()> {
        let candidates = self.block_candidates(player);
        for (i, &(blocker, attacker)) in blocks.iter().enumerate() {
            if blocks[..i].iter().any(|(b, _)| *b == blocker) {
                return Err(ActionError::InvalidDeclaration(format!("card {blocker} blocks twice")));
            }
            if !candidates.contains(&blocker) {
                return Err(ActionError::InvalidDeclaration(format!("card {blocker} cannot block")));
            }
            if self.combat.get_defending_player(attacker) != Some(player) {
                return Err(ActionError::InvalidDeclaration(format!(
                    "card {attacker} is not attacking you"
                )));
            }
            if self.has_keyword(attacker, Keyword::Flying)
                && !self.has_keyword(blocker, Keyword::Flying)
                && !self.has_keyword(blocker, Keyword::Reach)
            {
                return Err(ActionError::InvalidDeclaration(format!(
                    "card {blocker} cannot block flying card {attacker}"
                )));
            }
        }
        for &(_, attacker) in blocks {
            let count = blocks.iter().filter(|(_, a)| *a == attacker).count();
            if count == 1 && self.has_keyword(attacker, Keyword::Menace) {
                return Err(ActionError::InvalidDeclaration(format!(
                    "card {attacker} has menace and needs two or more blockers"
                )));
            }
        }
        Ok(())
    }

    pub fn declare_blockers(&mut self, player: PlayerId, blocks: &[(CardId, CardId)]) -> Result<()> {
        self.validate_blocks(player, blocks)?;
        for &(blocker, attacker) in blocks {
            self.combat.declare_blocker(blocker, attacker);
        }
        self.emit(GameEvent::BlockersDeclared {
            player,
            blocks: blocks.to_vec(),
        });
        Ok(())
    }

    /// Assign and deal all combat damage simultaneously
    pub fn deal_combat_damage(&mut self) -> Result<()> {
        let mut assignments: Vec<(CardId, TargetRef, i32)> = Vec::new();

        for (&attacker, &defender) in &self.combat.attackers {
            if !self.battlefield.contains(attacker) {
                continue;
            }
            let chars = self.characteristics(attacker)?;
            if chars.power <= 0 {
                continue;
            }
            let blockers: Vec<CardId> = self
                .combat
                .get_blockers(attacker)
                .into_iter()
                .filter(|b| self.battlefield.contains(*b))
                .collect();
            let trample = chars.has_keyword(Keyword::Trample);

            if !self.combat.is_blocked(attacker) {
                assignments.push((attacker, TargetRef::Player(defender), chars.power));
                continue;
            }
            if blockers.is_empty() {
                if trample {
                    assignments.push((attacker, TargetRef::Player(defender), chars.power));
                }
                continue;
            }

            let deathtouch = chars.has_keyword(Keyword::Deathtouch);
            let mut remaining = chars.power;
            for (i, &blocker) in blockers.iter().enumerate() {
                let last = i + 1 == blockers.len();
                let lethal = if deathtouch {
                    1
                } else {
                    let damage = self.cards.get(blocker)?.damage;
                    (self.toughness(blocker) - damage).max(0)
                };
                let amount = if last && !trample { remaining } else { lethal.min(remaining) };
                if amount > 0 {
                    assignments.push((attacker, TargetRef::Card(blocker), amount));
                }
                remaining -= amount;
            }
            if remaining > 0 {
                assignments.push((attacker, TargetRef::Player(defender), remaining));
            }
        }

        for (&blocker, &attacker) in &self.combat.blockers {
            if !self.battlefield.contains(blocker) || !self.battlefield.contains(attacker) {
                continue;
            }
            let power = self.power(blocker);
            if power > 0 {
                assignments.push((blocker, TargetRef::Card(attacker), power));
            }
        }

        let mut contexts: BTreeMap<CardId, EffectContext> = BTreeMap::new();
        for &(source, _, _) in &assignments {
            if contexts.contains_key(&source) {
                continue;
            }
            let card = self.cards.get(source)?;
            let mut ctx = EffectContext::new(card.controller, source);
            ctx.source_keywords = self.characteristics(source)?.keywords;
            contexts.insert(source, ctx);
        }

        for (source, target, amount) in assignments {
            if let Some(ctx) = contexts.get(&source) {
                let ctx = ctx.clone();
                self.deal_damage(&ctx, target, amount)?;
            }
        }
        Ok(())
    }
}
