//! Atomic cost payment
//!
//! Paying a cost is split in two. `plan_payment` checks every part of the
//! cost against a simulated copy of the relevant state and returns a plan or
//! the first shortfall; nothing is touched. `commit_payment` then applies a
//! plan, which cannot fail for a plan made against the current state. Either
//! the whole cost is paid or none of it is.

use crate::core::{CardId, Color, CounterType, Cost, Effect, Keyword, ManaCost, ManaPool, PlayerId};
use crate::error::{ActionError, CostShortfall};
use crate::game::{EffectContext, GameEvent, GameState};
use crate::zones::Zone;
use crate::{MtgError, Result};

type Check<T> = std::result::Result<T, ActionError>;

/// A checked payment
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaymentPlan {
    pub tap_source: bool,
    pub mana: ManaCost,
    /// Permanents to tap for mana, with the mana ability used
    pub mana_sources: Vec<(CardId, usize)>,
    pub life: i32,
    pub sacrifice_source: bool,
    pub remove_counters: Vec<(CounterType, u8)>,
    pub add_counters: Vec<(CounterType, u8)>,
}

fn shortfall(s: CostShortfall) -> ActionError {
    ActionError::CannotPayCost(s)
}

impl GameState {
    /// The tap-only mana ability of a permanent, if any, and what it adds
    pub fn tap_mana_ability(&self, card_id: CardId) -> Option<(usize, Color, u8)> {
        let card = self.cards.get(card_id).ok()?;
        card.activated.iter().enumerate().find_map(|(index, ability)| {
            if !ability.is_mana_ability || !ability.cost.is_tap_only() {
                return None;
            }
            ability.effects.iter().find_map(|effect| match effect {
                Effect::AddMana { color, amount } => Some((index, *color, *amount)),
                _ => None,
            })
        })
    }

    /// A permanent's tap cost can be paid: untapped, and no summoning
    /// sickness unless it has haste
    fn check_can_tap(&self, card_id: CardId) -> Check<()> {
        let card = self.cards.get(card_id).map_err(|_| {
            shortfall(CostShortfall::InvalidManaSource {
                card: card_id,
                reason: "no such card".to_string(),
            })
        })?;
        if card.tapped {
            return Err(shortfall(CostShortfall::SourceTapped { card: card_id }));
        }
        if card.is_creature() && card.summoning_sick && !self.has_keyword(card_id, Keyword::Haste) {
            return Err(shortfall(CostShortfall::SummoningSick { card: card_id }));
        }
        Ok(())
    }

    /// Check that `actor` can pay `cost` for `source`, using `mana_sources`
    /// for any mana the pool does not cover
    pub fn plan_payment(
        &self,
        actor: PlayerId,
        source: CardId,
        cost: &Cost,
        mana_sources: &[CardId],
    ) -> Check<PaymentPlan> {
        let mut plan = PaymentPlan::default();
        let player = self
            .get_player(actor)
            .map_err(|_| ActionError::InvalidDeclaration(format!("unknown player {actor}")))?;

        for component in cost.components() {
            match component {
                Cost::Tap => {
                    self.check_can_tap(source)?;
                    plan.tap_source = true;
                }
                Cost::Mana(mana) => plan.mana = plan.mana.plus(mana),
                Cost::PayLife { amount } => {
                    let required = plan.life + amount;
                    if player.life < required {
                        return Err(shortfall(CostShortfall::Life {
                            required,
                            available: player.life,
                        }));
                    }
                    plan.life = required;
                }
                Cost::SacrificeSelf => {
                    let on_battlefield = self
                        .cards
                        .get(source)
                        .is_ok_and(|c| c.zone == Zone::Battlefield && c.controller == actor);
                    if !on_battlefield {
                        return Err(shortfall(CostShortfall::CannotSacrifice { card: source }));
                    }
                    plan.sacrifice_source = true;
                }
                Cost::RemoveCounters { counter, amount } => {
                    let available = self.cards.get(source).map(|c| c.get_counter(counter)).unwrap_or(0);
                    if available < *amount {
                        return Err(shortfall(CostShortfall::Counters {
                            counter: counter.clone(),
                            required: *amount,
                            available,
                        }));
                    }
                    plan.remove_counters.push((counter.clone(), *amount));
                }
                Cost::AddCounters { counter, amount } => {
                    plan.add_counters.push((counter.clone(), *amount));
                }
                Cost::Composite(_) => {}
            }
        }

        let mut pool: ManaPool = player.mana_pool;
        for (i, &card_id) in mana_sources.iter().enumerate() {
            let invalid = |reason: &str| {
                shortfall(CostShortfall::InvalidManaSource {
                    card: card_id,
                    reason: reason.to_string(),
                })
            };
            if mana_sources[..i].contains(&card_id) {
                return Err(invalid("listed twice"));
            }
            if plan.tap_source && card_id == source {
                return Err(invalid("already tapped to pay the cost"));
            }
            let card = self.cards.get(card_id).map_err(|_| invalid("no such card"))?;
            if card.zone != Zone::Battlefield || card.controller != actor {
                return Err(invalid("not a permanent you control"));
            }
            let (index, color, amount) = self
                .tap_mana_ability(card_id)
                .ok_or_else(|| invalid("no tap mana ability"))?;
            self.check_can_tap(card_id)?;
            pool.add(color, amount);
            plan.mana_sources.push((card_id, index));
        }

        if !pool.can_pay(&plan.mana) {
            return Err(shortfall(CostShortfall::Mana {
                required: plan.mana,
                available: pool,
            }));
        }
        Ok(plan)
    }

    /// Apply a payment plan made against the current state
    pub fn commit_payment(&mut self, actor: PlayerId, source: CardId, plan: &PaymentPlan) -> Result<()> {
        for &(card_id, index) in &plan.mana_sources {
            self.resolve_mana_ability(actor, card_id, index, false)?;
        }

        if !plan.mana.is_free() {
            self.get_player_mut(actor)?
                .mana_pool
                .pay_cost(&plan.mana)
                .map_err(|err| MtgError::InvariantViolation(format!("planned payment failed: {err}")))?;
        }
        if plan.tap_source {
            self.tap_permanent(source)?;
        }
        if plan.life > 0 {
            self.change_life(actor, -plan.life)?;
        }
        for (counter, amount) in &plan.remove_counters {
            self.remove_counters(source, counter.clone(), *amount)?;
        }
        for (counter, amount) in &plan.add_counters {
            self.add_counters(source, counter.clone(), *amount)?;
        }
        if plan.sacrifice_source {
            self.move_card(source, Zone::Graveyard)?;
        }
        Ok(())
    }

    /// Pay a mana ability's cost and add its mana immediately
    ///
    /// With `pay_cost` the ability's full cost is planned and paid; mana
    /// sources tapped during another payment were already checked.
    pub(crate) fn resolve_mana_ability(
        &mut self,
        actor: PlayerId,
        source: CardId,
        index: usize,
        pay_cost: bool,
    ) -> Result<()> {
        let (ability, name) = {
            let card = self.cards.get(source)?;
            let ability = card
                .activated
                .get(index)
                .cloned()
                .ok_or_else(|| MtgError::InvalidAction(format!("card {source} has no ability {index}")))?;
            (ability, card.name.clone())
        };
        if pay_cost {
            let plan = self.plan_payment(actor, source, &ability.cost, &[])?;
            self.commit_payment(actor, source, &plan)?;
        } else {
            self.tap_permanent(source)?;
        }
        self.record(GameEvent::ManaAbilityActivated {
            player: actor,
            source,
            name,
        });
        let ctx = EffectContext::new(actor, source);
        for effect in &ability.effects {
            self.execute_effect(effect, &ctx)?;
        }
        Ok(())
    }

    /// Pick untapped mana sources that, with the pool, pay `cost`
    ///
    /// Colored requirements are covered first by sources of that color, then
    /// generic by whatever is left. `exclude` is kept untapped (a source whose
    /// own tap is part of the cost). Returns `None` when no choice works.
    pub fn plan_mana_sources(&self, actor: PlayerId, cost: &ManaCost, exclude: Option<CardId>) -> Option<Vec<CardId>> {
        let pool = self.get_player(actor).ok()?.mana_pool;
        if pool.can_pay(cost) {
            return Some(Vec::new());
        }

        let mut available: Vec<(CardId, Color, u8)> = self
            .battlefield
            .cards
            .iter()
            .copied()
            .filter(|&id| Some(id) != exclude)
            .filter(|&id| self.cards.get(id).is_ok_and(|c| c.controller == actor))
            .filter(|&id| self.check_can_tap(id).is_ok())
            .filter_map(|id| self.tap_mana_ability(id).map(|(_, color, amount)| (id, color, amount)))
            .collect();

        let mut chosen = Vec::new();
        let mut simulated = pool;
        for color in Color::ALL {
            while simulated.amount(color) < cost.colored(color) {
                let pos = available.iter().position(|&(_, c, _)| c == color)?;
                let (id, c, amount) = available.remove(pos);
                simulated.add(c, amount);
                chosen.push(id);
            }
        }
        while !simulated.can_pay(cost) {
            if available.is_empty() {
                return None;
            }
            let (id, c, amount) = available.remove(0);
            simulated.add(c, amount);
            chosen.push(id);
        }
        Some(chosen)
    }
}
