//! Effect execution
//!
//! Applies `Effect` descriptors to the game state when a stack item resolves
//! (or immediately, for mana abilities). Effects never check legality: the
//! item's targets were re-validated just before.

use crate::core::{
    Card, CardId, CardType, Color, CounterType, Effect, EffectTarget, Keyword, PlayerId, Subtype,
    TargetRef, TokenSpec,
};
use crate::game::{GameEvent, GameState, StackItem};
use crate::zones::Zone;
use crate::{MtgError, Result};
use rand::Rng;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

/// Handler for an `Effect::Custom`
pub type CustomEffectFn = fn(&mut GameState, &EffectContext) -> Result<()>;

/// Named handlers for effects the closed `Effect` set cannot express
#[derive(Debug, Clone, Default)]
pub struct EffectRegistry {
    handlers: FxHashMap<String, CustomEffectFn>,
}

impl EffectRegistry {
    pub fn register(&mut self, name: impl Into<String>, handler: CustomEffectFn) {
        self.handlers.insert(name.into(), handler);
    }

    pub fn get(&self, name: &str) -> Option<CustomEffectFn> {
        self.handlers.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }
}

/// Who is applying an effect, from what, and at what
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EffectContext {
    pub controller: PlayerId,
    pub source: CardId,
    /// Keywords of the source as last known (deathtouch, lifelink)
    pub source_keywords: SmallVec<[Keyword; 4]>,
    pub targets: SmallVec<[TargetRef; 2]>,
}

impl EffectContext {
    pub fn new(controller: PlayerId, source: CardId) -> Self {
        EffectContext {
            controller,
            source,
            source_keywords: SmallVec::new(),
            targets: SmallVec::new(),
        }
    }

    pub fn for_item(item: &StackItem) -> Self {
        EffectContext {
            controller: item.controller,
            source: item.source,
            source_keywords: item.snapshot.keywords.clone(),
            targets: item.targets.iter().map(|t| t.target).collect(),
        }
    }

    fn source_has(&self, keyword: Keyword) -> bool {
        self.source_keywords.contains(&keyword)
    }
}

impl GameState {
    /// Register a handler for `Effect::Custom { name }`
    pub fn register_custom_effect(&mut self, name: impl Into<String>, handler: CustomEffectFn) {
        self.custom_effects.register(name, handler);
    }

    /// Players an effect target refers to
    fn effect_players(&self, target: EffectTarget, ctx: &EffectContext) -> SmallVec<[PlayerId; 4]> {
        match target {
            EffectTarget::Target(i) => match ctx.targets.get(i) {
                Some(TargetRef::Player(p)) => smallvec::smallvec![*p],
                _ => SmallVec::new(),
            },
            EffectTarget::Controller => smallvec::smallvec![ctx.controller],
            EffectTarget::EachOpponent => self.opponents(ctx.controller).into_iter().collect(),
            EffectTarget::EachPlayer => self.apnap_order(),
            EffectTarget::Source | EffectTarget::EachCreature => SmallVec::new(),
        }
    }

    /// Permanents an effect target refers to
    fn effect_permanents(&self, target: EffectTarget, ctx: &EffectContext) -> Vec<CardId> {
        let on_battlefield = |id: &CardId| self.battlefield.contains(*id);
        match target {
            EffectTarget::Target(i) => match ctx.targets.get(i) {
                Some(TargetRef::Card(c)) => Some(*c).into_iter().filter(on_battlefield).collect(),
                _ => Vec::new(),
            },
            EffectTarget::Source => Some(ctx.source).into_iter().filter(on_battlefield).collect(),
            EffectTarget::EachCreature => self
                .battlefield
                .cards
                .iter()
                .copied()
                .filter(|&id| self.cards.get(id).is_ok_and(|c| c.is_creature()))
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Damage recipients: players and permanents
    fn effect_recipients(&self, target: EffectTarget, ctx: &EffectContext) -> Vec<TargetRef> {
        let mut out: Vec<TargetRef> = self
            .effect_players(target, ctx)
            .into_iter()
            .map(TargetRef::Player)
            .collect();
        out.extend(self.effect_permanents(target, ctx).into_iter().map(TargetRef::Card));
        out
    }

    /// Apply one effect
    pub fn execute_effect(&mut self, effect: &Effect, ctx: &EffectContext) -> Result<()> {
        match effect {
            Effect::DealDamage { to, amount } => {
                for recipient in self.effect_recipients(*to, ctx) {
                    self.deal_damage(ctx, recipient, *amount)?;
                }
            }
            Effect::DrawCards { player, count } => {
                for p in self.effect_players(*player, ctx) {
                    for _ in 0..*count {
                        self.draw_card(p)?;
                    }
                }
            }
            Effect::GainLife { player, amount } => {
                for p in self.effect_players(*player, ctx) {
                    self.change_life(p, *amount)?;
                }
            }
            Effect::LoseLife { player, amount } => {
                for p in self.effect_players(*player, ctx) {
                    self.change_life(p, -*amount)?;
                }
            }
            Effect::AddPoison { player, amount } => {
                for p in self.effect_players(*player, ctx) {
                    let total = self.get_player_mut(p)?.add_poison(*amount);
                    self.emit(GameEvent::PoisonAdded {
                        player: p,
                        amount: *amount,
                        total,
                    });
                }
            }
            Effect::Destroy { target } => {
                for card in self.effect_permanents(*target, ctx) {
                    self.destroy_permanent(card)?;
                }
            }
            Effect::ReturnToHand { target } => {
                for card in self.effect_permanents(*target, ctx) {
                    self.move_card(card, Zone::Hand)?;
                }
            }
            Effect::Tap { target } => {
                for card in self.effect_permanents(*target, ctx) {
                    self.tap_permanent(card)?;
                }
            }
            Effect::Untap { target } => {
                for card in self.effect_permanents(*target, ctx) {
                    let c = self.cards.get_mut(card)?;
                    if c.tapped {
                        c.untap();
                        self.emit(GameEvent::PermanentUntapped { card });
                    }
                }
            }
            Effect::Pump {
                target,
                power,
                toughness,
            } => {
                for card in self.effect_permanents(*target, ctx) {
                    let c = self.cards.get_mut(card)?;
                    c.eot_power += power;
                    c.eot_toughness += toughness;
                }
            }
            Effect::GrantKeyword { target, keyword } => {
                for card in self.effect_permanents(*target, ctx) {
                    let c = self.cards.get_mut(card)?;
                    if !c.eot_keywords.contains(keyword) {
                        c.eot_keywords.push(*keyword);
                    }
                }
            }
            Effect::PutCounters {
                target,
                counter,
                amount,
            } => {
                for card in self.effect_permanents(*target, ctx) {
                    self.add_counters(card, counter.clone(), *amount)?;
                }
            }
            Effect::Mill { player, count } => {
                for p in self.effect_players(*player, ctx) {
                    for _ in 0..*count {
                        let top = self.get_player_zones(p).and_then(|z| z.library.peek_top());
                        match top {
                            Some(card) => self.move_card(card, Zone::Graveyard)?,
                            None => break,
                        }
                    }
                }
            }
            Effect::Discard { player, count } => {
                for p in self.effect_players(*player, ctx) {
                    self.discard_at_random(p, usize::from(*count))?;
                }
            }
            Effect::CounterSpell { target } => {
                if let EffectTarget::Target(i) = target {
                    if let Some(TargetRef::StackItem(id)) = ctx.targets.get(*i) {
                        self.counter_item(*id)?;
                    }
                }
            }
            Effect::AddMana { color, amount } => {
                self.add_mana(ctx.controller, *color, *amount)?;
            }
            Effect::CreateTokens { token, count } => {
                for _ in 0..*count {
                    self.create_token(token, ctx.controller)?;
                }
            }
            Effect::AttachSource { target } => {
                if self.battlefield.contains(ctx.source) {
                    if let Some(&card) = self.effect_permanents(*target, ctx).first() {
                        self.attach(ctx.source, card)?;
                    }
                }
            }
            Effect::Custom { name } => {
                let handler = self
                    .custom_effects
                    .get(name)
                    .ok_or_else(|| MtgError::InvalidAction(format!("no handler registered for custom effect {name}")))?;
                handler(self, ctx)?;
            }
        }
        Ok(())
    }

    /// Deal damage from an effect's source
    ///
    /// Damage to a player is life loss; to a creature it is marked; to a
    /// planeswalker it removes loyalty. Lifelink and deathtouch come from the
    /// source's last known keywords.
    pub fn deal_damage(&mut self, ctx: &EffectContext, target: TargetRef, amount: i32) -> Result<()> {
        if amount <= 0 {
            return Ok(());
        }
        match target {
            TargetRef::Player(player) => {
                self.emit(GameEvent::DamageDealt {
                    source: ctx.source,
                    target,
                    amount,
                });
                self.change_life(player, -amount)?;
            }
            TargetRef::Card(card_id) => {
                let (is_creature, is_planeswalker) = {
                    let card = self.cards.get(card_id)?;
                    (card.is_creature(), card.is_planeswalker())
                };
                if is_creature {
                    let card = self.cards.get_mut(card_id)?;
                    card.damage += amount;
                    if ctx.source_has(Keyword::Deathtouch) {
                        card.deathtouch_damage = true;
                    }
                }
                self.emit(GameEvent::DamageDealt {
                    source: ctx.source,
                    target,
                    amount,
                });
                if is_planeswalker {
                    let loyalty = u8::try_from(amount).unwrap_or(u8::MAX);
                    self.remove_counters(card_id, CounterType::Loyalty, loyalty)?;
                }
            }
            TargetRef::StackItem(_) => return Ok(()),
        }
        if ctx.source_has(Keyword::Lifelink) {
            self.change_life(ctx.controller, amount)?;
        }
        Ok(())
    }

    /// Adjust a life total; losing is left to state-based actions
    pub fn change_life(&mut self, player: PlayerId, delta: i32) -> Result<()> {
        if delta == 0 {
            return Ok(());
        }
        let life = self.get_player_mut(player)?.adjust_life(delta);
        self.emit(GameEvent::LifeChanged { player, delta, life });
        Ok(())
    }

    /// Destroy a permanent unless it is indestructible
    pub fn destroy_permanent(&mut self, card: CardId) -> Result<bool> {
        if !self.battlefield.contains(card) || self.has_keyword(card, Keyword::Indestructible) {
            return Ok(false);
        }
        self.move_card(card, Zone::Graveyard)?;
        Ok(true)
    }

    pub fn tap_permanent(&mut self, card: CardId) -> Result<()> {
        let c = self.cards.get_mut(card)?;
        if !c.tapped {
            c.tap();
            self.emit(GameEvent::PermanentTapped { card });
        }
        Ok(())
    }

    pub fn add_counters(&mut self, card: CardId, counter: CounterType, amount: u8) -> Result<()> {
        if amount == 0 {
            return Ok(());
        }
        self.cards.get_mut(card)?.add_counter(counter.clone(), amount);
        self.emit(GameEvent::CountersChanged {
            card,
            counter,
            delta: i32::from(amount),
        });
        Ok(())
    }

    /// Remove up to `amount` counters, returning how many were removed
    pub fn remove_counters(&mut self, card: CardId, counter: CounterType, amount: u8) -> Result<u8> {
        let removed = self.cards.get_mut(card)?.remove_counter(&counter, amount);
        if removed > 0 {
            self.emit(GameEvent::CountersChanged {
                card,
                counter,
                delta: -i32::from(removed),
            });
        }
        Ok(removed)
    }

    pub fn add_mana(&mut self, player: PlayerId, color: Color, amount: u8) -> Result<()> {
        self.get_player_mut(player)?.mana_pool.add(color, amount);
        self.emit(GameEvent::ManaAdded { player, color, amount });
        Ok(())
    }

    /// Attach an aura or equipment to a permanent
    pub fn attach(&mut self, card: CardId, to: CardId) -> Result<()> {
        self.cards.get_mut(card)?.attached_to = Some(to);
        self.emit(GameEvent::Attached { card, to });
        Ok(())
    }

    /// Remove a spell or ability from the stack without resolving it
    pub fn counter_item(&mut self, id: crate::core::StackItemId) -> Result<()> {
        let Some(item) = self.stack.remove(id) else {
            return Ok(());
        };
        self.emit(GameEvent::SpellCountered {
            item: item.id,
            card: item.source,
            name: item.snapshot.name.clone(),
        });
        if item.is_spell() && self.cards.get(item.source)?.zone == Zone::Stack {
            self.move_card(item.source, Zone::Graveyard)?;
        }
        Ok(())
    }

    /// Discard cards chosen with the game RNG
    pub fn discard_at_random(&mut self, player: PlayerId, count: usize) -> Result<Vec<CardId>> {
        let mut discarded = Vec::new();
        for _ in 0..count {
            let hand: Vec<CardId> = self
                .get_player_zones(player)
                .map(|z| z.hand.cards.clone())
                .unwrap_or_default();
            if hand.is_empty() {
                break;
            }
            let pick = self.rng.borrow_mut().gen_range(0..hand.len());
            self.move_card(hand[pick], Zone::Graveyard)?;
            discarded.push(hand[pick]);
        }
        if !discarded.is_empty() {
            self.emit(GameEvent::CardsDiscarded {
                player,
                cards: discarded.clone(),
            });
        }
        Ok(discarded)
    }

    /// Create a creature token on the battlefield
    pub fn create_token(&mut self, spec: &TokenSpec, controller: PlayerId) -> Result<CardId> {
        let id = self.next_card_id();
        let mut card = Card::new(id, spec.name.as_str(), controller);
        card.types.push(CardType::Creature);
        card.subtypes.extend(spec.subtypes.iter().map(|s| Subtype::new(s.as_str())));
        card.colors.extend(spec.colors.iter().copied());
        card.keywords.extend(spec.keywords.iter().copied());
        card.power = Some(spec.power);
        card.toughness = Some(spec.toughness);
        card.is_token = true;
        card.zone = Zone::Battlefield;
        card.summoning_sick = true;
        card.timestamp = self.next_timestamp();
        let name = card.name.clone();

        self.cards.insert(id, card);
        self.battlefield.add(id);
        self.emit(GameEvent::TokenCreated {
            card: id,
            controller,
            name: name.clone(),
        });
        self.emit(GameEvent::EnteredBattlefield {
            card: id,
            controller,
            name,
        });
        Ok(id)
    }
}
