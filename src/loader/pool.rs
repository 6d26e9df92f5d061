//! Built-in sample card pool
//!
//! A small set of well-known cards covering what the engine supports:
//! basic lands, vanilla and keyword creatures, burn, removal, a counterspell,
//! pump, an anthem, an aura, equipment, a planeswalker and a few triggers.

use crate::core::{
    ActivatedAbility, CardType, Color, Cost, CounterType, Effect, EffectTarget, Keyword,
    ManaCost, SpellDescriptor, StaticAbility, StaticScope, TargetKind, Timing, TokenSpec, TriggerCondition,
    TriggeredAbility,
};
use crate::loader::{CardDatabase, CardDefinition, DeckList};

fn basic_land(name: &str, color: Color) -> CardDefinition {
    CardDefinition::new(name, "", &[CardType::Land])
        .with_subtype(name)
        .with_activated(ActivatedAbility::mana(
            Cost::Tap,
            Effect::AddMana { color, amount: 1 },
            format!("{{T}}: Add {{{color}}}"),
        ))
}

fn instant(name: &str, cost: &str, spell: SpellDescriptor) -> CardDefinition {
    CardDefinition::new(name, cost, &[CardType::Instant]).with_spell(spell)
}

fn sorcery(name: &str, cost: &str, spell: SpellDescriptor) -> CardDefinition {
    CardDefinition::new(name, cost, &[CardType::Sorcery]).with_spell(spell)
}

fn target_slot() -> EffectTarget {
    EffectTarget::Target(0)
}

/// Every card in the sample pool
pub fn sample_cards() -> Vec<CardDefinition> {
    let instant_speed = || SpellDescriptor::new(Timing::InstantSpeed);
    let sorcery_speed = || SpellDescriptor::new(Timing::SorcerySpeed);

    vec![
        basic_land("Plains", Color::White),
        basic_land("Island", Color::Blue),
        basic_land("Swamp", Color::Black),
        basic_land("Mountain", Color::Red),
        basic_land("Forest", Color::Green),
        // Creatures
        CardDefinition::creature("Grizzly Bears", "1G", 2, 2).with_subtype("Bear"),
        CardDefinition::creature("Hill Giant", "3R", 3, 3).with_subtype("Giant"),
        CardDefinition::creature("Serra Angel", "3WW", 4, 4)
            .with_subtype("Angel")
            .with_keyword(Keyword::Flying)
            .with_keyword(Keyword::Vigilance),
        CardDefinition::creature("Typhoid Rats", "B", 1, 1)
            .with_subtype("Rat")
            .with_keyword(Keyword::Deathtouch),
        CardDefinition::creature("Raging Goblin", "R", 1, 1)
            .with_subtype("Goblin")
            .with_keyword(Keyword::Haste),
        CardDefinition::creature("Giant Spider", "3G", 2, 4)
            .with_subtype("Spider")
            .with_keyword(Keyword::Reach),
        CardDefinition::creature("Wall of Stone", "1RR", 0, 8)
            .with_subtype("Wall")
            .with_keyword(Keyword::Defender),
        CardDefinition::creature("Craw Wurm", "4GG", 6, 4)
            .with_subtype("Wurm")
            .with_keyword(Keyword::Trample),
        CardDefinition::creature("Vampire Nighthawk", "1BB", 2, 3)
            .with_subtype("Vampire")
            .with_keyword(Keyword::Flying)
            .with_keyword(Keyword::Deathtouch)
            .with_keyword(Keyword::Lifelink),
        CardDefinition::creature("Llanowar Elves", "G", 1, 1)
            .with_subtype("Elf")
            .with_activated(ActivatedAbility::mana(
                Cost::Tap,
                Effect::AddMana {
                    color: Color::Green,
                    amount: 1,
                },
                "{T}: Add {G}",
            )),
        CardDefinition::creature("Prodigal Pyromancer", "2R", 1, 1)
            .with_subtype("Wizard")
            .with_activated(
                ActivatedAbility::new(Cost::Tap, "{T}: deals 1 damage to any target")
                    .with_target(TargetKind::Any)
                    .with_effect(Effect::damage_target(1)),
            ),
        CardDefinition::creature("Elvish Visionary", "1G", 1, 1)
            .with_subtype("Elf")
            .with_trigger(
                TriggeredAbility::new(TriggerCondition::EntersBattlefield, "When this enters, draw a card")
                    .with_effect(Effect::DrawCards {
                        player: EffectTarget::Controller,
                        count: 1,
                    }),
            ),
        CardDefinition::creature("Festering Goblin", "B", 1, 1)
            .with_subtype("Goblin")
            .with_trigger(
                TriggeredAbility::new(TriggerCondition::Dies, "When this dies, target creature gets -1/-1")
                    .with_target(TargetKind::Creature)
                    .with_effect(Effect::Pump {
                        target: target_slot(),
                        power: -1,
                        toughness: -1,
                    }),
            ),
        CardDefinition::creature("Blood Artist", "1B", 0, 1)
            .with_subtype("Vampire")
            .with_trigger(
                TriggeredAbility::new(
                    TriggerCondition::CreatureDies,
                    "Whenever a creature dies, target player loses 1 life and you gain 1 life",
                )
                .with_target(TargetKind::Player)
                .with_effect(Effect::LoseLife {
                    player: target_slot(),
                    amount: 1,
                })
                .with_effect(Effect::GainLife {
                    player: EffectTarget::Controller,
                    amount: 1,
                }),
            ),
        CardDefinition::creature("Young Pyromancer", "1R", 2, 1)
            .with_subtype("Shaman")
            .with_trigger(
                TriggeredAbility::new(
                    TriggerCondition::YouCastSpell,
                    "Whenever you cast a spell, create a 1/1 Elemental",
                )
                .with_effect(Effect::CreateTokens {
                    token: TokenSpec::creature("Elemental", 1, 1),
                    count: 1,
                }),
            ),
        CardDefinition::creature("Isamaru, Hound of Konda", "W", 2, 2)
            .legendary()
            .with_subtype("Dog"),
        // Instants and sorceries
        instant(
            "Lightning Bolt",
            "R",
            instant_speed()
                .with_target(TargetKind::Any)
                .with_effect(Effect::damage_target(3)),
        ),
        instant(
            "Shock",
            "R",
            instant_speed()
                .with_target(TargetKind::Any)
                .with_effect(Effect::damage_target(2)),
        ),
        instant(
            "Giant Growth",
            "G",
            instant_speed()
                .with_target(TargetKind::Creature)
                .with_effect(Effect::Pump {
                    target: target_slot(),
                    power: 3,
                    toughness: 3,
                }),
        ),
        instant(
            "Doom Blade",
            "1B",
            instant_speed()
                .with_target(TargetKind::Creature)
                .with_effect(Effect::Destroy { target: target_slot() }),
        ),
        instant(
            "Counterspell",
            "UU",
            instant_speed()
                .with_target(TargetKind::Spell)
                .with_effect(Effect::CounterSpell { target: target_slot() }),
        ),
        instant(
            "Unsummon",
            "U",
            instant_speed()
                .with_target(TargetKind::Creature)
                .with_effect(Effect::ReturnToHand { target: target_slot() }),
        ),
        sorcery(
            "Divination",
            "2U",
            sorcery_speed().with_effect(Effect::DrawCards {
                player: EffectTarget::Controller,
                count: 2,
            }),
        ),
        sorcery(
            "Mind Rot",
            "2B",
            sorcery_speed()
                .with_target(TargetKind::Player)
                .with_effect(Effect::Discard {
                    player: target_slot(),
                    count: 2,
                }),
        ),
        sorcery(
            "Pyroclasm",
            "1R",
            sorcery_speed().with_effect(Effect::DealDamage {
                to: EffectTarget::EachCreature,
                amount: 2,
            }),
        ),
        sorcery(
            "Day of Judgment",
            "2WW",
            sorcery_speed().with_effect(Effect::Destroy {
                target: EffectTarget::EachCreature,
            }),
        ),
        sorcery(
            "Lava Axe",
            "4R",
            sorcery_speed()
                .with_target(TargetKind::Player)
                .with_effect(Effect::damage_target(5)),
        ),
        // Permanents
        CardDefinition::new("Glorious Anthem", "1WW", &[CardType::Enchantment]).with_static(
            StaticAbility::ModifyPowerToughness {
                scope: StaticScope::CreaturesYouControl,
                power: 1,
                toughness: 1,
            },
        ),
        CardDefinition::new("Holy Strength", "W", &[CardType::Enchantment])
            .with_subtype("Aura")
            .with_spell(sorcery_speed().with_target(TargetKind::Creature))
            .with_static(StaticAbility::ModifyPowerToughness {
                scope: StaticScope::AttachedCreature,
                power: 1,
                toughness: 2,
            }),
        CardDefinition::new("Bonesplitter", "1", &[CardType::Artifact])
            .with_subtype("Equipment")
            .with_static(StaticAbility::ModifyPowerToughness {
                scope: StaticScope::AttachedCreature,
                power: 2,
                toughness: 0,
            })
            .with_activated(
                ActivatedAbility::new(Cost::Mana(ManaCost::from_string("1")), "Equip {1}")
                    .sorcery_speed()
                    .with_target(TargetKind::Creature)
                    .with_effect(Effect::AttachSource { target: target_slot() }),
            ),
        CardDefinition::new("Chandra, Novice Pyromancer", "3RR", &[CardType::Planeswalker])
            .legendary()
            .with_subtype("Chandra")
            .with_loyalty(4)
            .with_activated(
                ActivatedAbility::new(
                    Cost::AddCounters {
                        counter: CounterType::Loyalty,
                        amount: 1,
                    },
                    "+1: deals 2 damage to each opponent",
                )
                .sorcery_speed()
                .with_effect(Effect::DealDamage {
                    to: EffectTarget::EachOpponent,
                    amount: 2,
                }),
            )
            .with_activated(
                ActivatedAbility::new(
                    Cost::RemoveCounters {
                        counter: CounterType::Loyalty,
                        amount: 2,
                    },
                    "-2: deals 3 damage to any target",
                )
                .sorcery_speed()
                .with_target(TargetKind::Any)
                .with_effect(Effect::damage_target(3)),
            ),
    ]
}

/// The sample pool as a database
pub fn sample_pool() -> CardDatabase {
    let mut db = CardDatabase::new();
    for def in sample_cards() {
        db.insert(def);
    }
    db
}

/// Names accepted by `sample_deck`
pub const SAMPLE_DECKS: &[&str] = &["red", "green", "black", "azorius"];

/// A 40-card deck built from the sample pool
pub fn sample_deck(name: &str) -> Option<DeckList> {
    let entries: &[(&str, u8)] = match name.to_lowercase().as_str() {
        "red" => &[
            ("Mountain", 16),
            ("Raging Goblin", 4),
            ("Young Pyromancer", 3),
            ("Prodigal Pyromancer", 3),
            ("Hill Giant", 3),
            ("Lightning Bolt", 4),
            ("Shock", 3),
            ("Lava Axe", 2),
            ("Pyroclasm", 1),
            ("Chandra, Novice Pyromancer", 1),
        ],
        "green" => &[
            ("Forest", 16),
            ("Llanowar Elves", 4),
            ("Grizzly Bears", 4),
            ("Elvish Visionary", 3),
            ("Giant Spider", 3),
            ("Craw Wurm", 4),
            ("Giant Growth", 4),
            ("Bonesplitter", 2),
        ],
        "black" => &[
            ("Swamp", 17),
            ("Typhoid Rats", 4),
            ("Festering Goblin", 4),
            ("Blood Artist", 4),
            ("Vampire Nighthawk", 4),
            ("Doom Blade", 4),
            ("Mind Rot", 3),
        ],
        "azorius" => &[
            ("Plains", 8),
            ("Island", 8),
            ("Isamaru, Hound of Konda", 2),
            ("Serra Angel", 3),
            ("Glorious Anthem", 3),
            ("Holy Strength", 2),
            ("Counterspell", 4),
            ("Unsummon", 3),
            ("Divination", 3),
            ("Bonesplitter", 4),
        ],
        _ => return None,
    };
    Some(DeckList::from_entries(entries))
}
