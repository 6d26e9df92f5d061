//! Casting, activation and land-drop validation

mod common;

use common::Table;
use mtg_rules_kernel::core::{CardId, CounterType, PlayerId, TargetRef};
use mtg_rules_kernel::error::{CostShortfall, TimingViolation};
use mtg_rules_kernel::game::{Action, SpecialAction, Step};
use mtg_rules_kernel::zones::Zone;
use mtg_rules_kernel::{ActionError, MtgError};

fn cast(card: CardId, targets: Vec<TargetRef>, mana_sources: Vec<CardId>) -> Action {
    Action::CastSpell {
        card,
        targets,
        mana_sources,
    }
}

fn activate(source: CardId, index: usize, targets: Vec<TargetRef>, mana_sources: Vec<CardId>) -> Action {
    Action::ActivateAbility {
        source,
        index,
        targets,
        mana_sources,
    }
}

fn rejection(result: Result<impl std::fmt::Debug, MtgError>) -> ActionError {
    match result.unwrap_err() {
        MtgError::Rejected(err) => err,
        other => panic!("expected a rejection, got {other}"),
    }
}

fn play_land(table: &mut Table, player: PlayerId, card: CardId) -> Result<(), MtgError> {
    table
        .game
        .submit_action(player, Action::Special(SpecialAction::PlayLand { card }))
        .map(|_| ())
}

#[test]
fn test_sorcery_timing_is_checked_before_priority() {
    let mut table = Table::new(2);
    table.game.start_game().unwrap();
    let (p1, p2) = (table.player(0), table.player(1));
    let mountains = table.lands("Mountain", p2, 5);
    let axe = table.put("Lava Axe", p2, Zone::Hand);

    // Upkeep, and p2 does not hold priority either
    assert_eq!(
        rejection(table.game.submit_action(p2, cast(axe, vec![TargetRef::Player(p1)], mountains.clone()))),
        ActionError::WrongTiming(TimingViolation::NotMainPhase { step: Step::Upkeep })
    );

    table.game.begin_step(Step::Main1).unwrap();
    table.game.submit_action(p1, Action::Pass).unwrap();
    assert_eq!(table.holder(), p2);
    assert_eq!(
        rejection(table.game.submit_action(p2, cast(axe, vec![TargetRef::Player(p1)], mountains.clone()))),
        ActionError::WrongTiming(TimingViolation::NotActivePlayer { active: p1 })
    );
    assert!(mountains.iter().all(|&m| !table.is_tapped(m)));
    assert_eq!(table.zone_of(axe), Zone::Hand);
}

#[test]
fn test_sorcery_needs_an_empty_stack() {
    let mut table = Table::in_main_phase();
    let (p1, p2) = (table.player(0), table.player(1));
    let mountain = table.put("Mountain", p1, Zone::Battlefield);
    let islands = table.lands("Island", p1, 3);
    let shock = table.put("Shock", p1, Zone::Hand);
    let divination = table.put("Divination", p1, Zone::Hand);

    table
        .game
        .submit_action(p1, cast(shock, vec![TargetRef::Player(p2)], vec![mountain]))
        .unwrap();
    assert_eq!(
        rejection(table.game.submit_action(p1, cast(divination, vec![], islands))),
        ActionError::WrongTiming(TimingViolation::StackNotEmpty { depth: 1 })
    );
}

#[test]
fn test_instant_needs_priority() {
    let mut table = Table::in_main_phase();
    let (p1, p2) = (table.player(0), table.player(1));
    let mountain = table.put("Mountain", p2, Zone::Battlefield);
    let bolt = table.put("Lightning Bolt", p2, Zone::Hand);

    assert_eq!(
        rejection(table.game.submit_action(p2, cast(bolt, vec![TargetRef::Player(p1)], vec![mountain]))),
        ActionError::NotPriorityHolder {
            actor: p2,
            holder: Some(p1)
        }
    );
}

#[test]
fn test_unpayable_cost_taps_nothing() {
    let mut table = Table::in_main_phase();
    let p1 = table.player(0);
    let mountains = table.lands("Mountain", p1, 3);
    let giant = table.put("Hill Giant", p1, Zone::Hand);
    let events = table.game.event_log.len();

    let err = rejection(table.game.submit_action(p1, cast(giant, vec![], mountains.clone())));
    assert!(matches!(err, ActionError::CannotPayCost(CostShortfall::Mana { .. })));
    assert!(mountains.iter().all(|&m| !table.is_tapped(m)));
    assert_eq!(table.zone_of(giant), Zone::Hand);
    assert!(table.game.get_player(p1).unwrap().mana_pool.is_empty());
    assert_eq!(table.game.event_log.len(), events);
    assert_eq!(table.holder(), p1);
}

#[test]
fn test_tapped_source_is_rejected() {
    let mut table = Table::in_main_phase();
    let (p1, p2) = (table.player(0), table.player(1));
    let mountain = table.put("Mountain", p1, Zone::Battlefield);
    table.game.cards.get_mut(mountain).unwrap().tapped = true;
    let shock = table.put("Shock", p1, Zone::Hand);

    let err = rejection(table.game.submit_action(p1, cast(shock, vec![TargetRef::Player(p2)], vec![mountain])));
    assert!(matches!(err, ActionError::CannotPayCost(_)));
    assert_eq!(table.zone_of(shock), Zone::Hand);
}

#[test]
fn test_illegal_target_is_rejected() {
    let mut table = Table::in_main_phase();
    let (p1, p2) = (table.player(0), table.player(1));
    let swamps = table.lands("Swamp", p1, 2);
    let blade = table.put("Doom Blade", p1, Zone::Hand);

    let err = rejection(table.game.submit_action(p1, cast(blade, vec![TargetRef::Player(p2)], swamps.clone())));
    assert!(matches!(err, ActionError::IllegalTarget { index: 0, .. }));
    assert!(swamps.iter().all(|&s| !table.is_tapped(s)));
}

#[test]
fn test_one_land_per_turn() {
    let mut table = Table::in_main_phase();
    let (p1, p2) = (table.player(0), table.player(1));
    let first = table.put("Forest", p1, Zone::Hand);
    let second = table.put("Forest", p1, Zone::Hand);
    let theirs = table.put("Forest", p2, Zone::Hand);

    play_land(&mut table, p1, first).unwrap();
    assert_eq!(table.zone_of(first), Zone::Battlefield);
    assert_eq!(table.holder(), p1);

    assert_eq!(
        rejection(play_land(&mut table, p1, second)),
        ActionError::LandDropUsed { played: 1, allowed: 1 }
    );
    assert_eq!(table.zone_of(second), Zone::Hand);

    table.game.submit_action(p1, Action::Pass).unwrap();
    assert_eq!(
        rejection(play_land(&mut table, p2, theirs)),
        ActionError::WrongTiming(TimingViolation::NotActivePlayer { active: p1 })
    );
}

#[test]
fn test_loyalty_ability_once_per_turn() {
    let mut table = Table::in_main_phase();
    let (p1, p2) = (table.player(0), table.player(1));
    let chandra = table.put("Chandra, Novice Pyromancer", p1, Zone::Battlefield);
    assert_eq!(table.game.cards.get(chandra).unwrap().get_counter(&CounterType::Loyalty), 4);

    table.game.submit_action(p1, activate(chandra, 0, vec![], vec![])).unwrap();
    assert_eq!(table.game.cards.get(chandra).unwrap().get_counter(&CounterType::Loyalty), 5);

    table.resolve_stack();
    assert_eq!(table.life(p2), 18);

    let err = rejection(table.game.submit_action(p1, activate(chandra, 1, vec![TargetRef::Player(p2)], vec![])));
    assert!(matches!(err, ActionError::InvalidSource { .. }));
    assert_eq!(table.game.cards.get(chandra).unwrap().get_counter(&CounterType::Loyalty), 5);
}

#[test]
fn test_equip_attaches_and_pumps() {
    let mut table = Table::in_main_phase();
    let p1 = table.player(0);
    let mountain = table.put("Mountain", p1, Zone::Battlefield);
    let bears = table.put("Grizzly Bears", p1, Zone::Battlefield);
    let bonesplitter = table.put("Bonesplitter", p1, Zone::Battlefield);

    table
        .game
        .submit_action(p1, activate(bonesplitter, 0, vec![TargetRef::Card(bears)], vec![mountain]))
        .unwrap();
    assert!(table.is_tapped(mountain));
    table.resolve_stack();

    assert_eq!(table.game.cards.get(bonesplitter).unwrap().attached_to, Some(bears));
    assert_eq!(table.game.power(bears), 4);
    assert_eq!(table.game.toughness(bears), 2);
}

#[test]
fn test_tap_ability_of_a_summoning_sick_creature() {
    let mut table = Table::in_main_phase();
    let (p1, p2) = (table.player(0), table.player(1));
    let pyromancer = table.put("Prodigal Pyromancer", p1, Zone::Battlefield);
    table.game.cards.get_mut(pyromancer).unwrap().summoning_sick = true;

    let err = rejection(table.game.submit_action(p1, activate(pyromancer, 0, vec![TargetRef::Player(p2)], vec![])));
    assert_eq!(err, ActionError::CannotPayCost(CostShortfall::SummoningSick { card: pyromancer }));

    table.game.cards.get_mut(pyromancer).unwrap().summoning_sick = false;
    table
        .game
        .submit_action(p1, activate(pyromancer, 0, vec![TargetRef::Player(p2)], vec![]))
        .unwrap();
    assert!(table.is_tapped(pyromancer));
    table.resolve_stack();
    assert_eq!(table.life(p2), 19);
}
