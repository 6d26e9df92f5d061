//! Stack ordering, resolution and countering

mod common;

use common::Table;
use mtg_rules_kernel::core::{CardId, StackItemId, TargetRef};
use mtg_rules_kernel::game::{Action, GameEvent};
use mtg_rules_kernel::zones::Zone;
use mtg_rules_kernel::MtgError;

fn cast(table: &mut Table, card: CardId, target: TargetRef, sources: Vec<CardId>) {
    let actor = table.holder();
    table
        .game
        .submit_action(
            actor,
            Action::CastSpell {
                card,
                targets: vec![target],
                mana_sources: sources,
            },
        )
        .unwrap();
}

#[test]
fn test_items_resolve_in_reverse_push_order() {
    let mut table = Table::in_main_phase();
    let (p1, p2) = (table.player(0), table.player(1));
    let mountains = table.lands("Mountain", p1, 3);

    let mut pushed: Vec<StackItemId> = Vec::new();
    for &mountain in &mountains {
        let shock = table.put("Shock", p1, Zone::Hand);
        cast(&mut table, shock, TargetRef::Player(p2), vec![mountain]);
        pushed.push(table.game.stack.top().unwrap().id);
    }
    assert_eq!(table.game.stack.len(), 3);
    let bottom_to_top: Vec<StackItemId> = table.game.stack.items().iter().map(|i| i.id).collect();
    assert_eq!(bottom_to_top, pushed);

    let mark = table.game.event_log.len();
    table.resolve_stack();
    let resolved: Vec<StackItemId> = table.game.event_log[mark..]
        .iter()
        .filter_map(|e| match e {
            GameEvent::StackItemResolved { item, .. } => Some(*item),
            _ => None,
        })
        .collect();
    pushed.reverse();
    assert_eq!(resolved, pushed);
    assert_eq!(table.life(p2), 14);
}

#[test]
fn test_resolution_requires_a_complete_round() {
    let mut table = Table::in_main_phase();
    let (p1, p2) = (table.player(0), table.player(1));
    let mountain = table.put("Mountain", p1, Zone::Battlefield);
    let shock = table.put("Shock", p1, Zone::Hand);
    cast(&mut table, shock, TargetRef::Player(p2), vec![mountain]);

    assert!(matches!(table.game.resolve_top(), Err(MtgError::InvalidAction(_))));
    assert_eq!(table.game.stack.len(), 1);

    table.game.submit_action(p1, Action::Pass).unwrap();
    assert_eq!(table.game.stack.len(), 1);
    table.game.submit_action(p2, Action::Pass).unwrap();
    assert!(table.game.stack.is_empty());
    assert_eq!(table.zone_of(shock), Zone::Graveyard);
}

#[test]
fn test_resolution_reopens_priority_with_an_empty_stack() {
    let mut table = Table::in_main_phase();
    let (p1, p2) = (table.player(0), table.player(1));
    let mountain = table.put("Mountain", p1, Zone::Battlefield);
    let shock = table.put("Shock", p1, Zone::Hand);
    cast(&mut table, shock, TargetRef::Player(p2), vec![mountain]);
    table.pass_round();

    // Still main phase: the stack emptied, it did not advance the step
    assert_eq!(table.game.turn.current_step, mtg_rules_kernel::game::Step::Main1);
    assert_eq!(table.holder(), p1);
    assert!(table.game.priority.passed().is_empty());
}

#[test]
fn test_counterspell_counters_the_spell() {
    let mut table = Table::in_main_phase();
    let (p1, p2) = (table.player(0), table.player(1));
    let mountain = table.put("Mountain", p1, Zone::Battlefield);
    let islands = table.lands("Island", p2, 2);
    let bolt = table.put("Lightning Bolt", p1, Zone::Hand);
    let counterspell = table.put("Counterspell", p2, Zone::Hand);

    cast(&mut table, bolt, TargetRef::Player(p2), vec![mountain]);
    let bolt_item = table.game.stack.top().unwrap().id;
    table.game.submit_action(p1, Action::Pass).unwrap();
    assert_eq!(table.holder(), p2);
    cast(&mut table, counterspell, TargetRef::StackItem(bolt_item), islands.clone());
    assert!(islands.iter().all(|&i| table.is_tapped(i)));

    table.resolve_stack();
    assert_eq!(table.life(p2), 20);
    assert_eq!(table.zone_of(bolt), Zone::Graveyard);
    assert_eq!(table.zone_of(counterspell), Zone::Graveyard);
    assert!(table
        .game
        .event_log
        .iter()
        .any(|e| matches!(e, GameEvent::SpellCountered { item, .. } if *item == bolt_item)));
}

#[test]
fn test_permanent_spell_enters_the_battlefield() {
    let mut table = Table::in_main_phase();
    let p1 = table.player(0);
    let forests = table.lands("Forest", p1, 2);
    let bears = table.put("Grizzly Bears", p1, Zone::Hand);

    table
        .game
        .submit_action(
            p1,
            Action::CastSpell {
                card: bears,
                targets: vec![],
                mana_sources: forests,
            },
        )
        .unwrap();
    assert_eq!(table.zone_of(bears), Zone::Stack);
    table.resolve_stack();

    assert_eq!(table.zone_of(bears), Zone::Battlefield);
    let card = table.game.cards.get(bears).unwrap();
    assert_eq!(card.controller, p1);
    assert!(card.summoning_sick);
}

#[test]
fn test_stack_events_reach_the_captured_log() {
    let mut table = Table::in_main_phase();
    let (p1, p2) = (table.player(0), table.player(1));
    table.game.logger.set_verbosity(mtg_rules_kernel::game::VerbosityLevel::Verbose);
    table.game.logger.enable_capture();
    let mountain = table.put("Mountain", p1, Zone::Battlefield);
    let shock = table.put("Shock", p1, Zone::Hand);

    cast(&mut table, shock, TargetRef::Player(p2), vec![mountain]);
    table.resolve_stack();

    let logs = table.game.logger.logs();
    assert!(logs.iter().any(|e| e.category.as_deref() == Some("stack")));
    assert!(logs.iter().any(|e| e.category.as_deref() == Some("priority")));
}
