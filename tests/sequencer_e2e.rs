//! Turn structure: step entry, skipping and the cleanup decision

mod common;

use common::Table;
use mtg_rules_kernel::core::Color;
use mtg_rules_kernel::game::{Action, DecisionKind, EngineConfig, GameEvent, SpecialAction, Step};
use mtg_rules_kernel::zones::Zone;
use mtg_rules_kernel::ActionError;

fn pass_until(table: &mut Table, step: Step) {
    while table.game.turn.current_step != step {
        table.pass_round();
    }
}

#[test]
fn test_start_game_stops_in_upkeep_with_priority() {
    let mut table = Table::new(2);
    let outcome = table.game.start_game().unwrap();

    assert!(matches!(outcome.events.first(), Some(GameEvent::GameStarted { .. })));
    assert!(outcome.contains(|e| matches!(e, GameEvent::StepBegan { step: Step::Untap, .. })));
    assert_eq!(table.game.turn.current_step, Step::Upkeep);
    assert_eq!(table.holder(), table.player(0));
    assert!(table.game.start_game().is_err());
}

#[test]
fn test_first_draw_is_skipped() {
    let mut table = Table::new(2);
    let p1 = table.player(0);
    table.game.start_game().unwrap();
    pass_until(&mut table, Step::Main1);

    // An empty library would lose the game if the draw happened
    let player = table.game.get_player(p1).unwrap();
    assert!(!player.drew_from_empty_library);
    assert!(player.lost.is_none());
    assert!(!table
        .game
        .event_log
        .iter()
        .any(|e| matches!(e, GameEvent::CardDrawn { .. } | GameEvent::DrewFromEmptyLibrary { .. })));
}

#[test]
fn test_first_draw_can_be_kept() {
    let config = EngineConfig::default().with_skip_first_draw(false);
    let mut table = Table::with_config(2, config);
    let p1 = table.player(0);
    let top = table.put("Forest", p1, Zone::Library);
    table.game.start_game().unwrap();
    pass_until(&mut table, Step::Main1);

    assert_eq!(table.zone_of(top), Zone::Hand);
    assert!(table
        .game
        .event_log
        .iter()
        .any(|e| matches!(e, GameEvent::CardDrawn { player, card } if *player == p1 && *card == top)));
}

#[test]
fn test_mana_pools_empty_between_steps() {
    let mut table = Table::in_main_phase();
    let p1 = table.player(0);
    let mountain = table.put("Mountain", p1, Zone::Battlefield);

    table
        .game
        .submit_action(
            p1,
            Action::ActivateAbility {
                source: mountain,
                index: 0,
                targets: vec![],
                mana_sources: vec![],
            },
        )
        .unwrap();
    assert_eq!(table.game.get_player(p1).unwrap().mana_pool.amount(Color::Red), 1);
    // Mana abilities keep priority with the actor
    assert_eq!(table.holder(), p1);

    table.pass_round();
    assert_eq!(table.game.turn.current_step, Step::BeginCombat);
    assert!(table.game.get_player(p1).unwrap().mana_pool.is_empty());
    assert!(table
        .game
        .event_log
        .iter()
        .any(|e| matches!(e, GameEvent::ManaPoolEmptied { player } if *player == p1)));
}

#[test]
fn test_combat_steps_skipped_without_attackers() {
    let mut table = Table::in_main_phase();
    pass_until(&mut table, Step::DeclareAttackers);
    assert!(table.game.pending_decisions.is_empty());

    let mark = table.game.event_log.len();
    table.pass_round();
    assert_eq!(table.game.turn.current_step, Step::EndCombat);

    let skipped: Vec<Step> = table.game.event_log[mark..]
        .iter()
        .filter_map(|e| match e {
            GameEvent::StepSkipped { step } => Some(*step),
            _ => None,
        })
        .collect();
    assert_eq!(skipped, vec![Step::DeclareBlockers, Step::CombatDamage]);
}

#[test]
fn test_cleanup_asks_for_a_discard() {
    let mut table = Table::in_main_phase();
    let (p1, p2) = (table.player(0), table.player(1));
    let hand: Vec<_> = (0..9).map(|_| table.put("Forest", p1, Zone::Hand)).collect();
    pass_until(&mut table, Step::End);
    table.pass_round();

    assert_eq!(table.game.turn.current_step, Step::Cleanup);
    let decision = *table.game.pending_decisions.front().unwrap();
    assert_eq!(decision.player, p1);
    assert_eq!(decision.kind, DecisionKind::DiscardToHandSize);
    assert_eq!(decision.count, 2);
    assert_eq!(table.game.priority.holder(), None);

    let err = table.game.submit_action(p1, Action::Pass).unwrap_err();
    assert!(matches!(
        err.as_rejection(),
        Some(ActionError::AwaitingDecision {
            kind: DecisionKind::DiscardToHandSize,
            ..
        })
    ));

    let wrong_count = Action::Special(SpecialAction::DiscardToHandSize {
        cards: vec![hand[0]],
    });
    assert!(matches!(
        table.game.submit_action(p1, wrong_count).unwrap_err().as_rejection(),
        Some(ActionError::InvalidDeclaration(_))
    ));

    table
        .game
        .submit_action(
            p1,
            Action::Special(SpecialAction::DiscardToHandSize {
                cards: vec![hand[0], hand[1]],
            }),
        )
        .unwrap();
    assert_eq!(table.zone_of(hand[0]), Zone::Graveyard);
    assert_eq!(table.game.get_player_zones(p1).unwrap().hand.len(), 7);

    assert_eq!(table.game.turn.turn_number, 2);
    assert_eq!(table.game.turn.active_player, p2);
    assert_eq!(table.game.turn.current_step, Step::Upkeep);
    assert_eq!(table.holder(), p2);
}

#[test]
fn test_untap_step_untaps_only_the_active_players_permanents() {
    let mut table = Table::in_main_phase();
    let (p1, p2) = (table.player(0), table.player(1));
    let mine = table.put("Forest", p1, Zone::Battlefield);
    let theirs = table.put("Forest", p2, Zone::Battlefield);
    table.game.cards.get_mut(mine).unwrap().tapped = true;
    table.game.cards.get_mut(theirs).unwrap().tapped = true;

    pass_until(&mut table, Step::End);
    table.pass_round();
    assert_eq!(table.game.turn.active_player, p2);
    assert!(table.is_tapped(mine));
    assert!(!table.is_tapped(theirs));
}
