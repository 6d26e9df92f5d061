//! Priority passing through the public action interface

mod common;

use common::Table;
use mtg_rules_kernel::core::{LossReason, PlayerId, TargetRef};
use mtg_rules_kernel::game::{Action, Step};
use mtg_rules_kernel::zones::Zone;
use mtg_rules_kernel::ActionError;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha12Rng;

#[test]
fn test_only_the_holder_may_pass() {
    let mut table = Table::in_main_phase();
    let (p1, p2) = (table.player(0), table.player(1));
    assert_eq!(table.holder(), p1);

    let err = table.game.submit_action(p2, Action::Pass).unwrap_err();
    assert_eq!(
        err.as_rejection(),
        Some(&ActionError::NotPriorityHolder {
            actor: p2,
            holder: Some(p1)
        })
    );
    assert_eq!(table.holder(), p1);
    assert!(table.game.priority.passed().is_empty());
}

#[test]
fn test_pass_moves_priority_in_apnap_order() {
    let mut table = Table::new(3);
    table.game.start_game().unwrap();
    table.game.begin_step(Step::Main1).unwrap();
    let (p1, p2, p3) = (table.player(0), table.player(1), table.player(2));

    table.game.submit_action(p1, Action::Pass).unwrap();
    assert_eq!(table.holder(), p2);
    table.game.submit_action(p2, Action::Pass).unwrap();
    assert_eq!(table.holder(), p3);
    assert_eq!(table.game.turn.current_step, Step::Main1);

    table.game.submit_action(p3, Action::Pass).unwrap();
    assert_eq!(table.game.turn.current_step, Step::BeginCombat);
    assert_eq!(table.holder(), p1);
}

#[test]
fn test_players_who_lost_are_skipped() {
    let mut table = Table::new(3);
    table.game.start_game().unwrap();
    table.game.begin_step(Step::Main1).unwrap();
    let (p1, p2, p3) = (table.player(0), table.player(1), table.player(2));
    table.game.get_player_mut(p2).unwrap().lost = Some(LossReason::ZeroLife);

    assert_eq!(table.game.apnap_order().as_slice(), &[p1, p3]);
    table.game.submit_action(p1, Action::Pass).unwrap();
    assert_eq!(table.holder(), p3);
}

#[test]
fn test_stack_push_resets_the_passing_round() {
    let mut table = Table::in_main_phase();
    let (p1, p2) = (table.player(0), table.player(1));
    let m1 = table.put("Mountain", p1, Zone::Battlefield);
    let m2 = table.put("Mountain", p2, Zone::Battlefield);
    let shock = table.put("Shock", p1, Zone::Hand);
    let bolt = table.put("Lightning Bolt", p2, Zone::Hand);

    table
        .game
        .submit_action(
            p1,
            Action::CastSpell {
                card: shock,
                targets: vec![TargetRef::Player(p2)],
                mana_sources: vec![m1],
            },
        )
        .unwrap();
    assert_eq!(table.holder(), p1);
    table.game.submit_action(p1, Action::Pass).unwrap();
    assert_eq!(table.holder(), p2);
    assert!(table.game.priority.has_passed(p1));

    // Responding clears the round and priority goes back to the active player
    table
        .game
        .submit_action(
            p2,
            Action::CastSpell {
                card: bolt,
                targets: vec![TargetRef::Player(p1)],
                mana_sources: vec![m2],
            },
        )
        .unwrap();
    assert_eq!(table.holder(), p1);
    assert!(table.game.priority.passed().is_empty());

    table.pass_round();
    assert_eq!(table.game.stack.len(), 1);
    assert_eq!(table.life(p1), 17);
    assert_eq!(table.holder(), p1);

    table.pass_round();
    assert!(table.game.stack.is_empty());
    assert_eq!(table.life(p2), 18);
    assert_eq!(table.game.turn.current_step, Step::Main1);
}

#[test]
fn test_random_passes_respect_the_holder() {
    let mut table = Table::new(2);
    let players = [table.player(0), table.player(1)];
    for &p in &players {
        for _ in 0..20 {
            table.put("Forest", p, Zone::Library);
        }
    }
    table.game.start_game().unwrap();
    let mut rng = ChaCha12Rng::seed_from_u64(17);

    for _ in 0..200 {
        let actor: PlayerId = players[rng.gen_range(0..players.len())];
        let holder = table.holder();
        let step = table.game.turn.current_step;
        let apnap = table.game.apnap_order();
        let passed: Vec<PlayerId> = table.game.priority.passed().to_vec();

        let result = table.game.submit_action(actor, Action::Pass);
        if actor != holder {
            assert!(matches!(
                result.unwrap_err().as_rejection(),
                Some(ActionError::NotPriorityHolder { .. })
            ));
            assert_eq!(table.holder(), holder);
            continue;
        }
        result.unwrap();

        let start = apnap.iter().position(|&p| p == holder).unwrap();
        let expected_next = (1..apnap.len())
            .map(|offset| apnap[(start + offset) % apnap.len()])
            .find(|p| !passed.contains(p));
        match expected_next {
            Some(next) => {
                assert_eq!(table.holder(), next);
                assert_eq!(table.game.turn.current_step, step);
            }
            None => {
                // Round complete with an empty stack: the game moved on
                assert!(table.game.stack.is_empty());
                assert_eq!(table.holder(), table.game.turn.active_player);
            }
        }
    }
}

#[test]
fn test_no_actions_after_the_game_ends() {
    let mut table = Table::in_main_phase();
    let (p1, p2) = (table.player(0), table.player(1));
    table.game.get_player_mut(p2).unwrap().life = 0;
    table.game.settle().unwrap();

    assert!(table.game.is_game_over());
    assert_eq!(table.game.get_winner(), Some(p1));
    assert_eq!(table.game.priority.holder(), None);
    let err = table.game.submit_action(p1, Action::Pass).unwrap_err();
    assert_eq!(err.as_rejection(), Some(&ActionError::GameOver));
    assert!(table.game.legal_actions(p1).is_empty());
}
