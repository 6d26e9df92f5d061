//! Same seed, same game: full state snapshots must match

use mtg_rules_kernel::core::PlayerId;
use mtg_rules_kernel::game::{ActionSource, EngineConfig, GameLoop, GameState, RandomController, VerbosityLevel};
use mtg_rules_kernel::loader::{sample_deck, sample_pool, GameInitializer};
use similar_asserts::assert_eq;

fn play(seed: u64, deck1: &str, deck2: &str) -> GameState {
    let db = sample_pool();
    let d1 = sample_deck(deck1).unwrap();
    let d2 = sample_deck(deck2).unwrap();
    let config = EngineConfig::default().with_max_turns(30).with_strict_invariants(false);
    let mut game = GameInitializer::new(&db)
        .init_game("Alice", &d1, "Bob", &d2, config, seed)
        .unwrap();
    game.logger.set_verbosity(VerbosityLevel::Silent);

    let ids: Vec<PlayerId> = game.players.iter().map(|p| p.id).collect();
    let mut c1 = RandomController::with_seed(ids[0], seed ^ 0xA5A5);
    let mut c2 = RandomController::with_seed(ids[1], seed ^ 0x5A5A);
    let mut sources: Vec<&mut dyn ActionSource> = vec![&mut c1, &mut c2];
    GameLoop::new(&mut game)
        .with_invariant_checks(true)
        .run_game(&mut sources)
        .unwrap();
    game
}

#[test]
fn test_same_seed_same_game() {
    for (seed, d1, d2) in [(1, "red", "green"), (42, "black", "azorius"), (7, "red", "red")] {
        let first = serde_json::to_string_pretty(&play(seed, d1, d2)).unwrap();
        let second = serde_json::to_string_pretty(&play(seed, d1, d2)).unwrap();
        assert_eq!(first, second);
    }
}

#[test]
fn test_different_seeds_diverge() {
    let a = play(3, "red", "green");
    let b = play(4, "red", "green");
    assert_ne!(a.event_log, b.event_log);
}

#[test]
fn test_snapshot_restores_an_equivalent_game() {
    let game = play(11, "green", "black");
    let json = serde_json::to_string(&game).unwrap();
    let restored: GameState = serde_json::from_str(&json).unwrap();
    assert_eq!(serde_json::to_string(&restored).unwrap(), json);
}
