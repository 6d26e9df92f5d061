//! Soak testing: many seeded random games run in parallel
//!
//! Every game is built from the sample pool, played by random action sources
//! with state invariants checked after each action, and fully determined by
//! its seed. A failing game can be replayed alone from the seed reported.

use crate::core::PlayerId;
use crate::game::{ActionSource, EngineConfig, GameEndReason, GameLoop, RandomController, VerbosityLevel};
use crate::loader::{sample_deck, sample_pool, CardDatabase, DeckList, GameInitializer, SAMPLE_DECKS};
use crate::{MtgError, Result};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha12Rng;
use rayon::prelude::*;

#[derive(Debug, Clone)]
pub struct SoakConfig {
    pub games: usize,
    pub seed: u64,
    pub players: usize,
    /// Sample deck names to draw from; empty means all of them
    pub decks: Vec<String>,
    pub engine: EngineConfig,
}

impl Default for SoakConfig {
    fn default() -> Self {
        SoakConfig {
            games: 100,
            seed: 0,
            players: 2,
            decks: Vec::new(),
            engine: EngineConfig::default().with_strict_invariants(false),
        }
    }
}

/// Outcome of one soak game
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameSummary {
    pub index: usize,
    pub seed: u64,
    pub decks: Vec<String>,
    /// Seat index of the winner
    pub winner: Option<usize>,
    pub end_reason: GameEndReason,
    pub turns: u32,
    pub rejected_actions: u32,
}

#[derive(Debug, Clone)]
pub struct SoakFailure {
    pub index: usize,
    pub seed: u64,
    pub error: String,
}

#[derive(Debug, Clone, Default)]
pub struct SoakReport {
    pub games: Vec<GameSummary>,
    pub failures: Vec<SoakFailure>,
}

impl SoakReport {
    pub fn wins_by_seat(&self, players: usize) -> Vec<usize> {
        let mut wins = vec![0; players];
        for seat in self.games.iter().filter_map(|g| g.winner) {
            if let Some(w) = wins.get_mut(seat) {
                *w += 1;
            }
        }
        wins
    }

    pub fn draws(&self) -> usize {
        self.games
            .iter()
            .filter(|g| g.end_reason == GameEndReason::Draw)
            .count()
    }

    pub fn turn_limits(&self) -> usize {
        self.games
            .iter()
            .filter(|g| g.end_reason == GameEndReason::TurnLimit)
            .count()
    }

    pub fn average_turns(&self) -> f64 {
        if self.games.is_empty() {
            return 0.0;
        }
        let total: u64 = self.games.iter().map(|g| u64::from(g.turns)).sum();
        total as f64 / self.games.len() as f64
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Seed of game `index` in a soak run seeded with `seed`
pub fn game_seed(seed: u64, index: usize) -> u64 {
    seed.wrapping_add((index as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15))
}

fn resolve_decks(names: &[String]) -> Result<Vec<(String, DeckList)>> {
    let names: Vec<String> = if names.is_empty() {
        SAMPLE_DECKS.iter().map(|s| s.to_string()).collect()
    } else {
        names.to_vec()
    };
    names
        .into_iter()
        .map(|name| {
            let deck = sample_deck(&name)
                .ok_or_else(|| MtgError::InvalidDeckFormat(format!("no sample deck named {name:?}")))?;
            Ok((name, deck))
        })
        .collect()
}

/// Play a single soak game
pub fn play_game(
    db: &CardDatabase,
    decks: &[(String, DeckList)],
    players: usize,
    engine: &EngineConfig,
    index: usize,
    seed: u64,
) -> Result<GameSummary> {
    let mut rng = ChaCha12Rng::seed_from_u64(seed);
    let chosen: Vec<&(String, DeckList)> = (0..players)
        .map(|_| &decks[rng.gen_range(0..decks.len())])
        .collect();
    let names: Vec<String> = (1..=players).map(|i| format!("Player {i}")).collect();
    let seats: Vec<(&str, &DeckList)> = names
        .iter()
        .zip(&chosen)
        .map(|(name, (_, deck))| (name.as_str(), deck))
        .collect();

    let mut game = GameInitializer::new(db).init_multiplayer(&seats, engine.clone(), seed)?;
    game.logger.set_verbosity(VerbosityLevel::Silent);

    let ids: Vec<PlayerId> = game.players.iter().map(|p| p.id).collect();
    let mut controllers: Vec<RandomController> = ids
        .iter()
        .map(|&id| RandomController::with_seed(id, rng.gen()))
        .collect();
    let mut sources: Vec<&mut dyn ActionSource> = controllers
        .iter_mut()
        .map(|c| c as &mut dyn ActionSource)
        .collect();

    let result = GameLoop::new(&mut game)
        .with_invariant_checks(true)
        .run_game(&mut sources)?;

    Ok(GameSummary {
        index,
        seed,
        decks: chosen.iter().map(|(name, _)| name.clone()).collect(),
        winner: result.winner.and_then(|w| ids.iter().position(|&id| id == w)),
        end_reason: result.end_reason,
        turns: result.turns_played,
        rejected_actions: result.rejected_actions,
    })
}

/// Run a soak in parallel; the report is ordered by game index
pub fn run_soak(config: &SoakConfig) -> Result<SoakReport> {
    if config.players < 2 {
        return Err(MtgError::InvalidAction(format!(
            "a game needs at least 2 players, got {}",
            config.players
        )));
    }
    let db = sample_pool();
    let decks = resolve_decks(&config.decks)?;

    let results: Vec<(usize, u64, Result<GameSummary>)> = (0..config.games)
        .into_par_iter()
        .map(|index| {
            let seed = game_seed(config.seed, index);
            let result = play_game(&db, &decks, config.players, &config.engine, index, seed);
            (index, seed, result)
        })
        .collect();

    let mut report = SoakReport::default();
    for (index, seed, result) in results {
        match result {
            Ok(summary) => report.games.push(summary),
            Err(err) => report.failures.push(SoakFailure {
                index,
                seed,
                error: err.to_string(),
            }),
        }
    }
    Ok(report)
}
