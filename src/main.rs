//! mtg-kernel command line
//!
//! `play` runs one game between built-in action sources, `soak` runs many
//! seeded random games in parallel and `cards` lists the sample pool.

use anyhow::{bail, Context};
use clap::{Parser, Subcommand, ValueEnum};
use mtg_rules_kernel::game::{
    ActionSource, EngineConfig, GameEndReason, GameLoop, OutputFormat, RandomController, VerbosityLevel,
    ZeroController,
};
use mtg_rules_kernel::loader::{sample_deck, sample_pool, CardDatabase, DeckList, DeckLoader, GameInitializer};
use mtg_rules_kernel::soak::{run_soak, SoakConfig};
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Action source type for a seat
#[derive(Debug, Clone, Copy, ValueEnum)]
enum ControllerType {
    /// Always chooses the first non-pass action
    Zero,
    /// Makes random choices
    Random,
}

/// Verbosity level for game output (accepts names and numbers)
#[derive(Debug, Clone, Copy)]
struct VerbosityArg(VerbosityLevel);

impl std::str::FromStr for VerbosityArg {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "silent" | "0" => Ok(VerbosityArg(VerbosityLevel::Silent)),
            "minimal" | "1" => Ok(VerbosityArg(VerbosityLevel::Minimal)),
            "normal" | "2" => Ok(VerbosityArg(VerbosityLevel::Normal)),
            "verbose" | "3" => Ok(VerbosityArg(VerbosityLevel::Verbose)),
            _ => Err(format!(
                "invalid verbosity level '{s}' (expected: silent/0, minimal/1, normal/2, verbose/3)"
            )),
        }
    }
}

/// Engine settings shared by `play` and `soak`
#[derive(clap::Args, Debug)]
struct EngineArgs {
    /// JSON engine configuration; flags below override its fields
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    #[arg(long)]
    starting_life: Option<i32>,

    #[arg(long)]
    max_turns: Option<u32>,

    #[arg(long)]
    max_hand_size: Option<usize>,

    /// Poison counters at which a player loses
    #[arg(long)]
    poison_threshold: Option<u32>,
}

impl EngineArgs {
    fn resolve(&self) -> anyhow::Result<EngineConfig> {
        let mut config = match &self.config {
            Some(path) => EngineConfig::from_json_file(path)
                .with_context(|| format!("reading engine config {}", path.display()))?,
            None => EngineConfig::default(),
        };
        if let Some(life) = self.starting_life {
            config = config.with_starting_life(life);
        }
        if let Some(turns) = self.max_turns {
            config.max_turns = turns;
        }
        if let Some(size) = self.max_hand_size {
            config = config.with_max_hand_size(size);
        }
        if let Some(threshold) = self.poison_threshold {
            config = config.with_poison_threshold(threshold);
        }
        Ok(config)
    }
}

#[derive(Parser)]
#[command(name = "mtg-kernel")]
#[command(about = "MTG rules kernel - deterministic Magic: The Gathering rules engine", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play one game and print its log
    Play {
        /// Sample deck name or deck list file for player 1
        #[arg(long, default_value = "red")]
        deck1: String,

        /// Sample deck name or deck list file for player 2
        #[arg(long, default_value = "green")]
        deck2: String,

        #[arg(long, value_enum, default_value = "random")]
        p1: ControllerType,

        #[arg(long, value_enum, default_value = "random")]
        p2: ControllerType,

        #[arg(long, default_value = "Player 1")]
        p1_name: String,

        #[arg(long, default_value = "Player 2")]
        p2_name: String,

        /// Extra card definitions (JSON array) added to the sample pool
        #[arg(long, value_name = "FILE")]
        cards: Option<PathBuf>,

        /// Seed for shuffling and random action sources
        #[arg(long, default_value_t = 0)]
        seed: u64,

        /// Verbosity level for game output (0=silent, 1=minimal, 2=normal, 3=verbose)
        #[arg(long, default_value = "normal", short = 'v')]
        verbosity: VerbosityArg,

        /// Print one JSON object per event instead of text
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        engine: EngineArgs,
    },

    /// Run many random games in parallel, checking invariants after every action
    Soak {
        #[arg(long, default_value_t = 1000)]
        games: usize,

        #[arg(long, default_value_t = 0)]
        seed: u64,

        #[arg(long, default_value_t = 2)]
        players: usize,

        /// Sample deck to draw from (repeatable; default all)
        #[arg(long = "deck")]
        decks: Vec<String>,

        #[command(flatten)]
        engine: EngineArgs,
    },

    /// List the sample card pool
    Cards {
        /// Print full definitions as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Play {
            deck1,
            deck2,
            p1,
            p2,
            p1_name,
            p2_name,
            cards,
            seed,
            verbosity,
            json,
            engine,
        } => {
            let config = engine.resolve()?;
            let mut db = sample_pool();
            if let Some(path) = cards {
                let extra = CardDatabase::load_from_file(&path)
                    .with_context(|| format!("loading cards from {}", path.display()))?;
                db.extend(extra);
            }
            let deck1 = resolve_deck(&deck1)?;
            let deck2 = resolve_deck(&deck2)?;
            run_play(&db, (&p1_name, &deck1, p1), (&p2_name, &deck2, p2), config, seed, verbosity.0, json)
        }
        Commands::Soak {
            games,
            seed,
            players,
            decks,
            engine,
        } => {
            let config = SoakConfig {
                games,
                seed,
                players,
                decks,
                engine: engine.resolve()?.with_strict_invariants(false),
            };
            run_soak_command(&config)
        }
        Commands::Cards { json } => {
            let db = sample_pool();
            if json {
                println!("{}", db.to_json()?);
            } else {
                for name in db.names() {
                    println!("{name}");
                }
            }
            Ok(())
        }
    }
}

/// A sample deck name, or else a path to a deck list
fn resolve_deck(arg: &str) -> anyhow::Result<DeckList> {
    if let Some(deck) = sample_deck(arg) {
        return Ok(deck);
    }
    let path = Path::new(arg);
    if !path.exists() {
        bail!("{arg:?} is neither a sample deck nor a deck file");
    }
    DeckLoader::load_from_file(path).with_context(|| format!("loading deck {}", path.display()))
}

fn make_source(kind: ControllerType, player: mtg_rules_kernel::core::PlayerId, seed: u64) -> Box<dyn ActionSource> {
    match kind {
        ControllerType::Zero => Box::new(ZeroController::new(player)),
        ControllerType::Random => Box::new(RandomController::with_seed(player, seed)),
    }
}

fn run_play(
    db: &CardDatabase,
    seat1: (&str, &DeckList, ControllerType),
    seat2: (&str, &DeckList, ControllerType),
    config: EngineConfig,
    seed: u64,
    verbosity: VerbosityLevel,
    json: bool,
) -> anyhow::Result<()> {
    let mut game = GameInitializer::new(db).init_game(seat1.0, seat1.1, seat2.0, seat2.1, config, seed)?;
    game.logger.set_verbosity(verbosity);
    if json {
        game.logger.set_output_format(OutputFormat::Json);
    }

    let (p1, p2) = (game.players[0].id, game.players[1].id);
    let mut source1 = make_source(seat1.2, p1, seed.wrapping_add(0x1234_5678_9ABC_DEF0));
    let mut source2 = make_source(seat2.2, p2, seed.wrapping_add(0xFEDC_BA98_7654_3210));

    let start = Instant::now();
    let result = GameLoop::new(&mut game).run_game(&mut [source1.as_mut(), source2.as_mut()])?;
    let elapsed = start.elapsed();

    if verbosity >= VerbosityLevel::Minimal && !json {
        println!("\n=== Game Over ===");
        match result.winner {
            Some(winner) => {
                let name = game.get_player(winner).map(|p| p.name.to_string())?;
                println!("Winner: {name}");
            }
            None => println!("No winner"),
        }
        let reason = match result.end_reason {
            GameEndReason::PlayerDeath(_) => "life total reached 0",
            GameEndReason::Decking(_) => "drew from an empty library",
            GameEndReason::Poison(_) => "poison",
            GameEndReason::Draw => "draw",
            GameEndReason::TurnLimit => "turn limit reached",
        };
        println!("Reason: {reason}");
        println!("Turns played: {}", result.turns_played);
        if result.rejected_actions > 0 {
            println!("Rejected actions: {}", result.rejected_actions);
        }
        for player in &game.players {
            println!("  {}: {} life, {} poison", player.name, player.life, player.poison);
        }
        eprintln!("(Game time: {:.2}ms)", elapsed.as_secs_f64() * 1000.0);
    }
    Ok(())
}

fn run_soak_command(config: &SoakConfig) -> anyhow::Result<()> {
    println!("=== MTG rules kernel - Soak ===");
    println!("Games: {}, players: {}, seed: {}\n", config.games, config.players, config.seed);

    let start = Instant::now();
    let report = run_soak(config)?;
    let elapsed = start.elapsed();

    let played = report.games.len();
    println!("Completed {played} games in {:.2}s", elapsed.as_secs_f64());
    if played > 0 {
        println!("  {:.1} games/sec", played as f64 / elapsed.as_secs_f64().max(f64::EPSILON));
    }
    for (seat, wins) in report.wins_by_seat(config.players).iter().enumerate() {
        println!("  Seat {} wins: {wins}", seat + 1);
    }
    println!("  Draws: {}", report.draws());
    println!("  Turn limit: {}", report.turn_limits());
    println!("  Average turns: {:.1}", report.average_turns());

    if !report.is_clean() {
        for failure in &report.failures {
            eprintln!("FAILED game {} (seed {}): {}", failure.index, failure.seed, failure.error);
        }
        bail!("{} of {} games failed", report.failures.len(), config.games);
    }
    Ok(())
}
