//! Play command - one game between two AI players
//!
//! - run() - orchestration
//! - build_configs(), print_turn(), print_summary()

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use wargrid_core::{render, Error, GameState, Heuristics, Level, Move, Player, TurnCounters};
use wargrid_tournament::{AiConfig, GameOutcome, GameRunner, HumanConsole, PlayerType};

use crate::{load_heuristics, resolve_seed};

// ============================================================================
// COMMAND ARGUMENTS
// ============================================================================

#[derive(Args)]
pub struct PlayArgs {
    /// Level JSON file
    #[arg(long, value_name = "FILE")]
    pub level: PathBuf,

    /// Blue player (minimax, random, first-valid, human)
    #[arg(long, default_value = "minimax")]
    pub blue: PlayerType,

    /// Red player (minimax, random, first-valid, human)
    #[arg(long, default_value = "random")]
    pub red: PlayerType,

    /// Search nodes per move
    #[arg(long, default_value = "10000")]
    pub budget: u64,

    /// Deepest search iteration
    #[arg(long)]
    pub max_depth: Option<u32>,

    /// Half-moves before the game is called a draw
    #[arg(long, default_value = "100")]
    pub max_turns: u32,

    /// Heuristics JSON file
    #[arg(long, value_name = "FILE")]
    pub heuristics: Option<PathBuf>,

    /// Only print the final result
    #[arg(long)]
    pub quiet: bool,
}

// ============================================================================
// ORCHESTRATION
// ============================================================================

/// Run play command
pub fn run(args: PlayArgs, seed: Option<u64>) -> Result<()> {
    let level = Level::load(&args.level)?;
    let (state, counters) = level
        .to_game()
        .with_context(|| format!("Failed to set up level: {}", level.name))?;
    let heuristics = load_heuristics(args.heuristics.as_deref())?;
    let seed = resolve_seed(seed);

    let (blue, red) = build_configs(&args, &heuristics, seed);
    tracing::info!("Playing {}: {} (Blue) vs {} (Red), seed {}", level.name, blue.label(), red.label(), seed);

    if !args.quiet {
        println!("{}", render(&state, counters.turn()));
    }

    let quiet = args.quiet;
    let mut runner = GameRunner::new(blue, red);
    if has_human(&args) {
        runner = runner.with_console(HumanConsole::stdio());
    }

    let played = runner.play_game_with(state, counters, args.max_turns, |state, counters, player, mv| {
        if !quiet {
            print_turn(state, counters, player, mv);
        }
    });

    match played {
        Ok(outcome) => print_summary(&level, &outcome),
        Err(Error::Abandoned { player }) => println!("{} quit the game", player),
        Err(err) => return Err(err.into()),
    }
    Ok(())
}

// ============================================================================
// STEPS
// ============================================================================

fn build_configs(args: &PlayArgs, heuristics: &Heuristics, seed: u64) -> (AiConfig, AiConfig) {
    let build = |player_type: PlayerType| {
        let mut config = AiConfig::of_type(player_type)
            .with_budget(args.budget)
            .with_heuristics(heuristics.clone())
            .with_seed(seed);
        config.max_depth_cap = args.max_depth;
        config
    };
    (build(args.blue), build(args.red))
}

fn has_human(args: &PlayArgs) -> bool {
    args.blue == PlayerType::Human || args.red == PlayerType::Human
}

fn print_turn(state: &GameState, counters: &TurnCounters, player: Player, mv: Option<Move>) {
    match mv {
        Some(mv) => println!("{} plays {}", player, mv),
        None => println!("{} has no move and passes", player),
    }
    println!("{}", render(state, counters.turn()));
}

fn print_summary(level: &Level, outcome: &GameOutcome) {
    println!("=== {} ===", level.name);
    match outcome.winner() {
        Some(winner) => println!("{} wins after {} half-moves", winner, outcome.turns),
        None => println!("Draw after {} half-moves", outcome.turns),
    }
    if outcome.passes() > 0 {
        println!("Forced passes: {}", outcome.passes());
    }
}
