//! Match command - play games between two AI configurations
//!
//! ## Architecture
//!
//! - Level 1: run() - orchestration
//! - Level 2: build_configs(), report_results()
//! - Level 3: formatting utilities

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;

use wargrid_core::{GameResult, Heuristics, Level};
use wargrid_tournament::{play_match_with_progress, AiConfig, MatchResult, PlayerType};

use crate::{load_heuristics, resolve_seed};

// ============================================================================
// COMMAND ARGUMENTS
// ============================================================================

#[derive(Args)]
pub struct MatchArgs {
    /// Level JSON file
    #[arg(long, value_name = "FILE")]
    pub level: PathBuf,

    /// First player (minimax, random, first-valid); human players are rejected
    #[arg(long)]
    pub first: PlayerType,

    /// Second player (minimax, random, first-valid)
    #[arg(long)]
    pub second: PlayerType,

    /// Number of games to play (will alternate colors)
    #[arg(long, default_value = "10")]
    pub games: usize,

    /// Search nodes per move
    #[arg(long, default_value = "2000")]
    pub budget: u64,

    /// Deepest search iteration
    #[arg(long)]
    pub max_depth: Option<u32>,

    /// Half-moves before a game is called a draw
    #[arg(long, default_value = "100")]
    pub max_turns: u32,

    /// Heuristics JSON file
    #[arg(long, value_name = "FILE")]
    pub heuristics: Option<PathBuf>,

    /// Run games on all cores
    #[arg(long)]
    pub parallel: bool,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

/// Run match command
///
/// 1. Load the level
/// 2. Play the match (multiple games)
/// 3. Report results
pub fn run(args: MatchArgs, seed: Option<u64>) -> Result<()> {
    let level = Level::load(&args.level)?;
    let (state, counters) = level
        .to_game()
        .with_context(|| format!("Failed to set up level: {}", level.name))?;
    let heuristics = load_heuristics(args.heuristics.as_deref())?;
    let seed = resolve_seed(seed);

    let (first, second) = build_configs(&args, &heuristics, seed);

    let progress = create_progress(args.games as u64, args.json)?;
    let result = play_match_with_progress(
        &state,
        &counters,
        &first,
        &second,
        args.games,
        args.max_turns,
        args.parallel,
        |outcome| {
            progress.set_message(format!("last: {:?}", outcome.result));
            progress.inc(1);
        },
    )?;
    progress.finish_and_clear();

    report_results(&level, &first, &second, &result, args.json)
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

fn build_configs(args: &MatchArgs, heuristics: &Heuristics, seed: u64) -> (AiConfig, AiConfig) {
    let build = |player_type: PlayerType| {
        let mut config = AiConfig::of_type(player_type)
            .with_budget(args.budget)
            .with_heuristics(heuristics.clone())
            .with_seed(seed);
        config.max_depth_cap = args.max_depth;
        config
    };
    (build(args.first), build(args.second))
}

/// Report match results
fn report_results(level: &Level, first: &AiConfig, second: &AiConfig, result: &MatchResult, json: bool) -> Result<()> {
    let report = MatchReport::new(level, first, second, result);
    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_text_results(&report);
    }
    Ok(())
}

// ============================================================================
// LEVEL 3 - UTILITIES
// ============================================================================

#[derive(Serialize)]
struct GameReport {
    game_number: usize,
    /// Configuration that played Blue
    blue: String,
    result: String,
    turns: u32,
    passes: usize,
}

#[derive(Serialize)]
struct MatchReport {
    level: String,
    first: String,
    second: String,
    total_games: u32,
    first_wins: u32,
    second_wins: u32,
    draws: u32,
    avg_turns: f32,
    first_win_rate: f32,
    second_win_rate: f32,
    draw_rate: f32,
    games: Vec<GameReport>,
}

impl MatchReport {
    fn new(level: &Level, first: &AiConfig, second: &AiConfig, result: &MatchResult) -> Self {
        let games = result
            .game_outcomes
            .iter()
            .enumerate()
            .map(|(i, game)| GameReport {
                game_number: i + 1,
                blue: if game.first_was_blue { "first" } else { "second" }.to_string(),
                result: result_label(game.outcome.result).to_string(),
                turns: game.outcome.turns,
                passes: game.outcome.passes(),
            })
            .collect();

        Self {
            level: level.name.clone(),
            first: first.label(),
            second: second.label(),
            total_games: result.games_played,
            first_wins: result.first_wins,
            second_wins: result.second_wins,
            draws: result.draws,
            avg_turns: result.avg_turns,
            first_win_rate: result.first_win_rate(),
            second_win_rate: result.second_win_rate(),
            draw_rate: result.draw_rate(),
            games,
        }
    }
}

fn result_label(result: GameResult) -> &'static str {
    match result {
        GameResult::BlueWins => "blue",
        GameResult::RedWins => "red",
        GameResult::Ongoing => "draw",
    }
}

/// Progress bar on stderr (hidden for JSON output)
fn create_progress(games: u64, hidden: bool) -> Result<ProgressBar> {
    if hidden {
        return Ok(ProgressBar::hidden());
    }
    let pb = ProgressBar::new(games);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} games ({msg})")
            .context("Invalid progress bar template")?,
    );
    Ok(pb)
}

/// Print results as text
fn print_text_results(report: &MatchReport) {
    println!("\n=== Match Results: {} ===", report.level);
    println!("Total games:  {}", report.total_games);
    println!(
        "{:<12}  {} ({:.1}%)",
        report.first,
        report.first_wins,
        report.first_win_rate * 100.0
    );
    println!(
        "{:<12}  {} ({:.1}%)",
        report.second,
        report.second_wins,
        report.second_win_rate * 100.0
    );
    println!("Draws:        {} ({:.1}%)", report.draws, report.draw_rate * 100.0);
    println!("Avg turns:    {:.1}", report.avg_turns);

    println!("\nGame details:");
    for game in &report.games {
        println!(
            "  Game {}: {} as Blue, {} in {} turns",
            game.game_number, game.blue, game.result, game.turns
        );
    }
}

// ============================================================================
// TESTS
// ============================================================================
