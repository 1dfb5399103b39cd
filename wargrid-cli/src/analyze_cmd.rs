//! Analyze command - one search on a level's starting position

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use wargrid_core::search::SearchMode;
use wargrid_core::{render, Decision, Level, Player, SearchConfig, SearchEngine, SearchReport, SearchResult};

use crate::{load_heuristics, resolve_seed};

#[derive(Args)]
pub struct AnalyzeArgs {
    /// Level JSON file
    #[arg(long, value_name = "FILE")]
    pub level: PathBuf,

    /// Side to move (blue, red)
    #[arg(long, default_value = "blue")]
    pub player: Player,

    /// What to compute (policy, value)
    #[arg(long, default_value = "policy")]
    pub mode: SearchMode,

    /// Search node budget
    #[arg(long, default_value = "10000")]
    pub budget: u64,

    /// Deepest search iteration
    #[arg(long)]
    pub max_depth: Option<u32>,

    /// Heuristics JSON file
    #[arg(long, value_name = "FILE")]
    pub heuristics: Option<PathBuf>,
}

/// Run analyze command
pub fn run(args: AnalyzeArgs, seed: Option<u64>) -> Result<()> {
    let level = Level::load(&args.level)?;
    let (state, counters) = level
        .to_game()
        .with_context(|| format!("Failed to set up level: {}", level.name))?;
    let heuristics = load_heuristics(args.heuristics.as_deref())?;

    let config = search_config(&args, resolve_seed(seed));
    let mut engine = SearchEngine::new(config, heuristics);

    println!("{}", render(&state, counters.turn()));

    match engine.run(&state, &counters, args.player)? {
        SearchResult::Policy(report) => print_report(args.player, &report),
        SearchResult::Value(value) => println!("{} value: {}", args.player, format_utility(value)),
    }

    Ok(())
}

fn search_config(args: &AnalyzeArgs, seed: u64) -> SearchConfig {
    let mut config = match args.mode {
        SearchMode::Policy => SearchConfig::policy(args.budget),
        SearchMode::Value => SearchConfig::value(args.budget),
    }
    .with_seed(seed);
    config.max_depth_cap = args.max_depth;
    config
}

fn print_report(player: Player, report: &SearchReport) {
    match report.decision {
        Decision::Move(mv) => println!("{} plays {}", player, mv),
        Decision::NoMoveAvailable => println!("{} has no legal move", player),
    }
    if let Some(utility) = report.utility {
        println!("Utility:         {}", format_utility(utility));
    }
    if let Some(depth) = report.completed_depth {
        println!("Completed depth: {}", depth);
    }
    println!("Nodes used:      {}", report.nodes_used);
    if report.random_fallback {
        println!("(budget too small for a full iteration: random move)");
    }
}

fn format_utility(value: f32) -> String {
    if value == f32::INFINITY {
        "win".to_string()
    } else if value == f32::NEG_INFINITY {
        "loss".to_string()
    } else {
        format!("{:.3}", value)
    }
}
