//! WARGRID CLI - Command-line interface
//!
//! Commands:
//! - play: Play a single game, printing the board every half-move
//! - match: Play a series of games between two AI configurations
//! - analyze: Run the search engine once on a level's starting position

mod analyze_cmd;
mod match_cmd;
mod play_cmd;

use std::path::Path;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing_subscriber::EnvFilter;

use wargrid_core::Heuristics;

#[derive(Parser)]
#[command(name = "wargrid")]
#[command(about = "WARGRID turn-based grid strategy engine")]
struct Cli {
    /// Random seed for reproducible runs
    #[arg(long, global = true)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a single game
    Play(play_cmd::PlayArgs),
    /// Play a match between two AI configurations
    Match(match_cmd::MatchArgs),
    /// Search a level's starting position once
    Analyze(analyze_cmd::AnalyzeArgs),
}

fn main() -> Result<()> {
    // Initialize logging (RUST_LOG overrides)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Play(args) => play_cmd::run(args, cli.seed),
        Commands::Match(args) => match_cmd::run(args, cli.seed),
        Commands::Analyze(args) => analyze_cmd::run(args, cli.seed),
    }
}

// ============================================================================
// SHARED UTILITIES
// ============================================================================

/// Create RNG from seed or random
pub(crate) fn create_rng(seed: Option<u64>) -> ChaCha8Rng {
    match seed {
        Some(s) => ChaCha8Rng::seed_from_u64(s),
        None => ChaCha8Rng::from_entropy(),
    }
}

/// Base seed for engines and games
pub(crate) fn resolve_seed(seed: Option<u64>) -> u64 {
    seed.unwrap_or_else(|| create_rng(None).gen())
}

/// Heuristics from a JSON file, or the built-in defaults
pub(crate) fn load_heuristics(path: Option<&Path>) -> Result<Heuristics> {
    match path {
        Some(path) => Heuristics::load(path).with_context(|| format!("Failed to load heuristics: {}", path.display())),
        None => Ok(Heuristics::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_rng_deterministic() {
        let mut rng1 = create_rng(Some(42));
        let mut rng2 = create_rng(Some(42));
        assert_eq!(rng1.gen::<u64>(), rng2.gen::<u64>());
    }

    #[test]
    fn test_resolve_seed_keeps_explicit_seed() {
        assert_eq!(resolve_seed(Some(9)), 9);
    }

    #[test]
    fn test_default_heuristics_without_file() {
        assert_eq!(load_heuristics(None).unwrap(), Heuristics::default());
    }

    #[test]
    fn test_cli_parses_subcommands() {
        let cli = Cli::try_parse_from(["wargrid", "--seed", "3", "analyze", "--level", "levels/duel.json"]).unwrap();
        assert_eq!(cli.seed, Some(3));
        assert!(matches!(cli.command, Commands::Analyze(_)));

        assert!(Cli::try_parse_from(["wargrid", "play", "--level", "x.json", "--blue", "nobody"]).is_err());
    }
}
