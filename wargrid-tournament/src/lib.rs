//! WARGRID Tournament - AI-vs-AI game playing
//!
//! This crate drives whole games on top of the core engine:
//! - Player configurations (search, random, first-valid, human)
//! - A line-based console for human players
//! - Single games with forced passes and a turn limit
//! - Match play with alternating colours, optionally in parallel

mod config;
mod game_runner;
mod human;
mod match_play;

pub use config::{AiConfig, PlayerType};
pub use game_runner::{GameOutcome, GameRunner};
pub use human::HumanConsole;
pub use match_play::{play_match, play_match_parallel, play_match_with_progress, MatchGame, MatchResult};
