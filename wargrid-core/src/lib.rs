//! WARGRID Core - Game engine and AI
//!
//! This crate provides the core game logic for WARGRID:
//! - Board geometry (rectangular grid, orthogonal moves)
//! - Unit types, game state and production counters
//! - Move generation, ordering and the turn engine
//! - Position evaluation
//! - Budgeted iterative-deepening alpha-beta search
//! - Level loading

pub mod board;
pub mod error;
pub mod units;
pub mod game;
pub mod moves;
pub mod turn;
pub mod eval;
pub mod search;
pub mod level;

// Re-exports for convenient access
pub use board::{Pos, DIRECTIONS, MAX_WIDTH};
pub use error::{Error, Result};
pub use units::{get_unit_type, UnitKind, UnitType, UNIT_TYPES};
pub use game::{check_win, render, GameResult, GameState, Player, TurnCounters, Unit};
pub use moves::{classify, generate_moves, is_capture_or_create, order_moves, parse_move, validate_move, Move, MoveKind};
pub use turn::{advance_turn, apply_move};
pub use eval::{evaluate, Evaluator, Heuristics};
pub use search::{
    Decision, SearchConfig, SearchContext, SearchEngine, SearchMode, SearchOutcome, SearchReport, SearchResult,
};
pub use level::Level;
