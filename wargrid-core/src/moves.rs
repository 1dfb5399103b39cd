//! Moves: generation, classification, ordering and parsing

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::board::Pos;
use crate::error::{Error, Result};
use crate::game::{GameState, Player};
use crate::units::get_unit_type;

// ============================================================================
// TYPES
// ============================================================================

/// A player action. Its kind is not stored: it is read off the state the move
/// was generated from (see [`classify`]), so a move only means something
/// against that exact state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Move {
    pub from: Pos,
    pub to: Pos,
}

impl Move {
    pub const fn new(from: Pos, to: Pos) -> Self {
        Self { from, to }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.from, self.to)
    }
}

impl FromStr for Move {
    type Err = Error;

    /// Accepts `b2 b3`, `b2-b3` and `b2b3`
    fn from_str(s: &str) -> Result<Self> {
        let invalid = || Error::InvalidNotation { input: s.to_string() };
        let text = s.trim();

        let (from, to) = if let Some((a, b)) = text.split_once(|c: char| c == '-' || c.is_whitespace()) {
            (a, b)
        } else {
            // Second coordinate starts at the second letter
            let split = text
                .char_indices()
                .skip(1)
                .find(|(_, c)| c.is_ascii_alphabetic())
                .map(|(i, _)| i)
                .ok_or_else(invalid)?;
            text.split_at(split)
        };

        let from = Pos::parse(from).ok_or_else(invalid)?;
        let to = Pos::parse(to.trim_start_matches('-')).ok_or_else(invalid)?;
        Ok(Move::new(from, to))
    }
}

/// What a move does on the state it was generated from
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MoveKind {
    /// Unit steps onto an empty cell
    Relocate,
    /// Unit lands on an opposing unit and removes it
    Capture,
    /// Factory places a new unit on an adjacent empty cell
    Create,
}

// ============================================================================
// MOVE GENERATION
// ============================================================================

/// All legal moves for `player`, scanning units in row-major order.
/// An empty list is a forced pass, not an error.
pub fn generate_moves(state: &GameState, player: Player) -> Vec<Move> {
    let mut moves = Vec::new();

    for (pos, unit) in state.units() {
        if unit.owner != player {
            continue;
        }

        let ut = get_unit_type(unit.kind);
        if ut.is_mobile() {
            generate_unit_moves(state, pos, player, ut.move_range, &mut moves);
        }
        if ut.is_producer {
            generate_create_moves(state, pos, &mut moves);
        }
    }

    moves
}

fn generate_unit_moves(state: &GameState, pos: Pos, player: Player, range: u8, moves: &mut Vec<Move>) {
    for direction in 0..4 {
        for distance in 1..=range {
            let Some(dest) = pos.offset(direction, distance, state.width(), state.height()) else {
                break;
            };

            match state.get(dest) {
                None => moves.push(Move::new(pos, dest)),
                Some(occupant) => {
                    if occupant.owner != player {
                        moves.push(Move::new(pos, dest));
                    }
                    break; // Blocked
                }
            }
        }
    }
}

fn generate_create_moves(state: &GameState, pos: Pos, moves: &mut Vec<Move>) {
    for direction in 0..4 {
        if let Some(dest) = pos.offset(direction, 1, state.width(), state.height()) {
            if state.get(dest).is_none() {
                moves.push(Move::new(pos, dest));
            }
        }
    }
}

// ============================================================================
// CLASSIFICATION
// ============================================================================

/// Kind of `mv` on `state`. `mv` must come from `generate_moves(state, _)`.
pub fn classify(state: &GameState, mv: &Move) -> MoveKind {
    let source_is_producer = state.get(mv.from).map(|u| u.is_producer()).unwrap_or(false);
    if source_is_producer {
        return MoveKind::Create;
    }

    if state.get(mv.to).is_some() {
        MoveKind::Capture
    } else {
        MoveKind::Relocate
    }
}

/// True for moves likely to swing the evaluation (captures and creations)
pub fn is_capture_or_create(state: &GameState, mv: &Move) -> bool {
    !matches!(classify(state, mv), MoveKind::Relocate)
}

// ============================================================================
// MOVE ORDERING
// ============================================================================

/// Stable partition: captures and creations first, each class keeping its
/// original relative order
pub fn order_moves(state: &GameState, moves: Vec<Move>) -> Vec<Move> {
    let (mut ordered, quiet): (Vec<Move>, Vec<Move>) =
        moves.into_iter().partition(|mv| is_capture_or_create(state, mv));
    ordered.extend(quiet);
    ordered
}

// ============================================================================
// VALIDATION
// ============================================================================

/// Accept `mv` only if the generator would produce it for `player` here
pub fn validate_move(state: &GameState, player: Player, mv: Move) -> Result<Move> {
    if generate_moves(state, player).contains(&mv) {
        Ok(mv)
    } else {
        Err(Error::IllegalMove { mv, player })
    }
}

/// Parse and validate human input in one step
pub fn parse_move(state: &GameState, player: Player, input: &str) -> Result<Move> {
    let mv: Move = input.parse()?;
    validate_move(state, player, mv)
}

// ============================================================================
// TESTS
// ============================================================================
