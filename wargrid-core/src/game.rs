//! Game state, production counters and the win condition

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::board::{column_letter, Pos, MAX_WIDTH};
use crate::error::{Error, Result};
use crate::units::{get_unit_type, UnitKind};

// ============================================================================
// CORE TYPES
// ============================================================================

/// Player side. Blue moves first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Player {
    Blue,
    Red,
}

impl Player {
    pub fn opponent(self) -> Self {
        match self {
            Player::Blue => Player::Red,
            Player::Red => Player::Blue,
        }
    }

    /// +1 for Blue, -1 for Red
    pub fn sign(self) -> i8 {
        match self {
            Player::Blue => 1,
            Player::Red => -1,
        }
    }

    pub fn from_sign(sign: i8) -> Option<Self> {
        match sign.signum() {
            1 => Some(Player::Blue),
            -1 => Some(Player::Red),
            _ => None,
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Player::Blue => write!(f, "Blue"),
            Player::Red => write!(f, "Red"),
        }
    }
}

impl FromStr for Player {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "blue" | "1" | "+1" => Ok(Player::Blue),
            "red" | "-1" | "2" => Ok(Player::Red),
            other => Err(Error::InvalidConfiguration {
                message: format!("unknown player '{}'", other),
            }),
        }
    }
}

/// Game result
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameResult {
    Ongoing,
    BlueWins,
    RedWins,
}

impl GameResult {
    pub fn winner(self) -> Option<Player> {
        match self {
            GameResult::Ongoing => None,
            GameResult::BlueWins => Some(Player::Blue),
            GameResult::RedWins => Some(Player::Red),
        }
    }
}

/// A unit on the board
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Unit {
    pub owner: Player,
    pub kind: UnitKind,
}

impl Unit {
    pub const fn new(owner: Player, kind: UnitKind) -> Self {
        Self { owner, kind }
    }

    /// Board symbol: upper case for Blue, lower case for Red
    pub fn symbol(&self) -> char {
        let symbol = get_unit_type(self.kind).symbol;
        match self.owner {
            Player::Blue => symbol,
            Player::Red => symbol.to_ascii_lowercase(),
        }
    }

    pub fn is_producer(&self) -> bool {
        get_unit_type(self.kind).is_producer
    }
}

// ============================================================================
// GAME STATE
// ============================================================================

/// Board snapshot.
///
/// Cells live behind an `Arc`: cloning is cheap and the first write on a
/// clone copies the grid, so a state handed to the search is never observed
/// changing by anyone else holding it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GameState {
    width: usize,
    height: usize,
    cells: Arc<Vec<Option<Unit>>>,
}

impl GameState {
    // ========================================================================
    // CONSTRUCTORS
    // ========================================================================

    /// Empty `width x height` board
    pub fn empty(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: Arc::new(vec![None; width * height]),
        }
    }

    /// Board with the given placements. Rejects positions off the board and
    /// cells claimed twice.
    pub fn from_units(width: usize, height: usize, units: &[(Pos, Unit)]) -> Result<Self> {
        if width == 0 || height == 0 || width > MAX_WIDTH || height > u8::MAX as usize {
            return Err(Error::InvalidConfiguration {
                message: format!("unsupported board size {}x{}", width, height),
            });
        }

        let mut state = Self::empty(width, height);
        for &(pos, unit) in units {
            if !state.contains(pos) {
                return Err(Error::OutOfBounds { pos, width, height });
            }
            if state.get(pos).is_some() {
                return Err(Error::InvalidConfiguration {
                    message: format!("two units placed on {}", pos),
                });
            }
            state.set(pos, Some(unit));
        }

        Ok(state)
    }

    // ========================================================================
    // ACCESSORS
    // ========================================================================

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn contains(&self, pos: Pos) -> bool {
        (pos.row as usize) < self.height && (pos.col as usize) < self.width
    }

    /// Unit at a cell (`None` for empty or off-board cells)
    pub fn get(&self, pos: Pos) -> Option<Unit> {
        if !self.contains(pos) {
            return None;
        }
        self.cells[self.index(pos)]
    }

    /// Iterate units in row-major order
    pub fn units(&self) -> impl Iterator<Item = (Pos, Unit)> + '_ {
        let width = self.width;
        self.cells.iter().enumerate().filter_map(move |(i, cell)| {
            cell.map(|unit| (Pos::new((i / width) as u8, (i % width) as u8), unit))
        })
    }

    /// Number of units owned by a player
    pub fn unit_count(&self, player: Player) -> usize {
        self.cells.iter().flatten().filter(|u| u.owner == player).count()
    }

    // ========================================================================
    // MUTATION (crate-internal, copy-on-write)
    // ========================================================================

    pub(crate) fn set(&mut self, pos: Pos, cell: Option<Unit>) {
        let idx = self.index(pos);
        Arc::make_mut(&mut self.cells)[idx] = cell;
    }

    pub(crate) fn take(&mut self, pos: Pos) -> Option<Unit> {
        let idx = self.index(pos);
        Arc::make_mut(&mut self.cells)[idx].take()
    }

    fn index(&self, pos: Pos) -> usize {
        pos.row as usize * self.width + pos.col as usize
    }
}

// ============================================================================
// TURN COUNTERS
// ============================================================================

/// Production countdowns (one slot per cell, meaningful where a factory
/// stands) and the global turn index
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TurnCounters {
    width: usize,
    remaining: Arc<Vec<u8>>,
    interval: u8,
    turn: u32,
}

impl TurnCounters {
    /// Counters for every factory on `state`, each starting a full interval away
    pub fn new(state: &GameState, interval: u8) -> Self {
        Self::with_initial(state, interval, interval)
    }

    /// Counters starting at `initial` (clamped to the interval)
    pub fn with_initial(state: &GameState, interval: u8, initial: u8) -> Self {
        let mut remaining = vec![0u8; state.width * state.height];
        for (pos, unit) in state.units() {
            if unit.is_producer() {
                remaining[state.index(pos)] = initial.min(interval);
            }
        }

        Self {
            width: state.width,
            remaining: Arc::new(remaining),
            interval,
            turn: 0,
        }
    }

    /// Turns left before the site at `pos` produces
    pub fn remaining(&self, pos: Pos) -> u8 {
        let idx = self.index(pos);
        self.remaining.get(idx).copied().unwrap_or(0)
    }

    /// Value a counter resets to after production
    pub fn interval(&self) -> u8 {
        self.interval
    }

    /// Number of half-moves advanced so far
    pub fn turn(&self) -> u32 {
        self.turn
    }

    pub(crate) fn set_remaining(&mut self, pos: Pos, value: u8) {
        let idx = self.index(pos);
        Arc::make_mut(&mut self.remaining)[idx] = value;
    }

    pub(crate) fn reset(&mut self, pos: Pos) {
        let interval = self.interval;
        self.set_remaining(pos, interval);
    }

    pub(crate) fn tick(&mut self) {
        self.turn += 1;
    }

    fn index(&self, pos: Pos) -> usize {
        pos.row as usize * self.width + pos.col as usize
    }
}

// ============================================================================
// WIN CONDITION
// ============================================================================

/// A side wins once the opponent has no units left on the board.
/// Never reports two winners: a board with both sides empty is `Ongoing`.
pub fn check_win(state: &GameState) -> GameResult {
    let blue = state.unit_count(Player::Blue);
    let red = state.unit_count(Player::Red);

    match (blue, red) {
        (0, 0) => GameResult::Ongoing,
        (_, 0) => GameResult::BlueWins,
        (0, _) => GameResult::RedWins,
        _ => GameResult::Ongoing,
    }
}

// ============================================================================
// RENDERING
// ============================================================================

/// ASCII picture of the board with a turn header
pub fn render(state: &GameState, turn: u32) -> String {
    format!("Turn {}\n{}", turn, state)
}

impl fmt::Display for GameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "    ")?;
        for col in 0..self.width {
            write!(f, " {}", column_letter(col as u8))?;
        }
        writeln!(f)?;

        for row in 0..self.height {
            write!(f, "{:>4}", row + 1)?;
            for col in 0..self.width {
                let symbol = self
                    .get(Pos::new(row as u8, col as u8))
                    .map(|u| u.symbol())
                    .unwrap_or('.');
                write!(f, " {}", symbol)?;
            }
            writeln!(f)?;
        }

        Ok(())
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn soldier(owner: Player) -> Unit {
        Unit::new(owner, UnitKind::Soldier)
    }

    fn simple_game() -> GameState {
        GameState::from_units(
            4,
            3,
            &[
                (Pos::new(0, 0), Unit::new(Player::Blue, UnitKind::Factory)),
                (Pos::new(1, 1), soldier(Player::Blue)),
                (Pos::new(2, 3), Unit::new(Player::Red, UnitKind::Tank)),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_player_sign() {
        assert_eq!(Player::Blue.sign(), 1);
        assert_eq!(Player::Red.sign(), -1);
        assert_eq!(Player::from_sign(-3), Some(Player::Red));
        assert_eq!(Player::from_sign(0), None);
        assert_eq!(Player::Blue.opponent(), Player::Red);
    }

    #[test]
    fn test_player_from_str() {
        assert_eq!("blue".parse::<Player>().unwrap(), Player::Blue);
        assert_eq!("RED".parse::<Player>().unwrap(), Player::Red);
        assert!("green".parse::<Player>().is_err());
    }

    #[test]
    fn test_from_units_rejects_overlap() {
        let result = GameState::from_units(
            3,
            3,
            &[
                (Pos::new(1, 1), soldier(Player::Blue)),
                (Pos::new(1, 1), soldier(Player::Red)),
            ],
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_from_units_rejects_out_of_bounds() {
        let result = GameState::from_units(3, 3, &[(Pos::new(3, 0), soldier(Player::Blue))]);
        assert!(matches!(result, Err(Error::OutOfBounds { .. })));
    }

    #[test]
    fn test_units_row_major() {
        let game = simple_game();
        let positions: Vec<Pos> = game.units().map(|(p, _)| p).collect();
        assert_eq!(positions, vec![Pos::new(0, 0), Pos::new(1, 1), Pos::new(2, 3)]);
        assert_eq!(game.unit_count(Player::Blue), 2);
        assert_eq!(game.unit_count(Player::Red), 1);
    }

    #[test]
    fn test_clone_is_isolated() {
        let game = simple_game();
        let mut child = game.clone();
        child.take(Pos::new(1, 1));
        assert!(game.get(Pos::new(1, 1)).is_some());
        assert!(child.get(Pos::new(1, 1)).is_none());
    }

    #[test]
    fn test_counters_start_at_interval() {
        let game = simple_game();
        let counters = TurnCounters::new(&game, 4);
        assert_eq!(counters.remaining(Pos::new(0, 0)), 4);
        assert_eq!(counters.remaining(Pos::new(1, 1)), 0);
        assert_eq!(counters.turn(), 0);

        let early = TurnCounters::with_initial(&game, 4, 9);
        assert_eq!(early.remaining(Pos::new(0, 0)), 4);
    }

    #[test]
    fn test_check_win() {
        assert_eq!(check_win(&simple_game()), GameResult::Ongoing);

        let blue_only = GameState::from_units(2, 2, &[(Pos::new(0, 0), soldier(Player::Blue))]).unwrap();
        assert_eq!(check_win(&blue_only), GameResult::BlueWins);

        let red_only = GameState::from_units(2, 2, &[(Pos::new(0, 0), soldier(Player::Red))]).unwrap();
        assert_eq!(check_win(&red_only), GameResult::RedWins);

        assert_eq!(check_win(&GameState::empty(2, 2)), GameResult::Ongoing);
    }

    #[test]
    fn test_render() {
        let text = render(&simple_game(), 7);
        assert!(text.starts_with("Turn 7\n"));
        assert!(text.contains("F . . ."));
        assert!(text.contains(". . . t"));
    }
}
