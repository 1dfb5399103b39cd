//! Grid geometry with row/column coordinates

use serde::{Deserialize, Serialize};
use std::fmt;

/// Widest grid the column-letter notation can address (a..z)
pub const MAX_WIDTH: usize = 26;

/// Cell coordinates (row 0 is the top row)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Pos {
    pub row: u8,
    pub col: u8,
}

impl Pos {
    pub const fn new(row: u8, col: u8) -> Self {
        Self { row, col }
    }

    /// Step `distance` cells in `direction` (0-3), if the result stays inside a
    /// `width x height` grid
    pub fn offset(&self, direction: usize, distance: u8, width: usize, height: usize) -> Option<Pos> {
        let (dr, dc) = DIRECTIONS[direction % 4];
        let row = self.row as i16 + dr as i16 * distance as i16;
        let col = self.col as i16 + dc as i16 * distance as i16;

        if row < 0 || col < 0 || row as usize >= height || col as usize >= width {
            return None;
        }

        Some(Pos::new(row as u8, col as u8))
    }

    /// Parse `b3` style notation (column letter, 1-based row)
    pub fn parse(text: &str) -> Option<Pos> {
        let text = text.trim();
        let mut chars = text.chars();
        let letter = chars.next()?.to_ascii_lowercase();
        if !letter.is_ascii_lowercase() {
            return None;
        }

        let row: u16 = chars.as_str().parse().ok()?;
        if row == 0 || row > u8::MAX as u16 {
            return None;
        }

        Some(Pos::new((row - 1) as u8, letter as u8 - b'a'))
    }
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", column_letter(self.col), self.row as u16 + 1)
    }
}

/// Letter used for a column in notation and rendering
pub fn column_letter(col: u8) -> char {
    (b'a' + col) as char
}

/// Direction vectors (d_row, d_col)
/// Index: 0=N, 1=E, 2=S, 3=W
pub const DIRECTIONS: [(i8, i8); 4] = [
    (-1, 0), // N
    (0, 1),  // E
    (1, 0),  // S
    (0, -1), // W
];
