//! Level - starting position definition

use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::board::{Pos, MAX_WIDTH};
use crate::error::{Error, Result};
use crate::game::{GameState, Player, TurnCounters, Unit};
use crate::units::kind_from_symbol;

/// Starting position and production settings.
///
/// ```json
/// {
///   "name": "duel",
///   "production_interval": 4,
///   "layout": ["F..", ".S.", "..s", "..f"]
/// }
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Level {
    pub name: String,
    /// Turns between spawns; factories reset to this after producing
    pub production_interval: u8,
    /// First countdown value (defaults to the interval)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial_counter: Option<u8>,
    /// One string per row, top row first: unit symbols or `.`
    pub layout: Vec<String>,
}

impl Level {
    /// Load from a JSON file
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read level: {}", path.display()))?;
        let level = Self::parse(&content).with_context(|| format!("Failed to load level: {}", path.display()))?;
        Ok(level)
    }

    /// Parse JSON text and check the layout
    pub fn parse(text: &str) -> Result<Self> {
        let level: Level = serde_json::from_str(text)?;
        level.validate()?;
        Ok(level)
    }

    /// Save to a JSON file
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content).with_context(|| format!("Failed to write level: {}", path.display()))?;
        Ok(())
    }

    pub fn width(&self) -> usize {
        self.layout.first().map(|row| row.chars().count()).unwrap_or(0)
    }

    pub fn height(&self) -> usize {
        self.layout.len()
    }

    /// Rectangular, non-empty, at most `MAX_WIDTH` columns, known symbols,
    /// positive interval
    pub fn validate(&self) -> Result<()> {
        self.placements().map(|_| ())
    }

    /// Build the starting state and counters
    pub fn to_game(&self) -> Result<(GameState, TurnCounters)> {
        let units = self.placements()?;
        let state = GameState::from_units(self.width(), self.height(), &units)?;
        let initial = self.initial_counter.unwrap_or(self.production_interval);
        let counters = TurnCounters::with_initial(&state, self.production_interval, initial);
        Ok((state, counters))
    }

    fn placements(&self) -> Result<Vec<(Pos, Unit)>> {
        let invalid = |message: String| Error::InvalidLevel {
            name: self.name.clone(),
            message,
        };

        if self.production_interval == 0 {
            return Err(invalid("production interval must be positive".to_string()));
        }

        let width = self.width();
        if width == 0 {
            return Err(invalid("layout is empty".to_string()));
        }
        if width > MAX_WIDTH {
            return Err(invalid(format!("{} columns exceed the maximum of {}", width, MAX_WIDTH)));
        }
        if self.height() > u8::MAX as usize {
            return Err(invalid(format!("{} rows exceed the maximum of {}", self.height(), u8::MAX)));
        }

        let mut units = Vec::new();
        for (row, line) in self.layout.iter().enumerate() {
            if line.chars().count() != width {
                return Err(invalid(format!("row {} has {} cells, expected {}", row + 1, line.chars().count(), width)));
            }

            for (col, symbol) in line.chars().enumerate() {
                if symbol == '.' {
                    continue;
                }
                let kind = kind_from_symbol(symbol)
                    .ok_or_else(|| invalid(format!("unknown symbol '{}' in row {}", symbol, row + 1)))?;
                let owner = if symbol.is_ascii_uppercase() { Player::Blue } else { Player::Red };
                units.push((Pos::new(row as u8, col as u8), Unit::new(owner, kind)));
            }
        }

        Ok(units)
    }
}
