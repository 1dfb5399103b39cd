//! Unit type definitions

use serde::{Deserialize, Serialize};

/// Unit kind
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitKind {
    Soldier = 0,
    Tank = 1,
    Factory = 2,
}

/// Unit type definition
#[derive(Clone, Debug)]
pub struct UnitType {
    pub kind: UnitKind,
    pub name: &'static str,
    /// Board symbol for Blue; Red uses the lower-case form
    pub symbol: char,
    /// Cells a unit may travel in one straight line (0 = immobile)
    pub move_range: u8,
    /// Produces soldiers on a countdown
    pub is_producer: bool,
}

impl UnitType {
    const fn new(kind: UnitKind, name: &'static str, symbol: char, range: u8, is_producer: bool) -> Self {
        Self {
            kind,
            name,
            symbol,
            move_range: range,
            is_producer,
        }
    }

    pub fn is_mobile(&self) -> bool {
        self.move_range > 0
    }
}

/// Number of unit kinds
pub const UNIT_KIND_COUNT: usize = 3;

/// All unit types, indexed by `UnitKind as usize`
pub static UNIT_TYPES: [UnitType; UNIT_KIND_COUNT] = [
    UnitType::new(UnitKind::Soldier, "Soldier", 'S', 1, false),
    UnitType::new(UnitKind::Tank, "Tank", 'T', 2, false),
    UnitType::new(UnitKind::Factory, "Factory", 'F', 0, true),
];

/// Kind spawned by factories
pub const PRODUCED_KIND: UnitKind = UnitKind::Soldier;

/// Get unit type for a kind
pub fn get_unit_type(kind: UnitKind) -> &'static UnitType {
    &UNIT_TYPES[kind as usize]
}

/// Look up a kind by its (case-insensitive) board symbol
pub fn kind_from_symbol(symbol: char) -> Option<UnitKind> {
    let upper = symbol.to_ascii_uppercase();
    UNIT_TYPES.iter().find(|ut| ut.symbol == upper).map(|ut| ut.kind)
}
