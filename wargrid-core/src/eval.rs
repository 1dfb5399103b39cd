//! Position evaluation
//!
//! The search only sees the [`Evaluator`] trait; [`Heuristics`] is the
//! built-in hand-tuned scorer. Any deterministic, side-effect-free closure
//! with the same shape can stand in for it (e.g. a learned model).

use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::game::{check_win, GameResult, GameState, Player, TurnCounters};
use crate::moves::generate_moves;
use crate::units::{UnitKind, UNIT_KIND_COUNT};

/// Scores a non-terminal position from `perspective`'s point of view.
/// Must return the same value for the same inputs.
pub trait Evaluator {
    fn evaluate(&self, state: &GameState, counters: &TurnCounters, perspective: Player) -> f32;
}

impl<F> Evaluator for F
where
    F: Fn(&GameState, &TurnCounters, Player) -> f32,
{
    fn evaluate(&self, state: &GameState, counters: &TurnCounters, perspective: Player) -> f32 {
        self(state, counters, perspective)
    }
}

/// Heuristic weights for position evaluation
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Heuristics {
    /// Value of each unit kind (indexed by `UnitKind as usize`)
    pub unit_values: [f32; UNIT_KIND_COUNT],
    /// Weight for how close each factory is to its next spawn (0..1 per factory)
    pub production_weight: f32,
    /// Weight for mobility (legal move count)
    pub mobility_weight: f32,
}

impl Default for Heuristics {
    fn default() -> Self {
        let mut values = [0.0f32; UNIT_KIND_COUNT];
        values[UnitKind::Soldier as usize] = 1.0;
        values[UnitKind::Tank as usize] = 2.5;
        values[UnitKind::Factory as usize] = 4.0;

        Self {
            unit_values: values,
            production_weight: 0.5,
            mobility_weight: 0.05,
        }
    }
}

impl Heuristics {
    /// Load weights from a JSON file; missing fields keep their defaults
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read heuristics: {}", path.display()))?;
        let heuristics = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse heuristics: {}", path.display()))?;
        Ok(heuristics)
    }
}

impl Evaluator for Heuristics {
    fn evaluate(&self, state: &GameState, counters: &TurnCounters, perspective: Player) -> f32 {
        evaluate(state, counters, perspective, self)
    }
}

/// Evaluate position from `perspective` (own minus opponent).
/// Decided positions score ±infinity.
pub fn evaluate(state: &GameState, counters: &TurnCounters, perspective: Player, heuristics: &Heuristics) -> f32 {
    match check_win(state) {
        GameResult::Ongoing => {}
        result if result.winner() == Some(perspective) => return f32::INFINITY,
        _ => return f32::NEG_INFINITY,
    }

    let interval = counters.interval().max(1) as f32;
    let mut score = 0.0f32;

    // Material and production
    for (pos, unit) in state.units() {
        let mut value = heuristics.unit_values[unit.kind as usize];
        if unit.is_producer() {
            let progress = 1.0 - counters.remaining(pos) as f32 / interval;
            value += heuristics.production_weight * progress;
        }

        if unit.owner == perspective {
            score += value;
        } else {
            score -= value;
        }
    }

    // Mobility
    if heuristics.mobility_weight.abs() > 0.001 {
        let mine = generate_moves(state, perspective).len() as f32;
        let theirs = generate_moves(state, perspective.opponent()).len() as f32;
        score += heuristics.mobility_weight * (mine - theirs);
    }

    score
}
