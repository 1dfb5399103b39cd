//! Budgeted alpha-beta search with iterative deepening
//!
//! The search is bounded by a node budget rather than a clock. The budget is
//! a plain `u64` threaded by value through the recursion and handed back with
//! every completed result; running out unwinds the whole in-flight iteration
//! as [`SearchOutcome::Exhausted`]. The driver keeps the answer of the deepest
//! iteration that finished.

use std::cell::Cell;
use std::str::FromStr;

use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

use crate::error::{Error, Result};
use crate::eval::{Evaluator, Heuristics};
use crate::game::{check_win, GameState, Player, TurnCounters};
use crate::moves::{generate_moves, order_moves, Move};
use crate::turn::{advance_turn, apply_move};

// ============================================================================
// CONSTANTS
// ============================================================================

/// Depth of the first iteration
pub const DEFAULT_START_DEPTH: u32 = 2;

/// Nodes per decision unless configured otherwise
pub const DEFAULT_NODE_BUDGET: u64 = 10_000;

/// Deepening stops here when no cap is configured
const MAX_SEARCH_DEPTH: u32 = 64;

// ============================================================================
// CONFIGURATION
// ============================================================================

/// What the caller wants back
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SearchMode {
    /// Choose a move
    Policy,
    /// Score the position
    Value,
}

impl FromStr for SearchMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "policy" | "move" => Ok(SearchMode::Policy),
            "value" | "score" => Ok(SearchMode::Value),
            other => Err(Error::InvalidConfiguration {
                message: format!("unknown search mode '{}' (policy, value)", other),
            }),
        }
    }
}

/// Search configuration
#[derive(Clone, Debug, PartialEq)]
pub struct SearchConfig {
    pub mode: SearchMode,
    /// Total nodes one decision may charge (must be > 0)
    pub node_budget: u64,
    /// Deepest iteration to attempt
    pub max_depth_cap: Option<u32>,
    /// Depth of the first iteration
    pub start_depth: u32,
    /// Seed for root shuffling and the random fallback
    pub seed: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            mode: SearchMode::Policy,
            node_budget: DEFAULT_NODE_BUDGET,
            max_depth_cap: None,
            start_depth: DEFAULT_START_DEPTH,
            seed: 42,
        }
    }
}

impl SearchConfig {
    /// Policy search with the given budget
    pub fn policy(node_budget: u64) -> Self {
        Self {
            mode: SearchMode::Policy,
            node_budget,
            ..Default::default()
        }
    }

    /// Value search with the given budget
    pub fn value(node_budget: u64) -> Self {
        Self {
            mode: SearchMode::Value,
            node_budget,
            ..Default::default()
        }
    }

    /// Cap the deepest iteration
    pub fn with_max_depth(mut self, max_depth: u32) -> Self {
        self.max_depth_cap = Some(max_depth);
        self
    }

    /// Set the first iteration's depth
    pub fn with_start_depth(mut self, start_depth: u32) -> Self {
        self.start_depth = start_depth;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.node_budget == 0 {
            return Err(Error::InvalidConfiguration {
                message: "node budget must be positive".to_string(),
            });
        }
        if self.start_depth == 0 {
            return Err(Error::InvalidConfiguration {
                message: "start depth must be at least 1".to_string(),
            });
        }
        if let Some(cap) = self.max_depth_cap {
            if cap < self.start_depth {
                return Err(Error::InvalidConfiguration {
                    message: format!("max depth {} is below start depth {}", cap, self.start_depth),
                });
            }
        }
        Ok(())
    }

    fn depth_ceiling(&self) -> u32 {
        self.max_depth_cap.unwrap_or(MAX_SEARCH_DEPTH)
    }
}

// ============================================================================
// RESULTS
// ============================================================================

/// Result of one recursive call
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SearchOutcome {
    /// Utility for the root player and the budget left afterwards
    Complete { utility: f32, budget: u64 },
    /// Budget ran out somewhere below; no value
    Exhausted,
}

impl SearchOutcome {
    pub fn utility(&self) -> Option<f32> {
        match self {
            SearchOutcome::Complete { utility, .. } => Some(*utility),
            SearchOutcome::Exhausted => None,
        }
    }
}

/// Policy answer
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Decision {
    Move(Move),
    /// The side to move has no legal action: a forced pass, not a loss
    NoMoveAvailable,
}

/// Everything a policy search found out
#[derive(Clone, Debug, PartialEq)]
pub struct SearchReport {
    pub decision: Decision,
    /// Utility of the chosen move at `completed_depth`
    pub utility: Option<f32>,
    /// Depth of the deepest iteration that finished
    pub completed_depth: Option<u32>,
    /// Budget charged
    pub nodes_used: u64,
    /// No iteration finished and the move was picked at random
    pub random_fallback: bool,
}

impl SearchReport {
    fn no_move() -> Self {
        Self {
            decision: Decision::NoMoveAvailable,
            utility: None,
            completed_depth: None,
            nodes_used: 0,
            random_fallback: false,
        }
    }

    pub fn chosen_move(&self) -> Option<Move> {
        match self.decision {
            Decision::Move(mv) => Some(mv),
            Decision::NoMoveAvailable => None,
        }
    }
}

/// Answer of [`SearchEngine::run`], shaped by the configured mode
#[derive(Clone, Debug, PartialEq)]
pub enum SearchResult {
    Policy(SearchReport),
    Value(f32),
}

// ============================================================================
// RECURSIVE SEARCH
// ============================================================================

/// Fixed parameters of one iteration
pub struct SearchContext<'e, E: ?Sized> {
    evaluator: &'e E,
    root_player: Player,
    max_depth: u32,
    horizon_reached: Cell<bool>,
}

impl<'e, E: Evaluator + ?Sized> SearchContext<'e, E> {
    pub fn new(evaluator: &'e E, root_player: Player, max_depth: u32) -> Self {
        Self {
            evaluator,
            root_player,
            max_depth,
            horizon_reached: Cell::new(false),
        }
    }

    pub fn root_player(&self) -> Player {
        self.root_player
    }

    /// Whether any line was cut off by the depth limit. If not, a deeper
    /// iteration would see the same tree.
    pub fn horizon_reached(&self) -> bool {
        self.horizon_reached.get()
    }

    /// Minimax value of `state` for the root player, `to_move` acting next.
    ///
    /// Every visited node charges one unit; a zero budget on entry, or one that
    /// runs dry before a child is expanded, yields `Exhausted`, which each
    /// caller passes straight up.
    #[allow(clippy::too_many_arguments)]
    pub fn alpha_beta(
        &self,
        state: &GameState,
        counters: &TurnCounters,
        depth: u32,
        maximizing: bool,
        to_move: Player,
        alpha: f32,
        beta: f32,
        budget: u64,
    ) -> SearchOutcome {
        self.node(state, counters, depth, maximizing, to_move, alpha, beta, budget, false)
    }

    #[allow(clippy::too_many_arguments)]
    fn node(
        &self,
        state: &GameState,
        counters: &TurnCounters,
        depth: u32,
        maximizing: bool,
        to_move: Player,
        mut alpha: f32,
        mut beta: f32,
        mut budget: u64,
        after_pass: bool,
    ) -> SearchOutcome {
        if budget == 0 {
            return SearchOutcome::Exhausted;
        }

        // Terminal check dominates any heuristic
        if let Some(winner) = check_win(state).winner() {
            let utility = if winner == self.root_player {
                f32::INFINITY
            } else {
                f32::NEG_INFINITY
            };
            return SearchOutcome::Complete { utility, budget: budget - 1 };
        }

        // Depth limit
        if depth >= self.max_depth {
            self.horizon_reached.set(true);
            return self.leaf(state, counters, budget);
        }

        let moves = generate_moves(state, to_move);

        // Forced pass: the turn still advances, depth does not
        if moves.is_empty() {
            if after_pass {
                // Neither side can act
                return self.leaf(state, counters, budget);
            }
            let (next_state, next_counters) = advance_turn(state, counters);
            return self.node(
                &next_state,
                &next_counters,
                depth,
                !maximizing,
                to_move.opponent(),
                alpha,
                beta,
                budget - 1,
                true,
            );
        }

        let moves = order_moves(state, moves);
        let mut best = if maximizing { f32::NEG_INFINITY } else { f32::INFINITY };

        for mv in moves {
            if budget <= 1 {
                return SearchOutcome::Exhausted;
            }
            budget -= 1;

            let (child, child_counters) = apply_move(state, counters, mv);
            let (child, child_counters) = advance_turn(&child, &child_counters);

            let utility = match self.node(
                &child,
                &child_counters,
                depth + 1,
                !maximizing,
                to_move.opponent(),
                alpha,
                beta,
                budget,
                false,
            ) {
                SearchOutcome::Complete { utility, budget: remaining } => {
                    budget = remaining;
                    utility
                }
                SearchOutcome::Exhausted => return SearchOutcome::Exhausted,
            };

            if maximizing {
                best = best.max(utility);
                if best > beta {
                    break;
                }
                alpha = alpha.max(best);
            } else {
                best = best.min(utility);
                if best < alpha {
                    break;
                }
                beta = beta.min(best);
            }
        }

        SearchOutcome::Complete { utility: best, budget }
    }

    fn leaf(&self, state: &GameState, counters: &TurnCounters, budget: u64) -> SearchOutcome {
        SearchOutcome::Complete {
            utility: self.evaluator.evaluate(state, counters, self.root_player),
            budget: budget - 1,
        }
    }
}

/// Outcome of one full pass over the root moves
enum RootOutcome {
    Complete { mv: Move, utility: f32, budget: u64 },
    Exhausted,
}

/// One iteration over the (already ordered, non-empty) root moves
fn search_root<E: Evaluator + ?Sized>(
    ctx: &SearchContext<'_, E>,
    state: &GameState,
    counters: &TurnCounters,
    moves: &[Move],
    mut budget: u64,
) -> RootOutcome {
    let player = ctx.root_player();
    let mut alpha = f32::NEG_INFINITY;
    let mut best: Option<(Move, f32)> = None;

    for &mv in moves {
        if budget <= 1 {
            return RootOutcome::Exhausted;
        }
        budget -= 1;

        let (child, child_counters) = apply_move(state, counters, mv);
        let (child, child_counters) = advance_turn(&child, &child_counters);

        match ctx.alpha_beta(
            &child,
            &child_counters,
            1,
            false,
            player.opponent(),
            alpha,
            f32::INFINITY,
            budget,
        ) {
            SearchOutcome::Complete { utility, budget: remaining } => {
                budget = remaining;
                if best.map_or(true, |(_, b)| utility > b) {
                    best = Some((mv, utility));
                    alpha = alpha.max(utility);
                }
                if utility == f32::INFINITY {
                    break;
                }
            }
            SearchOutcome::Exhausted => return RootOutcome::Exhausted,
        }
    }

    match best {
        Some((mv, utility)) => RootOutcome::Complete { mv, utility, budget },
        None => RootOutcome::Exhausted,
    }
}

// ============================================================================
// SEARCH ENGINE
// ============================================================================

/// Iterative-deepening driver around [`SearchContext::alpha_beta`]
pub struct SearchEngine<E = Heuristics> {
    pub config: SearchConfig,
    evaluator: E,
    rng: ChaCha8Rng,
}

impl<E: Evaluator> SearchEngine<E> {
    pub fn new(config: SearchConfig, evaluator: E) -> Self {
        let seed = config.seed;
        Self::with_seed(config, evaluator, seed)
    }

    pub fn with_seed(config: SearchConfig, evaluator: E, seed: u64) -> Self {
        Self {
            config,
            evaluator,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Run in the configured mode
    pub fn run(&mut self, state: &GameState, counters: &TurnCounters, player: Player) -> Result<SearchResult> {
        match self.config.mode {
            SearchMode::Policy => self.choose_move(state, counters, player).map(SearchResult::Policy),
            SearchMode::Value => self.evaluate_position(state, counters, player).map(SearchResult::Value),
        }
    }

    /// Pick a move for `player`.
    ///
    /// Always yields a move when one exists: if no iteration completes, a
    /// legal move is drawn uniformly at random.
    pub fn choose_move(&mut self, state: &GameState, counters: &TurnCounters, player: Player) -> Result<SearchReport> {
        self.config.validate()?;
        if let Some(winner) = check_win(state).winner() {
            return Err(Error::GameOver { winner });
        }

        let mut moves = generate_moves(state, player);
        if moves.is_empty() {
            return Ok(SearchReport::no_move());
        }

        // Shuffle so equal-valued moves are not always tried in board order
        moves.shuffle(&mut self.rng);
        let moves = order_moves(state, moves);

        let node_budget = self.config.node_budget;
        let mut budget = node_budget;
        let mut exhausted = false;
        let mut best: Option<(Move, f32, u32)> = None;
        let mut max_depth = self.config.start_depth;

        while max_depth <= self.config.depth_ceiling() {
            let ctx = SearchContext::new(&self.evaluator, player, max_depth);

            match search_root(&ctx, state, counters, &moves, budget) {
                RootOutcome::Complete { mv, utility, budget: remaining } => {
                    budget = remaining;
                    tracing::debug!(
                        "{} depth {} complete: {} ({:.3}), {} nodes left",
                        player,
                        max_depth,
                        mv,
                        utility,
                        budget
                    );
                    best = Some((mv, utility, max_depth));

                    if utility == f32::INFINITY || !ctx.horizon_reached() {
                        break;
                    }
                }
                RootOutcome::Exhausted => {
                    tracing::debug!("{} depth {} aborted: budget exhausted", player, max_depth);
                    exhausted = true;
                    break;
                }
            }

            max_depth += 1;
        }

        let nodes_used = if exhausted { node_budget } else { node_budget - budget };

        let report = match best {
            Some((mv, utility, depth)) => SearchReport {
                decision: Decision::Move(mv),
                utility: Some(utility),
                completed_depth: Some(depth),
                nodes_used,
                random_fallback: false,
            },
            None => {
                let decision = moves
                    .choose(&mut self.rng)
                    .map(|&mv| Decision::Move(mv))
                    .unwrap_or(Decision::NoMoveAvailable);
                tracing::debug!("{} no iteration completed, random fallback {:?}", player, decision);
                SearchReport {
                    decision,
                    utility: None,
                    completed_depth: None,
                    nodes_used,
                    random_fallback: true,
                }
            }
        };

        Ok(report)
    }

    /// Score `state` for `player` (to move).
    ///
    /// Falls back to the static evaluation if no iteration completes.
    pub fn evaluate_position(&mut self, state: &GameState, counters: &TurnCounters, player: Player) -> Result<f32> {
        self.config.validate()?;
        if let Some(winner) = check_win(state).winner() {
            return Ok(if winner == player { f32::INFINITY } else { f32::NEG_INFINITY });
        }

        let mut budget = self.config.node_budget;
        let mut value = None;
        let mut max_depth = self.config.start_depth;

        while max_depth <= self.config.depth_ceiling() {
            let ctx = SearchContext::new(&self.evaluator, player, max_depth);

            match ctx.alpha_beta(
                state,
                counters,
                0,
                true,
                player,
                f32::NEG_INFINITY,
                f32::INFINITY,
                budget,
            ) {
                SearchOutcome::Complete { utility, budget: remaining } => {
                    budget = remaining;
                    tracing::debug!("{} value at depth {}: {:.3}", player, max_depth, utility);
                    value = Some(utility);

                    if utility.is_infinite() || !ctx.horizon_reached() {
                        break;
                    }
                }
                SearchOutcome::Exhausted => break,
            }

            max_depth += 1;
        }

        Ok(value.unwrap_or_else(|| self.evaluator.evaluate(state, counters, player)))
    }
}

// ============================================================================
// TESTS
// ============================================================================
