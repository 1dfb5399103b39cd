//! Match play - multiple games between two AI configurations
//!
//! The configurations swap colours every game; seeds are derived from the
//! first configuration's seed and the game index, so sequential and parallel
//! runs of the same match agree.

use rayon::prelude::*;

use wargrid_core::{Error, GameResult, GameState, Result, TurnCounters};

use crate::config::{AiConfig, PlayerType};
use crate::game_runner::{GameOutcome, GameRunner};

/// Result of a match (multiple games)
#[derive(Clone, Debug)]
pub struct MatchResult {
    /// Wins for the first configuration
    pub first_wins: u32,
    /// Wins for the second configuration
    pub second_wins: u32,
    /// Draws (games that ended without a winner)
    pub draws: u32,
    /// Average game length in half-moves
    pub avg_turns: f32,
    /// Total games played
    pub games_played: u32,
    /// Individual games in the order they were scheduled
    pub game_outcomes: Vec<MatchGame>,
}

/// One game of a match and which configuration played Blue in it
#[derive(Clone, Debug)]
pub struct MatchGame {
    pub outcome: GameOutcome,
    pub first_was_blue: bool,
}

impl MatchResult {
    /// Create empty result
    pub fn empty() -> Self {
        Self {
            first_wins: 0,
            second_wins: 0,
            draws: 0,
            avg_turns: 0.0,
            games_played: 0,
            game_outcomes: Vec::new(),
        }
    }

    /// Combine two results
    pub fn combine(&self, other: &MatchResult) -> MatchResult {
        let total_games = self.games_played + other.games_played;
        let avg_turns = if total_games > 0 {
            (self.avg_turns * self.games_played as f32 + other.avg_turns * other.games_played as f32)
                / total_games as f32
        } else {
            0.0
        };

        let mut game_outcomes = self.game_outcomes.clone();
        game_outcomes.extend(other.game_outcomes.iter().cloned());

        MatchResult {
            first_wins: self.first_wins + other.first_wins,
            second_wins: self.second_wins + other.second_wins,
            draws: self.draws + other.draws,
            avg_turns,
            games_played: total_games,
            game_outcomes,
        }
    }

    pub fn first_win_rate(&self) -> f32 {
        self.rate(self.first_wins)
    }

    pub fn second_win_rate(&self) -> f32 {
        self.rate(self.second_wins)
    }

    pub fn draw_rate(&self) -> f32 {
        self.rate(self.draws)
    }

    /// Wins = 1.0, Draws = 0.5, Losses = 0.0
    pub fn score_for_first(&self) -> f32 {
        self.first_wins as f32 + 0.5 * self.draws as f32
    }

    pub fn score_for_second(&self) -> f32 {
        self.second_wins as f32 + 0.5 * self.draws as f32
    }

    fn rate(&self, count: u32) -> f32 {
        if self.games_played == 0 {
            0.0
        } else {
            count as f32 / self.games_played as f32
        }
    }
}

/// Play a match between two configurations on one starting position.
///
/// Plays multiple games alternating colors for fairness.
pub fn play_match(
    state: &GameState,
    counters: &TurnCounters,
    first: &AiConfig,
    second: &AiConfig,
    games: usize,
    max_turns: u32,
) -> Result<MatchResult> {
    play_match_with_progress(state, counters, first, second, games, max_turns, false, |_| {})
}

/// Play a match with parallel execution
pub fn play_match_parallel(
    state: &GameState,
    counters: &TurnCounters,
    first: &AiConfig,
    second: &AiConfig,
    games: usize,
    max_turns: u32,
) -> Result<MatchResult> {
    play_match_with_progress(state, counters, first, second, games, max_turns, true, |_| {})
}

/// Play a match, calling `on_game` as each game finishes (in completion order
/// when `parallel`)
#[allow(clippy::too_many_arguments)]
pub fn play_match_with_progress<F>(
    state: &GameState,
    counters: &TurnCounters,
    first: &AiConfig,
    second: &AiConfig,
    games: usize,
    max_turns: u32,
    parallel: bool,
    on_game: F,
) -> Result<MatchResult>
where
    F: Fn(&GameOutcome) + Sync,
{
    if first.player_type == PlayerType::Human || second.player_type == PlayerType::Human {
        return Err(Error::InvalidConfiguration {
            message: "matches are played between computer players only".to_string(),
        });
    }
    if games == 0 {
        return Ok(MatchResult::empty());
    }

    tracing::info!(
        "Starting match: {} vs {} ({} games, {} turns max)",
        first.label(),
        second.label(),
        games,
        max_turns
    );

    let game_configs = prepare_game_configs(games);
    let base_seed = first.seed.unwrap_or(42);

    let play = |gc: &GameConfig| -> Result<MatchGame> {
        let seed = base_seed.wrapping_add(2 * gc.game_index as u64);
        let game = play_single_game(state, counters, first, second, gc, max_turns, seed)?;
        on_game(&game.outcome);
        Ok(game)
    };

    let outcomes = if parallel {
        game_configs.par_iter().map(play).collect::<Result<Vec<_>>>()?
    } else {
        game_configs.iter().map(play).collect::<Result<Vec<_>>>()?
    };

    let result = aggregate_results(outcomes);
    tracing::info!(
        "Match finished: {} {} - {} {} ({} draws)",
        first.label(),
        result.first_wins,
        result.second_wins,
        second.label(),
        result.draws
    );

    Ok(result)
}

// ============================================================================
// Steps
// ============================================================================

/// Configuration for a single game in a match
#[derive(Clone, Copy)]
struct GameConfig {
    /// The first configuration plays Blue this game
    first_is_blue: bool,
    /// Game index (for seeding)
    game_index: usize,
}

/// Prepare game configurations for a match
fn prepare_game_configs(games: usize) -> Vec<GameConfig> {
    (0..games)
        .map(|i| GameConfig {
            first_is_blue: i % 2 == 0, // Alternate colors
            game_index: i,
        })
        .collect()
}

/// Play a single game with the given configuration
fn play_single_game(
    state: &GameState,
    counters: &TurnCounters,
    first: &AiConfig,
    second: &AiConfig,
    gc: &GameConfig,
    max_turns: u32,
    seed: u64,
) -> Result<MatchGame> {
    let (blue, red) = if gc.first_is_blue {
        (first.clone(), second.clone())
    } else {
        (second.clone(), first.clone())
    };

    let mut runner = GameRunner::new(blue, red);
    runner.reset_seed(seed);

    let outcome = runner.play_game(state.clone(), counters.clone(), max_turns)?;

    Ok(MatchGame {
        outcome,
        first_was_blue: gc.first_is_blue,
    })
}

/// Aggregate game outcomes into a match result
fn aggregate_results(games: Vec<MatchGame>) -> MatchResult {
    let mut first_wins = 0u32;
    let mut second_wins = 0u32;
    let mut draws = 0u32;
    let mut total_turns = 0u32;

    for game in &games {
        total_turns += game.outcome.turns;

        // Attribute wins based on who was playing which colour
        match (game.outcome.result, game.first_was_blue) {
            (GameResult::BlueWins, true) | (GameResult::RedWins, false) => first_wins += 1,
            (GameResult::BlueWins, false) | (GameResult::RedWins, true) => second_wins += 1,
            (GameResult::Ongoing, _) => draws += 1,
        }
    }

    let games_played = games.len() as u32;
    let avg_turns = if games_played > 0 {
        total_turns as f32 / games_played as f32
    } else {
        0.0
    };

    MatchResult {
        first_wins,
        second_wins,
        draws,
        avg_turns,
        games_played,
        game_outcomes: games,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use wargrid_core::Level;

    fn adjacent_soldiers() -> (GameState, TurnCounters) {
        Level::parse(r#"{"name": "adjacent", "production_interval": 4, "layout": ["....", ".Ss.", "....", "...."]}"#)
            .unwrap()
            .to_game()
            .unwrap()
    }

    fn skirmish() -> (GameState, TurnCounters) {
        Level::parse(r#"{"name": "skirmish", "production_interval": 3, "layout": ["F....", ".S...", "...s.", "....f"]}"#)
            .unwrap()
            .to_game()
            .unwrap()
    }

    fn result_with(first_wins: u32, second_wins: u32, draws: u32, avg_turns: f32) -> MatchResult {
        MatchResult {
            first_wins,
            second_wins,
            draws,
            avg_turns,
            games_played: first_wins + second_wins + draws,
            game_outcomes: vec![],
        }
    }

    #[test]
    fn test_match_result_empty() {
        let result = MatchResult::empty();
        assert_eq!(result.games_played, 0);
        assert_eq!(result.first_win_rate(), 0.0);
    }

    #[test]
    fn test_match_result_combine() {
        let combined = result_with(2, 1, 1, 20.0).combine(&result_with(1, 2, 1, 30.0));
        assert_eq!(combined.first_wins, 3);
        assert_eq!(combined.second_wins, 3);
        assert_eq!(combined.draws, 2);
        assert_eq!(combined.games_played, 8);
        assert!((combined.avg_turns - 25.0).abs() < 0.01);
    }

    #[test]
    fn test_match_result_rates_and_scores() {
        let result = result_with(6, 3, 1, 25.0);
        assert_eq!(result.first_win_rate(), 0.6);
        assert_eq!(result.second_win_rate(), 0.3);
        assert_eq!(result.draw_rate(), 0.1);
        assert_eq!(result.score_for_first(), 6.5);
        assert_eq!(result.score_for_second(), 3.5);
    }

    #[test]
    fn test_prepare_game_configs() {
        let configs = prepare_game_configs(4);
        assert_eq!(configs.len(), 4);
        assert!(configs[0].first_is_blue);
        assert!(!configs[1].first_is_blue);
        assert!(configs[2].first_is_blue);
        assert!(!configs[3].first_is_blue);
    }

    #[test]
    fn test_play_match_zero_games() {
        let (state, counters) = skirmish();
        let result = play_match(&state, &counters, &AiConfig::random(), &AiConfig::random(), 0, 20).unwrap();
        assert_eq!(result.games_played, 0);
    }

    #[test]
    fn test_minimax_wins_as_blue() {
        let (state, counters) = adjacent_soldiers();
        let result = play_match(&state, &counters, &AiConfig::minimax(5_000), &AiConfig::random(), 4, 20).unwrap();

        assert_eq!(result.games_played, 4);
        assert_eq!(result.first_wins + result.second_wins + result.draws, 4);
        // Games 0 and 2: minimax moves first and captures at once
        assert!(result.game_outcomes[0].outcome.blue_wins());
        assert!(result.game_outcomes[2].outcome.blue_wins());
        assert!(result.first_wins >= 2);
        let blue: Vec<bool> = result.game_outcomes.iter().map(|g| g.first_was_blue).collect();
        assert_eq!(blue, vec![true, false, true, false]);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let (state, counters) = skirmish();
        let first = AiConfig::minimax(300).with_seed(11);
        let second = AiConfig::random();

        let sequential = play_match(&state, &counters, &first, &second, 4, 16).unwrap();
        let parallel = play_match_parallel(&state, &counters, &first, &second, 4, 16).unwrap();

        assert_eq!(sequential.first_wins, parallel.first_wins);
        assert_eq!(sequential.second_wins, parallel.second_wins);
        assert_eq!(sequential.draws, parallel.draws);
        for (a, b) in sequential.game_outcomes.iter().zip(&parallel.game_outcomes) {
            assert_eq!(a.first_was_blue, b.first_was_blue);
            assert_eq!(a.outcome.moves, b.outcome.moves);
        }
    }

    #[test]
    fn test_match_rejects_human_players() {
        let (state, counters) = skirmish();
        let result = play_match(&state, &counters, &AiConfig::human(), &AiConfig::random(), 2, 10);
        assert!(matches!(result, Err(Error::InvalidConfiguration { .. })));
    }

    #[test]
    fn test_progress_callback_counts_games() {
        let (state, counters) = skirmish();
        let finished = AtomicUsize::new(0);
        let result = play_match_with_progress(
            &state,
            &counters,
            &AiConfig::first_valid(),
            &AiConfig::random(),
            3,
            10,
            true,
            |_| {
                finished.fetch_add(1, Ordering::SeqCst);
            },
        )
        .unwrap();

        assert_eq!(finished.load(Ordering::SeqCst), 3);
        assert_eq!(result.games_played, 3);
    }
}
