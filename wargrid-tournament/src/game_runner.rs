//! Game runner - executes single games
//!
//! One half-move: check the win condition, ask the side to move for a move,
//! apply it (or pass when there is none), advance the turn once, flip sides.

use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

use wargrid_core::{
    advance_turn, apply_move, check_win, generate_moves, Error, GameResult, GameState, Heuristics, Move, Player,
    Result, SearchEngine, TurnCounters,
};

use crate::config::{AiConfig, PlayerType};
use crate::human::HumanConsole;

/// Outcome of a single game
#[derive(Clone, Debug)]
pub struct GameOutcome {
    /// Final game result (`Ongoing` = draw at the turn limit)
    pub result: GameResult,
    /// Half-moves played
    pub turns: u32,
    /// One entry per half-move, `None` for a forced pass
    pub moves: Vec<Option<Move>>,
    /// Board after the last half-move
    pub final_state: GameState,
}

impl GameOutcome {
    pub fn blue_wins(&self) -> bool {
        self.result == GameResult::BlueWins
    }

    pub fn red_wins(&self) -> bool {
        self.result == GameResult::RedWins
    }

    /// Check if game is a draw (ongoing at turn limit)
    pub fn is_draw(&self) -> bool {
        self.result == GameResult::Ongoing
    }

    /// Get winner (None for draw)
    pub fn winner(&self) -> Option<Player> {
        self.result.winner()
    }

    /// Number of forced passes
    pub fn passes(&self) -> usize {
        self.moves.iter().filter(|m| m.is_none()).count()
    }
}

/// A side's decision maker for one game
enum Agent {
    Search(SearchEngine<Heuristics>),
    Random(ChaCha8Rng),
    FirstValid,
    Human,
}

impl Agent {
    fn new(config: &AiConfig, seed: u64) -> Self {
        match config.player_type {
            PlayerType::Minimax => Agent::Search(SearchEngine::new(config.search_config(seed), config.heuristics.clone())),
            PlayerType::Random => Agent::Random(ChaCha8Rng::seed_from_u64(seed)),
            PlayerType::FirstValid => Agent::FirstValid,
            PlayerType::Human => Agent::Human,
        }
    }

    /// `None` when the player has to pass
    fn choose(
        &mut self,
        state: &GameState,
        counters: &TurnCounters,
        player: Player,
        console: Option<&mut HumanConsole>,
    ) -> Result<Option<Move>> {
        match self {
            Agent::Search(engine) => {
                let report = engine.choose_move(state, counters, player)?;
                Ok(report.chosen_move())
            }
            Agent::Random(rng) => Ok(generate_moves(state, player).choose(rng).copied()),
            Agent::FirstValid => Ok(generate_moves(state, player).first().copied()),
            Agent::Human => match console {
                Some(console) => console.ask(state, player),
                None => Err(Error::InvalidConfiguration {
                    message: format!("{} is a human player but no console is attached", player),
                }),
            },
        }
    }
}

/// Game runner that plays games between two player configurations
pub struct GameRunner {
    blue: AiConfig,
    red: AiConfig,
    /// Random seed counter
    seed_counter: u64,
    /// Shared by every human side
    console: Option<HumanConsole>,
}

impl GameRunner {
    /// Create a new game runner
    pub fn new(blue: AiConfig, red: AiConfig) -> Self {
        let seed_counter = blue.seed.unwrap_or(42);
        Self {
            blue,
            red,
            seed_counter,
            console: None,
        }
    }

    /// Attach the console human players type their moves at
    pub fn with_console(mut self, console: HumanConsole) -> Self {
        self.console = Some(console);
        self
    }

    /// Play a single game, returning the outcome
    pub fn play_game(&mut self, state: GameState, counters: TurnCounters, max_turns: u32) -> Result<GameOutcome> {
        self.play_game_with(state, counters, max_turns, |_, _, _, _| {})
    }

    /// Play a single game, calling `on_turn` after every half-move with the
    /// new position, the side that acted and its move
    pub fn play_game_with<F>(
        &mut self,
        mut state: GameState,
        mut counters: TurnCounters,
        max_turns: u32,
        mut on_turn: F,
    ) -> Result<GameOutcome>
    where
        F: FnMut(&GameState, &TurnCounters, Player, Option<Move>),
    {
        let seed = self.next_seed();
        let mut blue = Agent::new(&self.blue, seed);
        let mut red = Agent::new(&self.red, seed.wrapping_add(1));

        let mut to_move = Player::Blue;
        let mut moves = Vec::new();
        let mut turns = 0u32;

        while turns < max_turns && check_win(&state) == GameResult::Ongoing {
            let agent = match to_move {
                Player::Blue => &mut blue,
                Player::Red => &mut red,
            };

            let mv = agent.choose(&state, &counters, to_move, self.console.as_mut())?;
            if let Some(mv) = mv {
                (state, counters) = apply_move(&state, &counters, mv);
            } else {
                tracing::debug!("Turn {}: {} passes", turns + 1, to_move);
            }
            (state, counters) = advance_turn(&state, &counters);

            moves.push(mv);
            turns += 1;
            on_turn(&state, &counters, to_move, mv);
            to_move = to_move.opponent();
        }

        let result = check_win(&state);
        tracing::info!(
            "Game finished: {} vs {} -> {:?} after {} turns",
            self.blue.label(),
            self.red.label(),
            result,
            turns
        );

        Ok(GameOutcome {
            result,
            turns,
            moves,
            final_state: state,
        })
    }

    /// Get next seed and increment counter
    fn next_seed(&mut self) -> u64 {
        let seed = self.seed_counter;
        self.seed_counter = self.seed_counter.wrapping_add(2);
        seed
    }

    /// Reset seed counter
    pub fn reset_seed(&mut self, seed: u64) {
        self.seed_counter = seed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wargrid_core::{Level, Pos};

    fn game(layout: &[&str], interval: u8) -> (GameState, TurnCounters) {
        Level {
            name: "test".to_string(),
            production_interval: interval,
            initial_counter: None,
            layout: layout.iter().map(|r| r.to_string()).collect(),
        }
        .to_game()
        .unwrap()
    }

    #[test]
    fn test_minimax_takes_the_win() {
        let (state, counters) = game(&["....", ".Ss.", "....", "...."], 4);
        let mut runner = GameRunner::new(AiConfig::minimax(10_000), AiConfig::random());
        let outcome = runner.play_game(state, counters, 20).unwrap();

        assert!(outcome.blue_wins());
        assert_eq!(outcome.turns, 1);
        assert_eq!(outcome.moves, vec![Some(Move::new(Pos::new(1, 1), Pos::new(1, 2)))]);
    }

    #[test]
    fn test_pass_is_recorded() {
        // Blue's factory is boxed in and cannot act
        let (state, counters) = game(&["Fs", "s."], 9);
        let mut runner = GameRunner::new(AiConfig::first_valid(), AiConfig::first_valid());
        let outcome = runner.play_game(state, counters, 2).unwrap();

        assert_eq!(outcome.turns, 2);
        assert_eq!(outcome.moves[0], None);
        assert_eq!(outcome.moves[1], Some(Move::new(Pos::new(0, 1), Pos::new(1, 1))));
        assert_eq!(outcome.passes(), 1);
        assert!(outcome.is_draw());
    }

    #[test]
    fn test_turn_limit_is_a_draw() {
        let (state, counters) = game(&["F.....", "......", "......", ".....f"], 3);
        let mut runner = GameRunner::new(AiConfig::first_valid(), AiConfig::first_valid());
        let outcome = runner.play_game(state, counters, 6).unwrap();

        assert_eq!(outcome.turns, 6);
        assert_eq!(outcome.moves.len(), 6);
        assert!(outcome.is_draw());
        assert!(outcome.moves.iter().all(|m| m.is_some()));
    }

    #[test]
    fn test_random_games_are_reproducible() {
        let (state, counters) = game(&["F....", ".S...", "...s.", "....f"], 3);
        let play = || {
            let mut runner = GameRunner::new(AiConfig::random().with_seed(5), AiConfig::random());
            runner.play_game(state.clone(), counters.clone(), 30).unwrap()
        };

        let a = play();
        let b = play();
        assert_eq!(a.moves, b.moves);
        assert_eq!(a.result, b.result);
    }

    #[test]
    fn test_observer_sees_every_turn() {
        let (state, counters) = game(&["F....", ".S...", "...s.", "....f"], 3);
        let mut runner = GameRunner::new(AiConfig::minimax(500), AiConfig::random());
        let mut seen = Vec::new();
        let outcome = runner
            .play_game_with(state, counters, 10, |_, c, player, _| seen.push((c.turn(), player)))
            .unwrap();

        assert_eq!(seen.len() as u32, outcome.turns);
        for (i, (turn, player)) in seen.iter().enumerate() {
            assert_eq!(*turn, i as u32 + 1);
            let expected = if i % 2 == 0 { Player::Blue } else { Player::Red };
            assert_eq!(*player, expected);
        }
    }

    #[test]
    fn test_invalid_budget_is_reported() {
        let (state, counters) = game(&["S.", ".s"], 3);
        let mut runner = GameRunner::new(AiConfig::minimax(0), AiConfig::random());
        assert!(runner.play_game(state, counters, 10).is_err());
    }

    #[test]
    fn test_human_game_from_script() {
        // Bad notation, an illegal move and a skip, then a legal move
        let (state, counters) = game(&["....", ".Ss.", "....", "...."], 4);
        let script = "nonsense\nb2 d4\nskip\nb2 b1\n";
        let console = HumanConsole::new(std::io::Cursor::new(script), std::io::sink());
        let mut runner = GameRunner::new(AiConfig::human(), AiConfig::first_valid()).with_console(console);
        let outcome = runner.play_game(state, counters, 3).unwrap();

        assert_eq!(
            outcome.moves,
            vec![
                None,
                Some(Move::new(Pos::new(1, 2), Pos::new(0, 2))),
                Some(Move::new(Pos::new(1, 1), Pos::new(0, 1))),
            ]
        );
        assert!(outcome.is_draw());
    }

    #[test]
    fn test_human_quit_abandons_game() {
        let (state, counters) = game(&["F.....", "......", "......", ".....f"], 3);
        let console = HumanConsole::new(std::io::Cursor::new("quit\n"), std::io::sink());
        let mut runner = GameRunner::new(AiConfig::first_valid(), AiConfig::human()).with_console(console);

        assert!(matches!(
            runner.play_game(state, counters, 10),
            Err(Error::Abandoned { player: Player::Red })
        ));
    }

    #[test]
    fn test_human_without_console_is_rejected() {
        let (state, counters) = game(&["S.", ".s"], 3);
        let mut runner = GameRunner::new(AiConfig::human(), AiConfig::random());
        assert!(matches!(
            runner.play_game(state, counters, 10),
            Err(Error::InvalidConfiguration { .. })
        ));
    }

    #[test]
    fn test_game_outcome_winner() {
        let (state, _) = game(&["S.", ".."], 3);
        let outcome = GameOutcome {
            result: GameResult::BlueWins,
            turns: 10,
            moves: vec![],
            final_state: state.clone(),
        };
        assert_eq!(outcome.winner(), Some(Player::Blue));
        assert!(outcome.blue_wins());
        assert!(!outcome.red_wins());

        let draw = GameOutcome {
            result: GameResult::Ongoing,
            turns: 50,
            moves: vec![],
            final_state: state,
        };
        assert_eq!(draw.winner(), None);
        assert!(draw.is_draw());
    }
}
