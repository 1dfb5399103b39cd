//! Console player - moves typed by a person
//!
//! One line per attempt: a move in board notation (`b2 b3`), `skip` to pass
//! or `quit` to abandon the game. Unparseable and illegal moves re-prompt.

use std::io::{self, BufRead, BufReader, Write};

use wargrid_core::{generate_moves, parse_move, Error, GameState, Move, Player, Result};

/// Line-based input and prompt output for human players
pub struct HumanConsole {
    input: Box<dyn BufRead + Send>,
    output: Box<dyn Write + Send>,
}

impl HumanConsole {
    pub fn new(input: impl BufRead + Send + 'static, output: impl Write + Send + 'static) -> Self {
        Self {
            input: Box::new(input),
            output: Box::new(output),
        }
    }

    /// Console on the process's stdin and stdout
    pub fn stdio() -> Self {
        Self::new(BufReader::new(io::stdin()), io::stdout())
    }

    /// Ask `player` for a move on `state`. `Ok(None)` is a pass, either
    /// requested with `skip` or forced because no move exists.
    ///
    /// `quit` and end of input abandon the game.
    pub fn ask(&mut self, state: &GameState, player: Player) -> Result<Option<Move>> {
        if generate_moves(state, player).is_empty() {
            writeln!(self.output, "{} has no legal move and passes", player)?;
            self.output.flush()?;
            return Ok(None);
        }

        write!(self.output, "{} to move ('b2 b3', 'skip' or 'quit'): ", player)?;
        loop {
            self.output.flush()?;

            let mut line = String::new();
            if self.input.read_line(&mut line)? == 0 {
                return Err(Error::Abandoned { player });
            }

            let text = line.trim();
            if text.eq_ignore_ascii_case("quit") {
                return Err(Error::Abandoned { player });
            }
            if text.eq_ignore_ascii_case("skip") {
                return Ok(None);
            }
            if text.is_empty() {
                write!(self.output, "Enter a move: ")?;
                continue;
            }

            match parse_move(state, player, text) {
                Ok(mv) => return Ok(Some(mv)),
                Err(err @ (Error::InvalidNotation { .. } | Error::IllegalMove { .. })) => {
                    write!(self.output, "{}. Try again: ", err)?;
                }
                Err(err) => return Err(err),
            }
        }
    }
}
