//! Game rules for tic-tac-toe.
//!
//! Pure functions that classify a board. The terminal result is never stored
//! as ground truth anywhere; callers recompute it after every accepted move.

mod draw;
mod win;

pub use draw::is_full;
pub use win::{LINES, winning_line};

use super::{Board, Seat};
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// The three cell indices that made a win.
pub type WinningLine = [usize; 3];

/// End-of-game classification of a board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TerminalResult {
    /// The game is still going.
    #[default]
    None,
    /// A seat has three in a row.
    Winner(Seat),
    /// Every cell is marked and nobody has a line.
    Draw,
}

impl TerminalResult {
    /// Returns true once the game has ended.
    pub fn is_terminal(self) -> bool {
        !matches!(self, TerminalResult::None)
    }
}

/// A terminal result together with the line to highlight.
///
/// `line` is `Some` exactly when `result` is a winner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Outcome {
    result: TerminalResult,
    line: Option<WinningLine>,
}

impl Outcome {
    /// Returns the terminal result.
    pub fn result(&self) -> TerminalResult {
        self.result
    }

    /// Returns the winning line, if any.
    pub fn line(&self) -> Option<WinningLine> {
        self.line
    }
}

/// Classifies the board.
///
/// Lines are checked rows first, then columns, then the two diagonals; the
/// first complete line wins. With no line, a full board is a draw.
#[instrument]
pub fn compute_result(board: &Board) -> Outcome {
    if let Some((seat, line)) = winning_line(board) {
        return Outcome {
            result: TerminalResult::Winner(seat),
            line: Some(line),
        };
    }

    if is_full(board) {
        Outcome {
            result: TerminalResult::Draw,
            line: None,
        }
    } else {
        Outcome::default()
    }
}
