//! Win detection logic for tic-tac-toe.

use super::super::{Board, Cell, Seat};
use super::WinningLine;
use tracing::instrument;

/// All winning lines, in the order they are checked.
pub const LINES: [WinningLine; 8] = [
    // Rows
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    // Columns
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
    // Diagonals
    [0, 4, 8],
    [2, 4, 6],
];

/// Finds the first complete line on the board.
///
/// Returns the seat and the line if three identical marks line up,
/// `None` otherwise.
#[instrument]
pub fn winning_line(board: &Board) -> Option<(Seat, WinningLine)> {
    for line @ [a, b, c] in LINES {
        let cell = board.get(a);
        if cell != Some(Cell::Empty) && cell == board.get(b) && cell == board.get(c) {
            if let Some(Cell::Marked(seat)) = cell {
                return Some((seat, line));
            }
        }
    }

    None
}
