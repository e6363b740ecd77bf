//! Move legality and application.
//!
//! Neither function knows whose turn it is; turn ownership belongs to the
//! session layer.

use super::{BOARD_SIZE, Board, Cell, Seat};
use derive_more::{Display, Error};
use tracing::{debug, instrument, warn};

/// Error returned when a move cannot be placed on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Error)]
pub enum IllegalMoveError {
    /// Index is not in 0-8.
    #[display("Cell {} is out of range (must be 0-8)", _0)]
    OutOfRange(#[error(not(source))] usize),

    /// The cell already carries a mark.
    #[display("Cell {} is already occupied", _0)]
    Occupied(#[error(not(source))] usize),
}

/// Returns true iff `index` is on the board and the cell is empty.
pub fn is_legal_move(board: &Board, index: usize) -> bool {
    index < BOARD_SIZE && board.is_empty(index)
}

/// Places `seat` at `index`, returning the new board.
///
/// The input board is left untouched; the result differs from it in
/// exactly one cell.
///
/// # Errors
///
/// Returns [`IllegalMoveError`] if the index is out of range or occupied.
#[instrument(skip(board), fields(board = %board))]
pub fn apply_move(board: &Board, index: usize, seat: Seat) -> Result<Board, IllegalMoveError> {
    if index >= BOARD_SIZE {
        warn!(index, "Move out of range");
        return Err(IllegalMoveError::OutOfRange(index));
    }
    if !board.is_empty(index) {
        warn!(index, "Move onto occupied cell");
        return Err(IllegalMoveError::Occupied(index));
    }

    debug!(index, %seat, "Applying move");
    Ok(board.with_cell(index, Cell::Marked(seat)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_legal_on_empty_cell() {
        assert!(is_legal_move(&Board::new(), 0));
        assert!(is_legal_move(&Board::new(), 8));
    }

    #[test]
    fn test_illegal_out_of_range() {
        assert!(!is_legal_move(&Board::new(), 9));
        assert_eq!(
            apply_move(&Board::new(), 9, Seat::X),
            Err(IllegalMoveError::OutOfRange(9))
        );
    }

    #[test]
    fn test_illegal_on_occupied_cell() {
        let board = Board::parse("....X....").unwrap();
        assert!(!is_legal_move(&board, 4));
        assert_eq!(apply_move(&board, 4, Seat::O), Err(IllegalMoveError::Occupied(4)));
    }

    #[test]
    fn test_apply_does_not_mutate_input() {
        let board = Board::new();
        let next = apply_move(&board, 4, Seat::X).unwrap();
        assert_eq!(board, Board::new());
        assert_eq!(next.get(4), Some(Cell::Marked(Seat::X)));
    }
}
