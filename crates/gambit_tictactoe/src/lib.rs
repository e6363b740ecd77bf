//! Pure tic-tac-toe game logic.
//!
//! Everything in this crate is a plain value or a pure function: boards are
//! exchanged by substitution, move legality ignores whose turn it is, and the
//! terminal result is always recomputed from the board rather than stored.
//!
//! # Example
//!
//! ```
//! use gambit_tictactoe::{apply_move, compute_result, Board, Seat, TerminalResult};
//!
//! let board = Board::parse("XX.OO....").unwrap();
//! let board = apply_move(&board, 5, Seat::O).unwrap();
//! let outcome = compute_result(&board);
//! assert_eq!(outcome.result(), TerminalResult::Winner(Seat::O));
//! assert_eq!(outcome.line(), Some([3, 4, 5]));
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod moves;
mod rules;
mod types;

pub use moves::{IllegalMoveError, apply_move, is_legal_move};
pub use rules::{LINES, Outcome, TerminalResult, WinningLine, compute_result, is_full, winning_line};
pub use types::{BOARD_SIZE, Board, BoardParseError, Cell, Seat};
