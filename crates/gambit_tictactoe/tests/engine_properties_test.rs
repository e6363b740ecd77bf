//! Property tests for win/draw detection and move application.

use gambit_tictactoe::{
    BOARD_SIZE, Board, Cell, IllegalMoveError, LINES, Seat, TerminalResult, WinningLine,
    apply_move, compute_result, is_legal_move,
};
use proptest::prelude::*;

fn cell() -> impl Strategy<Value = Cell> {
    prop_oneof![
        Just(Cell::Empty),
        Just(Cell::Marked(Seat::X)),
        Just(Cell::Marked(Seat::O)),
    ]
}

fn board() -> impl Strategy<Value = Board> {
    prop::array::uniform9(cell()).prop_map(Board::from_cells)
}

fn full_board() -> impl Strategy<Value = Board> {
    let mark = prop_oneof![Just(Cell::Marked(Seat::X)), Just(Cell::Marked(Seat::O))];
    prop::array::uniform9(mark).prop_map(Board::from_cells)
}

/// Every line whose three cells carry the same mark.
fn complete_lines(board: &Board) -> Vec<(Seat, WinningLine)> {
    LINES
        .iter()
        .filter_map(|&line| {
            let [a, b, c] = line.map(|i| board.cells()[i]);
            match (a, a == b && b == c) {
                (Cell::Marked(seat), true) => Some((seat, line)),
                _ => None,
            }
        })
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig {
        max_global_rejects: 100_000,
        ..ProptestConfig::default()
    })]

    #[test]
    fn single_line_reports_that_winner_and_line(board in board()) {
        let lines = complete_lines(&board);
        prop_assume!(lines.len() == 1);
        let (seat, line) = lines[0];

        let outcome = compute_result(&board);
        prop_assert_eq!(outcome.result(), TerminalResult::Winner(seat));
        prop_assert_eq!(outcome.line(), Some(line));
    }

    #[test]
    fn full_board_without_line_is_draw(board in full_board()) {
        prop_assume!(complete_lines(&board).is_empty());

        let outcome = compute_result(&board);
        prop_assert_eq!(outcome.result(), TerminalResult::Draw);
        prop_assert_eq!(outcome.line(), None);
    }

    #[test]
    fn open_board_without_line_is_in_progress(board in board()) {
        prop_assume!(!board.empty_cells().is_empty());
        prop_assume!(complete_lines(&board).is_empty());

        let outcome = compute_result(&board);
        prop_assert_eq!(outcome.result(), TerminalResult::None);
        prop_assert_eq!(outcome.line(), None);
    }

    #[test]
    fn compute_result_is_idempotent(board in board()) {
        prop_assert_eq!(compute_result(&board), compute_result(&board));
    }

    #[test]
    fn apply_move_changes_exactly_one_cell(
        board in board(),
        index in 0usize..12,
        x in any::<bool>(),
    ) {
        let seat = if x { Seat::X } else { Seat::O };
        match apply_move(&board, index, seat) {
            Ok(next) => {
                prop_assert!(is_legal_move(&board, index));
                prop_assert_eq!(next.get(index), Some(Cell::Marked(seat)));
                let changed = (0..BOARD_SIZE)
                    .filter(|&i| next.get(i) != board.get(i))
                    .count();
                prop_assert_eq!(changed, 1);
            }
            Err(IllegalMoveError::OutOfRange(i)) => {
                prop_assert_eq!(i, index);
                prop_assert!(index >= BOARD_SIZE);
            }
            Err(IllegalMoveError::Occupied(i)) => {
                prop_assert_eq!(i, index);
                prop_assert!(!board.is_empty(index));
            }
        }
    }
}

#[test]
fn test_parse_rejects_wrong_length() {
    assert!(Board::parse("XO").is_err());
    assert!(Board::parse("XO.......X").is_err());
}

#[test]
fn test_parse_accepts_separators() {
    let board = Board::parse("XX./OO./...").unwrap();
    assert_eq!(board.to_string(), "XX.OO....");
    assert_eq!(board.mark_count(Seat::X), 2);
    assert_eq!(board.empty_cells(), vec![2, 5, 6, 7, 8]);
}

#[test]
fn test_display_numbers_empty_cells() {
    let board = Board::parse("X...O...X").unwrap();
    assert_eq!(board.display(), "X|2|3\n-+-+-\n4|O|6\n-+-+-\n7|8|X");
}
