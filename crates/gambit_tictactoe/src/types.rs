//! Core domain types for tic-tac-toe.

use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// Number of cells on the board.
pub const BOARD_SIZE: usize = 9;

/// One of the two players' identities.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[strum(ascii_case_insensitive)]
pub enum Seat {
    /// Seat X (moves first).
    X,
    /// Seat O (moves second).
    O,
}

impl Seat {
    /// Returns the other seat.
    pub fn opponent(self) -> Self {
        match self {
            Seat::X => Seat::O,
            Seat::O => Seat::X,
        }
    }
}

/// A cell on the tic-tac-toe board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Cell {
    /// Nobody has played here yet.
    #[default]
    Empty,
    /// Cell carries a seat's mark.
    Marked(Seat),
}

impl Cell {
    /// Returns true if no mark has been placed.
    pub fn is_empty(self) -> bool {
        matches!(self, Cell::Empty)
    }

    /// Returns the seat whose mark occupies this cell.
    pub fn seat(self) -> Option<Seat> {
        match self {
            Cell::Empty => None,
            Cell::Marked(seat) => Some(seat),
        }
    }
}

/// 3x3 tic-tac-toe board, cells in row-major order (0-8).
///
/// Boards are values: nothing outside this crate can clear a marked cell,
/// and moves produce a new board instead of editing one in place.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Board {
    cells: [Cell; BOARD_SIZE],
}

impl Board {
    /// Creates a new empty board.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a board from explicit cell contents.
    pub fn from_cells(cells: [Cell; BOARD_SIZE]) -> Self {
        Self { cells }
    }

    /// Parses the compact nine-character notation.
    ///
    /// `X` and `O` (either case) are marks; `.`, `-`, `_` and space are empty
    /// cells. Any `|` or `/` separators are skipped, so `"XX./OO./..."` also works.
    #[instrument]
    pub fn parse(notation: &str) -> Result<Self, BoardParseError> {
        let parsed = notation
            .chars()
            .filter(|c| !matches!(c, '|' | '/'))
            .map(|ch| match ch {
                'x' | 'X' => Ok(Cell::Marked(Seat::X)),
                'o' | 'O' => Ok(Cell::Marked(Seat::O)),
                '.' | '-' | '_' | ' ' => Ok(Cell::Empty),
                other => Err(BoardParseError::InvalidSymbol(other)),
            })
            .collect::<Result<Vec<_>, _>>()?;

        let cells: [Cell; BOARD_SIZE] = parsed
            .try_into()
            .map_err(|cells: Vec<Cell>| BoardParseError::WrongLength(cells.len()))?;
        Ok(Self { cells })
    }

    /// Gets the cell at the given index (0-8).
    pub fn get(&self, index: usize) -> Option<Cell> {
        self.cells.get(index).copied()
    }

    /// Checks if the cell at `index` exists and is empty.
    pub fn is_empty(&self, index: usize) -> bool {
        matches!(self.get(index), Some(Cell::Empty))
    }

    /// Returns all cells.
    pub fn cells(&self) -> &[Cell; BOARD_SIZE] {
        &self.cells
    }

    /// Indices of the cells nobody has played yet, in ascending order.
    pub fn empty_cells(&self) -> Vec<usize> {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, cell)| cell.is_empty())
            .map(|(index, _)| index)
            .collect()
    }

    /// Number of marks the seat has on the board.
    pub fn mark_count(&self, seat: Seat) -> usize {
        self.cells
            .iter()
            .filter(|cell| **cell == Cell::Marked(seat))
            .count()
    }

    /// Returns true when the board has no marks at all.
    pub fn is_blank(&self) -> bool {
        self.cells.iter().all(|cell| cell.is_empty())
    }

    /// Returns a copy with `index` replaced. Callers check legality first.
    pub(crate) fn with_cell(&self, index: usize, cell: Cell) -> Self {
        let mut cells = self.cells;
        cells[index] = cell;
        Self { cells }
    }

    /// Formats the board as a human-readable grid, empty cells numbered 1-9.
    pub fn display(&self) -> String {
        let mut result = String::new();
        for row in 0..3 {
            for col in 0..3 {
                let pos = row * 3 + col;
                let symbol = match self.cells[pos] {
                    Cell::Empty => (pos + 1).to_string(),
                    Cell::Marked(seat) => seat.to_string(),
                };
                result.push_str(&symbol);
                if col < 2 {
                    result.push('|');
                }
            }
            if row < 2 {
                result.push_str("\n-+-+-\n");
            }
        }
        result
    }
}

impl std::fmt::Display for Board {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for cell in &self.cells {
            match cell {
                Cell::Empty => write!(f, ".")?,
                Cell::Marked(seat) => write!(f, "{}", seat)?,
            }
        }
        Ok(())
    }
}

/// Error parsing the compact board notation.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
pub enum BoardParseError {
    /// The notation did not describe exactly nine cells.
    #[display("Board must have exactly 9 cells, got {}", _0)]
    WrongLength(#[error(not(source))] usize),

    /// A character that is neither a mark nor an empty-cell symbol.
    #[display("Invalid board symbol {:?}", _0)]
    InvalidSymbol(#[error(not(source))] char),
}
