//! Cursor movement for keyboard navigation.

use crossterm::event::KeyCode;

/// Moves the cursor (a cell index 0-8) based on arrow keys.
///
/// The cursor stops at the board edges.
pub fn move_cursor(cursor: usize, key: KeyCode) -> usize {
    let (row, col) = (cursor / 3, cursor % 3);

    match key {
        KeyCode::Right if col < 2 => cursor + 1,
        KeyCode::Left if col > 0 => cursor - 1,
        KeyCode::Down if row < 2 => cursor + 3,
        KeyCode::Up if row > 0 => cursor - 3,
        // No change for other keys or edge cases
        _ => cursor,
    }
}
