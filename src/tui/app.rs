//! Application state and key handling.

use crossterm::event::KeyCode;
use gambit::{AiCompletion, AiResolution, ClickOutcome, GameSession, MoveArbiter, MoveSource};
use tracing::{debug, error};

use super::input::move_cursor;

/// What the event loop should do after a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    /// Keep running.
    Continue,
    /// Leave the UI.
    Quit,
}

/// Main application state.
pub struct App {
    arbiter: MoveArbiter,
    cursor: usize,
    notice: Option<String>,
}

impl App {
    /// Creates a new application.
    pub fn new(arbiter: MoveArbiter) -> Self {
        Self {
            arbiter,
            cursor: 4,
            notice: None,
        }
    }

    /// The session being displayed.
    pub fn session(&self) -> &GameSession {
        self.arbiter.session()
    }

    /// Mutable access to the arbiter for starting AI turns.
    pub fn arbiter_mut(&mut self) -> &mut MoveArbiter {
        &mut self.arbiter
    }

    /// Cell under the cursor.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Transient message shown under the status line.
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    /// Name of the oracle playing O.
    pub fn oracle_name(&self) -> &str {
        self.arbiter.oracle().name()
    }

    /// Handles a key press.
    pub fn handle_key(&mut self, key: KeyCode) -> Control {
        debug!(?key, "Handling key");

        match key {
            KeyCode::Char('q') | KeyCode::Esc => return Control::Quit,
            KeyCode::Up | KeyCode::Down | KeyCode::Left | KeyCode::Right => {
                self.cursor = move_cursor(self.cursor, key);
            }
            KeyCode::Enter | KeyCode::Char(' ') => self.click(self.cursor),
            KeyCode::Char(c @ '1'..='9') => {
                if let Some(digit) = c.to_digit(10) {
                    self.cursor = digit as usize - 1;
                    self.click(self.cursor);
                }
            }
            KeyCode::Char('n') | KeyCode::Char('r') => {
                self.arbiter.reset_game();
                self.notice = None;
            }
            KeyCode::Char('s') => {
                self.arbiter.reset_scores();
                self.notice = Some("Scores reset".to_string());
            }
            KeyCode::Char('m') => {
                if self.session().can_change_mode() {
                    let mode = self.session().mode().toggled();
                    self.arbiter.change_mode(mode);
                    self.notice = None;
                } else {
                    self.notice = Some("Finish or restart the game to switch modes".to_string());
                }
            }
            _ => {}
        }

        Control::Continue
    }

    fn click(&mut self, index: usize) {
        self.notice = match self.arbiter.on_human_click(index) {
            ClickOutcome::Applied => None,
            ClickOutcome::Ignored(reason) => Some(reason.to_string()),
        };
    }

    /// Applies an oracle answer delivered by a spawned AI task.
    pub fn complete_ai_turn(&mut self, resolution: AiResolution) {
        match self.arbiter.complete_ai_turn(resolution) {
            Ok(AiCompletion::Applied {
                cell,
                source: MoveSource::Fallback,
            }) => {
                self.notice = Some(format!(
                    "AI suggestion unusable, played cell {} at random",
                    cell + 1
                ));
            }
            Ok(_) => {}
            Err(e) => {
                error!(error = %e, "AI turn failed");
                self.notice = Some(e.to_string());
            }
        }
    }
}
