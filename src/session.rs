//! Game session state and its reducer.
//!
//! A [`GameSession`] is a value: every transition goes through
//! [`GameSession::reduce`], which consumes the old session and returns the
//! next one. The terminal result is recomputed synchronously after every
//! accepted move, and the scoreboard is bumped only on the transition from
//! an open game to a finished one.

use derive_more::Display;
use gambit_tictactoe::{
    Board, Outcome, Seat, TerminalResult, WinningLine, apply_move, compute_result,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

/// Who sits in seat O.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
pub enum GameMode {
    /// Human plays X, the move oracle plays O.
    #[default]
    #[serde(rename = "ai")]
    #[strum(serialize = "ai")]
    HumanVsAi,
    /// Two humans share the board.
    #[serde(rename = "pvp")]
    #[strum(serialize = "pvp")]
    HumanVsHuman,
}

impl GameMode {
    /// Returns true if a human controls the seat in this mode.
    pub fn is_human(self, seat: Seat) -> bool {
        match self {
            GameMode::HumanVsAi => seat == Seat::X,
            GameMode::HumanVsHuman => true,
        }
    }

    /// The seat played by the oracle, if any.
    pub fn ai_seat(self) -> Option<Seat> {
        match self {
            GameMode::HumanVsAi => Some(Seat::O),
            GameMode::HumanVsHuman => None,
        }
    }

    /// The other mode.
    pub fn toggled(self) -> Self {
        match self {
            GameMode::HumanVsAi => GameMode::HumanVsHuman,
            GameMode::HumanVsHuman => GameMode::HumanVsAi,
        }
    }
}

/// Completed-game tallies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Scoreboard {
    x_wins: u32,
    o_wins: u32,
    draws: u32,
}

impl Scoreboard {
    /// Games won by X.
    pub fn x_wins(&self) -> u32 {
        self.x_wins
    }

    /// Games won by O.
    pub fn o_wins(&self) -> u32 {
        self.o_wins
    }

    /// Drawn games.
    pub fn draws(&self) -> u32 {
        self.draws
    }

    /// Wins for the given seat.
    pub fn wins(&self, seat: Seat) -> u32 {
        match seat {
            Seat::X => self.x_wins,
            Seat::O => self.o_wins,
        }
    }

    fn record(&mut self, result: TerminalResult) {
        match result {
            TerminalResult::Winner(Seat::X) => self.x_wins += 1,
            TerminalResult::Winner(Seat::O) => self.o_wins += 1,
            TerminalResult::Draw => self.draws += 1,
            TerminalResult::None => {}
        }
    }
}

/// Why a human click was not applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum IgnoreReason {
    /// The game already has a result.
    #[display("The game is over")]
    GameOver,
    /// An oracle request is outstanding.
    #[display("Waiting for the AI move")]
    AiThinking,
    /// The active seat belongs to the AI.
    #[display("It is not your turn")]
    NotYourTurn,
    /// Out of range or already marked.
    #[display("That cell is not available")]
    IllegalCell,
}

/// Snapshot taken when an AI turn begins.
///
/// The generation ties the eventual answer to the game it was asked for, and
/// the board is what the suggestion is validated against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AiRequest {
    generation: u64,
    board: Board,
    seat: Seat,
}

impl AiRequest {
    /// Game generation the request belongs to.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Board as it stood when the request was made.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Seat the oracle is asked to move for.
    pub fn seat(&self) -> Seat {
        self.seat
    }
}

/// Inputs to the session reducer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// A human clicked a cell.
    CellClicked(usize),
    /// Switch mode; resets board, turn and scores.
    ModeChanged(GameMode),
    /// Start a new game, keeping the scores.
    GameReset,
    /// Clear the scoreboard.
    ScoresReset,
    /// An oracle request has been issued.
    AiTurnStarted {
        /// Generation the request was made for.
        generation: u64,
    },
    /// The AI's cell has been decided (suggested or fallback).
    AiMoveChosen {
        /// Generation the request was made for.
        generation: u64,
        /// Cell to mark.
        cell: usize,
    },
    /// The AI turn is over, whatever happened.
    AiTurnEnded {
        /// Generation the request was made for.
        generation: u64,
    },
}

/// Full state of one game table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSession {
    board: Board,
    active_seat: Seat,
    mode: GameMode,
    outcome: Outcome,
    scoreboard: Scoreboard,
    thinking: bool,
    generation: u64,
}

impl GameSession {
    /// Creates a session with an empty board and X to move.
    #[instrument]
    pub fn new(mode: GameMode) -> Self {
        info!(%mode, "Creating game session");
        Self {
            board: Board::new(),
            active_seat: Seat::X,
            mode,
            outcome: Outcome::default(),
            scoreboard: Scoreboard::default(),
            thinking: false,
            generation: 0,
        }
    }

    /// Creates a session from an arbitrary position.
    ///
    /// The result is computed from the board, so a finished position starts
    /// finished. Scores start at zero.
    #[instrument(fields(board = %board))]
    pub fn from_position(mode: GameMode, board: Board, active_seat: Seat) -> Self {
        let outcome = compute_result(&board);
        Self {
            board,
            active_seat,
            mode,
            outcome,
            scoreboard: Scoreboard::default(),
            thinking: false,
            generation: 0,
        }
    }

    /// The board.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Seat to move.
    pub fn active_seat(&self) -> Seat {
        self.active_seat
    }

    /// Current mode.
    pub fn mode(&self) -> GameMode {
        self.mode
    }

    /// Terminal result of the current board.
    pub fn result(&self) -> TerminalResult {
        self.outcome.result()
    }

    /// Line to highlight, if someone won.
    pub fn winning_line(&self) -> Option<WinningLine> {
        self.outcome.line()
    }

    /// Completed-game tallies.
    pub fn scoreboard(&self) -> &Scoreboard {
        &self.scoreboard
    }

    /// True while an oracle request is outstanding.
    pub fn is_thinking(&self) -> bool {
        self.thinking
    }

    /// Increments on every reset and mode change.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// A game is in progress once a mark is down and until it ends.
    pub fn is_in_progress(&self) -> bool {
        !self.board.is_blank() && !self.result().is_terminal()
    }

    /// Mode may only be switched between games.
    pub fn can_change_mode(&self) -> bool {
        !self.is_in_progress()
    }

    /// Returns why a click on `index` would be ignored, or `None` if it would apply.
    pub fn click_rejection(&self, index: usize) -> Option<IgnoreReason> {
        if self.result().is_terminal() {
            Some(IgnoreReason::GameOver)
        } else if self.thinking {
            Some(IgnoreReason::AiThinking)
        } else if !self.mode.is_human(self.active_seat) {
            Some(IgnoreReason::NotYourTurn)
        } else if !gambit_tictactoe::is_legal_move(&self.board, index) {
            Some(IgnoreReason::IllegalCell)
        } else {
            None
        }
    }

    /// The AI request to issue now, if the oracle is due to move.
    pub fn pending_ai_request(&self) -> Option<AiRequest> {
        let seat = self.mode.ai_seat()?;
        if self.active_seat != seat || self.result().is_terminal() || self.thinking {
            return None;
        }
        Some(AiRequest {
            generation: self.generation,
            board: self.board.clone(),
            seat,
        })
    }

    /// One-line description of the game state for the view.
    pub fn status_message(&self) -> String {
        match self.result() {
            TerminalResult::Draw => "It's a Draw!".to_string(),
            TerminalResult::Winner(seat) => match self.mode {
                GameMode::HumanVsAi if seat == Seat::X => "Congratulations, You Won!".to_string(),
                GameMode::HumanVsAi => "The AI Wins!".to_string(),
                GameMode::HumanVsHuman => format!("Player {} Won!", seat),
            },
            TerminalResult::None if self.thinking => "The AI is thinking...".to_string(),
            TerminalResult::None => match self.mode {
                GameMode::HumanVsAi => "Your Turn (X)".to_string(),
                GameMode::HumanVsHuman => format!("Player {}'s Turn", self.active_seat),
            },
        }
    }

    /// Applies one event and returns the next session.
    ///
    /// Events that do not apply to the current state leave it unchanged.
    #[instrument(skip(self), fields(generation = self.generation, seat = %self.active_seat))]
    pub fn reduce(self, event: SessionEvent) -> Self {
        match event {
            SessionEvent::CellClicked(index) => match self.click_rejection(index) {
                Some(reason) => {
                    debug!(index, %reason, "Ignoring click");
                    self
                }
                None => {
                    let seat = self.active_seat;
                    self.place(index, seat)
                }
            },
            SessionEvent::ModeChanged(mode) => {
                info!(from = %self.mode, to = %mode, "Changing mode");
                let generation = self.generation + 1;
                Self {
                    generation,
                    ..Self::new(mode)
                }
            }
            SessionEvent::GameReset => {
                info!("Resetting game");
                Self {
                    board: Board::new(),
                    active_seat: Seat::X,
                    outcome: Outcome::default(),
                    thinking: false,
                    generation: self.generation + 1,
                    ..self
                }
            }
            SessionEvent::ScoresReset => {
                info!("Resetting scores");
                Self {
                    scoreboard: Scoreboard::default(),
                    ..self
                }
            }
            SessionEvent::AiTurnStarted { generation } => {
                if generation != self.generation || self.pending_ai_request().is_none() {
                    warn!(generation, "Ignoring AI turn start");
                    return self;
                }
                Self {
                    thinking: true,
                    ..self
                }
            }
            SessionEvent::AiMoveChosen { generation, cell } => {
                if generation != self.generation || !self.thinking {
                    debug!(generation, cell, "Dropping stale AI move");
                    return self;
                }
                let seat = self.active_seat;
                Self {
                    thinking: false,
                    ..self.place(cell, seat)
                }
            }
            SessionEvent::AiTurnEnded { generation } => {
                if generation != self.generation {
                    return self;
                }
                Self {
                    thinking: false,
                    ..self
                }
            }
        }
    }

    /// Marks `index` for `seat`, flips the turn and recomputes the result.
    fn place(self, index: usize, seat: Seat) -> Self {
        let board = match apply_move(&self.board, index, seat) {
            Ok(board) => board,
            Err(e) => {
                warn!(error = %e, "Rejected move that passed gating");
                return self;
            }
        };

        let before = self.result();
        let outcome = compute_result(&board);
        let mut scoreboard = self.scoreboard;
        if !before.is_terminal() && outcome.result().is_terminal() {
            info!(result = ?outcome.result(), line = ?outcome.line(), "Game over");
            scoreboard.record(outcome.result());
        }

        debug!(index, %seat, board = %board, "Move accepted");
        Self {
            board,
            active_seat: seat.opponent(),
            outcome,
            scoreboard,
            ..self
        }
    }
}

impl Default for GameSession {
    fn default() -> Self {
        Self::new(GameMode::default())
    }
}
