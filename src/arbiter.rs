//! Turn sequencing and AI-move integration.
//!
//! The arbiter owns a [`GameSession`] and a [`MoveOracle`]. Human clicks go
//! straight through the reducer; AI turns are split into three steps so a
//! front end can keep running while the oracle is outstanding:
//!
//! 1. [`MoveArbiter::begin_ai_turn`] marks the session as thinking and hands
//!    back an [`AiTask`].
//! 2. [`AiTask::run`] waits the thinking delay and asks the oracle, bounded
//!    by a timeout. It touches no shared state and can be spawned.
//! 3. [`MoveArbiter::complete_ai_turn`] validates the answer against the
//!    board the request was made for, falls back to a random empty cell when
//!    needed, and applies it. Answers for an older game generation are dropped.
//!
//! [`MoveArbiter::resolve_ai_turn`] runs all three in sequence.

use crate::oracle::{MoveOracle, MoveSuggestion, OracleError, OracleErrorKind};
use crate::session::{AiRequest, GameMode, GameSession, IgnoreReason, SessionEvent};
use derive_more::{Display, Error};
use gambit_tictactoe::{Board, Seat, is_legal_move};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, instrument, warn};

/// Default pause before the oracle is asked, so the AI does not answer instantly.
pub const DEFAULT_THINKING_DELAY: Duration = Duration::from_millis(750);

/// Default bound on a single oracle call.
pub const DEFAULT_ORACLE_TIMEOUT: Duration = Duration::from_secs(10);

/// Timing knobs for AI turns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArbiterSettings {
    thinking_delay: Duration,
    oracle_timeout: Duration,
}

impl ArbiterSettings {
    /// Creates settings with explicit timings.
    pub fn new(thinking_delay: Duration, oracle_timeout: Duration) -> Self {
        Self {
            thinking_delay,
            oracle_timeout,
        }
    }

    /// Minimum time spent in the thinking state.
    pub fn thinking_delay(&self) -> Duration {
        self.thinking_delay
    }

    /// Upper bound on the oracle call.
    pub fn oracle_timeout(&self) -> Duration {
        self.oracle_timeout
    }
}

impl Default for ArbiterSettings {
    fn default() -> Self {
        Self::new(DEFAULT_THINKING_DELAY, DEFAULT_ORACLE_TIMEOUT)
    }
}

/// Arbiter failures. These indicate a logic defect, not a user error.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
pub enum ArbiterError {
    /// A move was requested for a board with no empty cells.
    #[display("Invariant violation: AI move requested with no empty cells on {}", _0)]
    NoLegalMoves(#[error(not(source))] Board),
}

/// Result of a human click.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickOutcome {
    /// The mark was placed.
    Applied,
    /// Nothing changed.
    Ignored(IgnoreReason),
}

/// Where the AI's cell came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum MoveSource {
    /// The oracle's suggestion was legal.
    #[display("oracle")]
    Oracle,
    /// The suggestion was unusable; a random empty cell was played instead.
    #[display("fallback")]
    Fallback,
}

/// Result of completing an AI turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AiCompletion {
    /// The AI's mark was placed.
    Applied {
        /// Cell that was marked.
        cell: usize,
        /// Whether the oracle's own suggestion was used.
        source: MoveSource,
    },
    /// The answer belonged to a game that has since been reset.
    Discarded,
}

/// An oracle answer tied to the request it answers.
#[derive(Debug)]
pub struct AiResolution {
    request: AiRequest,
    suggestion: Result<MoveSuggestion, OracleError>,
}

impl AiResolution {
    /// The request this answers.
    pub fn request(&self) -> &AiRequest {
        &self.request
    }

    /// The oracle's answer.
    pub fn suggestion(&self) -> &Result<MoveSuggestion, OracleError> {
        &self.suggestion
    }
}

/// An outstanding oracle request, detached from the session.
pub struct AiTask {
    request: AiRequest,
    oracle: Arc<dyn MoveOracle>,
    settings: ArbiterSettings,
}

impl AiTask {
    /// The request being answered.
    pub fn request(&self) -> &AiRequest {
        &self.request
    }

    /// Waits the thinking delay, then asks the oracle.
    ///
    /// Always produces a resolution, even when the oracle fails or panics.
    #[instrument(
        skip(self),
        fields(oracle = %self.oracle.name(), generation = self.request.generation())
    )]
    pub async fn run(self) -> AiResolution {
        if !self.settings.thinking_delay.is_zero() {
            tokio::time::sleep(self.settings.thinking_delay).await;
        }
        let suggestion = request_move(
            Arc::clone(&self.oracle),
            self.request.board().clone(),
            self.request.seat(),
            self.settings.oracle_timeout,
        )
        .await;
        AiResolution {
            request: self.request,
            suggestion,
        }
    }
}

/// Asks the oracle once on its own task.
///
/// A timeout becomes [`OracleErrorKind::Timeout`] and a panic inside the
/// oracle becomes [`OracleErrorKind::Unavailable`], so callers always get
/// something the fallback can handle.
#[instrument(skip(oracle, board), fields(oracle = %oracle.name(), board = %board))]
pub async fn request_move(
    oracle: Arc<dyn MoveOracle>,
    board: Board,
    seat: Seat,
    timeout: Duration,
) -> Result<MoveSuggestion, OracleError> {
    let call = tokio::spawn(async move { oracle.suggest(&board, seat).await });
    let abort = call.abort_handle();

    match tokio::time::timeout(timeout, call).await {
        Ok(Ok(result)) => result,
        Ok(Err(e)) => {
            error!(error = %e, "Oracle task failed");
            Err(OracleError::new(OracleErrorKind::Unavailable(format!(
                "oracle task failed: {}",
                e
            ))))
        }
        Err(_) => {
            abort.abort();
            warn!(?timeout, "Oracle timed out");
            Err(OracleError::new(OracleErrorKind::Timeout(timeout)))
        }
    }
}

/// Turns an oracle answer into a playable cell.
///
/// The suggestion is checked against `board`; anything unusable is replaced
/// by a uniformly random empty cell.
///
/// # Errors
///
/// Returns [`ArbiterError::NoLegalMoves`] if `board` has no empty cell.
#[instrument(skip(board, suggestion, rng), fields(board = %board))]
pub fn settle_move<R: rand::Rng + ?Sized>(
    board: &Board,
    suggestion: Result<MoveSuggestion, OracleError>,
    rng: &mut R,
) -> Result<(usize, MoveSource), ArbiterError> {
    let validated = suggestion.and_then(|suggestion| {
        match usize::try_from(suggestion.cell()) {
            Ok(cell) if is_legal_move(board, cell) => Ok(cell),
            _ => Err(OracleError::new(OracleErrorKind::Rejected(suggestion.cell()))),
        }
    });

    match validated {
        Ok(cell) => Ok((cell, MoveSource::Oracle)),
        Err(e) => {
            warn!(error = %e, "Oracle suggestion unusable, falling back to random cell");
            let cell = board
                .empty_cells()
                .choose(rng)
                .copied()
                .ok_or_else(|| ArbiterError::NoLegalMoves(board.clone()))?;
            Ok((cell, MoveSource::Fallback))
        }
    }
}

/// Sequences turns for one session.
pub struct MoveArbiter {
    session: GameSession,
    oracle: Arc<dyn MoveOracle>,
    settings: ArbiterSettings,
    rng: StdRng,
}

impl MoveArbiter {
    /// Creates an arbiter with a fresh session.
    #[instrument(skip(oracle), fields(oracle = %oracle.name()))]
    pub fn new(mode: GameMode, oracle: Arc<dyn MoveOracle>, settings: ArbiterSettings) -> Self {
        Self::from_session(GameSession::new(mode), oracle, settings)
    }

    /// Creates an arbiter around an existing session.
    pub fn from_session(
        session: GameSession,
        oracle: Arc<dyn MoveOracle>,
        settings: ArbiterSettings,
    ) -> Self {
        Self {
            session,
            oracle,
            settings,
            rng: StdRng::from_entropy(),
        }
    }

    /// Makes the fallback choice reproducible.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// The current session.
    pub fn session(&self) -> &GameSession {
        &self.session
    }

    /// The oracle in use.
    pub fn oracle(&self) -> &Arc<dyn MoveOracle> {
        &self.oracle
    }

    fn dispatch(&mut self, event: SessionEvent) {
        self.session = self.session.clone().reduce(event);
    }

    /// Handles a human click on `index`.
    #[instrument(skip(self))]
    pub fn on_human_click(&mut self, index: usize) -> ClickOutcome {
        if let Some(reason) = self.session.click_rejection(index) {
            debug!(%reason, "Click ignored");
            return ClickOutcome::Ignored(reason);
        }
        self.dispatch(SessionEvent::CellClicked(index));
        ClickOutcome::Applied
    }

    /// Switches mode, resetting board, turn and scores.
    #[instrument(skip(self))]
    pub fn change_mode(&mut self, mode: GameMode) {
        self.dispatch(SessionEvent::ModeChanged(mode));
    }

    /// Starts a new game. Any outstanding oracle answer becomes stale.
    #[instrument(skip(self))]
    pub fn reset_game(&mut self) {
        self.dispatch(SessionEvent::GameReset);
    }

    /// Clears the scoreboard.
    #[instrument(skip(self))]
    pub fn reset_scores(&mut self) {
        self.dispatch(SessionEvent::ScoresReset);
    }

    /// Enters the thinking state and returns the oracle task, if the AI is due.
    ///
    /// Returns `None` when it is not the AI's turn or a request is already
    /// outstanding.
    #[instrument(skip(self))]
    pub fn begin_ai_turn(&mut self) -> Option<AiTask> {
        let request = self.session.pending_ai_request()?;
        info!(generation = request.generation(), seat = %request.seat(), "AI turn started");
        self.dispatch(SessionEvent::AiTurnStarted {
            generation: request.generation(),
        });
        Some(AiTask {
            request,
            oracle: Arc::clone(&self.oracle),
            settings: self.settings,
        })
    }

    /// Applies an oracle answer produced by [`AiTask::run`].
    ///
    /// The thinking state is cleared on every path, including errors.
    ///
    /// # Errors
    ///
    /// Returns [`ArbiterError::NoLegalMoves`] if the request's board was full.
    #[instrument(skip(self, resolution), fields(generation = resolution.request.generation()))]
    pub fn complete_ai_turn(
        &mut self,
        resolution: AiResolution,
    ) -> Result<AiCompletion, ArbiterError> {
        let AiResolution {
            request,
            suggestion,
        } = resolution;
        let generation = request.generation();

        if generation != self.session.generation()
            || !self.session.is_thinking()
            || request.board() != self.session.board()
        {
            info!(
                current_generation = self.session.generation(),
                "Discarding stale oracle answer"
            );
            return Ok(AiCompletion::Discarded);
        }

        let settled = settle_move(request.board(), suggestion, &mut self.rng);
        let completion = match settled {
            Ok((cell, source)) => {
                self.dispatch(SessionEvent::AiMoveChosen { generation, cell });
                info!(cell, %source, "AI move applied");
                Ok(AiCompletion::Applied { cell, source })
            }
            Err(e) => {
                error!(error = %e, "AI turn failed");
                Err(e)
            }
        };
        self.dispatch(SessionEvent::AiTurnEnded { generation });
        completion
    }

    /// Runs a whole AI turn in place.
    ///
    /// Returns `Ok(None)` when it is not the AI's turn.
    pub async fn resolve_ai_turn(&mut self) -> Result<Option<AiCompletion>, ArbiterError> {
        let Some(task) = self.begin_ai_turn() else {
            return Ok(None);
        };
        let resolution = task.run().await;
        self.complete_ai_turn(resolution).map(Some)
    }
}
