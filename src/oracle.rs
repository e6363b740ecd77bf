//! Move oracles: services that suggest a cell for a seat.
//!
//! An oracle is untrusted. Whatever it returns is validated by the arbiter,
//! and every failure here ends up on the random fallback path.

use crate::llm_client::{LlmClient, LlmError};
use derive_more::{Display, Error};
use gambit_tictactoe::{Board, Cell, Seat};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use std::sync::Mutex;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// Trait for anything that can suggest a move.
#[async_trait::async_trait]
pub trait MoveOracle: Send + Sync {
    /// Suggests a cell index for `seat` on `board`.
    ///
    /// The index is only a suggestion; it may be out of range or occupied.
    async fn suggest(&self, board: &Board, seat: Seat) -> Result<MoveSuggestion, OracleError>;

    /// Returns the oracle's display name.
    fn name(&self) -> &str;
}

/// A suggested move plus optional explanation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveSuggestion {
    cell: i64,
    reasoning: Option<String>,
}

impl MoveSuggestion {
    /// Creates a suggestion without reasoning.
    pub fn new(cell: i64) -> Self {
        Self {
            cell,
            reasoning: None,
        }
    }

    /// Attaches explanatory text.
    pub fn with_reasoning(mut self, reasoning: impl Into<String>) -> Self {
        self.reasoning = Some(reasoning.into());
        self
    }

    /// The suggested cell, unvalidated.
    pub fn cell(&self) -> i64 {
        self.cell
    }

    /// Explanation supplied by the oracle, if any.
    pub fn reasoning(&self) -> Option<&str> {
        self.reasoning.as_deref()
    }
}

/// Category of oracle failure.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum OracleErrorKind {
    /// The request never produced a reply.
    #[display("transport failure: {}", _0)]
    Transport(String),
    /// A reply came back but could not be read as a move.
    #[display("malformed reply: {}", _0)]
    Malformed(String),
    /// No reply within the configured timeout.
    #[display("no reply within {:?}", _0)]
    Timeout(Duration),
    /// The suggested cell is out of range or occupied.
    #[display("suggested cell {} is not playable", _0)]
    Rejected(i64),
    /// The oracle had nothing to offer.
    #[display("oracle unavailable: {}", _0)]
    Unavailable(String),
}

/// Oracle error with location tracking.
#[derive(Debug, Clone, Display, Error)]
#[display("Oracle error: {} at {}:{}", kind, file, line)]
pub struct OracleError {
    /// What went wrong.
    #[error(not(source))]
    pub kind: OracleErrorKind,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl OracleError {
    /// Creates a new oracle error with caller location tracking.
    #[track_caller]
    pub fn new(kind: OracleErrorKind) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            kind,
            line: loc.line(),
            file: loc.file(),
        }
    }
}

impl From<LlmError> for OracleError {
    #[track_caller]
    fn from(err: LlmError) -> Self {
        Self::new(OracleErrorKind::Transport(err.message))
    }
}

/// System prompt sent with every move request.
pub const SYSTEM_PROMPT: &str = "You are a Tic-Tac-Toe expert. \
Reply with a single JSON object of the form {\"move\": <index>, \"reasoning\": \"<short explanation>\"} and nothing else.";

/// Builds the user prompt describing the position.
#[instrument(skip(board), fields(board = %board))]
pub fn build_prompt(board: &Board, seat: Seat) -> String {
    let cells = board
        .cells()
        .iter()
        .map(|cell| match cell {
            Cell::Empty => "null".to_string(),
            Cell::Marked(mark) => format!("\"{}\"", mark),
        })
        .collect::<Vec<_>>()
        .join(", ");
    let available = board
        .empty_cells()
        .iter()
        .map(|i| i.to_string())
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "It is player '{seat}'s turn to move.\n\
        The current board is represented by a 9-element array. 'X' and 'O' are players, and 'null' represents an empty square.\n\
        The board indexes are from 0 to 8, left-to-right, top-to-bottom.\n\
        Board: [{cells}]\n\n\
        Analyze the board and determine the best possible move to win or draw.\n\
        The available squares for your move (where the value is null) are at indices: [{available}].\n\
        You must choose one of these available indices.\n\n\
        Return a JSON object with your move."
    )
}

/// Reads a move out of an LLM reply.
///
/// Prose and Markdown fences around the outermost `{...}` are ignored. The
/// `move` field must be an integer; `reasoning` is optional.
#[instrument(skip(reply), fields(reply_length = reply.len()))]
pub fn parse_reply(reply: &str) -> Result<MoveSuggestion, OracleError> {
    let start = reply.find('{');
    let end = reply.rfind('}');
    let json = match (start, end) {
        (Some(start), Some(end)) if start < end => &reply[start..=end],
        _ => {
            return Err(OracleError::new(OracleErrorKind::Malformed(
                "no JSON object in reply".to_string(),
            )));
        }
    };

    let value: serde_json::Value = serde_json::from_str(json)
        .map_err(|e| OracleError::new(OracleErrorKind::Malformed(e.to_string())))?;

    let cell = value
        .get("move")
        .and_then(serde_json::Value::as_i64)
        .ok_or_else(|| {
            OracleError::new(OracleErrorKind::Malformed(format!(
                "expected integer \"move\", got {}",
                value.get("move").unwrap_or(&serde_json::Value::Null)
            )))
        })?;

    let suggestion = MoveSuggestion::new(cell);
    Ok(match value.get("reasoning").and_then(serde_json::Value::as_str) {
        Some(reasoning) => suggestion.with_reasoning(reasoning),
        None => suggestion,
    })
}

/// Oracle backed by a language model.
#[derive(Debug, Clone)]
pub struct LlmOracle {
    name: String,
    client: LlmClient,
}

impl LlmOracle {
    /// Creates an oracle that asks the given client.
    #[instrument(skip(client), fields(model = %client.config().model()))]
    pub fn new(client: LlmClient) -> Self {
        let name = client.config().model().to_string();
        info!(oracle = %name, "Creating LLM oracle");
        Self { name, client }
    }
}

#[async_trait::async_trait]
impl MoveOracle for LlmOracle {
    #[instrument(skip(self, board), fields(oracle = %self.name, board = %board))]
    async fn suggest(&self, board: &Board, seat: Seat) -> Result<MoveSuggestion, OracleError> {
        let prompt = build_prompt(board, seat);
        debug!("Asking model for a move");
        let reply = self.client.generate(SYSTEM_PROMPT, &prompt).await?;
        let suggestion = parse_reply(&reply)?;
        info!(
            cell = suggestion.cell(),
            reasoning = suggestion.reasoning().unwrap_or_default(),
            "Model suggested move"
        );
        Ok(suggestion)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Offline oracle that picks a random empty cell.
#[derive(Debug)]
pub struct RandomOracle {
    rng: Mutex<StdRng>,
}

impl RandomOracle {
    /// Creates a random oracle seeded from the OS.
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Creates a reproducible random oracle.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl Default for RandomOracle {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl MoveOracle for RandomOracle {
    #[instrument(skip(self, board), fields(board = %board))]
    async fn suggest(&self, board: &Board, seat: Seat) -> Result<MoveSuggestion, OracleError> {
        let empty = board.empty_cells();
        let mut rng = self.rng.lock().map_err(|_| {
            warn!("Random oracle lock poisoned");
            OracleError::new(OracleErrorKind::Unavailable("rng lock poisoned".to_string()))
        })?;
        let cell = empty.choose(&mut *rng).copied().ok_or_else(|| {
            OracleError::new(OracleErrorKind::Unavailable("no empty cells".to_string()))
        })?;
        debug!(cell, %seat, "Random oracle chose cell");
        Ok(MoveSuggestion::new(cell as i64))
    }

    fn name(&self) -> &str {
        "random"
    }
}
