//! Gambit - tic-tac-toe against a language-model move oracle.
//!
//! # Architecture
//!
//! - **Engine** (`gambit_tictactoe`): board, legality, win/draw detection
//! - **Session**: reducer-style game state, modes and scoreboard
//! - **Arbiter**: turn gating and AI-move integration with random fallback
//! - **Oracle**: LLM-backed and offline move suggestion
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use gambit::{ArbiterSettings, GameMode, MoveArbiter, RandomOracle};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let mut arbiter = MoveArbiter::new(
//!     GameMode::HumanVsAi,
//!     Arc::new(RandomOracle::new()),
//!     ArbiterSettings::default(),
//! );
//! arbiter.on_human_click(4);
//! arbiter.resolve_ai_turn().await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod arbiter;
pub mod config;
pub mod llm_client;
pub mod oracle;
pub mod session;

// Crate-level exports - Arbiter
pub use arbiter::{
    AiCompletion, AiResolution, AiTask, ArbiterError, ArbiterSettings, ClickOutcome, MoveArbiter,
    MoveSource, request_move, settle_move,
};

// Crate-level exports - Configuration
pub use config::{ConfigError, GameConfig};

// Crate-level exports - LLM client
pub use llm_client::{LlmClient, LlmConfig, LlmError, LlmProvider};

// Crate-level exports - Oracles
pub use oracle::{
    LlmOracle, MoveOracle, MoveSuggestion, OracleError, OracleErrorKind, RandomOracle,
    build_prompt, parse_reply,
};

// Crate-level exports - Session
pub use session::{AiRequest, GameMode, GameSession, IgnoreReason, Scoreboard, SessionEvent};

// Crate-level exports - Game types
pub use gambit_tictactoe::{
    Board, Cell, IllegalMoveError, Outcome, Seat, TerminalResult, WinningLine, apply_move,
    compute_result, is_legal_move,
};
