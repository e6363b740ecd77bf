//! Tests for AI-turn resolution against scripted oracles.

use gambit::{
    AiCompletion, ArbiterError, ArbiterSettings, Board, Cell, ClickOutcome, GameMode, GameSession,
    IgnoreReason, MoveArbiter, MoveOracle, MoveSource, MoveSuggestion, OracleError,
    OracleErrorKind, Seat, TerminalResult, request_move, settle_move,
};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Oracle that always gives the same answer and counts calls.
struct ScriptedOracle {
    reply: Result<i64, OracleErrorKind>,
    delay: Duration,
    calls: AtomicUsize,
}

impl ScriptedOracle {
    fn returning(cell: i64) -> Arc<Self> {
        Arc::new(Self {
            reply: Ok(cell),
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
        })
    }

    fn failing(kind: OracleErrorKind) -> Arc<Self> {
        Arc::new(Self {
            reply: Err(kind),
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
        })
    }

    fn slow(cell: i64, delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            reply: Ok(cell),
            delay,
            calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait::async_trait]
impl MoveOracle for ScriptedOracle {
    async fn suggest(&self, _board: &Board, _seat: Seat) -> Result<MoveSuggestion, OracleError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        match &self.reply {
            Ok(cell) => Ok(MoveSuggestion::new(*cell).with_reasoning("scripted")),
            Err(kind) => Err(OracleError::new(kind.clone())),
        }
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

/// Oracle whose every call panics.
struct PanickingOracle;

#[async_trait::async_trait]
impl MoveOracle for PanickingOracle {
    async fn suggest(&self, _board: &Board, _seat: Seat) -> Result<MoveSuggestion, OracleError> {
        panic!("oracle crashed")
    }

    fn name(&self) -> &str {
        "panicking"
    }
}

/// Counts log events carrying a given message.
struct MessageCounter {
    message: &'static str,
    hits: Arc<AtomicUsize>,
}

impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for MessageCounter {
    fn on_event(
        &self,
        event: &tracing::Event<'_>,
        _ctx: tracing_subscriber::layer::Context<'_, S>,
    ) {
        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);
        if visitor.0 == self.message {
            self.hits.fetch_add(1, Ordering::SeqCst);
        }
    }
}

#[derive(Default)]
struct MessageVisitor(String);

impl tracing::field::Visit for MessageVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.0 = format!("{:?}", value);
        }
    }
}

fn instant() -> ArbiterSettings {
    ArbiterSettings::new(Duration::ZERO, Duration::from_secs(5))
}

fn arbiter_at(notation: &str, oracle: Arc<ScriptedOracle>) -> MoveArbiter {
    let board = Board::parse(notation).unwrap();
    let session = GameSession::from_position(GameMode::HumanVsAi, board, Seat::O);
    MoveArbiter::from_session(session, oracle, instant()).with_seed(7)
}

/// Cells that are marked in `before` must carry the same mark in `after`.
fn assert_no_overwrite(before: &Board, after: &Board) {
    for (i, cell) in before.cells().iter().enumerate() {
        if *cell != Cell::Empty {
            assert_eq!(after.get(i), Some(*cell), "cell {} was overwritten", i);
        }
    }
}

#[tokio::test]
async fn test_oracle_win_scores_once() {
    let mut arbiter = arbiter_at("XX.OO....", ScriptedOracle::returning(5));

    let completion = arbiter.resolve_ai_turn().await.unwrap();
    assert_eq!(
        completion,
        Some(AiCompletion::Applied {
            cell: 5,
            source: MoveSource::Oracle
        })
    );

    let session = arbiter.session();
    assert_eq!(session.board(), &Board::parse("XX.OOO...").unwrap());
    assert_eq!(session.result(), TerminalResult::Winner(Seat::O));
    assert_eq!(session.winning_line(), Some([3, 4, 5]));
    assert_eq!(session.scoreboard().o_wins(), 1);
    assert!(!session.is_thinking());

    // Game over: no further AI turn, no second increment.
    assert_eq!(arbiter.resolve_ai_turn().await.unwrap(), None);
    assert_eq!(arbiter.session().scoreboard().o_wins(), 1);
}

#[tokio::test]
async fn test_occupied_suggestion_falls_back_to_empty_cell() {
    let before = Board::parse("XX.OO....").unwrap();
    let mut arbiter = arbiter_at("XX.OO....", ScriptedOracle::returning(0));

    let completion = arbiter.resolve_ai_turn().await.unwrap();
    let Some(AiCompletion::Applied { cell, source }) = completion else {
        panic!("expected an applied move, got {:?}", completion);
    };
    assert_eq!(source, MoveSource::Fallback);
    assert!(before.is_empty(cell));

    let after = arbiter.session().board();
    assert_eq!(after.cells().len(), 9);
    assert_no_overwrite(&before, after);
    assert_eq!(after.get(cell), Some(Cell::Marked(Seat::O)));
    assert_eq!(after.mark_count(Seat::O), 3);
    assert_eq!(arbiter.session().active_seat(), Seat::X);
}

#[tokio::test]
async fn test_out_of_range_and_negative_suggestions_fall_back() {
    for bad in [9, 42, -1] {
        let mut arbiter = arbiter_at("X........", ScriptedOracle::returning(bad));
        let completion = arbiter.resolve_ai_turn().await.unwrap();
        assert!(
            matches!(
                completion,
                Some(AiCompletion::Applied {
                    source: MoveSource::Fallback,
                    ..
                })
            ),
            "suggestion {} should fall back",
            bad
        );
        assert_eq!(arbiter.session().board().mark_count(Seat::O), 1);
    }
}

#[tokio::test]
async fn test_oracle_failure_falls_back_and_clears_thinking() {
    let oracle = ScriptedOracle::failing(OracleErrorKind::Transport("connection refused".into()));
    let mut arbiter = arbiter_at("X........", oracle.clone());

    let completion = arbiter.resolve_ai_turn().await.unwrap();
    assert!(matches!(
        completion,
        Some(AiCompletion::Applied {
            source: MoveSource::Fallback,
            ..
        })
    ));
    assert!(!arbiter.session().is_thinking());
    assert_eq!(oracle.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_oracle_timeout_falls_back() {
    let oracle = ScriptedOracle::slow(4, Duration::from_secs(30));
    let board = Board::parse("X........").unwrap();
    let session = GameSession::from_position(GameMode::HumanVsAi, board, Seat::O);
    let settings = ArbiterSettings::new(Duration::ZERO, Duration::from_millis(50));
    let mut arbiter = MoveArbiter::from_session(session, oracle, settings);

    let completion = arbiter.resolve_ai_turn().await.unwrap();
    assert!(matches!(
        completion,
        Some(AiCompletion::Applied {
            source: MoveSource::Fallback,
            ..
        })
    ));
    assert!(!arbiter.session().is_thinking());
}

#[tokio::test]
async fn test_human_then_ai_alternate() {
    let oracle = ScriptedOracle::returning(4);
    let mut arbiter = MoveArbiter::new(GameMode::HumanVsAi, oracle.clone(), instant());

    // Not the AI's turn yet.
    assert_eq!(arbiter.resolve_ai_turn().await.unwrap(), None);
    assert_eq!(oracle.calls.load(Ordering::SeqCst), 0);

    assert_eq!(arbiter.on_human_click(0), ClickOutcome::Applied);
    assert_eq!(arbiter.session().active_seat(), Seat::O);
    assert_eq!(
        arbiter.on_human_click(1),
        ClickOutcome::Ignored(IgnoreReason::NotYourTurn)
    );

    arbiter.resolve_ai_turn().await.unwrap();
    assert_eq!(arbiter.session().board(), &Board::parse("X...O....").unwrap());
    assert_eq!(arbiter.session().active_seat(), Seat::X);
}

#[tokio::test]
async fn test_one_request_outstanding_and_clicks_rejected() {
    let oracle = ScriptedOracle::returning(4);
    let mut arbiter = MoveArbiter::new(GameMode::HumanVsAi, oracle, instant());
    arbiter.on_human_click(0);

    let task = arbiter.begin_ai_turn().expect("AI should be due");
    assert!(arbiter.session().is_thinking());
    assert!(arbiter.begin_ai_turn().is_none());
    assert_eq!(
        arbiter.on_human_click(8),
        ClickOutcome::Ignored(IgnoreReason::AiThinking)
    );

    let resolution = task.run().await;
    let completion = arbiter.complete_ai_turn(resolution).unwrap();
    assert_eq!(
        completion,
        AiCompletion::Applied {
            cell: 4,
            source: MoveSource::Oracle
        }
    );
    assert!(!arbiter.session().is_thinking());
}

#[tokio::test]
async fn test_answer_after_reset_is_discarded() {
    let oracle = ScriptedOracle::returning(4);
    let mut arbiter = MoveArbiter::new(GameMode::HumanVsAi, oracle, instant());
    arbiter.on_human_click(0);

    let task = arbiter.begin_ai_turn().expect("AI should be due");
    arbiter.reset_game();
    assert!(!arbiter.session().is_thinking());

    let resolution = task.run().await;
    assert_eq!(
        arbiter.complete_ai_turn(resolution).unwrap(),
        AiCompletion::Discarded
    );
    assert!(arbiter.session().board().is_blank());
    assert_eq!(arbiter.session().active_seat(), Seat::X);
}

#[tokio::test]
async fn test_answer_after_mode_change_is_discarded() {
    let oracle = ScriptedOracle::returning(4);
    let mut arbiter = MoveArbiter::new(GameMode::HumanVsAi, oracle, instant());
    arbiter.on_human_click(0);

    let task = arbiter.begin_ai_turn().expect("AI should be due");
    arbiter.change_mode(GameMode::HumanVsHuman);

    let resolution = task.run().await;
    assert_eq!(
        arbiter.complete_ai_turn(resolution).unwrap(),
        AiCompletion::Discarded
    );
    assert!(arbiter.session().board().is_blank());
    assert_eq!(arbiter.session().mode(), GameMode::HumanVsHuman);
}

#[tokio::test]
async fn test_thinking_delay_is_observed() {
    let oracle = ScriptedOracle::returning(4);
    let settings = ArbiterSettings::new(Duration::from_millis(30), Duration::from_secs(5));
    let mut arbiter = MoveArbiter::new(GameMode::HumanVsAi, oracle, settings);
    arbiter.on_human_click(0);

    let started = std::time::Instant::now();
    arbiter.resolve_ai_turn().await.unwrap();
    assert!(started.elapsed() >= Duration::from_millis(30));
}

#[test]
fn test_settle_with_no_empty_cells_is_invariant_violation() {
    let board = Board::parse("XOXXOOOXX").unwrap();
    let mut rng = StdRng::seed_from_u64(1);

    let result = settle_move(&board, Ok(MoveSuggestion::new(0)), &mut rng);
    assert_eq!(result, Err(ArbiterError::NoLegalMoves(board.clone())));
}

#[test]
fn test_settle_accepts_legal_suggestion() {
    let board = Board::parse("XX.OO....").unwrap();
    let mut rng = StdRng::seed_from_u64(1);

    let result = settle_move(&board, Ok(MoveSuggestion::new(2)), &mut rng);
    assert_eq!(result, Ok((2, MoveSource::Oracle)));
}

#[test]
fn test_settle_fallback_only_picks_empty_cells() {
    let board = Board::parse("XOXOO.X..").unwrap();
    let empty = board.empty_cells();
    for seed in 0..50 {
        let mut rng = StdRng::seed_from_u64(seed);
        let error = OracleError::new(OracleErrorKind::Malformed("garbage".into()));
        let (cell, source) = settle_move(&board, Err(error), &mut rng).unwrap();
        assert_eq!(source, MoveSource::Fallback);
        assert!(empty.contains(&cell));
    }
}

#[tokio::test]
async fn test_panicking_oracle_is_unavailable() {
    let board = Board::parse("X........").unwrap();
    let err = request_move(
        Arc::new(PanickingOracle),
        board,
        Seat::O,
        Duration::from_secs(5),
    )
    .await
    .unwrap_err();
    assert!(matches!(err.kind, OracleErrorKind::Unavailable(_)));
}

#[tokio::test]
async fn test_panicking_oracle_falls_back_and_clears_thinking() {
    let board = Board::parse("X........").unwrap();
    let session = GameSession::from_position(GameMode::HumanVsAi, board, Seat::O);
    let mut arbiter =
        MoveArbiter::from_session(session, Arc::new(PanickingOracle), instant()).with_seed(7);

    // Driven the way the terminal UI drives it: the task runs on its own.
    let task = arbiter.begin_ai_turn().expect("AI should be due");
    let resolution = tokio::spawn(task.run())
        .await
        .expect("AI task should survive its oracle");

    let completion = arbiter.complete_ai_turn(resolution).unwrap();
    assert!(matches!(
        completion,
        AiCompletion::Applied {
            source: MoveSource::Fallback,
            ..
        }
    ));
    let session = arbiter.session();
    assert!(!session.is_thinking());
    assert_eq!(session.board().mark_count(Seat::O), 1);
    assert_eq!(session.active_seat(), Seat::X);
    assert_eq!(session.status_message(), "Your Turn (X)");
}

#[test]
fn test_events_do_not_recreate_session() {
    use tracing_subscriber::layer::SubscriberExt;

    let hits = Arc::new(AtomicUsize::new(0));
    let subscriber = tracing_subscriber::registry().with(MessageCounter {
        message: "Creating game session",
        hits: Arc::clone(&hits),
    });

    tracing::subscriber::with_default(subscriber, || {
        let mut arbiter =
            MoveArbiter::new(GameMode::HumanVsHuman, ScriptedOracle::returning(4), instant());
        arbiter.on_human_click(0);
        arbiter.reset_game();
        arbiter.reset_scores();
    });

    // Only the constructor creates a session.
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}
