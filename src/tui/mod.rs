//! Terminal UI for Gambit

mod app;
mod input;
mod ui;

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use gambit::{AiResolution, MoveArbiter};
use ratatui::{Terminal, backend::CrosstermBackend};
use std::io;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, error, info, instrument};

use app::{App, Control};

/// Runs the terminal UI until the user quits.
pub async fn run_tui(arbiter: MoveArbiter) -> Result<()> {
    info!(mode = %arbiter.session().mode(), "Starting Gambit TUI");

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, App::new(arbiter)).await;

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = &res {
        error!(error = ?err, "Game loop error");
    }

    res
}

/// Event loop: starts AI turns, applies their answers, draws, reads keys.
///
/// AI tasks run on the runtime and report back over a channel, so the board
/// keeps rendering and input is answered while the oracle is outstanding.
#[instrument(skip_all)]
async fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    mut app: App,
) -> Result<()> {
    let (ai_tx, mut ai_rx) = mpsc::unbounded_channel::<AiResolution>();

    loop {
        if let Some(task) = app.arbiter_mut().begin_ai_turn() {
            debug!(generation = task.request().generation(), "Spawning AI task");
            let tx = ai_tx.clone();
            tokio::spawn(async move {
                // The receiver only goes away when the UI exits.
                let _ = tx.send(task.run().await);
            });
        }

        while let Ok(resolution) = ai_rx.try_recv() {
            app.complete_ai_turn(resolution);
        }

        terminal.draw(|f| ui::draw(f, &app))?;

        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press && app.handle_key(key.code) == Control::Quit {
                    info!("User quit");
                    return Ok(());
                }
            }
        }
    }
}
