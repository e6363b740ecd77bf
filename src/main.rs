//! Gambit - unified CLI
//!
//! Terminal tic-tac-toe with an LLM opponent, plus a one-shot move query.

#![warn(missing_docs)]

mod cli;
mod tui;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Command};
use gambit::{
    Board, GameConfig, LlmClient, LlmOracle, MoveArbiter, MoveOracle, MoveSource, RandomOracle,
    Seat, compute_result, request_move, settle_move,
};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Command::Play { mode } => {
            init_file_logging()?;
            let mut config = GameConfig::load_or_default(&cli.config)?;
            if let Some(model) = cli.model {
                config = config.with_model(model);
            }
            let mode = mode.unwrap_or(*config.mode());
            let oracle = build_oracle(&config, cli.offline);
            let arbiter = MoveArbiter::new(mode, oracle, config.arbiter_settings());
            tui::run_tui(arbiter).await
        }
        Command::Suggest { board, seat } => {
            init_stderr_logging();
            let mut config = GameConfig::load_or_default(&cli.config)?;
            if let Some(model) = cli.model {
                config = config.with_model(model);
            }
            run_suggest(&config, cli.offline, &board, seat).await
        }
    }
}

/// Logs to a file so the terminal UI is not overwritten.
fn init_file_logging() -> Result<()> {
    let log_file = std::fs::File::create("gambit_tui.log").context("Failed to create log file")?;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(Arc::new(log_file))
        .with_ansi(false)
        .try_init();
    Ok(())
}

fn init_stderr_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .try_init();
}

/// Picks the LLM oracle when a key is configured, the random one otherwise.
#[instrument(skip(config))]
fn build_oracle(config: &GameConfig, offline: bool) -> Arc<dyn MoveOracle> {
    if offline {
        info!("Offline mode, using random oracle");
        return Arc::new(RandomOracle::new());
    }

    match config.create_llm_config() {
        Ok(llm_config) => Arc::new(LlmOracle::new(LlmClient::new(llm_config))),
        Err(e) => {
            warn!(error = %e, "No LLM available, using random oracle");
            Arc::new(RandomOracle::new())
        }
    }
}

/// Asks the oracle for one move and prints the cell that would be played.
#[instrument(skip(config))]
async fn run_suggest(config: &GameConfig, offline: bool, notation: &str, seat: Seat) -> Result<()> {
    let board = Board::parse(notation).context("Invalid board")?;
    let outcome = compute_result(&board);
    if outcome.result().is_terminal() {
        anyhow::bail!("Board is already finished: {:?}", outcome.result());
    }

    let oracle = build_oracle(config, offline);
    let settings = config.arbiter_settings();
    let suggestion = request_move(
        Arc::clone(&oracle),
        board.clone(),
        seat,
        settings.oracle_timeout(),
    )
    .await;
    if let Ok(suggestion) = &suggestion {
        if let Some(reasoning) = suggestion.reasoning() {
            println!("Reasoning: {}", reasoning);
        }
    }

    let (cell, source) = settle_move(&board, suggestion, &mut rand::thread_rng())?;
    let next = gambit::apply_move(&board, cell, seat)?;
    match source {
        MoveSource::Oracle => println!("{} plays {} ({})", seat, cell, oracle.name()),
        MoveSource::Fallback => println!("{} plays {} (random fallback)", seat, cell),
    }
    println!("{}", next.display());
    Ok(())
}
